//! Term sanitizer - turns raw user input into FTS5 phrase strings / Санитайзер поисковых строк
//!
//! FTS5 treats bare words and symbols (`AND`, `OR`, `NOT`, `-`, `*`, `^`, `:`)
//! as query operators. Every user-supplied term is wrapped into a phrase
//! string, so none of them are interpreted.

/// Quote a raw search string as an FTS5 phrase / Обернуть строку в фразу FTS5
///
/// - `"` is doubled so the phrase cannot be terminated early
/// - non-breaking space and control characters become a regular space
/// - typographic single quotes become `'`
/// - typographic double quotes become an escaped `""`
pub fn quote_phrase(raw: &str) -> String {
    let mut phrase = String::with_capacity(raw.len() + 2);
    phrase.push('"');
    for c in raw.chars() {
        match c {
            '"' => phrase.push_str("\"\""),
            '\u{00A0}' => phrase.push(' '),
            c if c.is_control() => phrase.push(' '),
            '\u{2018}' | '\u{2019}' => phrase.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => phrase.push_str("\"\""),
            _ => phrase.push(c),
        }
    }
    phrase.push('"');
    phrase
}

/// Check if text contains Cyrillic characters / Есть ли в тексте кириллица
pub fn contains_cyrillic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0400}'..='\u{04FF}' |  // Cyrillic
            '\u{0500}'..='\u{052F}'    // Cyrillic Supplement
        )
    })
}
