//! Facet allow-lists / Допустимые значения фасетов

use std::collections::BTreeSet;

/// Fixed set of facet tokens accepted for one catalog family / Белый список фасетов
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetAllowList {
    values: BTreeSet<String>,
}

impl FacetAllowList {
    /// Build an allow-list / Создать белый список
    ///
    /// Facet values are spliced into FTS5 `col:^value` expressions, so only
    /// plain word tokens (letters, digits, `_`) are accepted; anything else is
    /// dropped with a warning.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = BTreeSet::new();
        for value in values {
            let value = value.as_ref().trim();
            if is_facet_token(value) {
                accepted.insert(value.to_string());
            } else {
                tracing::warn!("Ignoring invalid facet value in allow-list: {:?}", value);
            }
        }
        Self { values: accepted }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.values.contains(token)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Intersect client tokens with the allow-list / Пересечение с белым списком
    ///
    /// Unknown tokens are silently dropped, never an error.
    pub fn validate<'a, I>(&self, tokens: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens
            .into_iter()
            .map(str::trim)
            .filter(|token| self.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Validate a comma-separated token list, e.g. `games=skyrim,eso`
    pub fn validate_csv(&self, raw: &str) -> BTreeSet<String> {
        self.validate(raw.split(','))
    }
}

/// FTS5 keywords are case-sensitive, only the uppercase forms are operators
const FTS_KEYWORDS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

fn is_facet_token(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !FTS_KEYWORDS.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tes() -> FacetAllowList {
        FacetAllowList::new(["eso", "skyrim", "oblivion", "morrowind"])
    }

    #[test]
    fn test_validate_drops_unknown() {
        let games = tes().validate(["skyrim", "atlantis"]);
        assert_eq!(games.into_iter().collect::<Vec<_>>(), vec!["skyrim".to_string()]);
    }

    #[test]
    fn test_validate_csv() {
        let games = tes().validate_csv("eso, skyrim,,eso,bogus");
        assert_eq!(games.len(), 2);
        assert!(games.contains("eso"));
        assert!(games.contains("skyrim"));
        assert!(tes().validate_csv("").is_empty());
    }

    #[test]
    fn test_new_rejects_operator_tokens() {
        let list = FacetAllowList::new(["skyrim", "a OR b", "x:^y", "", "OR", "AND", "NOT", "NEAR", "near"]);
        assert_eq!(list.len(), 2);
        assert!(list.contains("skyrim"));
        assert!(list.contains("near"));
        assert!(list.validate_csv("OR,NOT,skyrim").into_iter().eq(["skyrim".to_string()]));
    }

    proptest! {
        #[test]
        fn prop_validated_is_subset(tokens in proptest::collection::vec("[a-z]{0,9}", 0..8)) {
            let list = tes();
            let validated = list.validate(tokens.iter().map(String::as_str));
            for token in &validated {
                prop_assert!(list.contains(token));
            }
        }

        #[test]
        fn prop_unknown_token_is_same_as_omitting(
            tokens in proptest::collection::vec("(eso|skyrim|oblivion)", 0..4),
            bogus in "[a-z]{1,9}",
        ) {
            let list = tes();
            prop_assume!(!list.contains(&bogus));
            let without = list.validate(tokens.iter().map(String::as_str));
            let with = list.validate(tokens.iter().map(String::as_str).chain([bogus.as_str()]));
            prop_assert_eq!(without, with);
        }
    }
}
