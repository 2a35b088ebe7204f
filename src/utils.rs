/// Request and rendering helper functions / Вспомогательные функции

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Form id: 1-8 hex digits, optional 0x prefix / Идентификатор формы
static FORM_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0[xX])?[0-9A-Fa-f]{1,8}$").unwrap()
});

/// Patch version: 1, 1.2, 1.2.3 ... / Версия патча
static PATCH_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(\.\d+)*$").unwrap()
});

/// Render free text for safe display / Подготовить текст для HTML
/// 1. HTML-escape / экранировать HTML
/// 2. Newlines become `<br>` / переводы строк в `<br>`
pub fn prepare_html(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.is_empty() => {
            html_escape::encode_quoted_attribute(text).replace('\n', "<br>")
        }
        _ => String::new(),
    }
}

/// Parse a positive integer parameter, falling back to the default / Положительное число
pub fn parse_positive_int(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// Parse a non-negative integer parameter (datatables `start`) / Неотрицательное число
pub fn parse_non_negative_int(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
        .unwrap_or(default)
}

/// Parse `1,2,3` into ids, invalid entries are dropped / Список идентификаторов
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        if let Ok(id) = part.trim().parse::<i64>() {
            if id >= 1 && !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Split a delimiter-joined field into a list / Разбить строку со списком
pub fn split_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_form_id(raw: &str) -> bool {
    FORM_ID.is_match(raw)
}

pub fn is_patch_version(raw: &str) -> bool {
    PATCH_VERSION.is_match(raw)
}

/// Last modification time of a file, RFC 3339 / Время изменения файла
pub fn file_modified(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let modified: DateTime<Utc> = modified.into();
    Some(modified.to_rfc3339())
}
