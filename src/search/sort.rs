//! Sort resolution against fixed column lists / Разрешение сортировки
//!
//! Two request styles exist:
//! - datatables: a column index plus a direction (glossary)
//! - named keys such as `name_asc` (item catalog)
//!
//! Neither style ever fails a request; bad input degrades to "unsorted" or to
//! the documented default.

use serde::{Deserialize, Serialize};

/// Sort direction / Направление сортировки
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse, anything else is rejected
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Validated ORDER BY target / Проверенная колонка сортировки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(column: &'static str, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub const fn asc(column: &'static str) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub const fn desc(column: &'static str) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

/// Ordered column list addressed by client index / Колонки по индексу
#[derive(Debug, Clone, Copy)]
pub struct ColumnAllowList {
    columns: &'static [&'static str],
}

impl ColumnAllowList {
    pub const fn new(columns: &'static [&'static str]) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn get(&self, index: i64) -> Option<&'static str> {
        usize::try_from(index).ok().and_then(|i| self.columns.get(i).copied())
    }

    /// Resolve `order[0][column]` + `order[0][dir]` / Разрешить сортировку по индексу
    ///
    /// A missing direction means ascending. An invalid direction or an
    /// out-of-range index resolves to `None` (no ORDER BY).
    pub fn resolve(&self, index: Option<i64>, direction: Option<&str>) -> Option<SortSpec> {
        let direction = match direction {
            Some(raw) => SortDirection::parse(raw)?,
            None => SortDirection::Asc,
        };
        let column = self.get(index?)?;
        Some(SortSpec::new(column, direction))
    }
}

/// Named sort keys with a fallback ordering / Именованные ключи сортировки
#[derive(Debug, Clone, Copy)]
pub struct NamedSort {
    entries: &'static [(&'static str, SortSpec)],
    default: SortSpec,
}

impl NamedSort {
    pub const fn new(entries: &'static [(&'static str, SortSpec)], default: SortSpec) -> Self {
        Self { entries, default }
    }

    pub fn default_spec(&self) -> SortSpec {
        self.default
    }

    /// Unknown or missing keys resolve to the default ordering
    pub fn resolve(&self, key: Option<&str>) -> SortSpec {
        key.and_then(|key| {
            let key = key.trim();
            self.entries
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, spec)| *spec)
        })
        .unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: ColumnAllowList = ColumnAllowList::new(&["game", "type", "en", "ru"]);

    const ORDERS: NamedSort = NamedSort::new(
        &[
            ("name_asc", SortSpec::asc("orderByName")),
            ("name_desc", SortSpec::desc("orderByName")),
        ],
        SortSpec::desc("orderByFormId"),
    );

    #[test]
    fn test_direction_parse() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse(" Desc "), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("sideways"), None);
        assert_eq!(SortDirection::parse(""), None);
    }

    #[test]
    fn test_resolve_by_index() {
        assert_eq!(COLUMNS.resolve(Some(2), Some("desc")), Some(SortSpec::desc("en")));
        assert_eq!(COLUMNS.resolve(Some(0), None), Some(SortSpec::asc("game")));
    }

    #[test]
    fn test_resolve_by_index_rejects_bad_input() {
        assert_eq!(COLUMNS.resolve(Some(4), Some("asc")), None);
        assert_eq!(COLUMNS.resolve(Some(-1), Some("asc")), None);
        assert_eq!(COLUMNS.resolve(None, Some("asc")), None);
        assert_eq!(COLUMNS.resolve(Some(1), Some("; DROP TABLE")), None);
    }

    #[test]
    fn test_named_sort_default() {
        assert_eq!(ORDERS.resolve(Some("name_asc")), SortSpec::asc("orderByName"));
        assert_eq!(ORDERS.resolve(Some("NAME_DESC")), SortSpec::desc("orderByName"));
        assert_eq!(ORDERS.resolve(Some("bogus")), SortSpec::desc("orderByFormId"));
        assert_eq!(ORDERS.resolve(None), ORDERS.default_spec());
    }
}
