//! Bilingual glossary catalog / Двуязычный глоссарий
//!
//! The `glossary` table is an FTS5 table (`game, type, en, ru, tag`). Requests
//! arrive in datatables format: offset paging, per-column filters and a sort
//! column index.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::search::{
    build_plan, execute, CatalogSchema, ColumnAllowList, FacetAllowList, FieldColumn, Paging,
    SearchError, SearchRequest, TermRouting, TextIndex,
};
use crate::utils::{parse_non_negative_int, parse_positive_int, prepare_html};

pub const TABLE_NAME: &str = "glossary";

/// Datatables column order / Порядок колонок datatables
pub const COLUMNS: ColumnAllowList = ColumnAllowList::new(&["game", "type", "en", "ru"]);

pub const SCHEMA: CatalogSchema = CatalogSchema {
    table: TABLE_NAME,
    alias: None,
    columns: &["game", "type", "en", "ru", "tag"],
    sortable: &["game", "type", "en", "ru"],
    index: TextIndex::Inline,
    routing: TermRouting::Bilingual { latin: "en", cyrillic: "ru" },
    fields: &[
        FieldColumn { key: "type", column: "type" },
        FieldColumn { key: "en", column: "en" },
        FieldColumn { key: "ru", column: "ru" },
    ],
    facet_column: Some("game"),
};

/// Glossary family, one database each / Семейство игр
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameFamily {
    Tes,
    Fallout,
}

impl From<&str> for GameFamily {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "fallout" => GameFamily::Fallout,
            _ => GameFamily::Tes,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GlossaryRow {
    pub game: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub en: Option<String>,
    pub ru: Option<String>,
    pub tag: Option<String>,
}

/// Public glossary entry / Запись глоссария
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    pub game: Option<String>,
    pub en: String,
    pub ru: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub tag: Option<String>,
}

impl From<GlossaryRow> for GlossaryEntry {
    fn from(row: GlossaryRow) -> Self {
        Self {
            game: row.game,
            en: prepare_html(row.en.as_deref()),
            ru: prepare_html(row.ru.as_deref()),
            kind: row.kind,
            tag: row.tag,
        }
    }
}

/// Datatables request / Запрос datatables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryQuery {
    pub draw: String,
    pub start: i64,
    pub length: i64,
    pub search_value: String,
    /// `columns[i][search][value]`, same order as [`COLUMNS`]
    pub column_filters: Vec<String>,
    pub order_column: Option<i64>,
    pub order_dir: Option<String>,
    pub games: String,
}

impl Default for GlossaryQuery {
    fn default() -> Self {
        Self {
            draw: "1".to_string(),
            start: 0,
            length: 10,
            search_value: String::new(),
            column_filters: vec![String::new(); COLUMNS.columns().len()],
            order_column: None,
            order_dir: None,
            games: String::new(),
        }
    }
}

impl GlossaryQuery {
    /// Derive from raw query parameters / Разобрать параметры запроса
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);
        Self {
            draw: get("draw").filter(|d| !d.is_empty()).unwrap_or("1").to_string(),
            start: parse_non_negative_int(get("start"), 0),
            length: parse_positive_int(get("length"), 10),
            search_value: get("search[value]").unwrap_or_default().to_string(),
            column_filters: (0..COLUMNS.columns().len())
                .map(|i| {
                    get(&format!("columns[{}][search][value]", i))
                        .unwrap_or_default()
                        .to_string()
                })
                .collect(),
            order_column: get("order[0][column]").and_then(|c| c.trim().parse().ok()),
            order_dir: get("order[0][dir]").map(str::to_string),
            games: get("games").unwrap_or_default().to_string(),
        }
    }

    /// Normalize into a search request / Преобразовать в поисковый запрос
    pub fn to_request(&self, games: &FacetAllowList) -> SearchRequest {
        let mut request = SearchRequest::new(Paging::offset(self.start, self.length))
            .facets(games.validate_csv(&self.games))
            .sort(COLUMNS.resolve(self.order_column, self.order_dir.as_deref()));

        if !self.search_value.is_empty() {
            request = request.term(self.search_value.as_str());
        }
        // Slot 0 (game) is served by the facet, not by a text filter
        for (column, value) in COLUMNS.columns().iter().zip(&self.column_filters).skip(1) {
            if !value.is_empty() {
                request = request.filter(*column, value.as_str());
            }
        }
        request
    }
}

/// Datatables response / Ответ datatables
#[derive(Debug, Clone, Serialize)]
pub struct GlossaryResponse {
    pub draw: String,
    #[serde(rename = "recordsTotal")]
    pub records_total: i64,
    #[serde(rename = "recordsFiltered")]
    pub records_filtered: i64,
    pub data: Vec<GlossaryEntry>,
}

/// Search one glossary family / Поиск по глоссарию
pub async fn search(
    pool: &SqlitePool,
    games: &FacetAllowList,
    query: &GlossaryQuery,
) -> Result<GlossaryResponse, SearchError> {
    let request = query.to_request(games);
    let plan = build_plan(&SCHEMA, &request)?;
    let result = execute::<GlossaryRow>(pool, &plan).await?.map(GlossaryEntry::from);

    Ok(GlossaryResponse {
        draw: query.draw.clone(),
        // No separate unfiltered total is tracked
        records_total: result.total,
        records_filtered: result.total,
        data: result.rows,
    })
}
