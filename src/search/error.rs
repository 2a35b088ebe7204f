use thiserror::Error;

/// Search failures / Ошибки поиска
///
/// Unknown sort keys and facet tokens are not errors; they never reach here.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("catalog `{0}` has no full-text index")]
    NoTextIndex(&'static str),

    #[error("catalog `{0}` has no facet column")]
    NoFacetColumn(&'static str),

    #[error("column `{column}` is not sortable in `{table}`")]
    UnsortableColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}
