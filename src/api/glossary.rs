use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use rueso_backend::catalogs::glossary::{self, GameFamily, GlossaryQuery};
use rueso_backend::utils::file_modified;

use super::{empty_object, internal_error, ApiResult};
use crate::state::AppState;

async fn search_family(
    state: &AppState,
    family: GameFamily,
    params: &HashMap<String, String>,
) -> ApiResult {
    let catalog = state.glossary(family);
    let query = GlossaryQuery::from_params(params);
    let response = glossary::search(&catalog.pool, &catalog.games, &query)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(response)))
}

/// GET /search - TES glossary, kept for old clients / Поиск по глоссарию TES
pub async fn legacy_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    search_family(&state, GameFamily::Tes, &params).await
}

/// GET /glossary/:family/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(family): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    search_family(&state, GameFamily::from(family.as_str()), &params).await
}

/// GET /glossary/:family/updated - Database modification time / Дата обновления базы
pub async fn updated(
    State(state): State<Arc<AppState>>,
    Path(family): Path<String>,
) -> Json<Value> {
    let catalog = state.glossary(GameFamily::from(family.as_str()));
    match file_modified(&catalog.db_path) {
        Some(updated) => Json(json!({ "updated": updated })),
        None => empty_object(),
    }
}
