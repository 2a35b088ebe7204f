use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use rueso_backend::catalogs::atx::{self, ItemListQuery};
use rueso_backend::utils::is_form_id;

use super::{empty_object, internal_error, ApiResult};
use crate::state::AppState;

/// Validated form id without the `0x` prefix
fn form_id(raw: &str) -> Option<&str> {
    if !is_form_id(raw) {
        return None;
    }
    Some(
        raw.strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw),
    )
}

/// GET /atx/items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let query = ItemListQuery::from_params(&params);
    let items = atx::list_items(&state.atx, &query)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(items)))
}

/// GET /atx/items/:form_id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> ApiResult {
    let Some(id) = form_id(&raw) else {
        return Ok(empty_object());
    };
    let item = atx::get_item(&state.atx, id).await.map_err(internal_error)?;
    Ok(item.map(|i| Json(json!(i))).unwrap_or_else(empty_object))
}

/// GET /atx/categories
pub async fn categories(State(state): State<Arc<AppState>>) -> ApiResult {
    let tree = atx::categories_tree(&state.atx)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(tree)))
}

/// GET /atx/categories/:form_id/items
pub async fn category_items(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let Some(id) = form_id(&raw) else {
        return Ok(empty_object());
    };
    let query = ItemListQuery::from_params(&params);
    let found = atx::category_items(&state.atx, id, &query)
        .await
        .map_err(internal_error)?;
    Ok(found.map(|f| Json(json!(f))).unwrap_or_else(empty_object))
}

/// GET /atx/subcategories/:form_id/items
pub async fn subcategory_items(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let Some(id) = form_id(&raw) else {
        return Ok(empty_object());
    };
    let query = ItemListQuery::from_params(&params);
    let found = atx::subcategory_items(&state.atx, id, &query)
        .await
        .map_err(internal_error)?;
    Ok(found.map(|f| Json(json!(f))).unwrap_or_else(empty_object))
}
