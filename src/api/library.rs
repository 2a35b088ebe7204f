use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use rueso_backend::catalogs::library;
use rueso_backend::utils::{is_patch_version, parse_id_list};

use super::{empty_object, internal_error, paging, ApiResult};
use crate::state::AppState;

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id >= 1)
}

/// GET /library/books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let books = library::list_books(&state.library, paging(&params))
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(books)))
}

/// GET /library/books/by-ids?ids=1,2,3
pub async fn books_by_ids(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let ids = parse_id_list(params.get("ids").map(String::as_str).unwrap_or_default());
    let books = library::books_with_ids(&state.library, &ids)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(books)))
}

/// GET /library/books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let Some(id) = parse_id(&id) else {
        return Ok(empty_object());
    };
    let book = library::get_book(&state.library, id)
        .await
        .map_err(internal_error)?;
    Ok(book.map(|b| Json(json!(b))).unwrap_or_else(empty_object))
}

/// GET /library/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult {
    let categories = library::list_categories(&state.library)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(categories)))
}

/// GET /library/categories/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let Some(id) = parse_id(&id) else {
        return Ok(empty_object());
    };
    let category = library::get_category(&state.library, id, paging(&params))
        .await
        .map_err(internal_error)?;
    Ok(category.map(|c| Json(json!(c))).unwrap_or_else(empty_object))
}

/// GET /library/patches
pub async fn list_patches(State(state): State<Arc<AppState>>) -> ApiResult {
    let patches = library::list_patches(&state.library)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(patches)))
}

/// GET /library/patches/:version
pub async fn get_patch(
    State(state): State<Arc<AppState>>,
    Path(version): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    if !is_patch_version(&version) {
        return Ok(empty_object());
    }
    let patch = library::get_patch(&state.library, &version, paging(&params))
        .await
        .map_err(internal_error)?;
    Ok(patch.map(|p| Json(json!(p))).unwrap_or_else(empty_object))
}
