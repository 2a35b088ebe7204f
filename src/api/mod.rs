pub mod atx;
pub mod glossary;
pub mod library;
pub mod server;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rueso_backend::search::{Paging, SearchError};
use rueso_backend::utils::parse_positive_int;

use crate::state::AppState;

pub type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Not-found body / Пустой ответ для ненайденных записей
pub fn empty_object() -> Json<Value> {
    Json(Value::Object(Map::new()))
}

/// Storage failure → 500 / Ошибка хранилища → 500
pub fn internal_error(err: SearchError) -> (StatusCode, Json<Value>) {
    tracing::error!("Catalog query failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": err.to_string()})),
    )
}

/// `page` / `page_size` query parameters, defaults 1 / 10
pub fn paging(params: &HashMap<String, String>) -> Paging {
    Paging::page(
        parse_positive_int(params.get("page").map(String::as_str), 1),
        parse_positive_int(params.get("page_size").map(String::as_str), 10),
    )
}

/// CORS restricted to configured origins / CORS по списку источников
///
/// An empty list allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        // Glossary / Глоссарий
        .route("/search", get(glossary::legacy_search))
        .route("/glossary/:family/search", get(glossary::search))
        .route("/glossary/:family/updated", get(glossary::updated))
        // Library / Библиотека
        .route("/library/books", get(library::list_books))
        .route("/library/books/by-ids", get(library::books_by_ids))
        .route("/library/books/:id", get(library::get_book))
        .route("/library/categories", get(library::list_categories))
        .route("/library/categories/:id", get(library::get_category))
        .route("/library/patches", get(library::list_patches))
        .route("/library/patches/:version", get(library::get_patch))
        // Atomic Shop / Атомная лавка
        .route("/atx/items", get(atx::list_items))
        .route("/atx/items/:form_id", get(atx::get_item))
        .route("/atx/categories", get(atx::categories))
        .route("/atx/categories/:form_id/items", get(atx::category_items))
        .route("/atx/subcategories/:form_id/items", get(atx::subcategory_items))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
