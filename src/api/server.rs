use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - Health check / Проверка состояния
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "RuESO backend is running",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}
