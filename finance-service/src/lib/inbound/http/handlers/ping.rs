use axum::Json;
use serde_json::json;
use serde_json::Value;

/// Liveness probe; answers without touching storage.
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
