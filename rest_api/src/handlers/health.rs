// rest_api/src/handlers/health.rs

use axum::Json;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "clinic-portal-api";

pub async fn health_check_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}
