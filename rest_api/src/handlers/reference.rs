// rest_api/src/handlers/reference.rs

use axum::{extract::State, Json};
use models::ReferenceKind;

use crate::errors::ApiError;
use crate::AppState;

async fn reference_values(state: &AppState, kind: ReferenceKind) -> Result<Json<Vec<String>>, ApiError> {
    let values = state.storage.get_reference(kind).await?.unwrap_or_default();
    Ok(Json(values))
}

/// `GET /api/reference/medications`; empty until the store is seeded.
pub async fn medications_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    reference_values(&state, ReferenceKind::Medications).await
}

/// `GET /api/reference/dosages`
pub async fn dosages_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    reference_values(&state, ReferenceKind::Dosages).await
}
