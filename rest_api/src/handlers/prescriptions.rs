// rest_api/src/handlers/prescriptions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Identified, NewPrescription, Prescription, PrescriptionUpdate, RecordId};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::ApiError;
use crate::extractors::ValidJson;
use crate::AppState;

fn parse_ids(patient_id: &str, prescription_id: &str) -> Result<(RecordId, RecordId), ApiError> {
    Ok((
        RecordId::parse(patient_id, "patient ID")?,
        RecordId::parse(prescription_id, "prescription ID")?,
    ))
}

pub async fn list_prescriptions_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Identified<Prescription>>>, ApiError> {
    let patient_id = RecordId::parse(&patient_id, "patient ID")?;
    let prescriptions = state.storage.list_prescriptions(&patient_id, state.list_limit).await?;
    Ok(Json(
        prescriptions
            .into_iter()
            .map(|(id, prescription)| Identified::new(id, prescription))
            .collect(),
    ))
}

pub async fn create_prescription_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    ValidJson(payload): ValidJson<NewPrescription>,
) -> Result<(StatusCode, Json<Identified<Prescription>>), ApiError> {
    let patient_id = RecordId::parse(&patient_id, "patient ID")?;
    payload.validate()?;
    if state.storage.get_patient(&patient_id).await?.is_none() {
        return Err(ApiError::not_found("Patient"));
    }

    let prescription = payload.into_prescription(patient_id);
    let id = state.storage.create_prescription(&prescription).await?;
    info!("Created prescription {} for patient {}", id, patient_id);
    Ok((StatusCode::CREATED, Json(Identified::new(id, prescription))))
}

pub async fn update_prescription_handler(
    State(state): State<AppState>,
    Path((patient_id, prescription_id)): Path<(String, String)>,
    ValidJson(payload): ValidJson<PrescriptionUpdate>,
) -> Result<Json<Identified<Prescription>>, ApiError> {
    let (patient_id, prescription_id) = parse_ids(&patient_id, &prescription_id)?;
    payload.validate()?;

    let prescription = state
        .storage
        .update_prescription(&prescription_id, &patient_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Prescription"))?;
    Ok(Json(Identified::new(prescription_id, prescription)))
}

pub async fn delete_prescription_handler(
    State(state): State<AppState>,
    Path((patient_id, prescription_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let (patient_id, prescription_id) = parse_ids(&patient_id, &prescription_id)?;
    if !state.storage.delete_prescription(&prescription_id, &patient_id).await? {
        return Err(ApiError::not_found("Prescription"));
    }
    info!("Deleted prescription {} of patient {}", prescription_id, patient_id);
    Ok(Json(json!({ "message": "Prescription deleted" })))
}
