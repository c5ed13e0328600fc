// rest_api/src/handlers/appointments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Appointment, AppointmentUpdate, Identified, NewAppointment, RecordId};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::ApiError;
use crate::extractors::ValidJson;
use crate::AppState;

fn parse_ids(patient_id: &str, appointment_id: &str) -> Result<(RecordId, RecordId), ApiError> {
    Ok((
        RecordId::parse(patient_id, "patient ID")?,
        RecordId::parse(appointment_id, "appointment ID")?,
    ))
}

/// `GET /api/patients/:patient_id/appointments`
///
/// An unknown patient simply has no appointments.
pub async fn list_appointments_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Identified<Appointment>>>, ApiError> {
    let patient_id = RecordId::parse(&patient_id, "patient ID")?;
    let appointments = state.storage.list_appointments(&patient_id, state.list_limit).await?;
    Ok(Json(
        appointments
            .into_iter()
            .map(|(id, appointment)| Identified::new(id, appointment))
            .collect(),
    ))
}

/// `POST /api/patients/:patient_id/appointments`
pub async fn create_appointment_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    ValidJson(payload): ValidJson<NewAppointment>,
) -> Result<(StatusCode, Json<Identified<Appointment>>), ApiError> {
    let patient_id = RecordId::parse(&patient_id, "patient ID")?;
    payload.validate()?;
    if state.storage.get_patient(&patient_id).await?.is_none() {
        return Err(ApiError::not_found("Patient"));
    }

    let appointment = payload.into_appointment(patient_id);
    let id = state.storage.create_appointment(&appointment).await?;
    info!("Created appointment {} for patient {}", id, patient_id);
    Ok((StatusCode::CREATED, Json(Identified::new(id, appointment))))
}

/// `PUT /api/patients/:patient_id/appointments/:appointment_id`
pub async fn update_appointment_handler(
    State(state): State<AppState>,
    Path((patient_id, appointment_id)): Path<(String, String)>,
    ValidJson(payload): ValidJson<AppointmentUpdate>,
) -> Result<Json<Identified<Appointment>>, ApiError> {
    let (patient_id, appointment_id) = parse_ids(&patient_id, &appointment_id)?;
    payload.validate()?;

    let appointment = state
        .storage
        .update_appointment(&appointment_id, &patient_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment"))?;
    Ok(Json(Identified::new(appointment_id, appointment)))
}

/// `DELETE /api/patients/:patient_id/appointments/:appointment_id`
pub async fn delete_appointment_handler(
    State(state): State<AppState>,
    Path((patient_id, appointment_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let (patient_id, appointment_id) = parse_ids(&patient_id, &appointment_id)?;
    if !state.storage.delete_appointment(&appointment_id, &patient_id).await? {
        return Err(ApiError::not_found("Appointment"));
    }
    info!("Deleted appointment {} of patient {}", appointment_id, patient_id);
    Ok(Json(json!({ "message": "Appointment deleted" })))
}
