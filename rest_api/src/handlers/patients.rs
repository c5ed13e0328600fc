// rest_api/src/handlers/patients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{
    Identified, NewPatient, Patient, PatientChanges, PatientProfile, PatientSummary, PatientUpdate,
    RecordId, ValidationError,
};
use tracing::info;

use crate::errors::{conflict_as, ApiError};
use crate::extractors::ValidJson;
use crate::handlers::hash_password_blocking;
use crate::AppState;

const DUPLICATE_EMAIL: &str = "A patient with this email already exists";
const EMAIL_IN_USE: &str = "Email already in use";

/// `GET /api/patients`
pub async fn list_patients_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Identified<PatientSummary>>>, ApiError> {
    let patients = state.storage.list_patients(state.list_limit).await?;
    let appointment_counts = state.storage.appointment_counts().await?;
    let prescription_counts = state.storage.prescription_counts().await?;
    let summaries = patients
        .into_iter()
        .map(|(id, patient)| {
            let summary = PatientSummary::new(
                patient.profile(),
                appointment_counts.get(&id).copied().unwrap_or(0),
                prescription_counts.get(&id).copied().unwrap_or(0),
            );
            Identified::new(id, summary)
        })
        .collect();
    Ok(Json(summaries))
}

/// `GET /api/patients/:patient_id`
pub async fn get_patient_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Identified<PatientProfile>>, ApiError> {
    let id = RecordId::parse(&patient_id, "patient ID")?;
    let patient = state
        .storage
        .get_patient(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient"))?;
    Ok(Json(Identified::new(id, patient.profile())))
}

/// `POST /api/patients`
pub async fn create_patient_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewPatient>,
) -> Result<(StatusCode, Json<Identified<PatientProfile>>), ApiError> {
    payload.validate()?;
    if state.storage.find_patient_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::Conflict(DUPLICATE_EMAIL.to_string()));
    }

    let patient = Patient {
        name: payload.name,
        email: payload.email,
        password_hash: hash_password_blocking(payload.password).await?,
    };
    // The lookup above is only a fast path; the store's email index decides.
    let id = state
        .storage
        .create_patient(&patient)
        .await
        .map_err(|e| conflict_as(e, DUPLICATE_EMAIL))?;

    info!("Created patient {}", id);
    Ok((StatusCode::CREATED, Json(Identified::new(id, patient.profile()))))
}

/// `PUT /api/patients/:patient_id`
pub async fn update_patient_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    ValidJson(payload): ValidJson<PatientUpdate>,
) -> Result<Json<Identified<PatientProfile>>, ApiError> {
    let id = RecordId::parse(&patient_id, "patient ID")?;
    payload.validate()?;
    if payload.is_empty() {
        return Err(ValidationError::EmptyUpdate.into());
    }

    let password_hash = match payload.password {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };
    let changes = PatientChanges {
        name: payload.name,
        email: payload.email,
        password_hash,
    };

    let patient = state
        .storage
        .update_patient(&id, &changes)
        .await
        .map_err(|e| conflict_as(e, EMAIL_IN_USE))?
        .ok_or_else(|| ApiError::not_found("Patient"))?;

    info!("Updated patient {}", id);
    Ok(Json(Identified::new(id, patient.profile())))
}
