// rest_api/src/handlers/auth.rs

use axum::{extract::State, Json};
use models::{Identified, LoginRequest, LoginResponse, PatientProfile};
use security::AuthError;
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::extractors::{CurrentPatient, ValidJson};
use crate::handlers::{verify_missing_account_blocking, verify_password_blocking};
use crate::AppState;

/// `POST /api/auth/login`
///
/// Unknown email and wrong password produce the same 401, after the same
/// amount of hashing work.
pub async fn login_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate()?;

    let Some((id, patient)) = state.storage.find_patient_by_email(&payload.email).await? else {
        verify_missing_account_blocking(payload.password).await?;
        warn!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password_blocking(payload.password, patient.password_hash.clone()).await? {
        warn!("Login attempt with wrong password for patient {}", id);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue(&id.to_string())?;
    info!("Patient {} logged in", id);
    Ok(Json(LoginResponse {
        token,
        user: Identified::new(id, patient.profile()),
    }))
}

/// `GET /api/auth/me`
pub async fn me_handler(current: CurrentPatient) -> Json<Identified<PatientProfile>> {
    Json(Identified::new(current.id, current.patient.profile()))
}
