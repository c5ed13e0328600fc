// rest_api/src/extractors.rs

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use models::{Patient, RecordId};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::ApiError;
use crate::AppState;

/// `Json<T>` whose rejections use the API error body and a 400 status.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// The raw token from an `Authorization: Bearer <token>` header.
#[derive(Debug)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))
    }
}

/// The patient named by a valid bearer token.
///
/// A token whose subject no longer exists is rejected with "User not found".
pub struct CurrentPatient {
    pub id: RecordId,
    pub patient: Patient,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentPatient {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let subject = state.tokens.resolve(&token)?;
        let id: RecordId = subject.parse().map_err(|_| {
            debug!("Token subject {:?} is not a record id", subject);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;
        match state.storage.get_patient(&id).await? {
            Some(patient) => Ok(CurrentPatient { id, patient }),
            None => Err(ApiError::Unauthorized("User not found".to_string())),
        }
    }
}
