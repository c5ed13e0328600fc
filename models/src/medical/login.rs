// models/src/medical/login.rs

use serde::{Deserialize, Serialize};

use crate::document::Identified;
use crate::errors::ValidationResult;
use crate::medical::patient::PatientProfile;
use crate::validation::check_email;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        check_email("email", &self.email)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identified<PatientProfile>,
}
