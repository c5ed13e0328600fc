// models/src/lib.rs

//! Records, request payloads and field validation shared by the storage
//! layer and the REST API.

pub mod document;
pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod patch;
pub mod validation;

pub use document::Identified;
pub use errors::{ValidationError, ValidationResult};
pub use identifiers::RecordId;
pub use medical::*;
pub use patch::Patch;
