// lib/src/lib.rs

//! Persistence for the clinic portal: a sled database holding patients,
//! appointments, prescriptions and reference lists.

pub mod errors;
pub mod seed;
pub mod storage_engine;

pub use crate::errors::{StorageError, StorageResult};
pub use crate::storage_engine::{
    open_sled_db, ClinicStorageEngine, Collection, SledClinicStorage, StorageConfig, UpdateOutcome,
};
