// lib/src/storage_engine/mod.rs

pub mod clinic_storage;
pub mod codec;
pub mod collection;
pub mod config;

pub use clinic_storage::{ClinicStorageEngine, SledClinicStorage};
pub use collection::{Collection, UpdateOutcome};
pub use config::{open_sled_db, StorageConfig};
