// models/src/medical/mod.rs

pub mod appointment;
pub mod login;
pub mod patient;
pub mod prescription;
pub mod recurrence;
pub mod reference;

pub use appointment::{Appointment, AppointmentUpdate, NewAppointment};
pub use login::{LoginRequest, LoginResponse};
pub use patient::{NewPatient, Patient, PatientChanges, PatientProfile, PatientSummary, PatientUpdate};
pub use prescription::{NewPrescription, Prescription, PrescriptionUpdate};
pub use recurrence::Recurrence;
pub use reference::{ReferenceKind, ReferenceList};
