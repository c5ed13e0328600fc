// lib/src/seed.rs

//! Demo data for local development.

use models::{Appointment, Patient, Prescription, Recurrence, ReferenceKind, ReferenceList};
use security::hash_password;
use tracing::info;

use crate::errors::StorageResult;
use crate::storage_engine::ClinicStorageEngine;

pub const DEMO_PASSWORD: &str = "Password123!";

pub const MEDICATIONS: [&str; 7] = [
    "Diovan", "Lexapro", "Metformin", "Ozempic", "Prozac", "Seroquel", "Tegretol",
];

pub const DOSAGES: [&str; 11] = [
    "1mg", "2mg", "3mg", "5mg", "10mg", "25mg", "50mg", "100mg", "250mg", "500mg", "1000mg",
];

struct DemoAppointment {
    provider: &'static str,
    datetime: &'static str,
    repeat: Recurrence,
}

struct DemoPrescription {
    medication: &'static str,
    dosage: &'static str,
    quantity: i64,
    refill_on: &'static str,
    refill_schedule: Recurrence,
}

struct DemoPatient {
    name: &'static str,
    email: &'static str,
    appointments: [DemoAppointment; 2],
    prescriptions: [DemoPrescription; 2],
}

fn demo_patients() -> [DemoPatient; 2] {
    [
        DemoPatient {
            name: "Mark Johnson",
            email: "mark@some-email-provider.net",
            appointments: [
                DemoAppointment {
                    provider: "Dr Kim West",
                    datetime: "2025-09-16T16:30:00.000-07:00",
                    repeat: Recurrence::Weekly,
                },
                DemoAppointment {
                    provider: "Dr Lin James",
                    datetime: "2025-09-19T18:30:00.000-07:00",
                    repeat: Recurrence::Monthly,
                },
            ],
            prescriptions: [
                DemoPrescription {
                    medication: "Lexapro",
                    dosage: "5mg",
                    quantity: 2,
                    refill_on: "2025-10-05",
                    refill_schedule: Recurrence::Monthly,
                },
                DemoPrescription {
                    medication: "Ozempic",
                    dosage: "1mg",
                    quantity: 1,
                    refill_on: "2025-10-10",
                    refill_schedule: Recurrence::Monthly,
                },
            ],
        },
        DemoPatient {
            name: "Lisa Smith",
            email: "lisa@some-email-provider.net",
            appointments: [
                DemoAppointment {
                    provider: "Dr Sally Field",
                    datetime: "2025-09-22T18:15:00.000-07:00",
                    repeat: Recurrence::Monthly,
                },
                DemoAppointment {
                    provider: "Dr Lin James",
                    datetime: "2025-09-25T20:00:00.000-07:00",
                    repeat: Recurrence::Weekly,
                },
            ],
            prescriptions: [
                DemoPrescription {
                    medication: "Metformin",
                    dosage: "500mg",
                    quantity: 2,
                    refill_on: "2025-10-15",
                    refill_schedule: Recurrence::Monthly,
                },
                DemoPrescription {
                    medication: "Diovan",
                    dosage: "100mg",
                    quantity: 1,
                    refill_on: "2025-10-25",
                    refill_schedule: Recurrence::Monthly,
                },
            ],
        },
    ]
}

/// Wipes the store and loads the demo patients and reference lists.
pub async fn seed_demo_data(storage: &dyn ClinicStorageEngine) -> StorageResult<()> {
    storage.clear().await?;
    info!("Cleared existing data");

    for demo in demo_patients() {
        let patient = Patient {
            name: demo.name.to_string(),
            email: demo.email.to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
        };
        let patient_id = storage.create_patient(&patient).await?;
        info!("Created patient: {} ({})", demo.name, demo.email);

        for appt in &demo.appointments {
            storage
                .create_appointment(&Appointment {
                    patient_id,
                    provider: appt.provider.to_string(),
                    datetime: appt.datetime.to_string(),
                    repeat: appt.repeat,
                    end_date: None,
                })
                .await?;
        }
        for rx in &demo.prescriptions {
            storage
                .create_prescription(&Prescription {
                    patient_id,
                    medication: rx.medication.to_string(),
                    dosage: rx.dosage.to_string(),
                    quantity: rx.quantity,
                    refill_on: rx.refill_on.to_string(),
                    refill_schedule: rx.refill_schedule,
                })
                .await?;
        }
        info!(
            "  -> {} appointments, {} prescriptions",
            demo.appointments.len(),
            demo.prescriptions.len()
        );
    }

    storage
        .put_reference(&ReferenceList {
            kind: ReferenceKind::Medications,
            values: MEDICATIONS.iter().map(|m| m.to_string()).collect(),
        })
        .await?;
    storage
        .put_reference(&ReferenceList {
            kind: ReferenceKind::Dosages,
            values: DOSAGES.iter().map(|d| d.to_string()).collect(),
        })
        .await?;
    info!("Seeded reference data (medications + dosages)");

    storage.flush().await
}
