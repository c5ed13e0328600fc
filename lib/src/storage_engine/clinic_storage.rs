// lib/src/storage_engine/clinic_storage.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use models::{
    Appointment, AppointmentUpdate, Patient, PatientChanges, Prescription, PrescriptionUpdate,
    RecordId, ReferenceKind, ReferenceList,
};
use sled::{Db, Tree};
use tracing::debug;

use crate::errors::{StorageError, StorageResult};
use crate::storage_engine::codec::{decode, encode};
use crate::storage_engine::collection::Collection;

/// Every operation the Records API needs from the store.
///
/// Appointments and prescriptions are always addressed together with the
/// owning patient id: a record that exists under another patient is
/// reported exactly like a missing one. Ownership is a stored field, not a
/// constraint; nothing stops a record from outliving its patient.
#[async_trait]
pub trait ClinicStorageEngine: Send + Sync + 'static {
    /// Inserts a patient and claims its email in the unique index.
    ///
    /// Fails with `StorageError::AlreadyExists` if the email is taken.
    async fn create_patient(&self, patient: &Patient) -> StorageResult<RecordId>;
    async fn get_patient(&self, id: &RecordId) -> StorageResult<Option<Patient>>;
    /// Exact, case-sensitive lookup.
    async fn find_patient_by_email(&self, email: &str) -> StorageResult<Option<(RecordId, Patient)>>;
    async fn list_patients(&self, limit: usize) -> StorageResult<Vec<(RecordId, Patient)>>;
    /// Applies `changes` to patient `id`; `Ok(None)` when no such patient.
    ///
    /// An email change fails with `StorageError::AlreadyExists` if another
    /// patient holds the address.
    async fn update_patient(&self, id: &RecordId, changes: &PatientChanges) -> StorageResult<Option<Patient>>;

    /// Number of appointments per owning patient, from a single scan.
    async fn appointment_counts(&self) -> StorageResult<HashMap<RecordId, usize>>;
    async fn list_appointments(&self, patient_id: &RecordId, limit: usize) -> StorageResult<Vec<(RecordId, Appointment)>>;
    async fn create_appointment(&self, appointment: &Appointment) -> StorageResult<RecordId>;
    async fn update_appointment(
        &self,
        id: &RecordId,
        patient_id: &RecordId,
        update: &AppointmentUpdate,
    ) -> StorageResult<Option<Appointment>>;
    /// Returns whether a record was deleted.
    async fn delete_appointment(&self, id: &RecordId, patient_id: &RecordId) -> StorageResult<bool>;

    async fn prescription_counts(&self) -> StorageResult<HashMap<RecordId, usize>>;
    async fn list_prescriptions(&self, patient_id: &RecordId, limit: usize) -> StorageResult<Vec<(RecordId, Prescription)>>;
    async fn create_prescription(&self, prescription: &Prescription) -> StorageResult<RecordId>;
    async fn update_prescription(
        &self,
        id: &RecordId,
        patient_id: &RecordId,
        update: &PrescriptionUpdate,
    ) -> StorageResult<Option<Prescription>>;
    async fn delete_prescription(&self, id: &RecordId, patient_id: &RecordId) -> StorageResult<bool>;

    /// `Ok(None)` when the list was never stored.
    async fn get_reference(&self, kind: ReferenceKind) -> StorageResult<Option<Vec<String>>>;
    async fn put_reference(&self, list: &ReferenceList) -> StorageResult<()>;

    /// Removes every document from every collection.
    async fn clear(&self) -> StorageResult<()>;
    async fn flush(&self) -> StorageResult<()>;
}

/// Sled-backed implementation of the `ClinicStorageEngine` trait.
pub struct SledClinicStorage {
    db: Db,
    patients: Collection<Patient>,
    /// email -> patient id key
    patient_emails: Tree,
    appointments: Collection<Appointment>,
    prescriptions: Collection<Prescription>,
    /// kind name -> encoded ReferenceList
    reference: Tree,
    email_changes: Mutex<()>,
}

impl SledClinicStorage {
    /// Opens the clinic trees in `db`.
    pub fn new(db: Db) -> StorageResult<Self> {
        Ok(Self {
            patients: Collection::open(&db, "patients")?,
            patient_emails: db.open_tree("patient_emails")?,
            appointments: Collection::open(&db, "appointments")?,
            prescriptions: Collection::open(&db, "prescriptions")?,
            reference: db.open_tree("reference")?,
            email_changes: Mutex::new(()),
            db,
        })
    }

    /// Points `email` at `id` unless another patient already owns it.
    fn claim_email(&self, email: &str, id: &RecordId) -> StorageResult<()> {
        let outcome = self.patient_emails.compare_and_swap(
            email.as_bytes(),
            None::<&[u8]>,
            Some(&id.as_key()[..]),
        )?;
        match outcome {
            Ok(()) => Ok(()),
            Err(cas) if cas.current.as_deref() == Some(&id.as_key()[..]) => Ok(()),
            Err(_) => Err(StorageError::AlreadyExists(format!("email {}", email))),
        }
    }

    /// Updates a patient, moving its email index entry when the email changes.
    ///
    /// Email changes are serialized so that a claim is only ever released
    /// by the update that made it. The document write is conditional on the
    /// email read at the start of the attempt.
    fn apply_patient_changes(&self, id: &RecordId, changes: &PatientChanges) -> StorageResult<Option<Patient>> {
        let _email_guard = match changes.email {
            Some(_) => Some(
                self.email_changes
                    .lock()
                    .map_err(|_| StorageError::InternalError("email index lock poisoned".to_string()))?,
            ),
            None => None,
        };

        loop {
            let Some(current) = self.patients.get(id)? else {
                return Ok(None);
            };
            let new_email = changes
                .email
                .as_deref()
                .filter(|email| *email != current.email);
            if let Some(email) = new_email {
                self.claim_email(email, id)?;
            }

            // Only applies while the email is still the one the claim was based on.
            let outcome = self.patients.update(
                id,
                |patient| patient.email == current.email,
                |patient| changes.apply_to(patient),
            );
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    if let Some(email) = new_email {
                        self.release_email(email, id)?;
                    }
                    return Err(e);
                }
            };

            if let Some(updated) = outcome.document {
                if new_email.is_some() {
                    self.release_email(&current.email, id)?;
                }
                return Ok(Some(updated));
            }

            // Lost a race: the patient is gone or its email moved. Keep the
            // claim only if the address is now the patient's own.
            if let Some(email) = new_email {
                let held = self.patients.get(id)?.is_some_and(|patient| patient.email == email);
                if !held {
                    self.release_email(email, id)?;
                }
            }
            debug!("Retrying update of patient {} after a concurrent change", id);
        }
    }

    /// Drops `email` from the index if it still points at `id`.
    fn release_email(&self, email: &str, id: &RecordId) -> StorageResult<()> {
        let _ = self.patient_emails.compare_and_swap(
            email.as_bytes(),
            Some(&id.as_key()[..]),
            None::<&[u8]>,
        )?;
        Ok(())
    }
}

#[async_trait]
impl ClinicStorageEngine for SledClinicStorage {
    async fn create_patient(&self, patient: &Patient) -> StorageResult<RecordId> {
        let id = RecordId::new();
        self.claim_email(&patient.email, &id)?;
        if let Err(e) = self.patients.insert_with_id(id, patient) {
            self.release_email(&patient.email, &id)?;
            return Err(e);
        }
        debug!("Inserted patient {}", id);
        Ok(id)
    }

    async fn get_patient(&self, id: &RecordId) -> StorageResult<Option<Patient>> {
        self.patients.get(id)
    }

    async fn find_patient_by_email(&self, email: &str) -> StorageResult<Option<(RecordId, Patient)>> {
        let Some(key) = self.patient_emails.get(email.as_bytes())? else {
            return Ok(None);
        };
        let id = RecordId::from_key(&key).ok_or_else(|| {
            StorageError::InvalidData(format!("corrupt email index entry for {}", email))
        })?;
        Ok(self
            .patients
            .get(&id)?
            .filter(|patient| patient.email == email)
            .map(|patient| (id, patient)))
    }

    async fn list_patients(&self, limit: usize) -> StorageResult<Vec<(RecordId, Patient)>> {
        self.patients.find(|_| true, limit)
    }

    async fn update_patient(&self, id: &RecordId, changes: &PatientChanges) -> StorageResult<Option<Patient>> {
        self.apply_patient_changes(id, changes)
    }

    async fn appointment_counts(&self) -> StorageResult<HashMap<RecordId, usize>> {
        self.appointments.tally(|a| a.patient_id)
    }

    async fn list_appointments(&self, patient_id: &RecordId, limit: usize) -> StorageResult<Vec<(RecordId, Appointment)>> {
        self.appointments.find(|a| a.patient_id == *patient_id, limit)
    }

    async fn create_appointment(&self, appointment: &Appointment) -> StorageResult<RecordId> {
        self.appointments.insert(appointment)
    }

    async fn update_appointment(
        &self,
        id: &RecordId,
        patient_id: &RecordId,
        update: &AppointmentUpdate,
    ) -> StorageResult<Option<Appointment>> {
        let outcome = self.appointments.update(
            id,
            |a| a.patient_id == *patient_id,
            |a| update.apply_to(a),
        )?;
        Ok(outcome.document)
    }

    async fn delete_appointment(&self, id: &RecordId, patient_id: &RecordId) -> StorageResult<bool> {
        Ok(self.appointments.delete(id, |a| a.patient_id == *patient_id)? > 0)
    }

    async fn prescription_counts(&self) -> StorageResult<HashMap<RecordId, usize>> {
        self.prescriptions.tally(|p| p.patient_id)
    }

    async fn list_prescriptions(&self, patient_id: &RecordId, limit: usize) -> StorageResult<Vec<(RecordId, Prescription)>> {
        self.prescriptions.find(|p| p.patient_id == *patient_id, limit)
    }

    async fn create_prescription(&self, prescription: &Prescription) -> StorageResult<RecordId> {
        self.prescriptions.insert(prescription)
    }

    async fn update_prescription(
        &self,
        id: &RecordId,
        patient_id: &RecordId,
        update: &PrescriptionUpdate,
    ) -> StorageResult<Option<Prescription>> {
        let outcome = self.prescriptions.update(
            id,
            |p| p.patient_id == *patient_id,
            |p| update.apply_to(p),
        )?;
        Ok(outcome.document)
    }

    async fn delete_prescription(&self, id: &RecordId, patient_id: &RecordId) -> StorageResult<bool> {
        Ok(self.prescriptions.delete(id, |p| p.patient_id == *patient_id)? > 0)
    }

    async fn get_reference(&self, kind: ReferenceKind) -> StorageResult<Option<Vec<String>>> {
        match self.reference.get(kind.as_str().as_bytes())? {
            Some(bytes) => {
                let list: ReferenceList = decode(&bytes)?;
                Ok(Some(list.values))
            }
            None => Ok(None),
        }
    }

    async fn put_reference(&self, list: &ReferenceList) -> StorageResult<()> {
        self.reference.insert(list.kind.as_str().as_bytes(), encode(list)?)?;
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.patients.clear()?;
        self.patient_emails.clear()?;
        self.appointments.clear()?;
        self.prescriptions.clear()?;
        self.reference.clear()?;
        Ok(())
    }

    async fn flush(&self) -> StorageResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::config::{open_sled_db, StorageConfig};
    use models::{Patch, Recurrence};
    use std::sync::Arc;

    fn storage() -> SledClinicStorage {
        SledClinicStorage::new(open_sled_db(&StorageConfig::temporary()).unwrap()).unwrap()
    }

    fn patient(name: &str, email: &str) -> Patient {
        Patient {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn appointment(patient_id: RecordId) -> Appointment {
        Appointment {
            patient_id,
            provider: "Dr X".to_string(),
            datetime: "2025-01-01T10:00:00Z".to_string(),
            repeat: Recurrence::Weekly,
            end_date: Some("2025-06-01".to_string()),
        }
    }

    fn prescription(patient_id: RecordId) -> Prescription {
        Prescription {
            patient_id,
            medication: "Lexapro".to_string(),
            dosage: "5mg".to_string(),
            quantity: 2,
            refill_on: "2025-10-05".to_string(),
            refill_schedule: Recurrence::Monthly,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = storage();
        store.create_patient(&patient("A", "a@x.com")).await.unwrap();
        let err = store.create_patient(&patient("B", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        store.create_patient(&patient("B", "b@x.com")).await.unwrap();
        assert_eq!(store.list_patients(1000).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = storage();
        let id = store.create_patient(&patient("A", "a@x.com")).await.unwrap();
        let (found, _) = store.find_patient_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found, id);
        assert!(store.find_patient_by_email("A@x.com").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_email_admit_one() {
        let store = Arc::new(storage());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_patient(&patient(&format!("P{}", i), "same@x.com")).await
            }));
        }
        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StorageError::AlreadyExists(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!((created, conflicts), (1, 7));
        assert_eq!(store.list_patients(1000).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_email_changes_leave_no_stale_claims() {
        let store = Arc::new(storage());
        for round in 0..50 {
            store.clear().await.unwrap();
            let id = store.create_patient(&patient("A", "a@x.com")).await.unwrap();
            let candidates: Vec<String> = (0..8).map(|i| format!("r{}-{}@x.com", round, i)).collect();
            let barrier = Arc::new(tokio::sync::Barrier::new(candidates.len()));

            let mut handles = Vec::new();
            for email in candidates.clone() {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                handles.push(tokio::spawn(async move {
                    barrier.wait().await;
                    let changes = PatientChanges {
                        email: Some(email),
                        ..Default::default()
                    };
                    store.update_patient(&id, &changes).await
                }));
            }
            for handle in handles {
                assert!(handle.await.unwrap().unwrap().is_some());
            }

            let held = store.get_patient(&id).await.unwrap().unwrap().email;
            for email in &candidates {
                let result = store.create_patient(&patient("B", email)).await;
                if *email == held {
                    assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
                } else {
                    assert!(result.is_ok(), "round {}: {} is still claimed", round, email);
                }
            }
            store.create_patient(&patient("C", "a@x.com")).await.unwrap();
        }
    }

    #[tokio::test]
    async fn email_change_moves_the_index_entry() {
        let store = storage();
        let a = store.create_patient(&patient("A", "a@x.com")).await.unwrap();
        let b = store.create_patient(&patient("B", "b@x.com")).await.unwrap();

        let taken = PatientChanges {
            email: Some("b@x.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_patient(&a, &taken).await,
            Err(StorageError::AlreadyExists(_))
        ));

        let own = PatientChanges {
            email: Some("a@x.com".to_string()),
            name: Some("A2".to_string()),
            ..Default::default()
        };
        let updated = store.update_patient(&a, &own).await.unwrap().unwrap();
        assert_eq!(updated.name, "A2");

        let moved = PatientChanges {
            email: Some("c@x.com".to_string()),
            ..Default::default()
        };
        store.update_patient(&a, &moved).await.unwrap().unwrap();
        assert!(store.find_patient_by_email("a@x.com").await.unwrap().is_none());
        assert_eq!(store.find_patient_by_email("c@x.com").await.unwrap().unwrap().0, a);

        // the released address can be registered again
        store.create_patient(&patient("D", "a@x.com")).await.unwrap();
        assert_eq!(store.find_patient_by_email("b@x.com").await.unwrap().unwrap().0, b);
    }

    #[tokio::test]
    async fn updating_missing_patient_releases_claim() {
        let store = storage();
        let ghost = RecordId::new();
        let changes = PatientChanges {
            email: Some("ghost@x.com".to_string()),
            ..Default::default()
        };
        assert!(store.update_patient(&ghost, &changes).await.unwrap().is_none());
        store.create_patient(&patient("G", "ghost@x.com")).await.unwrap();
    }

    #[tokio::test]
    async fn appointments_are_scoped_to_their_owner() {
        let store = storage();
        let owner = store.create_patient(&patient("A", "a@x.com")).await.unwrap();
        let other = store.create_patient(&patient("B", "b@x.com")).await.unwrap();
        let appt = store.create_appointment(&appointment(owner)).await.unwrap();

        let counts = store.appointment_counts().await.unwrap();
        assert_eq!(counts.get(&owner), Some(&1));
        assert_eq!(counts.get(&other), None);
        assert_eq!(store.list_appointments(&other, 1000).await.unwrap().len(), 0);

        let update = AppointmentUpdate {
            end_date: Patch::Null,
            ..Default::default()
        };
        assert!(store.update_appointment(&appt, &other, &update).await.unwrap().is_none());
        assert!(!store.delete_appointment(&appt, &other).await.unwrap());

        let cleared = store.update_appointment(&appt, &owner, &update).await.unwrap().unwrap();
        assert_eq!(cleared.end_date, None);
        assert!(store.delete_appointment(&appt, &owner).await.unwrap());
        assert!(store.appointment_counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn prescriptions_are_scoped_to_their_owner() {
        let store = storage();
        let owner = RecordId::new();
        let other = RecordId::new();
        let rx = store.create_prescription(&prescription(owner)).await.unwrap();

        let update = PrescriptionUpdate {
            quantity: Some(5),
            ..Default::default()
        };
        assert!(store.update_prescription(&rx, &other, &update).await.unwrap().is_none());
        let updated = store.update_prescription(&rx, &owner, &update).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 5);
        assert!(!store.delete_prescription(&rx, &other).await.unwrap());
        assert!(store.delete_prescription(&rx, &owner).await.unwrap());
        assert!(store.prescription_counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reference_lists_default_to_absent() {
        let store = storage();
        assert_eq!(store.get_reference(ReferenceKind::Medications).await.unwrap(), None);
        store
            .put_reference(&ReferenceList {
                kind: ReferenceKind::Dosages,
                values: vec!["5mg".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(
            store.get_reference(ReferenceKind::Dosages).await.unwrap(),
            Some(vec!["5mg".to_string()])
        );
        assert_eq!(store.get_reference(ReferenceKind::Medications).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_empties_everything() {
        let store = storage();
        let id = store.create_patient(&patient("A", "a@x.com")).await.unwrap();
        store.create_appointment(&appointment(id)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list_patients(1000).await.unwrap().is_empty());
        assert!(store.appointment_counts().await.unwrap().is_empty());
        store.create_patient(&patient("A", "a@x.com")).await.unwrap();
    }
}
