//! JSON-file store.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//!   assessments/
//!     <s1>/<s2>/<health_record_id>/
//!       health_record.json
//!       prediction.json
//!   appointments/
//!     <s1>/<s2>/<appointment_id>/
//!       appointment.json
//!   .staging/            # pairs being assembled
//! ```
//!
//! An assessment pair is written into a fresh directory under `.staging/` and then renamed into
//! its sharded location in one step, so readers either see both files or neither. Leftover
//! staging directories (from a crash mid-write) are removed when the store is opened.

use super::shared::{read_json, record_dirs, replace_json, sharded_dir, write_json};
use super::{new_appointment, new_assessment_pair, newest_first, AssessmentStore, NewAppointment};
use crate::constants::{
    APPOINTMENTS_DIR_NAME, APPOINTMENT_FILENAME, ASSESSMENTS_DIR_NAME, HEALTH_RECORD_FILENAME,
    PREDICTION_FILENAME, STAGING_DIR_NAME,
};
use crate::parser::Assessment;
use crate::{AssessmentError, AssessmentResult};
use api_shared::{Appointment, AppointmentStatus, HealthData, HealthRecord, Prediction};
use chrono::Utc;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

pub struct FileStore {
    root: PathBuf,
    // Serialises read-modify-write updates of appointment files.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    /// Returns `AssessmentError::StorageDirCreation` if the directory tree cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> AssessmentResult<Self> {
        let store = Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        };

        for dir in [
            store.assessments_dir(),
            store.appointments_dir(),
            store.staging_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(AssessmentError::StorageDirCreation)?;
        }
        store.clear_staging();

        tracing::info!("file store opened at {}", store.root.display());
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn assessments_dir(&self) -> PathBuf {
        self.root.join(ASSESSMENTS_DIR_NAME)
    }

    fn appointments_dir(&self) -> PathBuf {
        self.root.join(APPOINTMENTS_DIR_NAME)
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    fn clear_staging(&self) {
        let Ok(entries) = fs::read_dir(self.staging_dir()) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            tracing::warn!("removing incomplete staged assessment {}", path.display());
            if let Err(e) = fs::remove_dir_all(&path) {
                tracing::warn!("failed to remove {}: {}", path.display(), e);
            }
        }
    }

    /// Moves a fully written staging directory to the sharded location for `id`.
    fn publish(&self, staged: &Path, id: Uuid) -> AssessmentResult<()> {
        let target = sharded_dir(&self.assessments_dir(), id);
        if target.exists() {
            return Err(AssessmentError::FileWrite(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("assessment directory already exists: {}", target.display()),
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(AssessmentError::StorageDirCreation)?;
        }
        fs::rename(staged, &target).map_err(AssessmentError::FileWrite)
    }

    fn stage_pair(&self, record: &HealthRecord, prediction: &Prediction) -> AssessmentResult<PathBuf> {
        let staged = self.staging_dir().join(record.id.simple().to_string());
        fs::create_dir(&staged).map_err(AssessmentError::StorageDirCreation)?;

        let written = write_json(&staged.join(HEALTH_RECORD_FILENAME), record)
            .and_then(|()| write_json(&staged.join(PREDICTION_FILENAME), prediction));
        if let Err(e) = written {
            let _ = fs::remove_dir_all(&staged);
            return Err(e);
        }
        Ok(staged)
    }

    /// Reads every complete assessment pair. Unreadable pairs are logged and skipped.
    ///
    /// # Errors
    /// Returns `AssessmentError::FileRead` if the assessments tree cannot be listed.
    fn read_pairs(&self) -> AssessmentResult<Vec<(HealthRecord, Prediction)>> {
        let mut pairs = Vec::new();
        for dir in record_dirs(&self.assessments_dir())? {
            let record = read_json::<HealthRecord>(&dir.join(HEALTH_RECORD_FILENAME));
            let prediction = read_json::<Prediction>(&dir.join(PREDICTION_FILENAME));
            match (record, prediction) {
                (Ok(record), Ok(prediction)) => pairs.push((record, prediction)),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("failed to read assessment {}: {}", dir.display(), e);
                }
            }
        }
        Ok(pairs)
    }

    fn read_appointments(&self) -> AssessmentResult<Vec<Appointment>> {
        let mut appointments = Vec::new();
        for dir in record_dirs(&self.appointments_dir())? {
            match read_json::<Appointment>(&dir.join(APPOINTMENT_FILENAME)) {
                Ok(appointment) => appointments.push(appointment),
                Err(e) => tracing::warn!("failed to read appointment {}: {}", dir.display(), e),
            }
        }
        Ok(appointments)
    }
}

impl AssessmentStore for FileStore {
    fn record_assessment(
        &self,
        user_id: Uuid,
        data: HealthData,
        assessment: &Assessment,
    ) -> AssessmentResult<(HealthRecord, Prediction)> {
        let (record, prediction) = new_assessment_pair(user_id, data, assessment, Utc::now());

        let staged = self.stage_pair(&record, &prediction)?;
        if let Err(e) = self.publish(&staged, record.id) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e);
        }

        Ok((record, prediction))
    }

    fn health_records_for(&self, user_id: Uuid) -> AssessmentResult<Vec<HealthRecord>> {
        let mut records: Vec<HealthRecord> = self
            .read_pairs()?
            .into_iter()
            .map(|(record, _)| record)
            .filter(|r| r.user_id == user_id)
            .collect();
        newest_first(&mut records, |r| r.created_at);
        Ok(records)
    }

    fn predictions_for(&self, user_id: Uuid) -> AssessmentResult<Vec<Prediction>> {
        let mut predictions: Vec<Prediction> = self
            .read_pairs()?
            .into_iter()
            .map(|(_, prediction)| prediction)
            .filter(|p| p.user_id == user_id)
            .collect();
        newest_first(&mut predictions, |p| p.created_at);
        Ok(predictions)
    }

    fn all_predictions(&self) -> AssessmentResult<Vec<Prediction>> {
        let mut predictions: Vec<Prediction> = self
            .read_pairs()?
            .into_iter()
            .map(|(_, prediction)| prediction)
            .collect();
        newest_first(&mut predictions, |p| p.created_at);
        Ok(predictions)
    }

    fn create_appointment(&self, new: NewAppointment) -> AssessmentResult<Appointment> {
        let appointment = new_appointment(new, Utc::now());
        let dir = sharded_dir(&self.appointments_dir(), appointment.id);
        fs::create_dir_all(&dir).map_err(AssessmentError::StorageDirCreation)?;
        replace_json(&dir.join(APPOINTMENT_FILENAME), &appointment)?;
        Ok(appointment)
    }

    fn appointments_for_doctor(&self, doctor_id: Uuid) -> AssessmentResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .read_appointments()?
            .into_iter()
            .filter(|a| a.doctor_id == doctor_id)
            .collect();
        appointments.sort_by_key(|a| a.appointment_date);
        Ok(appointments)
    }

    fn appointments_for_patient(&self, patient_id: Uuid) -> AssessmentResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .read_appointments()?
            .into_iter()
            .filter(|a| a.patient_id == patient_id)
            .collect();
        newest_first(&mut appointments, |a| a.appointment_date);
        Ok(appointments)
    }

    fn update_appointment_status(
        &self,
        id: Uuid,
        doctor_id: Uuid,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> AssessmentResult<Appointment> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AssessmentError::StorePoisoned)?;

        let path = sharded_dir(&self.appointments_dir(), id).join(APPOINTMENT_FILENAME);
        if !path.is_file() {
            return Err(AssessmentError::NotFound(format!("appointment {id}")));
        }

        let mut appointment: Appointment = read_json(&path)?;
        if appointment.doctor_id != doctor_id {
            return Err(AssessmentError::NotFound(format!("appointment {id}")));
        }

        appointment.status = status;
        if notes.is_some() {
            appointment.notes = notes;
        }
        replace_json(&path, &appointment)?;
        Ok(appointment)
    }
}
