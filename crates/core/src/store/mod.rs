//! Record persistence.
//!
//! [`AssessmentStore`] owns health records, predictions and appointments. A health record and
//! the prediction derived from it are always written together by
//! [`AssessmentStore::record_assessment`]; an implementation must never expose one without the
//! other.
//!
//! Two implementations are provided:
//! - [`MemoryStore`] keeps everything in process memory (tests, demos).
//! - [`FileStore`] keeps JSON files in UUID-sharded directories under a data directory.
//!
//! ## Pure Data Operations
//!
//! This module performs no authorisation. Callers pass the already-resolved owner id; access
//! rules live in the assessment service.

mod file;
mod memory;
mod shared;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::parser::Assessment;
use crate::AssessmentResult;
use api_shared::{Appointment, AppointmentStatus, HealthData, HealthRecord, Prediction};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Input for booking an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub reason: Option<String>,
}

pub trait AssessmentStore: Send + Sync {
    /// Persists a health record and its prediction as one unit.
    ///
    /// Fresh identifiers are allocated on every call; identical payloads are stored twice.
    fn record_assessment(
        &self,
        user_id: Uuid,
        data: HealthData,
        assessment: &Assessment,
    ) -> AssessmentResult<(HealthRecord, Prediction)>;

    /// Health records owned by `user_id`, newest first.
    fn health_records_for(&self, user_id: Uuid) -> AssessmentResult<Vec<HealthRecord>>;

    /// Predictions owned by `user_id`, newest first.
    fn predictions_for(&self, user_id: Uuid) -> AssessmentResult<Vec<Prediction>>;

    /// Every stored prediction, newest first.
    fn all_predictions(&self) -> AssessmentResult<Vec<Prediction>>;

    /// Stores a new appointment in the `pending` state.
    fn create_appointment(&self, new: NewAppointment) -> AssessmentResult<Appointment>;

    /// Appointments with `doctor_id`, soonest first.
    fn appointments_for_doctor(&self, doctor_id: Uuid) -> AssessmentResult<Vec<Appointment>>;

    /// Appointments booked by `patient_id`, latest first.
    fn appointments_for_patient(&self, patient_id: Uuid) -> AssessmentResult<Vec<Appointment>>;

    /// Changes the status (and optionally the notes) of one of `doctor_id`'s appointments.
    ///
    /// # Errors
    /// Returns `AssessmentError::NotFound` if no such appointment belongs to `doctor_id`.
    fn update_appointment_status(
        &self,
        id: Uuid,
        doctor_id: Uuid,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> AssessmentResult<Appointment>;
}

/// Builds the record pair for one submission.
pub(crate) fn new_assessment_pair(
    user_id: Uuid,
    data: HealthData,
    assessment: &Assessment,
    now: DateTime<Utc>,
) -> (HealthRecord, Prediction) {
    let health_record = HealthRecord {
        id: Uuid::new_v4(),
        user_id,
        data,
        created_at: now,
    };
    let prediction = Prediction {
        id: Uuid::new_v4(),
        user_id,
        health_data_id: health_record.id,
        risk_score: assessment.risk_score,
        risk_level: assessment.risk_level,
        recommendations: assessment.recommendations.clone(),
        created_at: now,
    };
    (health_record, prediction)
}

pub(crate) fn new_appointment(new: NewAppointment, now: DateTime<Utc>) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id: new.patient_id,
        doctor_id: new.doctor_id,
        appointment_date: new.appointment_date,
        status: AppointmentStatus::Pending,
        reason: new.reason,
        notes: None,
        created_at: now,
    }
}

pub(crate) fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}
