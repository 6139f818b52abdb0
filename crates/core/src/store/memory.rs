use super::{new_appointment, new_assessment_pair, newest_first, AssessmentStore, NewAppointment};
use crate::parser::Assessment;
use crate::{AssessmentError, AssessmentResult};
use api_shared::{Appointment, AppointmentStatus, HealthData, HealthRecord, Prediction};
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    health_records: Vec<HealthRecord>,
    predictions: Vec<Prediction>,
    appointments: Vec<Appointment>,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AssessmentResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| AssessmentError::StorePoisoned)
    }

    /// Number of stored health records and predictions.
    pub fn counts(&self) -> AssessmentResult<(usize, usize)> {
        let tables = self.tables()?;
        Ok((tables.health_records.len(), tables.predictions.len()))
    }
}

impl AssessmentStore for MemoryStore {
    fn record_assessment(
        &self,
        user_id: Uuid,
        data: HealthData,
        assessment: &Assessment,
    ) -> AssessmentResult<(HealthRecord, Prediction)> {
        let (record, prediction) = new_assessment_pair(user_id, data, assessment, Utc::now());

        // Both rows are pushed under one lock acquisition.
        let mut tables = self.tables()?;
        tables.health_records.push(record.clone());
        tables.predictions.push(prediction.clone());

        Ok((record, prediction))
    }

    fn health_records_for(&self, user_id: Uuid) -> AssessmentResult<Vec<HealthRecord>> {
        let mut records: Vec<HealthRecord> = self
            .tables()?
            .health_records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut records, |r| r.created_at);
        Ok(records)
    }

    fn predictions_for(&self, user_id: Uuid) -> AssessmentResult<Vec<Prediction>> {
        let mut predictions: Vec<Prediction> = self
            .tables()?
            .predictions
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut predictions, |p| p.created_at);
        Ok(predictions)
    }

    fn all_predictions(&self) -> AssessmentResult<Vec<Prediction>> {
        let mut predictions = self.tables()?.predictions.clone();
        newest_first(&mut predictions, |p| p.created_at);
        Ok(predictions)
    }

    fn create_appointment(&self, new: NewAppointment) -> AssessmentResult<Appointment> {
        let appointment = new_appointment(new, Utc::now());
        self.tables()?.appointments.push(appointment.clone());
        Ok(appointment)
    }

    fn appointments_for_doctor(&self, doctor_id: Uuid) -> AssessmentResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .tables()?
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.appointment_date);
        Ok(appointments)
    }

    fn appointments_for_patient(&self, patient_id: Uuid) -> AssessmentResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .tables()?
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
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
        let mut tables = self.tables()?;
        let appointment = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == id && a.doctor_id == doctor_id)
            .ok_or_else(|| AssessmentError::NotFound(format!("appointment {id}")))?;

        appointment.status = status;
        if notes.is_some() {
            appointment.notes = notes;
        }
        Ok(appointment.clone())
    }
}
