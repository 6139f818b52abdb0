//! Risk assessment service.
//!
//! [`AssessmentService::assess`] is the one write path of the system:
//! authorise, validate, prompt, call the model, parse, persist, respond. The remaining methods
//! are caller-scoped reads backing the patient and doctor views.
//!
//! ## Access rules
//!
//! - Any authenticated user may submit an assessment and read their own records.
//! - Patients book appointments with doctors; doctors update the status of their own.
//! - Doctor-only views (dashboard, patient detail) reject other roles as forbidden.

use crate::analytics;
use crate::identity::IdentityProvider;
use crate::inference::InferenceClient;
use crate::parser::{parse_assessment, FallbackReason};
use crate::prompt::build_prompt;
use crate::store::{AssessmentStore, NewAppointment};
use crate::validation::validate_health_data;
use crate::{AssessmentError, AssessmentResult};
use api_shared::{
    Appointment, CreateAppointmentReq, DoctorDashboardRes, HealthData, HealthRecord,
    PatientDetailRes, Prediction, Profile, Role, UpdateAppointmentStatusReq,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Result of one successful assessment.
#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    pub health_record: HealthRecord,
    pub prediction: Prediction,
    /// Set when the model reply was unusable and the fixed fallback was stored.
    pub fallback: Option<FallbackReason>,
}

impl AssessmentOutcome {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[derive(Clone)]
pub struct AssessmentService {
    identity: Arc<dyn IdentityProvider>,
    inference: Arc<dyn InferenceClient>,
    store: Arc<dyn AssessmentStore>,
}

impl AssessmentService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        inference: Arc<dyn InferenceClient>,
        store: Arc<dyn AssessmentStore>,
    ) -> Self {
        Self {
            identity,
            inference,
            store,
        }
    }

    /// Resolves a bearer token to the caller's profile.
    ///
    /// # Errors
    /// Returns `AssessmentError::Unauthorized` if the token is missing or unknown.
    pub fn authorize(&self, token: Option<&str>) -> AssessmentResult<Profile> {
        token
            .and_then(|t| self.identity.resolve(t))
            .ok_or(AssessmentError::Unauthorized)
    }

    /// Like [`authorize`](Self::authorize) but also requires the doctor role.
    pub fn require_doctor(&self, token: Option<&str>) -> AssessmentResult<Profile> {
        let caller = self.authorize(token)?;
        if !caller.is_doctor() {
            return Err(AssessmentError::Forbidden(
                "this view is restricted to doctors".into(),
            ));
        }
        Ok(caller)
    }

    /// Runs one risk assessment for the caller and persists the result.
    ///
    /// An unusable model reply is not an error: the fixed fallback assessment is stored and
    /// the outcome carries the reason.
    ///
    /// # Errors
    /// - `Unauthorized` before any outbound call if the token does not resolve.
    /// - `InvalidInput` if the health data fails validation.
    /// - An inference error if the gateway call fails; nothing is written.
    /// - A storage error if persisting the pair fails.
    pub async fn assess(
        &self,
        token: Option<&str>,
        data: HealthData,
    ) -> AssessmentResult<AssessmentOutcome> {
        let caller = self.authorize(token)?;
        validate_health_data(&data)?;

        tracing::info!(user_id = %caller.id, "running risk assessment");

        let prompt = build_prompt(&data);
        let reply = self.inference.complete(&prompt).await?;

        let (assessment, fallback) = parse_assessment(&reply).into_parts();
        if let Some(reason) = &fallback {
            tracing::warn!(user_id = %caller.id, "using fallback assessment: {}", reason);
        }

        let (health_record, prediction) =
            self.store.record_assessment(caller.id, data, &assessment)?;

        tracing::info!(
            user_id = %caller.id,
            health_data_id = %health_record.id,
            prediction_id = %prediction.id,
            risk_score = prediction.risk_score,
            risk_level = %prediction.risk_level,
            fallback = fallback.is_some(),
            "risk assessment stored"
        );

        Ok(AssessmentOutcome {
            health_record,
            prediction,
            fallback,
        })
    }

    /// The caller's predictions, newest first.
    pub fn own_predictions(&self, token: Option<&str>) -> AssessmentResult<Vec<Prediction>> {
        let caller = self.authorize(token)?;
        self.store.predictions_for(caller.id)
    }

    /// The caller's health records, newest first.
    pub fn own_health_records(&self, token: Option<&str>) -> AssessmentResult<Vec<HealthRecord>> {
        let caller = self.authorize(token)?;
        self.store.health_records_for(caller.id)
    }

    /// A doctor's schedule (soonest first) or a patient's bookings (latest first).
    pub fn appointments(&self, token: Option<&str>) -> AssessmentResult<Vec<Appointment>> {
        let caller = self.authorize(token)?;
        match caller.role {
            Role::Doctor => self.store.appointments_for_doctor(caller.id),
            Role::Patient => self.store.appointments_for_patient(caller.id),
        }
    }

    /// Doctors a patient can book with, by name.
    pub fn doctors(&self, token: Option<&str>) -> AssessmentResult<Vec<Profile>> {
        self.authorize(token)?;
        Ok(self.identity.profiles_with_role(Role::Doctor))
    }

    /// Books a pending appointment for the calling patient.
    pub fn book_appointment(
        &self,
        token: Option<&str>,
        req: CreateAppointmentReq,
    ) -> AssessmentResult<Appointment> {
        let caller = self.authorize(token)?;
        if caller.role != Role::Patient {
            return Err(AssessmentError::Forbidden(
                "only patients can book appointments".into(),
            ));
        }

        match self.identity.profile(req.doctor_id) {
            Some(doctor) if doctor.is_doctor() => {}
            _ => {
                return Err(AssessmentError::InvalidInput(format!(
                    "{} is not a known doctor",
                    req.doctor_id
                )))
            }
        }

        let reason = req
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let appointment = self.store.create_appointment(NewAppointment {
            patient_id: caller.id,
            doctor_id: req.doctor_id,
            appointment_date: req.appointment_date,
            reason,
        })?;
        tracing::info!(
            appointment_id = %appointment.id,
            patient_id = %appointment.patient_id,
            doctor_id = %appointment.doctor_id,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Updates the status of one of the calling doctor's appointments.
    pub fn update_appointment_status(
        &self,
        token: Option<&str>,
        appointment_id: Uuid,
        req: UpdateAppointmentStatusReq,
    ) -> AssessmentResult<Appointment> {
        let doctor = self.require_doctor(token)?;
        let appointment =
            self.store
                .update_appointment_status(appointment_id, doctor.id, req.status, req.notes)?;
        tracing::info!(
            appointment_id = %appointment.id,
            status = ?appointment.status,
            "appointment status updated"
        );
        Ok(appointment)
    }

    /// Patients known to the doctor: anyone with a stored prediction or an appointment with
    /// them.
    fn roster_patients(
        &self,
        doctor_id: Uuid,
        predictions: &[Prediction],
        appointments: &[Appointment],
    ) -> Vec<Profile> {
        let ids: BTreeSet<Uuid> = predictions
            .iter()
            .map(|p| p.user_id)
            .chain(
                appointments
                    .iter()
                    .filter(|a| a.doctor_id == doctor_id)
                    .map(|a| a.patient_id),
            )
            .collect();

        ids.into_iter()
            .filter_map(|id| self.identity.profile(id))
            .filter(|p| p.role == Role::Patient)
            .collect()
    }

    /// Aggregates for the doctor dashboard. `today` anchors the 30-day trend window.
    pub fn doctor_dashboard(
        &self,
        token: Option<&str>,
        today: NaiveDate,
    ) -> AssessmentResult<DoctorDashboardRes> {
        let doctor = self.require_doctor(token)?;

        let predictions = self.store.all_predictions()?;
        let appointments = self.store.appointments_for_doctor(doctor.id)?;
        let patients = self.roster_patients(doctor.id, &predictions, &appointments);
        let roster = analytics::patient_roster(&patients, &predictions);

        Ok(DoctorDashboardRes {
            statistics: analytics::patient_statistics(&roster, &appointments),
            risk_distribution: analytics::risk_distribution(&roster),
            metrics_by_risk_level: analytics::metrics_by_risk_level(&roster),
            appointment_trends: analytics::appointment_trends(&appointments, today),
            roster,
            appointments,
        })
    }

    /// Everything a doctor sees about one patient.
    ///
    /// Appointments are limited to those between this patient and the calling doctor.
    pub fn patient_detail(
        &self,
        token: Option<&str>,
        patient_id: Uuid,
    ) -> AssessmentResult<PatientDetailRes> {
        let doctor = self.require_doctor(token)?;

        let patient = self
            .identity
            .profile(patient_id)
            .filter(|p| p.role == Role::Patient)
            .ok_or_else(|| AssessmentError::NotFound(format!("patient {patient_id}")))?;

        let health_records = self.store.health_records_for(patient.id)?;
        let predictions = self.store.predictions_for(patient.id)?;
        let appointments: Vec<Appointment> = self
            .store
            .appointments_for_patient(patient.id)?
            .into_iter()
            .filter(|a| a.doctor_id == doctor.id)
            .collect();
        let timeline = analytics::risk_timeline(&predictions);

        Ok(PatientDetailRes {
            patient,
            health_records,
            predictions,
            appointments,
            timeline,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::identity::ProfileRegistry;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub const DOCTOR_TOKEN: &str = "doctor-token";
    pub const PATIENT_TOKEN: &str = "patient-token";
    pub const OTHER_PATIENT_TOKEN: &str = "other-patient-token";

    pub const MODEL_REPLY: &str = "Assessment follows. {\"riskScore\":42,\"riskLevel\":\"Moderate\",\
                                   \"recommendations\":[\"a\",\"b\",\"c\"]} Thanks.";

    /// Inference stub that counts calls and replays a fixed reply or error.
    pub struct StubInference {
        pub calls: AtomicUsize,
        reply: Result<String, u16>,
    }

    impl StubInference {
        pub fn replying(text: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Ok(text.to_string()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Err(status),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceClient for StubInference {
        async fn complete(&self, _prompt: &str) -> AssessmentResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(AssessmentError::InferenceStatus {
                    status: *status,
                    body: "stubbed failure".into(),
                }),
            }
        }
    }

    /// Store whose writes always fail; reads see an empty store.
    pub struct FailingStore;

    impl AssessmentStore for FailingStore {
        fn record_assessment(
            &self,
            _user_id: Uuid,
            _data: HealthData,
            _assessment: &crate::parser::Assessment,
        ) -> AssessmentResult<(HealthRecord, Prediction)> {
            Err(AssessmentError::FileWrite(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn health_records_for(&self, _user_id: Uuid) -> AssessmentResult<Vec<HealthRecord>> {
            Ok(Vec::new())
        }

        fn predictions_for(&self, _user_id: Uuid) -> AssessmentResult<Vec<Prediction>> {
            Ok(Vec::new())
        }

        fn all_predictions(&self) -> AssessmentResult<Vec<Prediction>> {
            Ok(Vec::new())
        }

        fn create_appointment(&self, _new: NewAppointment) -> AssessmentResult<Appointment> {
            Err(AssessmentError::FileWrite(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn appointments_for_doctor(&self, _doctor_id: Uuid) -> AssessmentResult<Vec<Appointment>> {
            Ok(Vec::new())
        }

        fn appointments_for_patient(
            &self,
            _patient_id: Uuid,
        ) -> AssessmentResult<Vec<Appointment>> {
            Ok(Vec::new())
        }

        fn update_appointment_status(
            &self,
            id: Uuid,
            _doctor_id: Uuid,
            _status: api_shared::AppointmentStatus,
            _notes: Option<String>,
        ) -> AssessmentResult<Appointment> {
            Err(AssessmentError::NotFound(format!("appointment {id}")))
        }
    }

    pub fn profile(role: Role, name: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            role,
            full_name: name.into(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            phone: None,
        }
    }

    pub struct Fixture {
        pub service: AssessmentService,
        pub inference: Arc<StubInference>,
        pub store: Arc<MemoryStore>,
        pub doctor: Profile,
        pub patient: Profile,
        pub other_patient: Profile,
    }

    pub fn fixture(inference: StubInference) -> Fixture {
        let doctor = profile(Role::Doctor, "Dr Ada Byrne");
        let patient = profile(Role::Patient, "Sam Patel");
        let other_patient = profile(Role::Patient, "Lee Chen");

        let mut registry = ProfileRegistry::new();
        registry.insert(doctor.clone(), DOCTOR_TOKEN).unwrap();
        registry.insert(patient.clone(), PATIENT_TOKEN).unwrap();
        registry
            .insert(other_patient.clone(), OTHER_PATIENT_TOKEN)
            .unwrap();

        let inference = Arc::new(inference);
        let store = Arc::new(MemoryStore::new());
        let service = AssessmentService::new(Arc::new(registry), inference.clone(), store.clone());

        Fixture {
            service,
            inference,
            store,
            doctor,
            patient,
            other_patient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::identity::ProfileRegistry;
    use crate::risk::is_consistent;
    use crate::validation::sample_health_data;
    use api_shared::{AppointmentStatus, RiskLevel};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn end_to_end_reference_payload() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));

        let outcome = fx
            .service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .expect("assessment should succeed");

        assert!(!outcome.used_fallback());
        assert_eq!(outcome.prediction.risk_score, 42);
        assert_eq!(outcome.prediction.risk_level, RiskLevel::Moderate);
        assert_eq!(outcome.prediction.recommendations, vec!["a", "b", "c"]);
        assert_eq!(outcome.prediction.health_data_id, outcome.health_record.id);
        assert_eq!(outcome.prediction.user_id, fx.patient.id);
        assert_eq!(outcome.health_record.data, sample_health_data());

        let stored = fx.store.predictions_for(fx.patient.id).unwrap();
        assert_eq!(stored, vec![outcome.prediction]);
        assert_eq!(fx.inference.call_count(), 1);
    }

    #[tokio::test]
    async fn non_json_reply_stores_fallback() {
        let fx = fixture(StubInference::replying("Sorry, I am unable to assess this."));

        let outcome = fx
            .service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .expect("fallback is still a success");

        assert_eq!(outcome.fallback, Some(FallbackReason::NoJsonObject));
        assert_eq!(outcome.prediction.risk_score, 50);
        assert_eq!(outcome.prediction.risk_level, RiskLevel::Moderate);
        assert_eq!(outcome.prediction.recommendations.len(), 3);
        assert_eq!(fx.store.counts().unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn gateway_error_writes_nothing() {
        let fx = fixture(StubInference::failing(503));

        let err = fx
            .service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .expect_err("gateway failure should fail the request");

        assert!(err.is_inference());
        assert_eq!(fx.store.counts().unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn storage_failure_fails_the_request() {
        let patient = profile(Role::Patient, "Sam Patel");
        let mut registry = ProfileRegistry::new();
        registry.insert(patient, PATIENT_TOKEN).unwrap();
        let inference = Arc::new(StubInference::replying(MODEL_REPLY));
        let service =
            AssessmentService::new(Arc::new(registry), inference.clone(), Arc::new(FailingStore));

        let err = service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .expect_err("a failed write should fail the request");

        assert!(matches!(err, AssessmentError::FileWrite(_)));
        assert!(!err.is_inference());
        assert_eq!(inference.call_count(), 1);
    }

    #[tokio::test]
    async fn identical_submissions_create_distinct_records() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));

        let first = fx
            .service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .unwrap();
        let second = fx
            .service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .unwrap();

        assert_ne!(first.health_record.id, second.health_record.id);
        assert_ne!(first.prediction.id, second.prediction.id);
        assert_eq!(fx.store.counts().unwrap(), (2, 2));
    }

    #[tokio::test]
    async fn unauthorized_callers_never_reach_the_model() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));

        for token in [None, Some("not-a-token")] {
            let err = fx
                .service
                .assess(token, sample_health_data())
                .await
                .expect_err("unknown token should be rejected");
            assert!(matches!(err, AssessmentError::Unauthorized));
        }

        assert_eq!(fx.inference.call_count(), 0);
        assert_eq!(fx.store.counts().unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_the_model() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));
        let mut data = sample_health_data();
        data.chol = 9000;

        let err = fx
            .service
            .assess(Some(PATIENT_TOKEN), data)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidInput(_)));
        assert_eq!(fx.inference.call_count(), 0);
    }

    #[tokio::test]
    async fn parsed_predictions_are_in_range_and_band_consistent() {
        for (score, level) in [(0, "Low"), (42, "High"), (74, "High"), (100, "Very High")] {
            let reply = format!(
                "{{\"riskScore\":{score},\"riskLevel\":\"{level}\",\"recommendations\":[\"x\",\"y\",\"z\"]}}"
            );
            let fx = fixture(StubInference::replying(&reply));
            let outcome = fx
                .service
                .assess(Some(PATIENT_TOKEN), sample_health_data())
                .await
                .unwrap();

            assert!(outcome.prediction.risk_score <= 100);
            assert!(RiskLevel::ALL.contains(&outcome.prediction.risk_level));
            assert!(is_consistent(
                outcome.prediction.risk_score,
                outcome.prediction.risk_level
            ));
        }
    }

    #[tokio::test]
    async fn own_reads_are_scoped_to_the_caller() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));
        fx.service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .unwrap();

        assert_eq!(fx.service.own_predictions(Some(PATIENT_TOKEN)).unwrap().len(), 1);
        assert_eq!(fx.service.own_health_records(Some(PATIENT_TOKEN)).unwrap().len(), 1);
        assert!(fx
            .service
            .own_predictions(Some(OTHER_PATIENT_TOKEN))
            .unwrap()
            .is_empty());
        assert!(matches!(
            fx.service.own_predictions(None),
            Err(AssessmentError::Unauthorized)
        ));
    }

    #[test]
    fn booking_requires_patient_and_known_doctor() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));
        let req = |doctor_id| CreateAppointmentReq {
            doctor_id,
            appointment_date: Utc::now() + Duration::days(2),
            reason: Some("  chest tightness  ".into()),
        };

        let booked = fx
            .service
            .book_appointment(Some(PATIENT_TOKEN), req(fx.doctor.id))
            .unwrap();
        assert_eq!(booked.status, AppointmentStatus::Pending);
        assert_eq!(booked.reason.as_deref(), Some("chest tightness"));

        let doctors = fx.service.doctors(Some(PATIENT_TOKEN)).unwrap();
        assert_eq!(doctors, vec![fx.doctor.clone()]);

        let err = fx
            .service
            .book_appointment(Some(PATIENT_TOKEN), req(fx.other_patient.id))
            .unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidInput(_)));

        let err = fx
            .service
            .book_appointment(Some(DOCTOR_TOKEN), req(fx.doctor.id))
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        assert_eq!(fx.service.appointments(Some(DOCTOR_TOKEN)).unwrap().len(), 1);
        assert_eq!(fx.service.appointments(Some(PATIENT_TOKEN)).unwrap().len(), 1);
        assert!(fx
            .service
            .appointments(Some(OTHER_PATIENT_TOKEN))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn only_the_doctor_updates_status() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));
        let booked = fx
            .service
            .book_appointment(
                Some(PATIENT_TOKEN),
                CreateAppointmentReq {
                    doctor_id: fx.doctor.id,
                    appointment_date: Utc::now(),
                    reason: None,
                },
            )
            .unwrap();

        let update = || UpdateAppointmentStatusReq {
            status: AppointmentStatus::Completed,
            notes: Some("reviewed".into()),
        };

        let err = fx
            .service
            .update_appointment_status(Some(PATIENT_TOKEN), booked.id, update())
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        let updated = fx
            .service
            .update_appointment_status(Some(DOCTOR_TOKEN), booked.id, update())
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Completed);
        assert_eq!(updated.notes.as_deref(), Some("reviewed"));
    }

    #[tokio::test]
    async fn dashboard_aggregates_roster() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));
        fx.service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .unwrap();
        fx.service
            .book_appointment(
                Some(OTHER_PATIENT_TOKEN),
                CreateAppointmentReq {
                    doctor_id: fx.doctor.id,
                    appointment_date: Utc::now(),
                    reason: None,
                },
            )
            .unwrap();

        let today = Utc::now().date_naive();
        let dashboard = fx
            .service
            .doctor_dashboard(Some(DOCTOR_TOKEN), today)
            .unwrap();

        assert_eq!(dashboard.roster.len(), 2);
        assert_eq!(dashboard.roster[0].profile.id, fx.patient.id);
        assert_eq!(dashboard.roster[0].latest_risk, Some(42));
        assert_eq!(dashboard.roster[1].profile.id, fx.other_patient.id);
        assert_eq!(dashboard.roster[1].risk_level, None);
        assert_eq!(dashboard.statistics.total_patients, 2);
        assert_eq!(dashboard.statistics.moderate_risk_count, 1);
        assert_eq!(dashboard.statistics.avg_risk_score, 42);
        assert_eq!(dashboard.appointments.len(), 1);
        assert_eq!(dashboard.appointment_trends.len(), 30);
        assert_eq!(dashboard.appointment_trends.last().unwrap().total, 1);

        let err = fx
            .service
            .doctor_dashboard(Some(PATIENT_TOKEN), today)
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));
    }

    #[tokio::test]
    async fn patient_detail_for_doctor() {
        let fx = fixture(StubInference::replying(MODEL_REPLY));
        fx.service
            .assess(Some(PATIENT_TOKEN), sample_health_data())
            .await
            .unwrap();

        let detail = fx
            .service
            .patient_detail(Some(DOCTOR_TOKEN), fx.patient.id)
            .unwrap();
        assert_eq!(detail.patient, fx.patient);
        assert_eq!(detail.health_records.len(), 1);
        assert_eq!(detail.predictions.len(), 1);
        assert_eq!(detail.timeline.len(), 1);
        assert_eq!(detail.timeline[0].score, 42);
        assert!(detail.appointments.is_empty());

        let err = fx
            .service
            .patient_detail(Some(DOCTOR_TOKEN), fx.doctor.id)
            .unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));

        let err = fx
            .service
            .patient_detail(Some(DOCTOR_TOKEN), Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));
    }
}
