//! Record and wire types.
//!
//! Stored records (`HealthRecord`, `Prediction`, `Appointment`) serialise with snake_case field
//! names, matching the persisted layout. Request and response envelopes follow the public API
//! naming (`healthData`, `fallbackUsed`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// ============================================================================
// CLINICAL INPUT AND OUTPUT
// ============================================================================

/// Clinical fields submitted for one assessment.
///
/// Coded fields follow the conventional heart-disease dataset encoding: `sex` is 1 for male,
/// `cp` is the chest pain type (0-3), `fbs` and `exang` are 0/1 flags, `restecg` (0-2),
/// `slope` (0-2), `ca` is the number of major vessels (0-4) and `thal` (0-2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthData {
    pub age: i32,
    pub sex: i32,
    pub cp: i32,
    /// Resting blood pressure in mm Hg.
    pub trestbps: i32,
    /// Serum cholesterol in mg/dl.
    pub chol: i32,
    pub fbs: i32,
    pub restecg: i32,
    /// Maximum heart rate achieved, bpm.
    pub thalach: i32,
    pub exang: i32,
    /// ST depression induced by exercise relative to rest.
    pub oldpeak: f64,
    pub slope: i32,
    pub ca: i32,
    pub thal: i32,
}

/// A persisted health data submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub data: HealthData,
    pub created_at: DateTime<Utc>,
}

/// Coarse bucket over the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk level: {0}")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    /// Parses a level name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRiskLevel(s.to_string()))
    }
}

/// A persisted risk assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prediction {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The health record this prediction was derived from.
    pub health_data_id: Uuid,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// PEOPLE AND SCHEDULING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

/// User identity and contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Profile {
    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A scheduled consultation between a patient and a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// REQUESTS AND RESPONSES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Flat error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictReq {
    pub health_data: HealthData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictRes {
    pub success: bool,
    pub prediction: Prediction,
    /// True when the model reply could not be used and the fixed fallback was stored.
    pub fallback_used: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListPredictionsRes {
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListHealthRecordsRes {
    pub health_records: Vec<HealthRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListAppointmentsRes {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDoctorsRes {
    pub doctors: Vec<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAppointmentReq {
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAppointmentStatusReq {
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// DASHBOARD AGGREGATES
// ============================================================================

/// A patient on a doctor's roster together with their most recent assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub profile: Profile,
    pub latest_risk: Option<u8>,
    pub risk_level: Option<RiskLevel>,
    pub last_assessed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RiskDistributionEntry {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RiskLevelMetrics {
    pub risk_level: String,
    pub avg_score: u32,
    pub patients: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientStatistics {
    pub total_patients: usize,
    /// Patients whose latest level is High or Very High.
    pub high_risk_count: usize,
    pub high_risk_percent: u32,
    pub moderate_risk_count: usize,
    pub moderate_risk_percent: u32,
    pub low_risk_count: usize,
    pub low_risk_percent: u32,
    pub avg_risk_score: u32,
    pub total_appointments: usize,
    pub completed_appointments: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentTrendPoint {
    pub date: NaiveDate,
    /// Short label such as `Mar 04`.
    pub label: String,
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskTimelinePoint {
    /// Label such as `Mar 04, 2026`.
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub score: u8,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorDashboardRes {
    pub roster: Vec<RosterEntry>,
    pub statistics: PatientStatistics,
    pub risk_distribution: Vec<RiskDistributionEntry>,
    pub metrics_by_risk_level: Vec<RiskLevelMetrics>,
    pub appointment_trends: Vec<AppointmentTrendPoint>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientDetailRes {
    pub patient: Profile,
    pub health_records: Vec<HealthRecord>,
    pub predictions: Vec<Prediction>,
    pub appointments: Vec<Appointment>,
    pub timeline: Vec<RiskTimelinePoint>,
}
