//! Constants used throughout the cardio core crate.

/// Default directory for record storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "cardio_data";

/// Default location of the profile registry.
pub const DEFAULT_PROFILES_FILE: &str = "profiles.yaml";

/// Default chat-completion endpoint.
pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// Default model identifier sent to the gateway.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Upper bound accepted for `AI_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 5;

/// Number of recommendations a usable model reply must contain.
pub const RECOMMENDATION_COUNT: usize = 3;

pub const FALLBACK_RISK_SCORE: u8 = 50;

pub const FALLBACK_RECOMMENDATIONS: [&str; RECOMMENDATION_COUNT] = [
    "Consult with a cardiologist",
    "Monitor blood pressure regularly",
    "Maintain a healthy diet",
];

/// Directory name for assessment pairs (health record + prediction).
pub const ASSESSMENTS_DIR_NAME: &str = "assessments";

/// Directory name for appointments.
pub const APPOINTMENTS_DIR_NAME: &str = "appointments";

/// Directory assessment pairs are assembled in before being moved into place.
pub const STAGING_DIR_NAME: &str = ".staging";

pub const HEALTH_RECORD_FILENAME: &str = "health_record.json";

pub const PREDICTION_FILENAME: &str = "prediction.json";

pub const APPOINTMENT_FILENAME: &str = "appointment.json";

/// Number of daily buckets in the appointment trends chart.
pub const TREND_WINDOW_DAYS: i64 = 30;
