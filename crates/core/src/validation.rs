//! Intake validation for submitted health data.
//!
//! Every coded or measured field is checked against a plausible range before the payload is
//! described to the model or stored. The error names the offending field so the caller can fix
//! the form.

use crate::{AssessmentError, AssessmentResult};
use api_shared::HealthData;
use std::ops::RangeInclusive;

const AGE: RangeInclusive<i32> = 1..=120;
const FLAG: RangeInclusive<i32> = 0..=1;
const CHEST_PAIN: RangeInclusive<i32> = 0..=3;
const RESTING_BP: RangeInclusive<i32> = 50..=250;
const CHOLESTEROL: RangeInclusive<i32> = 50..=700;
const RESTING_ECG: RangeInclusive<i32> = 0..=2;
const MAX_HEART_RATE: RangeInclusive<i32> = 40..=250;
const ST_DEPRESSION: RangeInclusive<f64> = -5.0..=10.0;
const ST_SLOPE: RangeInclusive<i32> = 0..=2;
const VESSELS: RangeInclusive<i32> = 0..=4;
const THAL: RangeInclusive<i32> = 0..=2;

fn check(field: &str, value: i32, range: RangeInclusive<i32>) -> AssessmentResult<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(AssessmentError::InvalidInput(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Validates a health data payload.
///
/// # Errors
///
/// Returns `AssessmentError::InvalidInput` naming the first field that is out of range.
pub fn validate_health_data(data: &HealthData) -> AssessmentResult<()> {
    check("age", data.age, AGE)?;
    check("sex", data.sex, FLAG)?;
    check("cp", data.cp, CHEST_PAIN)?;
    check("trestbps", data.trestbps, RESTING_BP)?;
    check("chol", data.chol, CHOLESTEROL)?;
    check("fbs", data.fbs, FLAG)?;
    check("restecg", data.restecg, RESTING_ECG)?;
    check("thalach", data.thalach, MAX_HEART_RATE)?;
    check("exang", data.exang, FLAG)?;

    if !data.oldpeak.is_finite() || !ST_DEPRESSION.contains(&data.oldpeak) {
        return Err(AssessmentError::InvalidInput(format!(
            "oldpeak must be between {} and {}, got {}",
            ST_DEPRESSION.start(),
            ST_DEPRESSION.end(),
            data.oldpeak
        )));
    }

    check("slope", data.slope, ST_SLOPE)?;
    check("ca", data.ca, VESSELS)?;
    check("thal", data.thal, THAL)?;

    Ok(())
}

// Display labels for coded fields. Callers are expected to have validated the record first;
// unexpected codes render as "Unknown".

pub fn sex_label(code: i32) -> &'static str {
    if code == 1 {
        "Male"
    } else {
        "Female"
    }
}

pub fn yes_no_label(code: i32) -> &'static str {
    if code == 1 {
        "Yes"
    } else {
        "No"
    }
}

pub fn chest_pain_label(code: i32) -> &'static str {
    match code {
        0 => "Typical Angina",
        1 => "Atypical Angina",
        2 => "Non-anginal Pain",
        3 => "Asymptomatic",
        _ => "Unknown",
    }
}

pub fn fasting_blood_sugar_label(code: i32) -> &'static str {
    if code == 1 {
        "High (>120 mg/dl)"
    } else {
        "Normal (<=120 mg/dl)"
    }
}

pub fn resting_ecg_label(code: i32) -> &'static str {
    match code {
        0 => "Normal",
        1 => "ST-T Abnormality",
        2 => "LV Hypertrophy",
        _ => "Unknown",
    }
}

pub fn st_slope_label(code: i32) -> &'static str {
    match code {
        0 => "Upsloping",
        1 => "Flat",
        2 => "Downsloping",
        _ => "Unknown",
    }
}

pub fn thal_label(code: i32) -> &'static str {
    match code {
        0 => "Normal",
        1 => "Fixed Defect",
        2 => "Reversible Defect",
        _ => "Unknown",
    }
}

#[cfg(test)]
pub(crate) fn sample_health_data() -> HealthData {
    HealthData {
        age: 54,
        sex: 1,
        cp: 0,
        trestbps: 130,
        chol: 246,
        fbs: 0,
        restecg: 1,
        thalach: 150,
        exang: 0,
        oldpeak: 1.2,
        slope: 2,
        ca: 0,
        thal: 2,
    }
}
