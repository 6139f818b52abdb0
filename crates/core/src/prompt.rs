//! Prompt assembly for the inference gateway.

use crate::constants::RECOMMENDATION_COUNT;
use crate::validation::{
    chest_pain_label, fasting_blood_sugar_label, resting_ecg_label, sex_label, st_slope_label,
    thal_label, yes_no_label,
};
use api_shared::HealthData;
use std::fmt::Write;

/// Renders a health data payload into the single user message sent to the model.
///
/// The message lists every field with a readable label and asks for a JSON object with
/// `riskScore`, `riskLevel` and exactly three `recommendations`.
pub fn build_prompt(data: &HealthData) -> String {
    let mut prompt = String::from(
        "You are a medical AI assistant specialising in cardiovascular health risk assessment.\n\n\
         Analyse the following patient data and provide a heart disease risk assessment:\n",
    );

    let fields = [
        ("Age", data.age.to_string()),
        ("Sex", sex_label(data.sex).to_string()),
        (
            "Chest Pain Type",
            format!("{} ({})", data.cp, chest_pain_label(data.cp)),
        ),
        ("Resting Blood Pressure", format!("{} mm Hg", data.trestbps)),
        ("Cholesterol", format!("{} mg/dl", data.chol)),
        (
            "Fasting Blood Sugar",
            format!("{} ({})", data.fbs, fasting_blood_sugar_label(data.fbs)),
        ),
        (
            "Resting ECG",
            format!("{} ({})", data.restecg, resting_ecg_label(data.restecg)),
        ),
        ("Max Heart Rate", format!("{} bpm", data.thalach)),
        ("Exercise Induced Angina", yes_no_label(data.exang).to_string()),
        ("ST Depression", data.oldpeak.to_string()),
        (
            "Slope",
            format!("{} ({})", data.slope, st_slope_label(data.slope)),
        ),
        ("Number of Major Vessels", data.ca.to_string()),
        ("Thal", format!("{} ({})", data.thal, thal_label(data.thal))),
    ];

    for (label, value) in fields {
        // Writing into a String cannot fail.
        let _ = writeln!(prompt, "- {label}: {value}");
    }

    let _ = write!(
        prompt,
        "\nProvide:\n\
         1. A risk score from 0-100 (higher = higher risk)\n\
         2. Risk level (Low, Moderate, High, Very High)\n\
         3. {RECOMMENDATION_COUNT} specific, actionable recommendations\n\n\
         Format your response as JSON:\n\
         {{\n  \"riskScore\": number,\n  \"riskLevel\": \"Low\" | \"Moderate\" | \"High\" | \"Very High\",\n  \
         \"recommendations\": [string, string, string]\n}}"
    );

    prompt
}
