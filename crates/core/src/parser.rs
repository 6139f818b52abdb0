//! Extraction of a structured assessment from the model's free-text reply.
//!
//! The reply is expected to contain one JSON object somewhere in its text. The span from the
//! first `{` to the last `}` is decoded and its fields are validated. Any failure yields the
//! fixed fallback assessment; the outcome records which path was taken and why.

use crate::constants::{FALLBACK_RECOMMENDATIONS, FALLBACK_RISK_SCORE, RECOMMENDATION_COUNT};
use crate::risk::{level_for_score, MAX_RISK_SCORE};
use api_shared::RiskLevel;
use serde::Deserialize;
use std::fmt;

/// A usable risk assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    /// True when the model's level disagreed with its score and was replaced by the band level.
    pub level_adjusted: bool,
}

impl Assessment {
    /// The fixed placeholder stored when the model reply cannot be used.
    pub fn fallback() -> Self {
        Self {
            risk_score: FALLBACK_RISK_SCORE,
            risk_level: RiskLevel::Moderate,
            recommendations: FALLBACK_RECOMMENDATIONS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            level_adjusted: false,
        }
    }
}

/// Why the fallback assessment was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The reply contained no brace-delimited span.
    NoJsonObject,
    /// The span was not valid JSON or had the wrong field types.
    MalformedJson(String),
    /// The JSON decoded but a field failed validation.
    InvalidField(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoJsonObject => f.write_str("no JSON object in model reply"),
            FallbackReason::MalformedJson(e) => write!(f, "malformed JSON in model reply: {e}"),
            FallbackReason::InvalidField(e) => write!(f, "invalid field in model reply: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Assessment),
    Fallback {
        assessment: Assessment,
        reason: FallbackReason,
    },
}

impl ParseOutcome {
    pub fn assessment(&self) -> &Assessment {
        match self {
            ParseOutcome::Parsed(assessment) => assessment,
            ParseOutcome::Fallback { assessment, .. } => assessment,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn into_parts(self) -> (Assessment, Option<FallbackReason>) {
        match self {
            ParseOutcome::Parsed(assessment) => (assessment, None),
            ParseOutcome::Fallback { assessment, reason } => (assessment, Some(reason)),
        }
    }

    fn fallback(reason: FallbackReason) -> Self {
        ParseOutcome::Fallback {
            assessment: Assessment::fallback(),
            reason,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    risk_score: f64,
    risk_level: String,
    recommendations: Vec<String>,
}

/// Returns the span from the first `{` to the last `}`, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses a model reply into an assessment, falling back to the fixed default on any failure.
pub fn parse_assessment(reply: &str) -> ParseOutcome {
    let Some(json) = extract_json_object(reply) else {
        return ParseOutcome::fallback(FallbackReason::NoJsonObject);
    };

    let raw: RawAssessment = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => return ParseOutcome::fallback(FallbackReason::MalformedJson(e.to_string())),
    };

    match validate(raw) {
        Ok(assessment) => ParseOutcome::Parsed(assessment),
        Err(msg) => ParseOutcome::fallback(FallbackReason::InvalidField(msg)),
    }
}

fn validate(raw: RawAssessment) -> Result<Assessment, String> {
    let score = raw.risk_score;
    if !score.is_finite() || score.fract() != 0.0 {
        return Err(format!("riskScore {score} is not a whole number"));
    }
    if !(0.0..=f64::from(MAX_RISK_SCORE)).contains(&score) {
        return Err(format!("riskScore {score} is outside 0-{MAX_RISK_SCORE}"));
    }
    let risk_score = score as u8;

    let reported_level = raw
        .risk_level
        .parse::<RiskLevel>()
        .map_err(|e| format!("riskLevel: {e}"))?;

    if raw.recommendations.len() != RECOMMENDATION_COUNT {
        return Err(format!(
            "expected {RECOMMENDATION_COUNT} recommendations, got {}",
            raw.recommendations.len()
        ));
    }

    let recommendations: Vec<String> = raw
        .recommendations
        .into_iter()
        .map(|r| r.trim().to_string())
        .collect();
    if recommendations.iter().any(|r| r.is_empty()) {
        return Err("recommendations must not be blank".into());
    }

    let risk_level = level_for_score(risk_score);
    let level_adjusted = risk_level != reported_level;
    if level_adjusted {
        tracing::warn!(
            risk_score,
            reported = %reported_level,
            derived = %risk_level,
            "model risk level disagrees with score band; using band level"
        );
    }

    Ok(Assessment {
        risk_score,
        risk_level,
        recommendations,
        level_adjusted,
    })
}
