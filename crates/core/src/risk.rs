//! Score bands.
//!
//! The score is the authoritative output of an assessment; the level is a presentation bucket
//! derived from it. The band table is the same one the dashboards colour-code with:
//!
//! | score  | band     | level     |
//! |--------|----------|-----------|
//! | 0-24   | Low      | Low       |
//! | 25-49  | Moderate | Moderate  |
//! | 50-74  | Elevated | High      |
//! | 75-100 | Severe   | Very High |

use api_shared::RiskLevel;

/// Upper bound of the risk score scale.
pub const MAX_RISK_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Moderate,
    Elevated,
    Severe,
}

impl RiskBand {
    /// Returns the band for a score. Scores above 100 are treated as 100.
    pub fn for_score(score: u8) -> Self {
        match score.min(MAX_RISK_SCORE) {
            0..=24 => RiskBand::Low,
            25..=49 => RiskBand::Moderate,
            50..=74 => RiskBand::Elevated,
            _ => RiskBand::Severe,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            RiskBand::Low => RiskLevel::Low,
            RiskBand::Moderate => RiskLevel::Moderate,
            RiskBand::Elevated => RiskLevel::High,
            RiskBand::Severe => RiskLevel::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Moderate => "moderate",
            RiskBand::Elevated => "elevated",
            RiskBand::Severe => "severe",
        }
    }
}

pub fn level_for_score(score: u8) -> RiskLevel {
    RiskBand::for_score(score).risk_level()
}

/// Whether a stored level agrees with the band table for its score.
pub fn is_consistent(score: u8, level: RiskLevel) -> bool {
    level_for_score(score) == level
}
