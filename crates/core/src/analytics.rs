//! Dashboard aggregates.
//!
//! Pure transforms over already-fetched collections: the doctor's patient roster, risk
//! distribution and per-level metrics, summary statistics, daily appointment trends and a
//! patient's risk timeline. Empty inputs produce zeroed or empty outputs.

use crate::constants::TREND_WINDOW_DAYS;
use api_shared::{
    Appointment, AppointmentStatus, AppointmentTrendPoint, PatientStatistics, Prediction,
    Profile, RiskDistributionEntry, RiskLevel, RiskLevelMetrics, RiskTimelinePoint, RosterEntry,
};
use chrono::{Duration, NaiveDate};

const UNKNOWN_LEVEL: &str = "Unknown";

fn level_name(level: Option<RiskLevel>) -> &'static str {
    level.map(|l| l.as_str()).unwrap_or(UNKNOWN_LEVEL)
}

/// Rounded percentage of `part` in `whole`, 0 when `whole` is 0.
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

fn rounded_mean(total: u64, count: usize) -> u32 {
    if count == 0 {
        0
    } else {
        (total as f64 / count as f64).round() as u32
    }
}

/// Pairs each patient with their most recent prediction.
///
/// Patients without predictions are kept with no risk. The roster is ordered by latest score,
/// highest first, then by name.
pub fn patient_roster(patients: &[Profile], predictions: &[Prediction]) -> Vec<RosterEntry> {
    let mut roster: Vec<RosterEntry> = patients
        .iter()
        .map(|profile| {
            let latest = predictions
                .iter()
                .filter(|p| p.user_id == profile.id)
                .max_by_key(|p| p.created_at);
            RosterEntry {
                profile: profile.clone(),
                latest_risk: latest.map(|p| p.risk_score),
                risk_level: latest.map(|p| p.risk_level),
                last_assessed_at: latest.map(|p| p.created_at),
            }
        })
        .collect();

    roster.sort_by(|a, b| {
        b.latest_risk
            .cmp(&a.latest_risk)
            .then_with(|| a.profile.full_name.cmp(&b.profile.full_name))
    });
    roster
}

/// Number of roster patients per latest risk level, in level order, unknown last.
///
/// Levels with no patients are omitted.
pub fn risk_distribution(roster: &[RosterEntry]) -> Vec<RiskDistributionEntry> {
    RiskLevel::ALL
        .into_iter()
        .map(Some)
        .chain(std::iter::once(None))
        .filter_map(|level| {
            let value = roster.iter().filter(|e| e.risk_level == level).count();
            (value > 0).then(|| RiskDistributionEntry {
                name: level_name(level).to_string(),
                value,
            })
        })
        .collect()
}

/// Average latest score and patient count per risk level.
///
/// Patients without an assessment are reported under "Unknown" with an average of 0.
pub fn metrics_by_risk_level(roster: &[RosterEntry]) -> Vec<RiskLevelMetrics> {
    RiskLevel::ALL
        .into_iter()
        .map(Some)
        .chain(std::iter::once(None))
        .filter_map(|level| {
            let entries: Vec<&RosterEntry> =
                roster.iter().filter(|e| e.risk_level == level).collect();
            if entries.is_empty() {
                return None;
            }
            let total: u64 = entries
                .iter()
                .map(|e| u64::from(e.latest_risk.unwrap_or(0)))
                .sum();
            Some(RiskLevelMetrics {
                risk_level: level_name(level).to_string(),
                avg_score: rounded_mean(total, entries.len()),
                patients: entries.len(),
            })
        })
        .collect()
}

/// Summary card figures for a doctor's dashboard.
///
/// The average score is taken over assessed patients only; percentages are of all roster
/// patients.
pub fn patient_statistics(
    roster: &[RosterEntry],
    appointments: &[Appointment],
) -> PatientStatistics {
    let count_levels = |levels: &[RiskLevel]| {
        roster
            .iter()
            .filter(|e| e.risk_level.is_some_and(|l| levels.contains(&l)))
            .count()
    };

    let total_patients = roster.len();
    let high_risk_count = count_levels(&[RiskLevel::High, RiskLevel::VeryHigh]);
    let moderate_risk_count = count_levels(&[RiskLevel::Moderate]);
    let low_risk_count = count_levels(&[RiskLevel::Low]);

    let scores: Vec<u8> = roster.iter().filter_map(|e| e.latest_risk).collect();
    let score_total: u64 = scores.iter().map(|s| u64::from(*s)).sum();

    let total_appointments = appointments.len();
    let completed_appointments = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .count();

    PatientStatistics {
        total_patients,
        high_risk_count,
        high_risk_percent: percent(high_risk_count, total_patients),
        moderate_risk_count,
        moderate_risk_percent: percent(moderate_risk_count, total_patients),
        low_risk_count,
        low_risk_percent: percent(low_risk_count, total_patients),
        avg_risk_score: rounded_mean(score_total, scores.len()),
        total_appointments,
        completed_appointments,
        completion_rate: percent(completed_appointments, total_appointments),
    }
}

/// Daily appointment counts for the 30 days ending on `today` (inclusive), oldest first.
pub fn appointment_trends(appointments: &[Appointment], today: NaiveDate) -> Vec<AppointmentTrendPoint> {
    (0..TREND_WINDOW_DAYS)
        .rev()
        .map(|days_back| today - Duration::days(days_back))
        .map(|date| {
            let day: Vec<&Appointment> = appointments
                .iter()
                .filter(|a| a.appointment_date.date_naive() == date)
                .collect();
            let with_status =
                |status: AppointmentStatus| day.iter().filter(|a| a.status == status).count();

            AppointmentTrendPoint {
                date,
                label: date.format("%b %d").to_string(),
                total: day.len(),
                pending: with_status(AppointmentStatus::Pending),
                confirmed: with_status(AppointmentStatus::Confirmed),
                completed: with_status(AppointmentStatus::Completed),
            }
        })
        .collect()
}

/// A patient's predictions as chronological chart points.
pub fn risk_timeline(predictions: &[Prediction]) -> Vec<RiskTimelinePoint> {
    let mut points: Vec<RiskTimelinePoint> = predictions
        .iter()
        .map(|p| RiskTimelinePoint {
            date: p.created_at.format("%b %d, %Y").to_string(),
            created_at: p.created_at,
            score: p.risk_score,
            level: p.risk_level,
        })
        .collect();
    points.sort_by_key(|p| p.created_at);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::Role;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn patient(name: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            role: Role::Patient,
            full_name: name.into(),
            email: format!("{}@example.org", name.to_lowercase()),
            phone: None,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn prediction(user: &Profile, score: u8, level: RiskLevel, created_at: DateTime<Utc>) -> Prediction {
        Prediction {
            id: Uuid::new_v4(),
            user_id: user.id,
            health_data_id: Uuid::new_v4(),
            risk_score: score,
            risk_level: level,
            recommendations: vec![],
            created_at,
        }
    }

    fn appointment(date: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            appointment_date: date,
            status,
            reason: None,
            notes: None,
            created_at: date,
        }
    }

    #[test]
    fn roster_uses_latest_prediction_per_patient() {
        let ann = patient("Ann");
        let bob = patient("Bob");
        let cat = patient("Cat");
        let predictions = vec![
            prediction(&ann, 20, RiskLevel::Low, at(2026, 1, 1)),
            prediction(&ann, 60, RiskLevel::High, at(2026, 2, 1)),
            prediction(&bob, 30, RiskLevel::Moderate, at(2026, 1, 15)),
        ];

        let roster = patient_roster(&[cat.clone(), bob.clone(), ann.clone()], &predictions);

        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].profile.id, ann.id);
        assert_eq!(roster[0].latest_risk, Some(60));
        assert_eq!(roster[0].risk_level, Some(RiskLevel::High));
        assert_eq!(roster[1].profile.id, bob.id);
        assert_eq!(roster[2].profile.id, cat.id);
        assert_eq!(roster[2].latest_risk, None);
    }

    #[test]
    fn distribution_and_metrics_group_by_level() {
        let a = patient("A");
        let b = patient("B");
        let c = patient("C");
        let d = patient("D");
        let predictions = vec![
            prediction(&a, 10, RiskLevel::Low, at(2026, 1, 1)),
            prediction(&b, 20, RiskLevel::Low, at(2026, 1, 1)),
            prediction(&c, 81, RiskLevel::VeryHigh, at(2026, 1, 1)),
        ];
        let roster = patient_roster(&[a, b, c, d], &predictions);

        assert_eq!(
            risk_distribution(&roster),
            vec![
                RiskDistributionEntry { name: "Low".into(), value: 2 },
                RiskDistributionEntry { name: "Very High".into(), value: 1 },
                RiskDistributionEntry { name: "Unknown".into(), value: 1 },
            ]
        );

        let metrics = metrics_by_risk_level(&roster);
        assert_eq!(metrics[0].risk_level, "Low");
        assert_eq!(metrics[0].avg_score, 15);
        assert_eq!(metrics[0].patients, 2);
        assert_eq!(metrics[1].risk_level, "Very High");
        assert_eq!(metrics[1].avg_score, 81);
    }

    #[test]
    fn statistics_compute_counts_percentages_and_completion() {
        let a = patient("A");
        let b = patient("B");
        let c = patient("C");
        let predictions = vec![
            prediction(&a, 70, RiskLevel::High, at(2026, 1, 1)),
            prediction(&b, 90, RiskLevel::VeryHigh, at(2026, 1, 1)),
            prediction(&c, 30, RiskLevel::Moderate, at(2026, 1, 1)),
        ];
        let roster = patient_roster(&[a, b, c], &predictions);
        let appointments = vec![
            appointment(at(2026, 1, 2), AppointmentStatus::Completed),
            appointment(at(2026, 1, 3), AppointmentStatus::Pending),
            appointment(at(2026, 1, 4), AppointmentStatus::Completed),
        ];

        let stats = patient_statistics(&roster, &appointments);
        assert_eq!(stats.total_patients, 3);
        assert_eq!(stats.high_risk_count, 2);
        assert_eq!(stats.high_risk_percent, 67);
        assert_eq!(stats.moderate_risk_count, 1);
        assert_eq!(stats.moderate_risk_percent, 33);
        assert_eq!(stats.low_risk_count, 0);
        assert_eq!(stats.avg_risk_score, 63);
        assert_eq!(stats.completion_rate, 67);
    }

    #[test]
    fn statistics_are_zero_for_empty_inputs() {
        assert_eq!(patient_statistics(&[], &[]), PatientStatistics::default());
        assert!(risk_distribution(&[]).is_empty());
        assert!(metrics_by_risk_level(&[]).is_empty());
    }

    #[test]
    fn trends_cover_thirty_days_ending_today() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let appointments = vec![
            appointment(at(2026, 3, 31), AppointmentStatus::Pending),
            appointment(at(2026, 3, 31), AppointmentStatus::Completed),
            appointment(at(2026, 3, 2), AppointmentStatus::Confirmed),
            // Outside the window.
            appointment(at(2026, 3, 1), AppointmentStatus::Confirmed),
        ];

        let trends = appointment_trends(&appointments, today);
        assert_eq!(trends.len(), 30);
        assert_eq!(trends[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(trends[0].label, "Mar 02");
        assert_eq!(trends[0].confirmed, 1);

        let last = trends.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.total, 2);
        assert_eq!(last.pending, 1);
        assert_eq!(last.completed, 1);

        let total: usize = trends.iter().map(|t| t.total).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn timeline_is_chronological() {
        let ann = patient("Ann");
        let predictions = vec![
            prediction(&ann, 60, RiskLevel::High, at(2026, 2, 1)),
            prediction(&ann, 20, RiskLevel::Low, at(2026, 1, 5)),
        ];

        let timeline = risk_timeline(&predictions);
        assert_eq!(timeline[0].score, 20);
        assert_eq!(timeline[0].date, "Jan 05, 2026");
        assert_eq!(timeline[1].score, 60);
    }
}
