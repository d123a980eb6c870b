//! Candidate reminder-time computation.
//!
//! Each offset is anchored to a fixed time of day so patients are not
//! notified at odd hours: one week out at 10:00, three days out at 14:00,
//! and the morning of the appointment at 09:00.

use chrono::{DateTime, Days, NaiveDate, Utc};

use careminder_entity::reminder::ReminderKind;

/// Hour of day the one-week reminder fires.
const SEVEN_DAYS_HOUR: u32 = 10;
/// Hour of day the three-day reminder fires.
const THREE_DAYS_HOUR: u32 = 14;
/// Hour of day the same-day reminder fires.
const ONE_DAY_HOUR: u32 = 9;

/// Compute the reminder candidates for an appointment time.
///
/// The same-day candidate is only produced when its anchor falls before
/// the appointment itself (an early-morning appointment gets no same-day
/// reminder). Past-dated filtering against the current clock is the
/// scheduler's job, not this function's.
pub fn candidate_times(appointment_at: DateTime<Utc>) -> Vec<(ReminderKind, DateTime<Utc>)> {
    let date = appointment_at.date_naive();
    let mut candidates = Vec::with_capacity(3);

    if let Some(at) = date
        .checked_sub_days(Days::new(7))
        .and_then(|d| anchor(d, SEVEN_DAYS_HOUR))
    {
        candidates.push((ReminderKind::SevenDays, at));
    }

    if let Some(at) = date
        .checked_sub_days(Days::new(3))
        .and_then(|d| anchor(d, THREE_DAYS_HOUR))
    {
        candidates.push((ReminderKind::ThreeDays, at));
    }

    if let Some(at) = anchor(date, ONE_DAY_HOUR) {
        if at < appointment_at {
            candidates.push((ReminderKind::OneDay, at));
        }
    }

    candidates
}

fn anchor(date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    date.and_hms_opt(hour, 0, 0).map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn candidates_use_fixed_anchors() {
        let candidates = candidate_times(utc(2025, 1, 15, 10, 0));
        assert_eq!(
            candidates,
            vec![
                (ReminderKind::SevenDays, utc(2025, 1, 8, 10, 0)),
                (ReminderKind::ThreeDays, utc(2025, 1, 12, 14, 0)),
                (ReminderKind::OneDay, utc(2025, 1, 15, 9, 0)),
            ]
        );
    }

    #[test]
    fn early_morning_appointment_gets_no_same_day_candidate() {
        let candidates = candidate_times(utc(2025, 1, 15, 8, 30));
        assert!(
            !candidates
                .iter()
                .any(|(kind, _)| *kind == ReminderKind::OneDay)
        );
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn same_day_anchor_precedes_appointment() {
        for (kind, at) in candidate_times(utc(2025, 6, 1, 9, 30)) {
            if kind == ReminderKind::OneDay {
                assert_eq!(at, utc(2025, 6, 1, 9, 0));
            }
        }
    }
}
