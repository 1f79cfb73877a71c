//! Gestation calendar: the static dashboard numbers derived from the last menstrual period.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Full term, counted from the first day of the last menstrual period.
pub const FULL_TERM_DAYS: i64 = 280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationStats {
    pub weeks_pregnant: u32,
    pub due_date: NaiveDate,
    pub days_to_go: u32,
    pub weeks_left: u32,
}

impl GestationStats {
    /// `today` is passed in so the numbers are reproducible.
    pub fn compute(last_period: NaiveDate, today: NaiveDate) -> Self {
        let due_date = due_date(last_period);
        let days_to_go = days_to_go(last_period, today);
        GestationStats {
            weeks_pregnant: weeks_pregnant(last_period, today),
            due_date,
            days_to_go,
            weeks_left: days_to_go.div_ceil(7),
        }
    }
}

pub fn due_date(last_period: NaiveDate) -> NaiveDate {
    last_period + Duration::days(FULL_TERM_DAYS)
}

/// Completed weeks since the last period. A future date counts by its distance.
pub fn weeks_pregnant(last_period: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - last_period).num_days().unsigned_abs();
    u32::try_from(days / 7).unwrap_or(u32::MAX)
}

/// Days until the due date, never negative.
pub fn days_to_go(last_period: NaiveDate, today: NaiveDate) -> u32 {
    let days = (due_date(last_period) - today).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date_is_280_days_after_lmp() {
        assert_eq!(due_date(date(2025, 1, 1)), date(2025, 10, 8));
    }

    #[test]
    fn test_stats_mid_pregnancy() {
        let stats = GestationStats::compute(date(2025, 1, 1), date(2025, 4, 1));
        // 90 days elapsed
        assert_eq!(stats.weeks_pregnant, 12);
        assert_eq!(stats.days_to_go, 190);
        assert_eq!(stats.weeks_left, 28);
    }

    #[test]
    fn test_partial_week_left_rounds_up() {
        let stats = GestationStats::compute(date(2025, 1, 1), date(2025, 10, 6));
        assert_eq!(stats.days_to_go, 2);
        assert_eq!(stats.weeks_left, 1);
    }

    #[test]
    fn test_past_due_clamps_to_zero() {
        let stats = GestationStats::compute(date(2025, 1, 1), date(2025, 11, 1));
        assert_eq!(stats.days_to_go, 0);
        assert_eq!(stats.weeks_left, 0);
    }

    #[test]
    fn test_same_day_is_week_zero() {
        assert_eq!(weeks_pregnant(date(2025, 5, 5), date(2025, 5, 5)), 0);
        assert_eq!(weeks_pregnant(date(2025, 5, 5), date(2025, 5, 11)), 0);
        assert_eq!(weeks_pregnant(date(2025, 5, 5), date(2025, 5, 12)), 1);
    }
}
