//! Dashboard statistics derived from splits and the completion log.
//!
//! A day counts as a workout day when its date-key holds at least one
//! completion.

use crate::calendar::{date_key, week_start};
use crate::types::{CompletionLog, Split};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_splits: usize,
    pub current_streak: u32,
    pub workouts_this_week: u32,
    pub total_workouts: usize,
}

impl DashboardStats {
    pub fn compute(splits: &[Split], log: &CompletionLog, today: NaiveDate) -> Self {
        Self {
            total_splits: splits.len(),
            current_streak: current_streak(log, today),
            workouts_this_week: workouts_this_week(log, today),
            total_workouts: total_workouts(log),
        }
    }
}

/// Consecutive workout days ending today; 0 if today has none
pub fn current_streak(log: &CompletionLog, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while log.is_active(&date_key(day)) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Workout days in the Monday-to-Sunday week containing `today`
pub fn workouts_this_week(log: &CompletionLog, today: NaiveDate) -> u32 {
    let monday = week_start(today);
    (0..7)
        .map(|offset| monday + Duration::days(offset))
        .filter(|day| log.is_active(&date_key(*day)))
        .count() as u32
}

/// Distinct workout days ever logged
pub fn total_workouts(log: &CompletionLog) -> usize {
    log.days.keys().filter(|key| log.is_active(key)).count()
}
