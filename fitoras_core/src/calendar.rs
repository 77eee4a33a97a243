//! Calendar aggregation and the completion log.
//!
//! Maps calendar dates onto the weekdays of the active split and measures
//! how much of each day's plan has been marked done. All date-keys are
//! `YYYY-MM-DD` strings in UTC.

use crate::storage::{load_json, save_json, KeyValueStore, Partition};
use crate::types::{CompletionLog, CompletionRecord, Split, SplitExercise, Weekday};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

const COMPLETIONS_KEY: &str = "completions";

// ============================================================================
// Dates
// ============================================================================

/// Weekday of a date, Monday-first.
///
/// Counted from Sunday = 0 and shifted so Sunday lands last.
pub fn weekday_of(date: NaiveDate) -> Weekday {
    let from_sunday = date.weekday().num_days_from_sunday() as usize;
    let index = if from_sunday == 0 { 6 } else { from_sunday - 1 };
    Weekday::from_index(index)
}

/// Canonical date-key for a calendar day
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date-key of the UTC day containing `instant`
pub fn date_key_at(instant: DateTime<Utc>) -> String {
    date_key(instant.date_naive())
}

/// Parse a date-key back into a date
pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("invalid date '{}', expected YYYY-MM-DD", key)))
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(weekday_of(date).index() as i64)
}

/// Cells for a month view of the month containing `reference`.
///
/// Leading `None` cells pad the first row up to the 1st (Monday-first);
/// then one cell per day. No trailing padding.
pub fn month_grid(reference: NaiveDate) -> Vec<Option<NaiveDate>> {
    let Some(first) = reference.with_day(1) else {
        return Vec::new();
    };
    let offset = weekday_of(first).index();

    let mut cells: Vec<Option<NaiveDate>> = vec![None; offset];
    cells.extend(
        first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .map(Some),
    );
    cells
}

// ============================================================================
// Scheduled exercises
// ============================================================================

/// Every exercise planned for the weekday of `date`, groups flattened
pub fn exercises_for_date(split: &Split, date: NaiveDate) -> Vec<&SplitExercise> {
    split
        .day(weekday_of(date))
        .map(|day| day.all_exercises().collect())
        .unwrap_or_default()
}

/// Share of the scheduled exercises completed on `date`, 0 to 100
pub fn completion_percentage(split: &Split, log: &CompletionLog, date: NaiveDate) -> f64 {
    let scheduled = exercises_for_date(split, date);
    if scheduled.is_empty() {
        return 0.0;
    }
    let key = date_key(date);
    let done = scheduled
        .iter()
        .filter(|e| log.is_completed(&key, e.id()))
        .count();
    done as f64 / scheduled.len() as f64 * 100.0
}

/// True if something was scheduled and all of it was done
pub fn is_fully_completed(split: &Split, log: &CompletionLog, date: NaiveDate) -> bool {
    let scheduled = exercises_for_date(split, date);
    let key = date_key(date);
    !scheduled.is_empty() && scheduled.iter().all(|e| log.is_completed(&key, e.id()))
}

pub fn is_exercise_completed(log: &CompletionLog, key: &str, exercise_id: &str) -> bool {
    log.is_completed(key, exercise_id)
}

/// Per-date view of the plan and its progress
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub weekday: Weekday,
    pub exercises: Vec<ScheduledExercise>,
    pub percentage: f64,
    pub fully_completed: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExercise {
    pub id: String,
    pub name: String,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub completed: bool,
}

impl DaySummary {
    /// Summary for `date`; an absent split schedules nothing
    pub fn for_date(split: Option<&Split>, log: &CompletionLog, date: NaiveDate) -> Self {
        let key = date_key(date);
        let exercises: Vec<ScheduledExercise> = split
            .map(|s| exercises_for_date(s, date))
            .unwrap_or_default()
            .into_iter()
            .map(|e| ScheduledExercise {
                id: e.id().to_string(),
                name: e.exercise.name.clone(),
                sets: e.sets,
                reps: e.reps,
                completed: log.is_completed(&key, e.id()),
            })
            .collect();

        let (percentage, fully_completed) = match split {
            Some(s) => (
                completion_percentage(s, log, date),
                is_fully_completed(s, log, date),
            ),
            None => (0.0, false),
        };

        Self {
            date: key,
            weekday: weekday_of(date),
            exercises,
            percentage,
            fully_completed,
        }
    }
}

// ============================================================================
// Completion log
// ============================================================================

impl CompletionLog {
    pub fn is_completed(&self, key: &str, exercise_id: &str) -> bool {
        self.days
            .get(key)
            .is_some_and(|records| records.iter().any(|r| r.exercise_id == exercise_id))
    }

    /// Flip the completion of one exercise on one date.
    ///
    /// Returns the new state. A date whose last record is removed loses its
    /// bucket entirely.
    pub fn toggle(&mut self, key: &str, exercise_id: &str, at: DateTime<Utc>) -> bool {
        let records = self.days.entry(key.to_string()).or_default();
        if let Some(pos) = records.iter().position(|r| r.exercise_id == exercise_id) {
            records.remove(pos);
            if records.is_empty() {
                self.days.remove(key);
            }
            false
        } else {
            records.push(CompletionRecord {
                exercise_id: exercise_id.to_string(),
                completed_at: at,
            });
            true
        }
    }

    /// True if the date has at least one completion
    pub fn is_active(&self, key: &str) -> bool {
        self.days.get(key).is_some_and(|records| !records.is_empty())
    }
}

/// Persistent owner of the completion log
pub struct CompletionStore {
    store: Arc<dyn KeyValueStore>,
    log: CompletionLog,
    loaded: bool,
}

impl CompletionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            log: CompletionLog::default(),
            loaded: false,
        }
    }

    /// Hydrate from storage once; later calls do nothing
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        self.log = match load_json::<CompletionLog>(self.store.as_ref(), Partition::Calendar, COMPLETIONS_KEY) {
            Ok(log) => log.unwrap_or_default(),
            Err(Error::Json(e)) => {
                tracing::warn!("Stored completion log is unreadable: {}. Starting empty.", e);
                CompletionLog::default()
            }
            Err(e) => return Err(e),
        };
        self.loaded = true;
        tracing::info!("Loaded completions for {} days", self.log.days.len());
        Ok(())
    }

    pub fn log(&self) -> &CompletionLog {
        &self.log
    }

    /// Toggle with the current time; returns the new state
    pub fn toggle_exercise(&mut self, key: &str, exercise_id: &str) -> bool {
        let completed = self.log.toggle(key, exercise_id, Utc::now());
        tracing::debug!("Exercise {} on {} completed: {}", exercise_id, key, completed);
        if let Err(e) = save_json(self.store.as_ref(), Partition::Calendar, COMPLETIONS_KEY, &self.log) {
            tracing::warn!("Failed to persist completion log: {}", e);
        }
        completed
    }
}
