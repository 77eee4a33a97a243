//! Core domain types for the Fitoras split planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Catalog exercises (immutable reference data)
//! - Split tags (registry-level, attached to a whole split)
//! - Day groups (day-scoped groupings of exercises inside a split)
//! - Splits, their weekdays and the exercise snapshots they hold
//! - The completion log and exercise filter criteria

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ============================================================================
// Weekdays
// ============================================================================

/// Day of the week, Monday-first
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in split order
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Monday-first index (Monday = 0, Sunday = 6)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weekday for a Monday-first index, wrapping past Sunday
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    /// Accepts full names and three-letter abbreviations, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|day| {
                let name = day.as_str().to_lowercase();
                name == lower || (lower.len() == 3 && name.starts_with(&lower))
            })
            .ok_or_else(|| Error::validation(format!("unknown weekday '{}'", s)))
    }
}

// ============================================================================
// Catalog Exercise
// ============================================================================

/// Exercise instructions: either free text or ordered steps
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Instructions {
    Text(String),
    Steps(Vec<String>),
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::Steps(Vec::new())
    }
}

/// A catalog exercise definition
///
/// Catalog entries are reference data: fetched once, cached, never edited.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_muscles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_muscles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Instructions,
}

/// Catalog records sometimes carry `null` where a list is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Split Tags (registry-level)
// ============================================================================

/// A reusable named, coloured tag that can be attached to a whole split
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitTag {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Fields for creating a split tag
#[derive(Clone, Debug, Default)]
pub struct SplitTagDraft {
    pub name: String,
    pub color: String,
}

/// Partial update for a split tag or a day group
#[derive(Clone, Debug, Default)]
pub struct LabelPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

// ============================================================================
// Split Documents
// ============================================================================

/// Snapshot of a catalog exercise taken when it was added to a split
///
/// Later catalog changes never reach an existing snapshot.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitExercise {
    #[serde(flatten)]
    pub exercise: Exercise,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
}

impl SplitExercise {
    pub fn id(&self) -> &str {
        &self.exercise.id
    }
}

/// Which volume field a sets/reps edit targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeField {
    Sets,
    Reps,
}

impl FromStr for VolumeField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sets" => Ok(VolumeField::Sets),
            "reps" => Ok(VolumeField::Reps),
            other => Err(Error::validation(format!(
                "expected 'sets' or 'reps', got '{}'",
                other
            ))),
        }
    }
}

/// A named, coloured grouping of exercises within a single day of a split
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayGroup {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub exercises: Vec<SplitExercise>,
}

/// One weekday of a split
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutDay {
    pub day: Weekday,
    #[serde(default)]
    pub exercises: Vec<SplitExercise>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "categories")]
    pub groups: Vec<DayGroup>,
}

impl WorkoutDay {
    pub fn empty(day: Weekday) -> Self {
        Self {
            day,
            exercises: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn group(&self, group_id: &str) -> Option<&DayGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Root exercises followed by every group's exercises
    pub fn all_exercises(&self) -> impl Iterator<Item = &SplitExercise> {
        self.exercises
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.exercises.iter()))
    }
}

/// A weekly workout plan
///
/// `days` always holds exactly seven entries, one per weekday, Monday first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Split {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub days: Vec<WorkoutDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SplitTag>,
}

impl Split {
    pub fn day(&self, day: Weekday) -> Option<&WorkoutDay> {
        self.days.iter().find(|d| d.day == day)
    }

    /// Total number of planned exercises across the week
    pub fn exercise_count(&self) -> usize {
        self.days.iter().map(|d| d.all_exercises().count()).sum()
    }
}

/// Fields for creating a split
#[derive(Clone, Debug, Default)]
pub struct SplitDraft {
    pub name: String,
    pub description: Option<String>,
}

impl SplitDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Shallow partial update for a split
///
/// `category: Some(None)` clears the tag; `None` leaves it as is.
#[derive(Clone, Debug, Default)]
pub struct SplitPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub days: Option<Vec<WorkoutDay>>,
    pub category: Option<Option<SplitTag>>,
}

impl SplitPatch {
    pub fn days(days: Vec<WorkoutDay>) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }
}

// ============================================================================
// Completion Log
// ============================================================================

/// One exercise marked done on one date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub exercise_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Date-keyed record of completed exercise ids
///
/// Keys are `YYYY-MM-DD` date-keys (see `calendar::date_key`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct CompletionLog {
    pub days: BTreeMap<String, Vec<CompletionRecord>>,
}

// ============================================================================
// Filter Criteria
// ============================================================================

/// Exercise filter criteria; an empty string places no constraint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub name: String,
    pub force: String,
    pub mechanic: String,
    pub equipment: String,
    pub category: String,
    pub primary_muscle: String,
    pub secondary_muscle: String,
}
