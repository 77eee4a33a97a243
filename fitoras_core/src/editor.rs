//! Pure structural edits on a split document.
//!
//! Every function takes the current split and returns the next one; the
//! input is never modified. Only the targeted day (and within it the
//! targeted exercise list or day group) changes. Unresolvable targets
//! return an unchanged copy.
//!
//! An exercise list is addressed by `(day, group_id)`: `None` is the day's
//! root list, `Some(id)` a day group's list. The same exercise may live in
//! several lists of one day, but only once per list.

use crate::types::{
    DayGroup, Exercise, LabelPatch, Split, SplitExercise, VolumeField, Weekday, WorkoutDay,
};
use crate::{new_id, Error, Result};

/// Sets assigned to a freshly added exercise
pub const DEFAULT_SETS: u32 = 3;
/// Reps assigned to a freshly added exercise
pub const DEFAULT_REPS: u32 = 10;

/// Seven empty weekdays, Monday first
pub fn empty_week() -> Vec<WorkoutDay> {
    Weekday::ALL.iter().copied().map(WorkoutDay::empty).collect()
}

/// Copy a catalog exercise into a split entry with default volume
pub fn snapshot(exercise: &Exercise) -> SplitExercise {
    SplitExercise {
        exercise: exercise.clone(),
        sets: Some(DEFAULT_SETS),
        reps: Some(DEFAULT_REPS),
    }
}

/// How a group id that does not resolve is treated
#[derive(Clone, Copy, PartialEq, Eq)]
enum MissingGroup {
    UseRoot,
    Skip,
}

/// Apply `f` to one exercise list of one day on a copy of `split`.
///
/// `f` reports whether it changed anything; if not, the copy is dropped and
/// an unchanged clone is returned.
fn edit_list<F>(
    split: &Split,
    day: Weekday,
    group_id: Option<&str>,
    missing: MissingGroup,
    f: F,
) -> Result<Split>
where
    F: FnOnce(&mut Vec<SplitExercise>) -> Result<bool>,
{
    let mut next = split.clone();
    let Some(workout_day) = next.days.iter_mut().find(|d| d.day == day) else {
        tracing::debug!("Split {} has no {}; edit ignored", split.id, day);
        return Ok(split.clone());
    };

    let group_index = group_id.and_then(|id| workout_day.groups.iter().position(|g| g.id == id));
    let list = match (group_index, group_id) {
        (Some(index), _) => &mut workout_day.groups[index].exercises,
        (None, None) => &mut workout_day.exercises,
        (None, Some(_)) if missing == MissingGroup::UseRoot => &mut workout_day.exercises,
        (None, Some(id)) => {
            tracing::debug!("No group {} on {} of split {}; edit ignored", id, day, split.id);
            return Ok(split.clone());
        }
    };

    if f(list)? {
        Ok(next)
    } else {
        Ok(split.clone())
    }
}

/// Apply `f` to one day group on a copy of `split`
fn edit_group<F>(split: &Split, day: Weekday, group_id: &str, f: F) -> Result<Split>
where
    F: FnOnce(&mut DayGroup) -> Result<()>,
{
    let mut next = split.clone();
    let group = next
        .days
        .iter_mut()
        .find(|d| d.day == day)
        .and_then(|d| d.groups.iter_mut().find(|g| g.id == group_id));

    match group {
        Some(group) => {
            f(group)?;
            Ok(next)
        }
        None => {
            tracing::debug!("No group {} on {} of split {}; edit ignored", group_id, day, split.id);
            Ok(split.clone())
        }
    }
}

/// Add a snapshot of `exercise` to a day's root list or one of its groups.
///
/// A group id that does not resolve falls back to the root list. Adding an
/// exercise already present in the target list yields
/// [`Error::DuplicateExercise`].
pub fn add_exercise(
    split: &Split,
    day: Weekday,
    group_id: Option<&str>,
    exercise: &Exercise,
) -> Result<Split> {
    edit_list(split, day, group_id, MissingGroup::UseRoot, |list| {
        if list.iter().any(|e| e.id() == exercise.id) {
            return Err(Error::DuplicateExercise {
                exercise_id: exercise.id.clone(),
                day,
            });
        }
        list.push(snapshot(exercise));
        tracing::debug!("Added {} to {} of split {}", exercise.id, day, split.id);
        Ok(true)
    })
}

/// Remove an exercise from one list
pub fn remove_exercise(
    split: &Split,
    day: Weekday,
    group_id: Option<&str>,
    exercise_id: &str,
) -> Result<Split> {
    edit_list(split, day, group_id, MissingGroup::Skip, |list| {
        let before = list.len();
        list.retain(|e| e.id() != exercise_id);
        Ok(list.len() != before)
    })
}

/// Set the sets or reps of one planned exercise
pub fn change_sets_reps(
    split: &Split,
    day: Weekday,
    group_id: Option<&str>,
    exercise_id: &str,
    field: VolumeField,
    value: u32,
) -> Result<Split> {
    edit_list(split, day, group_id, MissingGroup::Skip, |list| {
        let Some(entry) = list.iter_mut().find(|e| e.id() == exercise_id) else {
            return Ok(false);
        };
        match field {
            VolumeField::Sets => entry.sets = Some(value),
            VolumeField::Reps => entry.reps = Some(value),
        }
        Ok(true)
    })
}

/// Move an exercise within one list from position `from` to position `to`
pub fn reorder_exercises(
    split: &Split,
    day: Weekday,
    group_id: Option<&str>,
    from: usize,
    to: usize,
) -> Result<Split> {
    edit_list(split, day, group_id, MissingGroup::Skip, |list| {
        if from >= list.len() || to >= list.len() || from == to {
            return Ok(false);
        }
        let entry = list.remove(from);
        list.insert(to, entry);
        Ok(true)
    })
}

/// Append a new, empty day group to one day
pub fn add_day_group(split: &Split, day: Weekday, name: &str, color: &str) -> Result<Split> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("group name must not be empty"));
    }

    let mut next = split.clone();
    let Some(workout_day) = next.days.iter_mut().find(|d| d.day == day) else {
        return Ok(split.clone());
    };
    workout_day.groups.push(DayGroup {
        id: new_id(),
        name: name.to_string(),
        color: color.to_string(),
        exercises: Vec::new(),
    });
    tracing::debug!("Added group '{}' to {} of split {}", name, day, split.id);
    Ok(next)
}

/// Rename or recolour a day group
pub fn update_day_group(
    split: &Split,
    day: Weekday,
    group_id: &str,
    patch: &LabelPatch,
) -> Result<Split> {
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(Error::validation("group name must not be empty"));
        }
    }

    edit_group(split, day, group_id, |group| {
        if let Some(name) = &patch.name {
            group.name = name.trim().to_string();
        }
        if let Some(color) = &patch.color {
            group.color = color.clone();
        }
        Ok(())
    })
}

/// Delete a day group and every exercise in it, on that day only
pub fn delete_day_group(split: &Split, day: Weekday, group_id: &str) -> Result<Split> {
    let mut next = split.clone();
    let Some(workout_day) = next.days.iter_mut().find(|d| d.day == day) else {
        return Ok(split.clone());
    };
    let before = workout_day.groups.len();
    workout_day.groups.retain(|g| g.id != group_id);
    if workout_day.groups.len() == before {
        return Ok(split.clone());
    }
    tracing::debug!("Deleted group {} from {} of split {}", group_id, day, split.id);
    Ok(next)
}
