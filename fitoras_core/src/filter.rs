//! Exercise filter engine.
//!
//! Filtering always runs over the full catalog so relaxing a criterion
//! brings exercises back. The free-text term matches against a normalized
//! search corpus; categorical criteria compare exactly.

use crate::types::{Exercise, FilterCriteria};
use serde::Serialize;
use std::collections::BTreeSet;

/// Lowercase, strip hyphens, trim
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('-', "").trim().to_string()
}

/// Matches exactly when the criterion is empty or equal
fn matches_exact(criterion: &str, value: Option<&str>) -> bool {
    criterion.is_empty() || value == Some(criterion)
}

/// Matches when the criterion is empty or contained in the list
fn matches_member(criterion: &str, values: &[String]) -> bool {
    criterion.is_empty() || values.iter().any(|v| v == criterion)
}

fn matches_text(term: &str, exercise: &Exercise) -> bool {
    if term.is_empty() {
        return true;
    }

    let scalar = [
        Some(exercise.name.as_str()),
        exercise.force.as_deref(),
        exercise.level.as_deref(),
        exercise.mechanic.as_deref(),
        exercise.equipment.as_deref(),
        exercise.category.as_deref(),
    ];
    scalar
        .into_iter()
        .flatten()
        .chain(exercise.primary_muscles.iter().map(String::as_str))
        .filter(|field| !field.is_empty())
        .any(|field| normalize(field).contains(term))
}

/// True if `exercise` satisfies every active criterion.
///
/// `term` is the already-normalized name criterion.
fn matches(exercise: &Exercise, criteria: &FilterCriteria, term: &str) -> bool {
    matches_text(term, exercise)
        && matches_exact(&criteria.force, exercise.force.as_deref())
        && matches_exact(&criteria.mechanic, exercise.mechanic.as_deref())
        && matches_exact(&criteria.equipment, exercise.equipment.as_deref())
        && matches_exact(&criteria.category, exercise.category.as_deref())
        && matches_member(&criteria.primary_muscle, &exercise.primary_muscles)
        && matches_member(&criteria.secondary_muscle, &exercise.secondary_muscles)
}

/// Exercises passing every active criterion, in catalog order
pub fn apply_filters<'a>(exercises: &'a [Exercise], criteria: &FilterCriteria) -> Vec<&'a Exercise> {
    let term = normalize(&criteria.name);
    exercises
        .iter()
        .filter(|exercise| matches(exercise, criteria, &term))
        .collect()
}

/// Distinct values available to each filter picker, sorted
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub forces: Vec<String>,
    pub levels: Vec<String>,
    pub mechanics: Vec<String>,
    pub equipment: Vec<String>,
    pub categories: Vec<String>,
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
}

impl FilterOptions {
    pub fn from_exercises(exercises: &[Exercise]) -> Self {
        fn collect<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            values
                .filter(|v| !v.is_empty())
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        Self {
            forces: collect(exercises.iter().filter_map(|e| e.force.as_ref())),
            levels: collect(exercises.iter().filter_map(|e| e.level.as_ref())),
            mechanics: collect(exercises.iter().filter_map(|e| e.mechanic.as_ref())),
            equipment: collect(exercises.iter().filter_map(|e| e.equipment.as_ref())),
            categories: collect(exercises.iter().filter_map(|e| e.category.as_ref())),
            primary_muscles: collect(exercises.iter().flat_map(|e| e.primary_muscles.iter())),
            secondary_muscles: collect(exercises.iter().flat_map(|e| e.secondary_muscles.iter())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Exercise> {
        vec![
            Exercise {
                id: "bench".into(),
                name: "Barbell Bench Press".into(),
                force: Some("push".into()),
                level: Some("beginner".into()),
                mechanic: Some("compound".into()),
                equipment: Some("barbell".into()),
                category: Some("strength".into()),
                primary_muscles: vec!["chest".into()],
                secondary_muscles: vec!["triceps".into(), "shoulders".into()],
                ..Exercise::default()
            },
            Exercise {
                id: "pullup".into(),
                name: "Pull-Up".into(),
                force: Some("pull".into()),
                level: Some("intermediate".into()),
                mechanic: Some("compound".into()),
                equipment: Some("body only".into()),
                category: Some("strength".into()),
                primary_muscles: vec!["lats".into()],
                secondary_muscles: vec!["biceps".into()],
                ..Exercise::default()
            },
            Exercise {
                id: "curl".into(),
                name: "Dumbbell Curl".into(),
                force: Some("pull".into()),
                level: Some("beginner".into()),
                mechanic: Some("isolation".into()),
                equipment: Some("dumbbell".into()),
                category: Some("strength".into()),
                primary_muscles: vec!["biceps".into()],
                ..Exercise::default()
            },
            Exercise {
                id: "stretch".into(),
                name: "Chest Stretch".into(),
                category: Some("stretching".into()),
                primary_muscles: vec!["chest".into()],
                ..Exercise::default()
            },
        ]
    }

    fn ids(result: &[&Exercise]) -> Vec<String> {
        result.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_returns_all() {
        let exercises = catalog();
        assert_eq!(apply_filters(&exercises, &FilterCriteria::default()).len(), 4);
    }

    #[test]
    fn test_name_ignores_case_and_hyphens() {
        let exercises = catalog();
        let criteria = FilterCriteria {
            name: "  PULLUP ".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["pullup"]);

        let criteria = FilterCriteria {
            name: "pull-up".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["pullup"]);
    }

    #[test]
    fn test_name_searches_corpus_fields() {
        let exercises = catalog();
        // Matches primary muscle of bench and stretch
        let criteria = FilterCriteria {
            name: "chest".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["bench", "stretch"]);

        // Level is part of the corpus, secondary muscles are not
        let criteria = FilterCriteria {
            name: "intermediate".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["pullup"]);
        let criteria = FilterCriteria {
            name: "triceps".into(),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(&exercises, &criteria).is_empty());
    }

    #[test]
    fn test_categorical_filters_are_exact() {
        let exercises = catalog();
        let criteria = FilterCriteria {
            force: "pull".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["pullup", "curl"]);

        let criteria = FilterCriteria {
            force: "Pull".into(),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(&exercises, &criteria).is_empty());
    }

    #[test]
    fn test_muscle_filters_use_membership() {
        let exercises = catalog();
        let criteria = FilterCriteria {
            secondary_muscle: "biceps".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["pullup"]);

        let criteria = FilterCriteria {
            primary_muscle: "biceps".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&exercises, &criteria)), vec!["curl"]);
    }

    #[test]
    fn test_adding_criteria_never_grows_result() {
        let exercises = catalog();
        let steps = [
            FilterCriteria::default(),
            FilterCriteria {
                category: "strength".into(),
                ..FilterCriteria::default()
            },
            FilterCriteria {
                category: "strength".into(),
                mechanic: "compound".into(),
                ..FilterCriteria::default()
            },
            FilterCriteria {
                category: "strength".into(),
                mechanic: "compound".into(),
                equipment: "barbell".into(),
                ..FilterCriteria::default()
            },
            FilterCriteria {
                category: "strength".into(),
                mechanic: "compound".into(),
                equipment: "barbell".into(),
                name: "bench".into(),
                ..FilterCriteria::default()
            },
        ];

        let sizes: Vec<usize> = steps
            .iter()
            .map(|criteria| apply_filters(&exercises, criteria).len())
            .collect();
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]), "sizes: {:?}", sizes);
        assert_eq!(sizes, vec![4, 3, 2, 1, 1]);
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_exercises(&catalog());
        assert_eq!(options.forces, vec!["pull", "push"]);
        assert_eq!(options.categories, vec!["strength", "stretching"]);
        assert_eq!(options.primary_muscles, vec!["biceps", "chest", "lats"]);
        assert_eq!(options.secondary_muscles, vec!["biceps", "shoulders", "triceps"]);
    }
}
