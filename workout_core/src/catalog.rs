//! Default catalog of exercises and routine templates.
//!
//! This module provides the built-in exercises and routines, plus the
//! similarity ranking used to suggest substitutions.

use crate::collaborators::ExerciseCatalog;
use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn exercise(
    id: &str,
    name: &str,
    primary: &[&str],
    secondary: &[&str],
    equipment: &[&str],
    difficulty: Difficulty,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        muscle_groups: MuscleGroups {
            primary: primary.iter().map(|s| s.to_string()).collect(),
            secondary: secondary.iter().map(|s| s.to_string()).collect(),
        },
        equipment: equipment.iter().map(|s| s.to_string()).collect(),
        difficulty,
    }
}

fn sets(count: usize, reps: u32, weight: Option<f64>) -> Vec<PrescribedSet> {
    (0..count)
        .map(|_| PrescribedSet {
            set_type: SetType::Normal,
            reps: Some(reps),
            weight,
            duration: None,
            distance: None,
        })
        .collect()
}

fn warmup_then(count: usize, reps: u32, weight: f64) -> Vec<PrescribedSet> {
    let mut all = vec![PrescribedSet {
        set_type: SetType::Warmup,
        reps: Some(10),
        weight: Some((weight / 2.0).max(0.0)),
        duration: None,
        distance: None,
    }];
    all.extend(sets(count, reps, Some(weight)));
    all
}

fn prescribe(exercise_id: &str, sets: Vec<PrescribedSet>, rest_time: Option<u32>) -> PrescribedExercise {
    PrescribedExercise {
        exercise_id: exercise_id.into(),
        sets,
        rest_time,
        notes: None,
    }
}

/// Builds the default catalog with built-in exercises and routines
pub fn build_default_catalog() -> Catalog {
    use Difficulty::*;

    let exercises = vec![
        // Push
        exercise("bench_press", "Barbell Bench Press", &["chest"], &["triceps", "shoulders"], &["barbell", "bench"], Intermediate),
        exercise("dumbbell_bench_press", "Dumbbell Bench Press", &["chest"], &["triceps", "shoulders"], &["dumbbell", "bench"], Beginner),
        exercise("incline_dumbbell_press", "Incline Dumbbell Press", &["chest", "shoulders"], &["triceps"], &["dumbbell", "bench"], Intermediate),
        exercise("push_up", "Push-up", &["chest"], &["triceps", "shoulders", "core"], &[], Beginner),
        exercise("overhead_press", "Overhead Press", &["shoulders"], &["triceps", "core"], &["barbell"], Intermediate),
        exercise("triceps_pushdown", "Triceps Pushdown", &["triceps"], &[], &["cable"], Beginner),
        // Pull
        exercise("deadlift", "Deadlift", &["hamstrings", "glutes", "back"], &["forearms", "core"], &["barbell"], Advanced),
        exercise("barbell_row", "Barbell Row", &["back"], &["biceps", "forearms"], &["barbell"], Intermediate),
        exercise("pull_up", "Pull-up", &["back"], &["biceps", "forearms"], &["pullup_bar"], Intermediate),
        exercise("lat_pulldown", "Lat Pulldown", &["back"], &["biceps"], &["cable"], Beginner),
        exercise("biceps_curl", "Dumbbell Biceps Curl", &["biceps"], &["forearms"], &["dumbbell"], Beginner),
        // Legs
        exercise("squat", "Barbell Back Squat", &["quads", "glutes"], &["hamstrings", "core"], &["barbell", "rack"], Intermediate),
        exercise("front_squat", "Front Squat", &["quads"], &["glutes", "core"], &["barbell", "rack"], Advanced),
        exercise("leg_press", "Leg Press", &["quads", "glutes"], &["hamstrings"], &["machine"], Beginner),
        exercise("romanian_deadlift", "Romanian Deadlift", &["hamstrings", "glutes"], &["back"], &["barbell"], Intermediate),
        // Core / conditioning
        exercise("plank", "Plank", &["core"], &["shoulders"], &[], Beginner),
        exercise("rowing_machine", "Rowing Machine", &["back", "quads"], &["biceps", "core"], &["rower"], Beginner),
    ];

    let routines = vec![
        Routine {
            id: "push_day".into(),
            name: "Push Day".into(),
            blocks: vec![RoutineBlock {
                name: "Main".into(),
                exercises: vec![
                    prescribe("bench_press", warmup_then(3, 8, 60.0), Some(120)),
                    prescribe("overhead_press", sets(3, 8, Some(40.0)), Some(90)),
                    prescribe("incline_dumbbell_press", sets(3, 10, Some(20.0)), Some(90)),
                    prescribe("triceps_pushdown", sets(3, 12, Some(25.0)), Some(60)),
                ],
            }],
        },
        Routine {
            id: "pull_day".into(),
            name: "Pull Day".into(),
            blocks: vec![RoutineBlock {
                name: "Main".into(),
                exercises: vec![
                    prescribe("deadlift", warmup_then(3, 5, 100.0), Some(180)),
                    prescribe("barbell_row", sets(3, 8, Some(50.0)), Some(90)),
                    prescribe("lat_pulldown", sets(3, 10, Some(45.0)), Some(75)),
                    prescribe("biceps_curl", sets(3, 12, Some(10.0)), Some(60)),
                ],
            }],
        },
        Routine {
            id: "leg_day".into(),
            name: "Leg Day".into(),
            blocks: vec![
                RoutineBlock {
                    name: "Strength".into(),
                    exercises: vec![
                        prescribe("squat", warmup_then(3, 5, 80.0), Some(180)),
                        prescribe("romanian_deadlift", sets(3, 8, Some(60.0)), Some(120)),
                        prescribe("leg_press", sets(3, 12, Some(120.0)), Some(90)),
                    ],
                },
                RoutineBlock {
                    name: "Finisher".into(),
                    exercises: vec![prescribe(
                        "plank",
                        vec![PrescribedSet { duration: Some(60), ..Default::default() }; 3],
                        Some(45),
                    )],
                },
            ],
        },
        Routine {
            id: "quick_full_body".into(),
            name: "Quick Full Body".into(),
            blocks: vec![RoutineBlock {
                name: "Circuit".into(),
                exercises: vec![
                    prescribe("push_up", sets(2, 15, None), None),
                    prescribe("pull_up", sets(2, 6, None), None),
                    prescribe(
                        "rowing_machine",
                        vec![PrescribedSet { distance: Some(500.0), ..Default::default() }],
                        Some(60),
                    ),
                ],
            }],
        },
    ];

    Catalog {
        exercises: exercises.into_iter().map(|e| (e.id.clone(), e)).collect(),
        routines: routines.into_iter().map(|r| (r.id.clone(), r)).collect(),
    }
}

/// How alike two exercises are for substitution purposes
///
/// Shared primary muscles weigh 3, shared secondary muscles and shared
/// equipment weigh 1 each.
pub fn similarity(a: &Exercise, b: &Exercise) -> u32 {
    let shared = |x: &[String], y: &[String]| x.iter().filter(|m| y.contains(m)).count() as u32;

    3 * shared(&a.muscle_groups.primary, &b.muscle_groups.primary)
        + shared(&a.muscle_groups.secondary, &b.muscle_groups.secondary)
        + shared(&a.equipment, &b.equipment)
}

impl ExerciseCatalog for Catalog {
    fn get_exercise_by_id(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    fn find_similar_exercises(&self, id: &str, limit: usize) -> Vec<&Exercise> {
        let Some(target) = self.exercises.get(id) else {
            return Vec::new();
        };

        let mut ranked: Vec<(u32, &Exercise)> = self
            .exercises
            .values()
            .filter(|e| e.id != target.id)
            .map(|e| (similarity(target, e), e))
            .filter(|(score, _)| *score > 0)
            .collect();

        ranked.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)));
        ranked.into_iter().take(limit).map(|(_, e)| e).collect()
    }
}

impl Catalog {
    /// Routines sorted by id for stable listing
    pub fn routines_sorted(&self) -> Vec<&Routine> {
        let mut routines: Vec<_> = self.routines.values().collect();
        routines.sort_by(|a, b| a.id.cmp(&b.id));
        routines
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let names: HashMap<&str, usize> = self
            .exercises
            .values()
            .fold(HashMap::new(), |mut acc, e| {
                *acc.entry(e.name.as_str()).or_insert(0) += 1;
                acc
            });
        for (name, count) in names {
            if count > 1 {
                errors.push(format!("Exercise name '{}' used {} times", name, count));
            }
        }

        for (key, exercise) in &self.exercises {
            if key != &exercise.id {
                errors.push(format!("Exercise key '{}' does not match id '{}'", key, exercise.id));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise '{}' has an empty name", exercise.id));
            }
            if exercise.muscle_groups.primary.is_empty() {
                errors.push(format!("Exercise '{}' has no primary muscle group", exercise.id));
            }
        }

        for (id, routine) in &self.routines {
            if routine.blocks.is_empty() {
                errors.push(format!("Routine '{}' has no blocks", id));
            }
            for block in &routine.blocks {
                for prescribed in &block.exercises {
                    if !self.exercises.contains_key(&prescribed.exercise_id) {
                        errors.push(format!(
                            "Routine '{}' references unknown exercise '{}'",
                            id, prescribed.exercise_id
                        ));
                    }
                    if prescribed.sets.is_empty() {
                        errors.push(format!(
                            "Routine '{}': exercise '{}' has no sets",
                            id, prescribed.exercise_id
                        ));
                    }
                    for set in &prescribed.sets {
                        if set.weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
                            errors.push(format!(
                                "Routine '{}': exercise '{}' has an invalid weight",
                                id, prescribed.exercise_id
                            ));
                        }
                    }
                }
            }
        }

        errors
    }
}
