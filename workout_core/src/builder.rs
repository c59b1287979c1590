//! Session construction from routine templates.
//!
//! Target weights are carried over from the most recent finished workout
//! that included the exercise, so a new session starts where the last one
//! left off.

use crate::collaborators::ExerciseCatalog;
use crate::{Exercise, PersistedLog, Routine, Session, SessionExercise, SessionSet, SetType};
use chrono::{DateTime, Utc};

/// Name given to sessions started without a routine
pub const FREEFORM_NAME: &str = "Freeform Workout";

/// Build a live session from the first block of `routine`
///
/// Each prescribed set gets the carried-over weight for its exercise when
/// one exists, falling back to the template weight.
pub fn build_from_routine(
    routine: &Routine,
    catalog: &impl ExerciseCatalog,
    logs: &[PersistedLog],
    now: DateTime<Utc>,
) -> Session {
    let mut session = Session::new(routine.name.clone(), Some(routine.id.clone()), now);

    let Some(block) = routine.blocks.first() else {
        tracing::info!("Routine '{}' has no blocks, starting empty session", routine.id);
        return session;
    };

    for (order_index, prescription) in block.exercises.iter().enumerate() {
        let carried = last_weight_for(&prescription.exercise_id, logs);
        let name = catalog
            .get_exercise_by_id(&prescription.exercise_id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Exercise '{}' not in catalog, using id as name",
                    prescription.exercise_id
                );
                prescription.exercise_id.clone()
            });

        let sets = prescription
            .sets
            .iter()
            .enumerate()
            .map(|(i, prescribed)| {
                SessionSet::from_prescription(
                    i as u32 + 1,
                    prescribed,
                    carried.or(prescribed.weight),
                )
            })
            .collect();

        session.exercises.push(SessionExercise {
            exercise_id: prescription.exercise_id.clone(),
            name,
            order_index,
            sets,
            rest_time: prescription.rest_time,
            notes: prescription.notes.clone(),
        });
    }

    tracing::info!(
        "Built session '{}' with {} exercises",
        session.name,
        session.exercises.len()
    );
    session
}

/// An empty session; exercises are added as the user goes
pub fn build_freeform(now: DateTime<Utc>) -> Session {
    Session::new(FREEFORM_NAME, None, now)
}

/// Weight used on the most recent log containing a completed set of `exercise_id`
///
/// Logs are compared by start time. When two logs share a start time the
/// one later in `logs` wins. A recorded weight of zero is carried as-is.
pub fn last_weight_for(exercise_id: &str, logs: &[PersistedLog]) -> Option<f64> {
    let mut best: Option<(DateTime<Utc>, f64)> = None;

    for log in logs {
        // Logs only hold completed sets; an exercise with none is skipped
        let weight = log
            .exercises
            .iter()
            .filter(|e| e.exercise_id == exercise_id)
            .flat_map(|e| e.sets.iter())
            .last()
            .map(|s| s.weight);

        if let Some(weight) = weight {
            match best {
                Some((at, _)) if log.start_time < at => {}
                _ => best = Some((log.start_time, weight)),
            }
        }
    }

    best.map(|(_, weight)| weight)
}

/// Fill missing target weights from history on a session already underway
///
/// Sets with a non-zero target weight are left alone. Returns how many sets
/// were filled.
pub fn refresh_weights(session: &mut Session, logs: &[PersistedLog]) -> usize {
    let mut filled = 0;

    for exercise in &mut session.exercises {
        let Some(weight) = last_weight_for(&exercise.exercise_id, logs) else {
            continue;
        };
        for set in &mut exercise.sets {
            let missing = match set.target_weight {
                None => true,
                Some(current) => current == 0.0 && weight != 0.0,
            };
            if missing {
                set.target_weight = Some(weight);
                filled += 1;
            }
        }
    }

    if filled > 0 {
        tracing::debug!("Refreshed {} target weights from history", filled);
    }
    filled
}

/// Append an exercise with one empty set, returning its index
pub fn add_exercise(session: &mut Session, exercise: &Exercise, rest_time: Option<u32>) -> usize {
    let order_index = session.exercises.len();
    session.exercises.push(SessionExercise {
        exercise_id: exercise.id.clone(),
        name: exercise.name.clone(),
        order_index,
        sets: vec![SessionSet::new(1, SetType::Normal)],
        rest_time,
        notes: None,
    });
    tracing::debug!("Added exercise '{}' at position {}", exercise.id, order_index);
    order_index
}

/// Swap the exercise at `ex_idx` for `replacement`, keeping its sets
pub fn substitute_exercise(session: &mut Session, ex_idx: usize, replacement: &Exercise) -> bool {
    let Some(slot) = session.exercises.get_mut(ex_idx) else {
        return false;
    };
    tracing::info!("Substituting '{}' with '{}'", slot.exercise_id, replacement.id);
    slot.exercise_id = replacement.id.clone();
    slot.name = replacement.name.clone();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build_default_catalog, LoggedExercise, LoggedSet, PrescribedExercise, PrescribedSet,
        RoutineBlock,
    };
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap()
    }

    fn log_with(exercise_id: &str, weight: f64, start: DateTime<Utc>) -> PersistedLog {
        PersistedLog {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            routine_id: None,
            name: "past".into(),
            date: start.date_naive(),
            start_time: start,
            end_time: start + Duration::minutes(45),
            exercises: vec![LoggedExercise {
                exercise_id: exercise_id.into(),
                name: exercise_id.into(),
                sets: vec![LoggedSet {
                    set_number: 1,
                    set_type: SetType::Normal,
                    reps: 5,
                    weight,
                    duration: 0,
                    distance: 0.0,
                    rpe: None,
                }],
            }],
            duration_seconds: 2700,
            total_volume: weight * 5.0,
            completed: true,
        }
    }

    fn routine(blocks: Vec<RoutineBlock>) -> Routine {
        Routine {
            id: "r1".into(),
            name: "Push".into(),
            blocks,
        }
    }

    fn prescription(exercise_id: &str, weight: Option<f64>) -> PrescribedExercise {
        PrescribedExercise {
            exercise_id: exercise_id.into(),
            sets: vec![
                PrescribedSet { reps: Some(8), weight, ..Default::default() },
                PrescribedSet { reps: Some(8), weight, ..Default::default() },
            ],
            rest_time: Some(90),
            notes: None,
        }
    }

    #[test]
    fn test_last_weight_prefers_latest_log() {
        let logs = vec![
            log_with("bench_press", 20.0, t0()),
            log_with("bench_press", 25.0, t0() + Duration::days(2)),
        ];
        assert_eq!(last_weight_for("bench_press", &logs), Some(25.0));

        // Order in the list does not matter when timestamps differ
        let reversed: Vec<_> = logs.into_iter().rev().collect();
        assert_eq!(last_weight_for("bench_press", &reversed), Some(25.0));
    }

    #[test]
    fn test_last_weight_tie_goes_to_later_entry() {
        let logs = vec![log_with("squat", 100.0, t0()), log_with("squat", 105.0, t0())];
        assert_eq!(last_weight_for("squat", &logs), Some(105.0));
    }

    #[test]
    fn test_last_weight_carries_zero_from_latest_log() {
        let logs = vec![
            log_with("pull_up", 25.0, t0()),
            log_with("pull_up", 0.0, t0() + Duration::days(2)),
        ];
        assert_eq!(last_weight_for("pull_up", &logs), Some(0.0));
    }

    #[test]
    fn test_last_weight_skips_log_without_sets() {
        let mut empty = log_with("pull_up", 0.0, t0() + Duration::days(2));
        empty.exercises[0].sets.clear();
        let logs = vec![log_with("pull_up", 25.0, t0()), empty];
        assert_eq!(last_weight_for("pull_up", &logs), Some(25.0));
    }

    #[test]
    fn test_refresh_with_zero_carryover() {
        let catalog = build_default_catalog();
        let r = routine(vec![RoutineBlock {
            name: "Main".into(),
            exercises: vec![prescription("pull_up", None)],
        }]);
        let mut session = build_from_routine(&r, &catalog, &[], t0());
        session.exercises[0].sets[1].target_weight = Some(0.0);

        let logs = vec![log_with("pull_up", 0.0, t0() - Duration::days(1))];
        assert_eq!(refresh_weights(&mut session, &logs), 1);
        assert_eq!(session.exercises[0].sets[0].target_weight, Some(0.0));
        assert_eq!(session.exercises[0].sets[1].target_weight, Some(0.0));
    }

    #[test]
    fn test_last_weight_none_without_history() {
        let logs = vec![log_with("squat", 100.0, t0())];
        assert_eq!(last_weight_for("bench_press", &logs), None);
        assert_eq!(last_weight_for("bench_press", &[]), None);
    }

    #[test]
    fn test_build_uses_carryover_then_template() {
        let catalog = build_default_catalog();
        let r = routine(vec![RoutineBlock {
            name: "Main".into(),
            exercises: vec![
                prescription("bench_press", Some(40.0)),
                prescription("overhead_press", Some(30.0)),
            ],
        }]);
        let logs = vec![log_with("bench_press", 55.0, t0() - Duration::days(3))];

        let session = build_from_routine(&r, &catalog, &logs, t0());
        assert_eq!(session.routine_id.as_deref(), Some("r1"));
        assert_eq!(session.exercises.len(), 2);
        assert_eq!(session.exercises[0].name, "Barbell Bench Press");
        assert_eq!(session.exercises[0].sets[0].target_weight, Some(55.0));
        assert_eq!(session.exercises[1].sets[1].target_weight, Some(30.0));
        assert_eq!(session.exercises[1].order_index, 1);
        assert_eq!(session.exercises[1].sets[1].set_number, 2);
    }

    #[test]
    fn test_build_only_uses_first_block() {
        let catalog = build_default_catalog();
        let r = routine(vec![
            RoutineBlock { name: "A".into(), exercises: vec![prescription("squat", None)] },
            RoutineBlock { name: "B".into(), exercises: vec![prescription("deadlift", None)] },
        ]);
        let session = build_from_routine(&r, &catalog, &[], t0());
        assert_eq!(session.exercises.len(), 1);
        assert_eq!(session.exercises[0].exercise_id, "squat");
    }

    #[test]
    fn test_build_empty_block() {
        let catalog = build_default_catalog();
        let r = routine(vec![RoutineBlock { name: "Empty".into(), exercises: vec![] }]);
        let session = build_from_routine(&r, &catalog, &[], t0());
        assert!(session.exercises.is_empty());
    }

    #[test]
    fn test_build_freeform_is_empty() {
        let session = build_freeform(t0());
        assert!(session.exercises.is_empty());
        assert_eq!(session.routine_id, None);
        assert_eq!(session.clock.started_at, t0());
    }

    #[test]
    fn test_refresh_fills_only_missing_weights() {
        let catalog = build_default_catalog();
        let r = routine(vec![RoutineBlock {
            name: "Main".into(),
            exercises: vec![prescription("bench_press", None), prescription("squat", Some(80.0))],
        }]);
        let mut session = build_from_routine(&r, &catalog, &[], t0());
        session.exercises[0].sets[1].target_weight = Some(0.0);
        session.exercises[0].sets[0].completed_weight = Some(47.5);

        let logs = vec![
            log_with("bench_press", 50.0, t0() - Duration::days(1)),
            log_with("squat", 120.0, t0() - Duration::days(1)),
        ];
        assert_eq!(refresh_weights(&mut session, &logs), 2);
        assert_eq!(session.exercises[0].sets[0].target_weight, Some(50.0));
        assert_eq!(session.exercises[0].sets[1].target_weight, Some(50.0));
        assert_eq!(session.exercises[0].sets[0].completed_weight, Some(47.5));
        assert_eq!(session.exercises[1].sets[0].target_weight, Some(80.0));
    }

    #[test]
    fn test_add_and_substitute_exercise() {
        let catalog = build_default_catalog();
        let mut session = build_freeform(t0());
        let bench = catalog.get_exercise_by_id("bench_press").unwrap();
        let dumbbell = catalog.get_exercise_by_id("dumbbell_bench_press").unwrap();

        assert_eq!(add_exercise(&mut session, bench, Some(90)), 0);
        assert_eq!(session.exercises[0].sets.len(), 1);
        assert!(substitute_exercise(&mut session, 0, dumbbell));
        assert_eq!(session.exercises[0].exercise_id, "dumbbell_bench_press");
        assert!(!substitute_exercise(&mut session, 4, dumbbell));
    }
}
