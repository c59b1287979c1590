//! Turning a live session into an immutable log.
//!
//! Only completed sets are kept. Each kept set records what was actually
//! done, falling back to the target, falling back to zero.

use crate::{LoggedExercise, LoggedSet, PersistedLog, Session, SessionSet};
use chrono::{DateTime, Utc};

/// Build the finished log for `session` as of `now`
///
/// Exercises with no completed sets stay in the log with an empty set list.
/// The log id is the session id, so finalizing the same session again
/// produces the same record.
pub fn finalize(session: &Session, user_id: &str, now: DateTime<Utc>) -> PersistedLog {
    let exercises: Vec<LoggedExercise> = session
        .exercises
        .iter()
        .map(|exercise| LoggedExercise {
            exercise_id: exercise.exercise_id.clone(),
            name: exercise.name.clone(),
            sets: exercise
                .sets
                .iter()
                .filter(|s| s.completed)
                .map(resolve_set)
                .collect(),
        })
        .collect();

    let total_volume = total_volume(&exercises);
    let start_time = session.clock.started_at;

    PersistedLog {
        id: session.id,
        user_id: user_id.to_string(),
        routine_id: session.routine_id.clone(),
        name: session.name.clone(),
        date: start_time.date_naive(),
        start_time,
        end_time: now,
        exercises,
        duration_seconds: session.clock.elapsed(now),
        total_volume,
        completed: true,
    }
}

/// Sum of weight × reps over every logged set
pub fn total_volume(exercises: &[LoggedExercise]) -> f64 {
    exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .map(|s| s.weight * f64::from(s.reps))
        .sum()
}

fn resolve_set(set: &SessionSet) -> LoggedSet {
    LoggedSet {
        set_number: set.set_number,
        set_type: set.set_type,
        reps: set.completed_reps.or(set.target_reps).unwrap_or(0),
        weight: set.completed_weight.or(set.target_weight).unwrap_or(0.0),
        duration: set.completed_duration.or(set.target_duration).unwrap_or(0),
        distance: set.completed_distance.or(set.target_distance).unwrap_or(0.0),
        rpe: set.rpe,
    }
}
