//! Set tracking for the live session.
//!
//! Each function is one discrete transform of the [`Session`]. Out-of-range
//! indices are treated as no-ops rather than errors, and the rest timer is
//! only ever armed as a side effect of completing a set or moving to an
//! exercise.

use crate::rest_timer::RestTimer;
use crate::{Session, SessionSet};
use chrono::{DateTime, Utc};

/// Lowest and highest accepted RPE values
pub const RPE_MIN: u8 = 1;
pub const RPE_MAX: u8 = 10;

/// Default weight stepper increment
pub const DEFAULT_WEIGHT_INCREMENT: f64 = 2.5;

/// Navigation direction between exercises
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Actual values recorded for a set; `None` fields are left as they are
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsPatch {
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub duration: Option<u32>,
    pub distance: Option<f64>,
    pub rpe: Option<u8>,
}

/// Flip a set's completion flag, arming the rest timer when a set is finished
///
/// Returns the new flag, or `None` if the indices are out of range. Metric
/// fields are never touched.
pub fn toggle_completion(
    session: &mut Session,
    ex_idx: usize,
    set_idx: usize,
    timer: &mut RestTimer,
    now: DateTime<Utc>,
) -> Option<bool> {
    let set = session.set_mut(ex_idx, set_idx)?;
    set.completed = !set.completed;
    let completed = set.completed;
    tracing::debug!(
        "Set {} of exercise {} marked {}",
        set_idx + 1,
        ex_idx,
        if completed { "complete" } else { "incomplete" }
    );

    if !completed {
        return Some(false);
    }

    let exercise = &session.exercises[ex_idx];
    let is_last_set = set_idx + 1 == exercise.sets.len();

    let rest = if !is_last_set {
        exercise.rest_time
    } else {
        // Rest ahead of switching to the next exercise
        session
            .exercises
            .get(ex_idx + 1)
            .and_then(|next| next.rest_time)
    };

    if let Some(seconds) = rest {
        timer.start(seconds, now);
    }

    Some(true)
}

/// Merge actual values into a set; RPE is clamped to 1..=10
pub fn update_metrics(
    session: &mut Session,
    ex_idx: usize,
    set_idx: usize,
    patch: &MetricsPatch,
) -> bool {
    let Some(set) = session.set_mut(ex_idx, set_idx) else {
        return false;
    };

    if let Some(reps) = patch.reps {
        set.completed_reps = Some(reps);
    }
    if let Some(weight) = patch.weight.filter(|w| w.is_finite()) {
        set.completed_weight = Some(weight.max(0.0));
    }
    if let Some(duration) = patch.duration {
        set.completed_duration = Some(duration);
    }
    if let Some(distance) = patch.distance.filter(|d| d.is_finite()) {
        set.completed_distance = Some(distance.max(0.0));
    }
    if let Some(rpe) = patch.rpe {
        set.rpe = Some(rpe.clamp(RPE_MIN, RPE_MAX));
    }
    true
}

/// Step the recorded reps by `delta`, starting from the target when nothing is recorded
///
/// Never goes below zero. Returns the new value.
pub fn step_reps(session: &mut Session, ex_idx: usize, set_idx: usize, delta: i32) -> Option<u32> {
    let set = session.set_mut(ex_idx, set_idx)?;
    let current = set.completed_reps.or(set.target_reps).unwrap_or(0);
    let next = (i64::from(current) + i64::from(delta)).max(0) as u32;
    set.completed_reps = Some(next);
    Some(next)
}

/// Step the recorded weight by `steps` increments, floored at zero
pub fn step_weight(
    session: &mut Session,
    ex_idx: usize,
    set_idx: usize,
    steps: i32,
    increment: f64,
) -> Option<f64> {
    let set = session.set_mut(ex_idx, set_idx)?;
    let current = set.completed_weight.or(set.target_weight).unwrap_or(0.0);
    let next = (current + f64::from(steps) * increment).max(0.0);
    set.completed_weight = Some(next);
    Some(next)
}

/// Append a set modelled on the exercise's current last set
///
/// Returns the new set's number.
pub fn add_set(session: &mut Session, ex_idx: usize) -> Option<u32> {
    let exercise = session.exercises.get_mut(ex_idx)?;
    let set_number = exercise.sets.len() as u32 + 1;

    let set = match exercise.sets.last() {
        Some(last) => SessionSet {
            target_reps: last.target_reps,
            target_weight: last.target_weight,
            ..SessionSet::new(set_number, last.set_type)
        },
        None => SessionSet::new(set_number, Default::default()),
    };
    exercise.sets.push(set);

    tracing::debug!("Added set {} to {}", set_number, exercise.name);
    Some(set_number)
}

/// Move to the neighbouring exercise
///
/// Moving past either end does nothing. A successful move resets the set
/// cursor and starts the destination's rest period if it declares one.
pub fn navigate(
    session: &mut Session,
    direction: Direction,
    timer: &mut RestTimer,
    now: DateTime<Utc>,
) -> bool {
    let current = session.current_exercise_index;
    let target = match direction {
        Direction::Next => current + 1,
        Direction::Previous => match current.checked_sub(1) {
            Some(idx) => idx,
            None => return false,
        },
    };
    if target >= session.exercises.len() {
        return false;
    }

    session.current_exercise_index = target;
    session.current_set_index = 0;
    tracing::debug!("Navigated to exercise {}", target);

    if let Some(seconds) = session.exercises[target].rest_time {
        timer.start(seconds, now);
    }
    true
}
