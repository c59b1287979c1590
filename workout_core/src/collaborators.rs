//! Interfaces to the systems around the session engine.
//!
//! The engine reads exercises and past logs, writes finished logs, and hands
//! finished logs to whatever shows the post-workout summary. Local
//! implementations live in [`crate::catalog`] and [`crate::store`].

use crate::{Exercise, PersistedLog, Result};

/// Exercise lookup and substitution search
pub trait ExerciseCatalog {
    fn get_exercise_by_id(&self, id: &str) -> Option<&Exercise>;

    /// Best substitution candidates for `id`, most similar first
    fn find_similar_exercises(&self, id: &str, limit: usize) -> Vec<&Exercise>;
}

/// Read access to a user's finished workouts
pub trait WorkoutHistory {
    /// Logs for `user_id`, oldest first
    fn get_workout_logs(&self, user_id: &str) -> Result<Vec<PersistedLog>>;
}

/// Durable storage for finished workouts
///
/// Saving the same log id twice must not produce a duplicate, so callers
/// can retry after a failure.
pub trait WorkoutLogStore {
    fn save_workout_log(&mut self, log: &PersistedLog) -> Result<()>;
}

/// Post-workout summary shown once a log is saved
///
/// `present` returns once the user has closed the summary.
pub trait Feedback {
    fn present(&mut self, log: &PersistedLog);
}
