//! Workout history queries.
//!
//! Loads recent logs for display.

use crate::collaborators::WorkoutHistory;
use crate::{PersistedLog, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Load logs from the last `days` days, newest first
///
/// Logs appearing more than once (same id) are returned once.
pub fn load_recent_logs(
    history: &impl WorkoutHistory,
    user_id: &str,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<PersistedLog>> {
    let cutoff = now - Duration::days(days);
    let mut seen_ids = HashSet::new();

    let mut logs: Vec<_> = history
        .get_workout_logs(user_id)?
        .into_iter()
        .filter(|l| l.start_time >= cutoff)
        .filter(|l| seen_ids.insert(l.id))
        .collect();

    // Sort by start time, newest first
    logs.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    tracing::info!("Loaded {} workout logs from last {} days", logs.len(), days);
    Ok(logs)
}
