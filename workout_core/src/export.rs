//! CSV export of finished workouts.
//!
//! One row per logged set, so the file loads straight into a spreadsheet.
//! The export is written to a temp file next to the target and renamed over
//! it once fully synced.

use crate::{Error, PersistedLog, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    log_id: String,
    date: String,
    workout: &'a str,
    routine_id: Option<&'a str>,
    exercise_id: &'a str,
    exercise: &'a str,
    set_number: u32,
    set_type: String,
    reps: u32,
    weight: f64,
    duration: u32,
    distance: f64,
    rpe: Option<u8>,
}

fn rows(log: &PersistedLog) -> impl Iterator<Item = CsvRow<'_>> {
    log.exercises.iter().flat_map(move |exercise| {
        exercise.sets.iter().map(move |set| CsvRow {
            log_id: log.id.to_string(),
            date: log.date.format("%Y-%m-%d").to_string(),
            workout: &log.name,
            routine_id: log.routine_id.as_deref(),
            exercise_id: &exercise.exercise_id,
            exercise: &exercise.name,
            set_number: set.set_number,
            set_type: format!("{:?}", set.set_type).to_lowercase(),
            reps: set.reps,
            weight: set.weight,
            duration: set.duration,
            distance: set.distance,
            rpe: set.rpe,
        })
    })
}

/// Write every set of `logs` to `csv_path`, replacing any existing file
///
/// Returns the number of rows written.
pub fn export_logs_csv(logs: &[PersistedLog], csv_path: &Path) -> Result<usize> {
    let parent = csv_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut count = 0;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        for log in logs {
            for row in rows(log) {
                writer.serialize(row)?;
                count += 1;
            }
        }
        writer.flush()?;
    }

    // Headers only come from the first serialized row
    if count == 0 {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        writer.write_record([
            "log_id", "date", "workout", "routine_id", "exercise_id", "exercise", "set_number",
            "set_type", "reps", "weight", "duration", "distance", "rpe",
        ])?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets from {} logs to {:?}", count, logs.len(), csv_path);
    Ok(count)
}
