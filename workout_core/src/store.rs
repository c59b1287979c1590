//! Append-only log store for finished workouts.
//!
//! Logs are appended to a JSONL (JSON Lines) file with file locking to
//! ensure safe concurrent access. Appending a log whose id is already in
//! the file is a no-op, which makes retries after a failed save safe.

use crate::collaborators::{WorkoutHistory, WorkoutLogStore};
use crate::{PersistedLog, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSONL-based workout log store with file locking
#[derive(Clone, Debug)]
pub struct JsonlLogStore {
    path: PathBuf,
}

impl JsonlLogStore {
    /// Create a new JSONL store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl WorkoutLogStore for JsonlLogStore {
    fn save_workout_log(&mut self, log: &PersistedLog) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // Held across the duplicate check and the write
        file.lock_exclusive()?;

        if contains_id(&file, log.id)? {
            file.unlock()?;
            tracing::info!("Log {} already stored, skipping append", log.id);
            return Ok(());
        }

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(log)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended workout log {} to {:?}", log.id, self.path);
        Ok(())
    }
}

impl WorkoutHistory for JsonlLogStore {
    fn get_workout_logs(&self, user_id: &str) -> Result<Vec<PersistedLog>> {
        let mut logs: Vec<_> = read_logs(&self.path)?
            .into_iter()
            .filter(|l| l.user_id == user_id)
            .collect();

        // Stable, so file order still decides between equal start times
        logs.sort_by_key(|l| l.start_time);
        Ok(logs)
    }
}

/// Scan an already-locked file for a log id without parsing whole records
fn contains_id(file: &File, id: Uuid) -> Result<bool> {
    #[derive(serde::Deserialize)]
    struct IdOnly {
        id: Uuid,
    }

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(entry) = serde_json::from_str::<IdOnly>(&line) {
            if entry.id == id {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Read all logs from a JSONL file
///
/// Lines that fail to parse are logged and skipped.
pub fn read_logs(path: &Path) -> Result<Vec<PersistedLog>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut logs = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<PersistedLog>(&line) {
            Ok(log) => logs.push(log),
            Err(e) => {
                tracing::warn!("Failed to parse workout log at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workout logs from {:?}", logs.len(), path);
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggedExercise, LoggedSet, SetType};
    use chrono::{Duration, TimeZone, Utc};

    fn create_test_log(user_id: &str, days_ago: i64) -> PersistedLog {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap() - Duration::days(days_ago);
        PersistedLog {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            routine_id: Some("push_day".into()),
            name: "Push Day".into(),
            date: start.date_naive(),
            start_time: start,
            end_time: start + Duration::minutes(50),
            exercises: vec![LoggedExercise {
                exercise_id: "bench_press".into(),
                name: "Barbell Bench Press".into(),
                sets: vec![LoggedSet {
                    set_number: 1,
                    set_type: SetType::Normal,
                    reps: 8,
                    weight: 60.0,
                    duration: 0,
                    distance: 0.0,
                    rpe: Some(8),
                }],
            }],
            duration_seconds: 3000,
            total_volume: 480.0,
            completed: true,
        }
    }

    #[test]
    fn test_append_and_read_single_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("logs.jsonl");

        let log = create_test_log("u1", 0);
        let mut store = JsonlLogStore::new(&path);
        store.save_workout_log(&log).unwrap();

        let logs = read_logs(&path).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0], log);
    }

    #[test]
    fn test_retry_with_same_id_does_not_duplicate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("logs.jsonl");

        let log = create_test_log("u1", 0);
        let mut store = JsonlLogStore::new(&path);
        store.save_workout_log(&log).unwrap();
        store.save_workout_log(&log).unwrap();
        store.save_workout_log(&create_test_log("u1", 1)).unwrap();

        assert_eq!(read_logs(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_history_filters_user_and_sorts_oldest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlLogStore::new(temp_dir.path().join("nested/dir/logs.jsonl"));

        store.save_workout_log(&create_test_log("u1", 1)).unwrap();
        store.save_workout_log(&create_test_log("u2", 2)).unwrap();
        store.save_workout_log(&create_test_log("u1", 5)).unwrap();

        let logs = store.get_workout_logs("u1").unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs[0].start_time < logs[1].start_time);
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("logs.jsonl");

        let mut store = JsonlLogStore::new(&path);
        store.save_workout_log(&create_test_log("u1", 0)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        store.save_workout_log(&create_test_log("u1", 1)).unwrap();

        assert_eq!(read_logs(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logs = read_logs(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(logs.is_empty());
    }
}
