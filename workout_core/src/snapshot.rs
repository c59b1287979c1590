//! Live session snapshots with file locking.
//!
//! The live session is written to disk after every change so a workout
//! survives a closed terminal or a crash. The rest countdown is never
//! part of a snapshot; a resumed session starts with the timer idle.

use crate::{Error, Result, Session};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl Session {
    /// Load a session snapshot with shared locking
    ///
    /// Returns `None` if no snapshot exists. A snapshot that cannot be read
    /// or parsed is logged and treated as absent.
    pub fn load_snapshot(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No session snapshot at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open session snapshot {:?}: {}. Ignoring it.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock session snapshot {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read session snapshot {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                tracing::debug!("Loaded session snapshot {} from {:?}", session.id, path);
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!("Failed to parse session snapshot {:?}: {}. Ignoring it.", path, e);
                Ok(None)
            }
        }
    }

    /// Save a session snapshot with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            Error::Other(format!("Snapshot path {:?} has no parent directory", path))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session snapshot to {:?}", path);
        Ok(())
    }
}

/// Remove a snapshot once its session is finished or discarded
pub fn clear_snapshot(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Cleared session snapshot {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
