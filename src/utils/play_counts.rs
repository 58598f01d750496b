//! Durable play counter shared by every guild.
//!
//! The table is a JSON object mapping track identity to count. It is read once
//! at startup and written through on every increment.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors from reading or writing the play-count file.
#[derive(Error, Debug)]
pub enum PlayCountError {
    #[error("I/O error on play count file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Play count file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-wide durable map of track identity to play count.
pub struct PlayCountStore {
    path: PathBuf,
    counts: Mutex<HashMap<String, u64>>,
    /// Held for the whole of an increment or flush so file writes land in
    /// the order their snapshots were taken. Readers never take it.
    write_lock: Mutex<()>,
}

impl PlayCountStore {
    /// Loads the table at `path`. A missing or corrupt file yields an empty table.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counts = match read_table(&path) {
            Ok(counts) => {
                info!("Loaded {} play counts from {:?}", counts.len(), path);
                counts
            }
            Err(e) => {
                warn!(
                    "Failed to load play counts from {:?}: {}. Starting with empty table.",
                    path, e
                );
                HashMap::new()
            }
        };

        Self {
            path,
            counts: Mutex::new(counts),
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        // A panic while holding the lock leaves a consistent map behind.
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds one play for `id`, persists the table and returns the new count.
    /// Persistence failures are logged; the in-memory count still advances.
    pub fn increment(&self, id: &str) -> u64 {
        let _writing = self.write_guard();
        let (new_count, serialized) = {
            let mut counts = self.lock();
            let count = counts.entry(id.to_string()).or_insert(0);
            *count += 1;
            let new_count = *count;
            (new_count, serde_json::to_string_pretty(&*counts))
        };

        if let Err(e) = serialized
            .map_err(PlayCountError::from)
            .and_then(|json| write_table(&self.path, &json))
        {
            error!("Failed to persist play count for '{}': {}", id, e);
        }
        debug!("Play count for '{}' is now {}", id, new_count);
        new_count
    }

    /// Current count for `id`, `0` if never played.
    pub fn get(&self, id: &str) -> u64 {
        self.lock().get(id).copied().unwrap_or(0)
    }

    /// The `limit` most played identities, highest first, ties by identity.
    pub fn top_n(&self, limit: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .lock()
            .iter()
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        entries
    }

    /// Writes the current table to disk.
    pub fn flush(&self) -> Result<(), PlayCountError> {
        let _writing = self.write_guard();
        let serialized = serde_json::to_string_pretty(&*self.lock())?;
        write_table(&self.path, &serialized)
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, u64>, PlayCountError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }

    Ok(serde_json::from_str(&content)?)
}

/// Writes to a sibling temp file and renames it over the target.
fn write_table(path: &Path, serialized: &str) -> Result<(), PlayCountError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, serialized)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
