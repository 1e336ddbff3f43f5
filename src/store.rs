use crate::snapshot::Snapshot;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to replace snapshot at {path}: {source}")]
    Replace {
        path: String,
        source: std::io::Error,
    },
}

/// Single-slot store for the previous run's snapshot. Holds exactly one
/// generation; `save` replaces whatever was there.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing or unreadable history is not an error: losing one generation
    /// of trend data is acceptable, crashing the monitor is not.
    pub fn load_previous(&self) -> Option<Snapshot> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read previous snapshot, comparing without baseline");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "previous snapshot is corrupt, comparing without baseline");
                None
            }
        }
    }

    /// Write-to-temp then rename, so a crash mid-write cannot tear the file
    /// the next run reads as its baseline.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(snapshot)?;

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, text).map_err(|source| StoreError::Write {
            path: tmp_path.display().to_string(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Replace {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}
