use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::store::types::{Observation, StoreError};

/// Append seam between the ingest loop and the storage layer.
///
/// The production implementation is [`ObservationLog`]; tests swap in
/// collecting or failing sinks to exercise the loop's error paths.
pub trait ObservationSink: Send {
    fn append(&mut self, obs: &Observation) -> Result<(), StoreError>;
}

/// Single-writer handle over the observation log file.
///
/// Each append is one self-delimited JSON line written with a single
/// `write_all`, so a record either lands whole or not at all; a failed
/// append cannot damage earlier records.
pub struct ObservationLog {
    path: PathBuf,
    file: File,
}

impl ObservationLog {
    /// Opens (creating if necessary) the log file in append mode.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::Unavailable)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(StoreError::Unavailable)?;

        info!(path = %path.display(), "observation log opened");

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationSink for ObservationLog {
    fn append(&mut self, obs: &Observation) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(obs)?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .map_err(StoreError::Write)?;

        Ok(())
    }
}
