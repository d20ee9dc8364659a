use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::logger::warn_if_slow;
use crate::store::types::{Observation, StoreError};

/// Read side of the observation log.
///
/// Holds only the path; every `load` reads the file fresh, so results
/// are always at least as new as the last completed append.
#[derive(Clone, Debug)]
pub struct LogReader {
    path: PathBuf,
}

/// Result of one log read.
///
/// `skipped` counts malformed lines (partial writes from a crash,
/// corrupted records) that were dropped from the readout. Callers
/// surface it; the valid records are served regardless.
#[derive(Clone, Debug, Default)]
pub struct LogReadout {
    pub observations: Vec<Observation>,
    pub skipped: usize,
}

impl LogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the most recent `limit` observations (all if `None`) in
    /// insertion order.
    ///
    /// A missing file means no data has been ingested yet and yields
    /// an empty readout; any other I/O failure is a fault
    /// (`StoreError::Unavailable`) so callers can tell the two apart.
    pub async fn load(&self, limit: Option<usize>) -> Result<LogReadout, StoreError> {
        warn_if_slow("log_read", Duration::from_millis(250), self.read(limit)).await
    }

    async fn read(&self, limit: Option<usize>) -> Result<LogReadout, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LogReadout::default()),
            Err(e) => return Err(StoreError::Unavailable(e)),
        };

        let mut observations = Vec::new();
        let mut skipped = 0usize;

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Observation>(line) {
                Ok(obs) => observations.push(obs),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        path = %self.path.display(),
                        line = idx + 1,
                        error = %e,
                        "skipping malformed log record"
                    );
                }
            }
        }

        if let Some(limit) = limit {
            if observations.len() > limit {
                observations.drain(..observations.len() - limit);
            }
        }

        Ok(LogReadout {
            observations,
            skipped,
        })
    }
}
