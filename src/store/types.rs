use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One persisted price sample, tied to the block that triggered it.
///
/// Records are immutable once written; the log never updates or
/// deletes them. `block` is opaque and non-decreasing by arrival
/// order; `timestamp` is the ingestion-side capture time, not the
/// chain's clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub block: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("log write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("log unavailable: {0}")]
    Unavailable(#[source] std::io::Error),

    #[error("record encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}
