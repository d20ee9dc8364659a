//! Append-only observation store.
//!
//! Exactly one writer exists by design: the ingest loop owns the
//! `ObservationLog` handle. Readers never share that handle; they
//! re-open the file per request, so a read observes the log either
//! just before or just after an append, never a torn record.

pub mod log;
pub mod reader;
pub mod types;

pub use log::{ObservationLog, ObservationSink};
pub use reader::{LogReadout, LogReader};
pub use types::{Observation, StoreError};
