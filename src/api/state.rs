use tokio::sync::watch;

use crate::ingest::{IngestCounters, IngestState};
use crate::store::LogReader;

#[derive(Clone)]
pub struct ApiState {
    pub reader: LogReader,

    /// Maximum points returned by `/prices`.
    pub history_len: usize,
    /// Trailing observations fed to the regression.
    pub window: usize,
    /// Forward steps returned by `/predict`.
    pub horizon: usize,

    pub ingest_state: watch::Receiver<IngestState>,
    pub counters: IngestCounters,
}
