//! Block-triggered sampling loop.
//!
//! Exactly one instance runs per process; it is the single writer of
//! the observation log. Signals arrive over a bounded channel from the
//! chain subscriber and are processed strictly in order, one append at
//! a time, so a slow write can never interleave with the next one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::chain::ChainSignal;
use crate::sampler::Sampler;
use crate::store::ObservationSink;

/// Externally visible state of the ingest loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestState {
    Disconnected,
    Connecting,
    Subscribed,
    Sampling,
    Appending,
}

impl IngestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestState::Disconnected => "disconnected",
            IngestState::Connecting => "connecting",
            IngestState::Subscribed => "subscribed",
            IngestState::Sampling => "sampling",
            IngestState::Appending => "appending",
        }
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct IngestCounters {
    pub blocks_seen: Arc<AtomicU64>,
    pub appended: Arc<AtomicU64>,

    // failure accounting
    pub sample_failures: Arc<AtomicU64>,
    pub append_failures: Arc<AtomicU64>,
    pub dropped_events: Arc<AtomicU64>,
}

impl IngestCounters {
    pub fn snapshot(&self) -> IngestCountersSnapshot {
        IngestCountersSnapshot {
            blocks_seen: self.blocks_seen.load(Ordering::Relaxed),
            appended: self.appended.load(Ordering::Relaxed),
            sample_failures: self.sample_failures.load(Ordering::Relaxed),
            append_failures: self.append_failures.load(Ordering::Relaxed),
            dropped_events: self.dropped_events.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct IngestCountersSnapshot {
    pub blocks_seen: u64,
    pub appended: u64,
    pub sample_failures: u64,
    pub append_failures: u64,
    pub dropped_events: u64,
}

/// Drives the sample-and-append loop until the signal channel closes.
///
/// Each `NewHead` is processed to completion before the next signal is
/// taken. Sample and append failures are counted and logged; neither
/// terminates the loop. The loop exiting at the bottom means shutdown
/// happened at a record boundary.
pub async fn run_ingest_loop(
    mut signals: mpsc::Receiver<ChainSignal>,
    mut sampler: impl Sampler,
    mut log: impl ObservationSink,
    state: watch::Sender<IngestState>,
    counters: IngestCounters,
) {
    while let Some(signal) = signals.recv().await {
        match signal {
            ChainSignal::Connecting => {
                state.send_replace(IngestState::Connecting);
            }
            ChainSignal::Subscribed => {
                info!("chain subscription established");
                state.send_replace(IngestState::Subscribed);
            }
            ChainSignal::Disconnected => {
                warn!("chain connection lost");
                state.send_replace(IngestState::Disconnected);
            }
            ChainSignal::NewHead(block) => {
                counters.blocks_seen.fetch_add(1, Ordering::Relaxed);

                state.send_replace(IngestState::Sampling);
                let obs = match sampler.sample(&block) {
                    Ok(obs) => obs,
                    Err(e) => {
                        counters.sample_failures.fetch_add(1, Ordering::Relaxed);
                        warn!(block = %block, error = %e, "sample rejected");
                        state.send_replace(IngestState::Subscribed);
                        continue;
                    }
                };

                state.send_replace(IngestState::Appending);
                match log.append(&obs) {
                    Ok(()) => {
                        counters.appended.fetch_add(1, Ordering::Relaxed);
                        info!(block = %obs.block, price = obs.price, "observation appended");
                    }
                    Err(e) => {
                        // The sample is dropped; the subscription survives.
                        counters.append_failures.fetch_add(1, Ordering::Relaxed);
                        error!(block = %obs.block, error = %e, "append failed; sample dropped");
                    }
                }
                state.send_replace(IngestState::Subscribed);
            }
        }
    }

    state.send_replace(IngestState::Disconnected);
    info!("ingest loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SampleError;
    use crate::store::{Observation, StoreError};
    use chrono::Utc;
    use std::sync::Mutex;

    /// Generator that replays a fixed price script.
    struct ScriptedSampler {
        prices: Vec<f64>,
        next: usize,
    }

    impl ScriptedSampler {
        fn new(prices: &[f64]) -> Self {
            Self {
                prices: prices.to_vec(),
                next: 0,
            }
        }
    }

    impl Sampler for ScriptedSampler {
        fn sample(&mut self, block: &str) -> Result<Observation, SampleError> {
            if block.is_empty() {
                return Err(SampleError::EmptyMarker);
            }
            let price = self.prices[self.next % self.prices.len()];
            self.next += 1;
            Ok(Observation {
                block: block.to_string(),
                timestamp: Utc::now(),
                price,
            })
        }
    }

    #[derive(Clone, Default)]
    struct CollectingSink(Arc<Mutex<Vec<Observation>>>);

    impl ObservationSink for CollectingSink {
        fn append(&mut self, obs: &Observation) -> Result<(), StoreError> {
            self.0.lock().unwrap().push(obs.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl ObservationSink for FailingSink {
        fn append(&mut self, _obs: &Observation) -> Result<(), StoreError> {
            Err(StoreError::Write(std::io::Error::other("disk full")))
        }
    }

    async fn drive(
        signals: Vec<ChainSignal>,
        sampler: impl Sampler + 'static,
        sink: impl ObservationSink + 'static,
    ) -> (IngestCounters, watch::Receiver<IngestState>) {
        let (tx, rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(IngestState::Disconnected);
        let counters = IngestCounters::default();

        let loop_handle = tokio::spawn(run_ingest_loop(
            rx,
            sampler,
            sink,
            state_tx,
            counters.clone(),
        ));

        for s in signals {
            tx.send(s).await.unwrap();
        }
        drop(tx);
        loop_handle.await.unwrap();

        (counters, state_rx)
    }

    #[tokio::test]
    async fn samples_and_appends_in_block_order() {
        let sink = CollectingSink::default();
        let collected = sink.0.clone();

        let (counters, state) = drive(
            vec![
                ChainSignal::Connecting,
                ChainSignal::Subscribed,
                ChainSignal::NewHead("100".into()),
                ChainSignal::NewHead("101".into()),
                ChainSignal::NewHead("102".into()),
            ],
            ScriptedSampler::new(&[3.1, 3.2, 3.3]),
            sink,
        )
        .await;

        let written = collected.lock().unwrap();
        let blocks: Vec<&str> = written.iter().map(|o| o.block.as_str()).collect();
        assert_eq!(blocks, ["100", "101", "102"]);
        assert_eq!(written[0].price, 3.1);
        assert_eq!(written[2].price, 3.3);

        assert_eq!(counters.snapshot().blocks_seen, 3);
        assert_eq!(counters.snapshot().appended, 3);
        // Channel closed -> loop stopped at a record boundary.
        assert_eq!(*state.borrow(), IngestState::Disconnected);
    }

    #[tokio::test]
    async fn append_failure_never_terminates_the_loop() {
        let (counters, _) = drive(
            vec![
                ChainSignal::Subscribed,
                ChainSignal::NewHead("1".into()),
                ChainSignal::NewHead("2".into()),
            ],
            ScriptedSampler::new(&[4.0]),
            FailingSink,
        )
        .await;

        let snap = counters.snapshot();
        // Both events were still consumed after the first failure.
        assert_eq!(snap.blocks_seen, 2);
        assert_eq!(snap.append_failures, 2);
        assert_eq!(snap.appended, 0);
    }

    #[tokio::test]
    async fn rejected_sample_is_counted_and_skipped() {
        let sink = CollectingSink::default();
        let collected = sink.0.clone();

        let (counters, _) = drive(
            vec![
                ChainSignal::Subscribed,
                ChainSignal::NewHead("".into()),
                ChainSignal::NewHead("7".into()),
            ],
            ScriptedSampler::new(&[4.0]),
            sink,
        )
        .await;

        assert_eq!(counters.snapshot().sample_failures, 1);
        assert_eq!(counters.snapshot().appended, 1);
        assert_eq!(collected.lock().unwrap()[0].block, "7");
    }
}
