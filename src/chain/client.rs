use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use crate::chain::types::{SUBSCRIBE_METHOD, parse_new_head};
use crate::chain::{ChainEvents, ChainSignal};
use crate::ingest::IngestCounters;

/// WebSocket new-heads subscriber.
///
/// Maintains the connection for the lifetime of the process:
/// reconnects with exponential backoff on loss, reports lifecycle
/// transitions alongside block events, and returns only once the
/// ingest side has gone away.
pub struct ChainWsClient {
    ws_url: String,
    connect_timeout: Duration,
    backoff_initial: Duration,
    backoff_max: Duration,
    counters: IngestCounters,
}

impl ChainWsClient {
    pub fn new(
        ws_url: String,
        connect_timeout: Duration,
        backoff_initial: Duration,
        backoff_max: Duration,
        counters: IngestCounters,
    ) -> Self {
        Self {
            ws_url,
            connect_timeout,
            backoff_initial,
            backoff_max,
            counters,
        }
    }

    /// Send the new-heads subscription request over the socket.
    async fn send_subscribe<E>(
        write: &mut (impl futures::Sink<Message, Error = E> + Unpin),
    ) -> anyhow::Result<()>
    where
        E: std::fmt::Debug + Send + Sync + 'static,
    {
        let req = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": SUBSCRIBE_METHOD,
            "params": []
        });

        let text = serde_json::to_string(&req)?;
        debug!(payload = %text, "sending new-heads subscription");

        write.send(Message::Text(text.into())).await.map_err(|e| {
            error!(error = ?e, "failed to send subscription request");
            anyhow::anyhow!("{:?}", e)
        })?;

        Ok(())
    }

    /// Forward one block event without waiting on the ingest loop.
    ///
    /// A full queue means appends are slower than block production;
    /// the event is dropped and counted rather than processed out of
    /// order. Returns `false` once the receiver is gone.
    fn forward_new_head(&self, sender: &Sender<ChainSignal>, number: String) -> bool {
        match sender.try_send(ChainSignal::NewHead(number)) {
            Ok(()) => true,
            Err(TrySendError::Full(signal)) => {
                self.counters.dropped_events.fetch_add(1, Ordering::Relaxed);
                warn!(?signal, "event queue full; dropping block event");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[async_trait]
impl ChainEvents for ChainWsClient {
    #[instrument(skip(self, sender), fields(url = %self.ws_url))]
    async fn subscribe_new_heads(&self, sender: Sender<ChainSignal>) -> anyhow::Result<()> {
        info!("starting new-heads subscription worker");

        let mut backoff = self.backoff_initial;

        loop {
            if sender.send(ChainSignal::Connecting).await.is_err() {
                return Ok(());
            }

            debug!("attempting chain websocket connection");
            match tokio::time::timeout(self.connect_timeout, connect_async(&self.ws_url)).await {
                Err(_) => {
                    warn!(timeout_ms = self.connect_timeout.as_millis() as u64, "connect timed out");
                }
                Ok(Err(e)) => {
                    warn!(error = ?e, "connect failed");
                }
                Ok(Ok((ws, _))) => {
                    info!("chain websocket connected");
                    let (mut write, mut read) = ws.split();

                    if let Err(e) = Self::send_subscribe(&mut write).await {
                        error!(error = ?e, "new-heads subscription failed; retrying connection");
                        // Fall through to the sleep/reconnect logic.
                    } else {
                        if sender.send(ChainSignal::Subscribed).await.is_err() {
                            return Ok(());
                        }
                        backoff = self.backoff_initial;

                        // Process all messages until this socket dies.
                        while let Some(msg) = read.next().await {
                            let msg = match msg {
                                Ok(m) => m,
                                Err(e) => {
                                    warn!(error = ?e, "websocket stream error");
                                    break;
                                }
                            };

                            if msg.is_ping() || msg.is_pong() {
                                continue;
                            }
                            if !msg.is_text() {
                                debug!(msg_type = ?msg, "ignoring non-text frame");
                                continue;
                            }
                            let Ok(text) = msg.to_text() else { continue };

                            match parse_new_head(text) {
                                Ok(Some(number)) => {
                                    debug!(block = %number, "new block header observed");
                                    if !self.forward_new_head(&sender, number) {
                                        return Ok(());
                                    }
                                }
                                Ok(None) => {
                                    debug!("non-head frame ignored");
                                }
                                Err(e) => {
                                    warn!(error = %e, "unparseable notification skipped");
                                }
                            }
                        }
                    }

                    if sender.send(ChainSignal::Disconnected).await.is_err() {
                        return Ok(());
                    }
                }
            }

            debug!(backoff_ms = backoff.as_millis() as u64, "reconnecting after backoff");
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.backoff_max);
        }
    }
}
