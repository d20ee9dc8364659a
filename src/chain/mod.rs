pub mod client;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::Sender;

pub use client::ChainWsClient;

/// What the chain subscriber reports to the ingest loop.
///
/// Lifecycle transitions ride the same channel as block events so the
/// loop's externally visible state always reflects the connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainSignal {
    Connecting,
    Subscribed,
    /// A new block header was observed; the payload is the block
    /// number as a decimal string.
    NewHead(String),
    Disconnected,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed block header: {0}")]
    BadHeader(String),
}

/// Source of block-observed events.
#[async_trait]
pub trait ChainEvents {
    /// Runs the subscription worker until `sender` has no receiver
    /// left. Reconnection is handled internally; the only error path
    /// out is a failure the worker cannot retry.
    async fn subscribe_new_heads(&self, sender: Sender<ChainSignal>) -> anyhow::Result<()>;
}
