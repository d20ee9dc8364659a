use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};

use blockfeed::{
    api::{ApiState, create_router},
    chain::{ChainEvents, ChainWsClient},
    config::AppConfig,
    ingest::{IngestCounters, IngestState, run_ingest_loop},
    logger::init_tracing,
    sampler::UniformSampler,
    store::{LogReader, ObservationLog},
};

/// Starts the subscription worker and the ingest loop; returns the
/// pieces the API needs for observability.
fn start_ingestion(
    cfg: &AppConfig,
    log: ObservationLog,
) -> (watch::Receiver<IngestState>, IngestCounters) {
    let counters = IngestCounters::default();
    let (state_tx, state_rx) = watch::channel(IngestState::Disconnected);
    let (signal_tx, signal_rx) = mpsc::channel(cfg.event_queue_capacity);

    let chain = ChainWsClient::new(
        cfg.chain_ws_url.clone(),
        Duration::from_millis(cfg.connect_timeout_ms),
        Duration::from_millis(cfg.reconnect_backoff_ms),
        Duration::from_millis(cfg.reconnect_backoff_max_ms),
        counters.clone(),
    );

    tokio::spawn(async move {
        if let Err(e) = chain.subscribe_new_heads(signal_tx).await {
            tracing::error!(error = ?e, "chain subscription worker exited");
        }
    });

    let sampler = UniformSampler::new(cfg.price_min, cfg.price_max);
    tokio::spawn(run_ingest_loop(
        signal_rx,
        sampler,
        log,
        state_tx,
        counters.clone(),
    ));

    (state_rx, counters)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("Starting blockfeed...");

    let cfg = AppConfig::from_env();
    tracing::info!(
        chain = %cfg.chain_ws_url,
        log = %cfg.log_path,
        window = cfg.forecast_window,
        horizon = cfg.forecast_horizon,
        "configuration loaded"
    );

    let log = ObservationLog::open(&cfg.log_path).context("open observation log")?;
    let reader = LogReader::new(&cfg.log_path);

    let (ingest_state, counters) = start_ingestion(&cfg, log);

    let app = create_router(ApiState {
        reader,
        history_len: cfg.history_len,
        window: cfg.forecast_window,
        horizon: cfg.forecast_horizon,
        ingest_state,
        counters,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.bind_port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
