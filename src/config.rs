#[derive(Clone, Debug)]
pub struct AppConfig {
    /// WebSocket endpoint of the chain node whose new block headers
    /// drive the sampling loop.
    pub chain_ws_url: String,

    /// Path of the append-only observation log (one JSON record per line).
    pub log_path: String,

    /// Port the read API binds on.
    pub bind_port: u16,

    // =========================
    // Query configuration
    // =========================
    /// Maximum number of observations returned by `GET /prices`.
    pub history_len: usize,

    /// Number of trailing observations the regression is fitted over.
    ///
    /// The window is fixed regardless of total log size. The log may
    /// hold fewer records than this; the predictor then uses whatever
    /// is available (and rejects the query below 2 points).
    pub forecast_window: usize,

    /// Number of forward steps `GET /predict` projects.
    pub forecast_horizon: usize,

    // =========================
    // Sampling configuration
    // =========================
    /// Lower bound of the synthetic price draw (inclusive).
    pub price_min: f64,

    /// Upper bound of the synthetic price draw (inclusive).
    pub price_max: f64,

    // =========================
    // Chain connection configuration
    // =========================
    /// Maximum time to wait for the WebSocket handshake before the
    /// attempt counts as failed.
    pub connect_timeout_ms: u64,

    /// Initial delay between reconnection attempts. Doubles on each
    /// consecutive failure.
    pub reconnect_backoff_ms: u64,

    /// Ceiling for the reconnection delay.
    pub reconnect_backoff_max_ms: u64,

    /// Capacity of the channel between the chain subscriber and the
    /// ingest loop.
    ///
    /// Acts as backpressure: block events arriving while an append is
    /// still in flight queue up here. If the queue fills, further
    /// events are dropped and counted, never processed out of order.
    pub event_queue_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self {
            chain_ws_url: env_var("CHAIN_WS_URL", "wss://westend-rpc.polkadot.io".to_string()),
            log_path: env_var("LOG_PATH", "data/observations.jsonl".to_string()),
            bind_port: env_var("BIND_PORT", 4000),

            // Query defaults match the dashboard's expectations:
            // last 10 points charted, 3 steps projected from a
            // 30-observation window.
            history_len: env_var("HISTORY_LEN", 10),
            forecast_window: env_var("FORECAST_WINDOW", 30),
            forecast_horizon: env_var("FORECAST_HORIZON", 3),

            price_min: env_var("PRICE_MIN", 3.0),
            price_max: env_var("PRICE_MAX", 5.0),

            connect_timeout_ms: env_var("CONNECT_TIMEOUT_MS", 5_000),
            reconnect_backoff_ms: env_var("RECONNECT_BACKOFF_MS", 1_000),
            reconnect_backoff_max_ms: env_var("RECONNECT_BACKOFF_MAX_MS", 30_000),
            event_queue_capacity: env_var("EVENT_QUEUE_CAPACITY", 256),
        };

        if cfg.price_min > cfg.price_max {
            tracing::warn!(
                min = cfg.price_min,
                max = cfg.price_max,
                "price bounds inverted; swapping"
            );
            std::mem::swap(&mut cfg.price_min, &mut cfg.price_max);
        }

        cfg
    }
}

fn env_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "invalid config value; using default");
                default
            }
        },
        Err(_) => default,
    }
}
