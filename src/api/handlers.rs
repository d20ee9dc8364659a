use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::state::ApiState;
use crate::forecast::predict_next;

/// One point of the served price history. Prices are fixed to two
/// decimals at this boundary only; the log keeps source precision.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PricePoint {
    pub block: String,
    pub price: String,
}

/// `GET /prices` — up to `history_len` most recent observations,
/// newest last. An empty log is an empty array, not an error.
pub async fn get_prices(State(state): State<ApiState>) -> Result<Json<Vec<PricePoint>>, ApiError> {
    let readout = state.reader.load(Some(state.history_len)).await?;

    if readout.skipped > 0 {
        warn!(skipped = readout.skipped, "served /prices past malformed records");
    }

    let body = readout
        .observations
        .iter()
        .map(|o| PricePoint {
            block: o.block.clone(),
            price: format!("{:.2}", o.price),
        })
        .collect();

    Ok(Json(body))
}

/// `GET /predict` — `horizon` projected prices, forward order.
/// Fewer than 2 stored observations is a client-visible error, never
/// a defaulted forecast.
pub async fn get_predict(State(state): State<ApiState>) -> Result<Json<Vec<String>>, ApiError> {
    let readout = state.reader.load(Some(state.window)).await?;

    if readout.skipped > 0 {
        warn!(skipped = readout.skipped, "served /predict past malformed records");
    }

    let prices: Vec<f64> = readout.observations.iter().map(|o| o.price).collect();
    let predictions = predict_next(&prices, state.horizon)?;

    Ok(Json(
        predictions.iter().map(|p| format!("{p:.2}")).collect(),
    ))
}

/// `GET /status` — the ingest loop's current state and counters.
pub async fn get_status(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let snapshot = state.counters.snapshot();

    Json(json!({
        "state": state.ingest_state.borrow().as_str(),
        "counters": snapshot,
    }))
}
