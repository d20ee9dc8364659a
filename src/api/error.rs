use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::forecast::ForecastError;
use crate::store::StoreError;

/// Error surface of the read API.
///
/// Both variants answer with a JSON error body. An insufficient-data
/// forecast is a condition of the data, not a server defect, so its
/// message stays distinguishable from a storage fault; an empty log
/// on `/prices` is not an error at all.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot read price log: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Forecast(#[from] ForecastError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        match &self {
            ApiError::Store(e) => tracing::error!(error = %e, "read request failed"),
            ApiError::Forecast(e) => tracing::warn!(error = %e, "forecast unavailable"),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}
