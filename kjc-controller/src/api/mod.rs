//! HTTP API
//!
//! Control endpoints for the operator UI plus the push channel and ready
//! notifications of the display client.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, run, AppContext};

use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error wrapper that renders as `{ "error": ..., "kind": ... }`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Superseded { .. } => StatusCode::CONFLICT,
            Error::RendezvousTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::Transport { .. } | Error::EngineResponse { .. } | Error::PreloadFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Error::Config(_) | Error::Http(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        if let Error::RendezvousTimeout {
            master_ready,
            external_ready,
        } = &self.0
        {
            body["master_ready"] = json!(master_ready);
            body["external_ready"] = json!(external_ready);
        }
        (status, Json(body)).into_response()
    }
}
