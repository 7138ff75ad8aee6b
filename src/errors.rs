// ABOUTME: Unified error taxonomy for the gateway with HTTP status mapping
// ABOUTME: Every failure path converges here and renders as a machine-readable error body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! # Gateway Error Handling
//!
//! One error type covers every component: configuration resolution, the
//! access gate, webhook input validation, and upstream calls. The outermost
//! request handler converts each variant into an HTTP status plus an
//! `{error, detail}` JSON body, so nothing below it needs to know about HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or invalid process configuration. Fatal at startup; if it
    /// surfaces during a request something re-read config that should not.
    #[error("configuration error: {0}")]
    Config(String),

    /// Access gate rejection: missing or mismatched shared secret
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed client input: bad body, missing fields, unparsable dates
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Non-2xx response from the upstream service (other than a retried 429)
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Rate-limit retries were spent without a successful response
    #[error("rate limit retries exhausted for {path}")]
    RetryExhausted { path: String },

    /// Unexpected internal fault: transport failure, undecodable success body
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status this error maps to at the request boundary.
    ///
    /// Upstream errors split on the upstream's own status: a 5xx from the
    /// service is a gateway problem (502), anything else non-2xx means the
    /// caller asked for something the service rejected (400).
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => {
                if *status >= 500 {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::BAD_REQUEST
                }
            }
            Self::RetryExhausted { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short machine-readable tag for the `error` field of the response body
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidInput(_) => "invalid_input",
            Self::Upstream { .. } => "upstream_error",
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result alias used throughout the crate
pub type GatewayResult<T> = Result<T, GatewayError>;

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl From<&GatewayError> for ErrorBody {
    fn from(error: &GatewayError) -> Self {
        Self {
            error: error.tag().to_owned(),
            detail: error.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
