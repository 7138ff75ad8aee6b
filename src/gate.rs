// ABOUTME: Shared-secret access gate checked before any upstream call
// ABOUTME: Permissive when no secret is configured, constant-time compare when one is
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Access gate for the tool and webhook surfaces.
//!
//! The policy is binary. With no configured secret every request passes,
//! which is the documented behavior for unauthenticated local use, not an
//! oversight to harden away. With a secret configured, the request must
//! carry it either as `Authorization: Bearer <secret>` or in the
//! `X-Gateway-Token` header, and the comparison is constant-time.

use crate::errors::{GatewayError, GatewayResult};
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Dedicated header accepted as an alternative to the bearer token
pub const GATEWAY_TOKEN_HEADER: &str = "x-gateway-token";

/// Optional shared-secret gate
#[derive(Debug, Clone)]
pub struct AccessGate {
    secret: Option<String>,
}

impl AccessGate {
    /// Create a gate; `None` means allow everything
    #[must_use]
    pub const fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Whether a secret is configured
    #[must_use]
    pub const fn is_enforcing(&self) -> bool {
        self.secret.is_some()
    }

    /// Authorize a request from its headers.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unauthorized` when a secret is configured and
    /// the request does not present exactly that value.
    pub fn authorize(&self, headers: &HeaderMap) -> GatewayResult<()> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        let presented = bearer_token(headers).or_else(|| header_value(headers, GATEWAY_TOKEN_HEADER));

        match presented {
            Some(token) if constant_time_eq(token, secret) => Ok(()),
            Some(_) => Err(GatewayError::Unauthorized(
                "gateway token does not match".into(),
            )),
            None => Err(GatewayError::Unauthorized("gateway token required".into())),
        }
    }
}

/// Extract the token from an `Authorization: Bearer` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, "authorization")?.strip_prefix("Bearer ")
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
