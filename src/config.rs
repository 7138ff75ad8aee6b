// ABOUTME: Environment configuration for upstream credentials and gateway secrets
// ABOUTME: Resolved once at process start and passed by Arc, never re-read per call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Environment-only configuration, resolved once at startup.
//!
//! The upstream API key is the single required value; the process refuses to
//! start without it. Everything else has a documented default suitable for
//! local use against the public Intervals.icu instance.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://intervals.icu";

/// Athlete id sentinel meaning "the athlete who owns the API key"
pub const DEFAULT_ATHLETE_ID: &str = "0";

/// Default HTTP listen port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Wall-clock budget for one inbound request, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Immutable gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Intervals.icu API key (HTTP Basic password, username fixed)
    pub api_key: String,
    /// Upstream base URL without trailing slash
    pub base_url: String,
    /// Athlete id used in upstream paths; `"0"` means the key's owner
    pub athlete_id: String,
    /// Shared secret for the tool surface; `None` disables the gate
    pub gateway_secret: Option<String>,
    /// Shared secret for the webhook; falls back to `gateway_secret`
    pub webhook_secret: Option<String>,
    /// HTTP listen port
    pub http_port: u16,
    /// Per-request wall-clock budget
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `INTERVALS_API_KEY` is unset or empty. A missing
    /// credential is a deployment mistake and must stop the process, not
    /// fail per request.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("INTERVALS_API_KEY")
            .context("INTERVALS_API_KEY must be set to the Intervals.icu API key")?;
        if api_key.trim().is_empty() {
            anyhow::bail!("INTERVALS_API_KEY is set but empty");
        }

        let base_url = env::var("INTERVALS_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

        let athlete_id =
            env::var("INTERVALS_ATHLETE_ID").unwrap_or_else(|_| DEFAULT_ATHLETE_ID.to_owned());

        Ok(Self {
            api_key,
            base_url,
            athlete_id,
            gateway_secret: non_empty_var("GATEWAY_SECRET"),
            webhook_secret: non_empty_var("WEBHOOK_SECRET"),
            http_port: parse_var("HTTP_PORT", DEFAULT_HTTP_PORT),
            request_timeout: Duration::from_secs(parse_var(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        })
    }

    /// Webhook secret with the documented fallback to the gateway secret
    #[must_use]
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret
            .as_deref()
            .or(self.gateway_secret.as_deref())
    }

    /// One-line startup summary, safe to log (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "upstream={} athlete={} port={} gate={} webhook_gate={} timeout={}s",
            self.base_url,
            self.athlete_id,
            self.http_port,
            if self.gateway_secret.is_some() {
                "on"
            } else {
                "off"
            },
            if self.webhook_secret().is_some() {
                "on"
            } else {
                "off"
            },
            self.request_timeout.as_secs(),
        )
    }
}

/// Read an optional env var, treating empty values as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Parse an env var with a fallback default, warning on unparsable values
fn parse_var<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{name}={raw} is not valid, using default {default}");
            default
        }),
        Err(_) => default,
    }
}
