// ABOUTME: Logging configuration and tracing-subscriber setup for the gateway
// ABOUTME: Env-selectable output format with RUST_LOG filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Structured logging setup.
//!
//! `RUST_LOG` controls the filter (default `info`); `LOG_FORMAT` selects
//! `pretty`, `json`, or `compact` output. Initialized once by the server
//! binary before anything else logs.

use anyhow::Result;
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format for production log shipping
    Json,
    /// Human-readable format for development
    Pretty,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    /// Read the format from `LOG_FORMAT`, defaulting to pretty
    #[must_use]
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => Self::Json,
            Ok("compact") => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber from the environment.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_from_env() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()?,
    }

    Ok(())
}
