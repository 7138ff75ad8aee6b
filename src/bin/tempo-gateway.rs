// ABOUTME: Server binary wiring configuration, logging, and the HTTP listener
// ABOUTME: Fails fast on missing credentials before binding anything
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! # Tempo Gateway Server Binary
//!
//! Resolves configuration from the environment, initializes logging, and
//! serves the MCP and webhook surfaces on one HTTP port.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tempo_gateway::config::GatewayConfig;
use tempo_gateway::logging;
use tempo_gateway::routes::{GatewayResources, GatewayRoutes};
use tracing::info;

#[derive(Parser)]
#[command(name = "tempo-gateway")]
#[command(about = "Tempo Gateway - MCP gateway for the Intervals.icu training API")]
struct Args {
    /// Override the HTTP listen port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = GatewayConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("starting tempo-gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(GatewayResources::new(Arc::new(config)));
    let router = GatewayRoutes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
