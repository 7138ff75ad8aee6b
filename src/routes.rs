// ABOUTME: HTTP surface of the gateway: MCP endpoint, webhook, and health check
// ABOUTME: Applies the access gate, request timeout, and error-to-status mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! HTTP routes.
//!
//! Three endpoints: `POST /mcp` (JSON-RPC tool surface), `POST /webhook`
//! plus its `GET` capability descriptor, and `GET /health`. The access gate
//! runs before anything that could reach the upstream; the whole router sits
//! behind a wall-clock timeout covering one inbound request.

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::gate::AccessGate;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::ToolHandlers;
use crate::upstream::{IntervalsProvider, UpstreamClient};
use crate::webhook::{self, WebhookRouter};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all route handlers
pub struct GatewayResources {
    pub config: Arc<GatewayConfig>,
    pub api: IntervalsProvider,
    pub gate: AccessGate,
    pub webhook_gate: AccessGate,
}

impl GatewayResources {
    /// Wire up the full component stack from configuration
    #[must_use]
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        let api = IntervalsProvider::new(UpstreamClient::new(Arc::clone(&config)));
        let gate = AccessGate::new(config.gateway_secret.clone());
        let webhook_gate = AccessGate::new(config.webhook_secret().map(str::to_owned));
        Self {
            config,
            api,
            gate,
            webhook_gate,
        }
    }
}

/// Gateway route construction
pub struct GatewayRoutes;

impl GatewayRoutes {
    /// Build the router with tracing and the per-request timeout applied
    #[must_use]
    pub fn router(resources: Arc<GatewayResources>) -> Router {
        let timeout = resources.config.request_timeout;
        Router::new()
            .route("/mcp", post(Self::handle_mcp))
            .route(
                "/webhook",
                post(Self::handle_webhook).get(Self::handle_webhook_descriptor),
            )
            .route("/health", get(Self::handle_health))
            .layer(TimeoutLayer::new(timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(resources)
    }

    /// JSON-RPC endpoint for the MCP tool surface
    async fn handle_mcp(
        State(resources): State<Arc<GatewayResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, GatewayError> {
        resources.gate.authorize(&headers)?;

        let request: JsonRpcRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                let response = JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("invalid JSON-RPC request: {e}"),
                );
                return Ok(Json(response).into_response());
            }
        };

        let response = ToolHandlers::handle(request, &resources.api).await;
        Ok(Json(response).into_response())
    }

    /// Webhook mutation endpoint
    async fn handle_webhook(
        State(resources): State<Arc<GatewayResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, GatewayError> {
        resources.webhook_gate.authorize(&headers)?;

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        let result = WebhookRouter::new(&resources.api)
            .handle(content_type, &body)
            .await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Static capability descriptor; no upstream call, no gate
    async fn handle_webhook_descriptor() -> Json<serde_json::Value> {
        Json(webhook::capability_descriptor())
    }

    /// Liveness endpoint for monitoring, never gated
    async fn handle_health() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}
