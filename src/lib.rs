// ABOUTME: Main library entry point for the Tempo Gateway
// ABOUTME: MCP tool surface and webhook bridge over the Intervals.icu training API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

#![deny(unsafe_code)]

//! # Tempo Gateway
//!
//! A stateless gateway that exposes the Intervals.icu training platform to
//! LLM clients over the Model Context Protocol, and accepts calendar event
//! mutations over a webhook endpoint.
//!
//! ## Architecture
//!
//! - **Upstream**: authenticated request executor with rate-limit retry and
//!   content-type-aware decoding, plus typed endpoint wrappers
//! - **MCP**: tool schema declarations and tool call routing over JSON-RPC
//! - **Pipelines**: read compositions joining several upstream calls into
//!   one document
//! - **Webhook**: action router normalizing loose payloads into typed
//!   create/update/delete requests
//! - **Gate**: optional shared-secret check in front of both surfaces
//!
//! Nothing is cached and nothing outlives the request that created it; the
//! only process-wide state is the configuration resolved at startup.

/// Environment-resolved gateway configuration
pub mod config;

/// Unified error taxonomy and HTTP response mapping
pub mod errors;

/// Shared-secret access gate
pub mod gate;

/// JSON-RPC 2.0 foundation for the MCP surface
pub mod jsonrpc;

/// Logging configuration and setup
pub mod logging;

/// MCP protocol schema and tool execution
pub mod mcp;

/// Aggregation pipelines over the upstream API
pub mod pipelines;

/// HTTP routes and shared server state
pub mod routes;

/// Upstream service access
pub mod upstream;

/// Webhook action router
pub mod webhook;
