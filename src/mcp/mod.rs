// ABOUTME: MCP protocol surface: schema declarations and tool execution
// ABOUTME: JSON-RPC method handling lives here, HTTP transport in routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Model Context Protocol surface.

/// Protocol schema types and the declared tool list
pub mod schema;

/// Tool call routing and execution
pub mod tools;

pub use schema::{tool_schemas, Content, ToolResponse, ToolSchema};
pub use tools::ToolHandlers;
