// ABOUTME: Upstream service access: request executor and typed endpoint wrappers
// ABOUTME: Everything that talks to Intervals.icu lives under this module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Upstream service access.

/// Typed endpoint wrappers over the executor
pub mod api;

/// Authenticated request executor and binary download adapter
pub mod client;

pub use api::{IntervalsProvider, WorkoutFileFormat};
pub use client::{BinaryDownload, RequestSpec, RetryConfig, UpstreamClient, UpstreamResponse};
