// ABOUTME: Typed Intervals.icu endpoint wrappers keyed by the configured athlete id
// ABOUTME: Thin request constructors so tool handlers and pipelines stay declarative
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Endpoint surface of the upstream API.
//!
//! Each method builds one [`RequestSpec`] and runs it through the executor.
//! Paths are keyed by the configured athlete id, where `"0"` is the
//! upstream's sentinel for "the athlete who owns this API key".

use super::client::{BinaryDownload, RequestSpec, UpstreamClient, UpstreamResponse};
use crate::errors::{GatewayError, GatewayResult};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Workout export formats the upstream can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutFileFormat {
    Zwo,
    Mrc,
    Erg,
    Fit,
}

impl WorkoutFileFormat {
    /// File extension used in the download path
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zwo => "zwo",
            Self::Mrc => "mrc",
            Self::Erg => "erg",
            Self::Fit => "fit",
        }
    }
}

impl FromStr for WorkoutFileFormat {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zwo" => Ok(Self::Zwo),
            "mrc" => Ok(Self::Mrc),
            "erg" => Ok(Self::Erg),
            "fit" => Ok(Self::Fit),
            other => Err(GatewayError::InvalidInput(format!(
                "unsupported workout file format '{other}' (expected zwo, mrc, erg, or fit)"
            ))),
        }
    }
}

impl fmt::Display for WorkoutFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Typed client for the Intervals.icu REST API
#[derive(Debug, Clone)]
pub struct IntervalsProvider {
    client: UpstreamClient,
}

impl IntervalsProvider {
    #[must_use]
    pub const fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub const fn client(&self) -> &UpstreamClient {
        &self.client
    }

    fn athlete_path(&self, suffix: &str) -> String {
        format!(
            "/api/v1/athlete/{}{suffix}",
            self.client.config().athlete_id
        )
    }

    /// Run a spec and require a JSON document back. A 204 decodes to JSON
    /// null; CSV here means a routing bug and fails loudly.
    async fn execute_json(&self, spec: RequestSpec) -> GatewayResult<Value> {
        let path = spec.path.clone();
        match self.client.execute(spec).await? {
            UpstreamResponse::Json(value) => Ok(value),
            UpstreamResponse::Empty => Ok(Value::Null),
            UpstreamResponse::Csv(_) => Err(GatewayError::Internal(format!(
                "unexpected CSV payload from {path}"
            ))),
        }
    }

    /// Wellness records for an inclusive date range
    pub async fn wellness_range(&self, oldest: &str, newest: &str) -> GatewayResult<Value> {
        self.execute_json(
            RequestSpec::get(self.athlete_path("/wellness"))
                .query("oldest", oldest)
                .query("newest", newest),
        )
        .await
    }

    /// Activity summaries for a date range, optionally filtered by sport type
    pub async fn activities_range(
        &self,
        oldest: &str,
        newest: &str,
        activity_type: Option<&str>,
        limit: Option<u32>,
    ) -> GatewayResult<Value> {
        self.execute_json(
            RequestSpec::get(self.athlete_path("/activities"))
                .query("oldest", oldest)
                .query("newest", newest)
                .query_opt("type", activity_type)
                .query_opt("limit", limit),
        )
        .await
    }

    /// Activity export for a date range as raw CSV text
    pub async fn activities_csv(&self, oldest: &str, newest: &str) -> GatewayResult<String> {
        let spec = RequestSpec::get(self.athlete_path("/activities.csv"))
            .query("oldest", oldest)
            .query("newest", newest);
        let path = spec.path.clone();
        match self.client.execute(spec).await? {
            UpstreamResponse::Csv(text) => Ok(text),
            UpstreamResponse::Json(_) | UpstreamResponse::Empty => Err(GatewayError::Internal(
                format!("expected CSV payload from {path}"),
            )),
        }
    }

    /// One activity, optionally with per-interval data
    pub async fn activity(
        &self,
        activity_id: &str,
        include_intervals: bool,
    ) -> GatewayResult<Value> {
        let spec = RequestSpec::get(format!("/api/v1/activity/{activity_id}"))
            .query_opt("intervals", include_intervals.then_some("true"));
        self.execute_json(spec).await
    }

    /// Calendar events for a date range, optionally filtered by category
    pub async fn events_range(
        &self,
        oldest: &str,
        newest: &str,
        category: Option<&str>,
    ) -> GatewayResult<Value> {
        self.execute_json(
            RequestSpec::get(self.athlete_path("/events"))
                .query("oldest", oldest)
                .query("newest", newest)
                .query_opt("category", category),
        )
        .await
    }

    /// One calendar event by id
    pub async fn event(&self, event_id: &str) -> GatewayResult<Value> {
        self.execute_json(RequestSpec::get(
            self.athlete_path(&format!("/events/{event_id}")),
        ))
        .await
    }

    /// Create a calendar event
    pub async fn create_event(&self, body: Value) -> GatewayResult<Value> {
        self.execute_json(RequestSpec::new(Method::POST, self.athlete_path("/events")).body(body))
            .await
    }

    /// Partial update of a calendar event
    pub async fn update_event(&self, event_id: &str, body: Value) -> GatewayResult<Value> {
        self.execute_json(
            RequestSpec::new(Method::PUT, self.athlete_path(&format!("/events/{event_id}")))
                .body(body),
        )
        .await
    }

    /// Delete a calendar event; the upstream answers 204
    pub async fn delete_event(&self, event_id: &str) -> GatewayResult<()> {
        self.execute_json(RequestSpec::new(
            Method::DELETE,
            self.athlete_path(&format!("/events/{event_id}")),
        ))
        .await
        .map(|_| ())
    }

    /// Workout library listing
    pub async fn workouts(&self) -> GatewayResult<Value> {
        self.execute_json(RequestSpec::get(self.athlete_path("/workouts")))
            .await
    }

    /// Power curves, newest date required
    pub async fn power_curves(
        &self,
        newest: &str,
        oldest: Option<&str>,
        activity_type: Option<&str>,
    ) -> GatewayResult<Value> {
        self.execute_json(
            RequestSpec::get(self.athlete_path("/power-curves"))
                .query("newest", newest)
                .query_opt("oldest", oldest)
                .query_opt("type", activity_type),
        )
        .await
    }

    /// Athlete profile; cheap connectivity probe for the status tool
    pub async fn athlete_profile(&self) -> GatewayResult<Value> {
        self.execute_json(RequestSpec::get(self.athlete_path("")))
            .await
    }

    /// Download a workout file export in the given format
    pub async fn download_workout(
        &self,
        workout_id: &str,
        format: WorkoutFileFormat,
    ) -> GatewayResult<BinaryDownload> {
        let path = self.athlete_path(&format!(
            "/workouts/{workout_id}/download.{}",
            format.extension()
        ));
        self.client.download(&path).await
    }
}
