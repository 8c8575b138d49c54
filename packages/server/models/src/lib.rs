#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the access map server.
//!
//! Record payloads (`NewLocation`, `NewReport`, ...) are served as-is from
//! the record models; this crate only holds the envelopes and query
//! parameters specific to the HTTP surface.

use access_map_analytics_models::{AreaBundle, BreakdownEntry};
use access_map_report_models::Category;
use serde::{Deserialize, Serialize};

/// Query parameters for the area-scoped narrative report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaReportParams {
    /// Area to report on.
    pub area_name: Option<String>,
}

/// Query parameters for location-scoped endpoints.
///
/// The ID is kept as a string so a malformed value can be reported as a
/// validation error rather than an extractor failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationParams {
    /// Location to report on.
    pub location_id: Option<String>,
}

/// A generated narrative report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Narrative text.
    pub report: String,
}

/// Per-area statistics for every area.
#[derive(Debug, Clone, Serialize)]
pub struct AreasResponse {
    /// One bundle per area.
    pub areas: Vec<AreaBundle>,
}

/// A single breakdown, e.g. issue types at one location.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "C: Category")]
pub struct BreakdownResponse<C> {
    /// Breakdown entries in first-encountered order.
    pub report: Vec<BreakdownEntry<C>>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// User-facing message.
    pub message: String,
    /// Internal detail, only included in development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Acknowledgement text.
    pub message: String,
}
