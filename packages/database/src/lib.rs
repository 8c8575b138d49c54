#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store for locations, reports, and emotion ratings.
//!
//! [`RecordStore`] is the seam the server and analytics depend on. Reads of
//! reports and emotions expand each record's location reference: a record
//! whose location no longer exists comes back as
//! [`LocationRef::Unresolved`](access_map_report_models::LocationRef::Unresolved).
//!
//! Two implementations are provided: [`queries::SqliteRecordStore`], backed
//! by `switchy_database` over `SQLite`, and [`memory::MemoryRecordStore`].

pub mod db;
pub mod memory;
pub mod queries;

use access_map_report_models::{
    Emotion, Location, LocationUpdate, NewEmotion, NewLocation, NewReport, Report,
};
use uuid::Uuid;

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An I/O operation failed (e.g., creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Which reports or emotions to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every record.
    All,
    /// Records owned by one location.
    Location(Uuid),
    /// Records whose resolved location belongs to this area.
    Area(String),
}

impl RecordFilter {
    /// Whether a record owned by `location_id` in `area` passes the filter.
    #[must_use]
    pub fn matches(&self, location_id: Uuid, area: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Location(id) => *id == location_id,
            Self::Area(name) => area == Some(name.as_str()),
        }
    }
}

/// Persistent storage for access map records.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Lists locations, optionally restricted to one area.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn locations(&self, area: Option<&str>) -> Result<Vec<Location>, StoreError>;

    /// Fetches one location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn location(&self, id: Uuid) -> Result<Option<Location>, StoreError>;

    /// Lists reports with their location reference expanded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn reports(&self, filter: &RecordFilter) -> Result<Vec<Report>, StoreError>;

    /// Lists emotion ratings with their location reference expanded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn emotions(&self, filter: &RecordFilter) -> Result<Vec<Emotion>, StoreError>;

    /// Stores a new location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails.
    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError>;

    /// Applies a partial update. Returns `None` if the location does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the update fails.
    async fn update_location(
        &self,
        id: Uuid,
        update: LocationUpdate,
    ) -> Result<Option<Location>, StoreError>;

    /// Deletes a location. Returns `false` if it did not exist.
    ///
    /// Reports and emotions that referenced it are kept and will read back
    /// with an unresolved location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    async fn delete_location(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Stores a new report.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails.
    async fn insert_report(&self, report: NewReport) -> Result<Report, StoreError>;

    /// Stores a new emotion rating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails.
    async fn insert_emotion(&self, emotion: NewEmotion) -> Result<Emotion, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matching() {
        let id = Uuid::new_v4();
        assert!(RecordFilter::All.matches(id, None));
        assert!(RecordFilter::Location(id).matches(id, None));
        assert!(!RecordFilter::Location(Uuid::new_v4()).matches(id, Some("Downtown")));
        assert!(RecordFilter::Area("Downtown".to_string()).matches(id, Some("Downtown")));
        assert!(!RecordFilter::Area("Downtown".to_string()).matches(id, None));
    }
}
