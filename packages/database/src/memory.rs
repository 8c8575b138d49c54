//! In-process [`RecordStore`] kept behind a lock.
//!
//! Records are stored with an unresolved location reference and expanded
//! against the current location table on every read, so deleting a
//! location is immediately visible in its reports and emotions.

use std::sync::{PoisonError, RwLock};

use access_map_report_models::{
    Emotion, Location, LocationRef, LocationUpdate, NewEmotion, NewLocation, NewReport, Report,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{RecordFilter, RecordStore, StoreError};

#[derive(Default)]
struct Tables {
    locations: Vec<Location>,
    reports: Vec<Report>,
    emotions: Vec<Emotion>,
}

impl Tables {
    fn resolve(&self, id: Uuid) -> LocationRef {
        self.locations
            .iter()
            .find(|l| l.id == id)
            .map_or(LocationRef::Unresolved(id), |l| {
                LocationRef::Resolved(l.clone())
            })
    }
}

/// Record store held entirely in memory. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn locations(&self, area: Option<&str>) -> Result<Vec<Location>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .locations
            .iter()
            .filter(|l| area.is_none_or(|area| l.area == area))
            .cloned()
            .collect())
    }

    async fn location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn reports(&self, filter: &RecordFilter) -> Result<Vec<Report>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .reports
            .iter()
            .filter_map(|report| {
                let location = tables.resolve(report.location.id());
                filter
                    .matches(location.id(), location.area())
                    .then(|| Report {
                        location,
                        ..report.clone()
                    })
            })
            .collect())
    }

    async fn emotions(&self, filter: &RecordFilter) -> Result<Vec<Emotion>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .emotions
            .iter()
            .filter_map(|emotion| {
                let location = tables.resolve(emotion.location.id());
                filter
                    .matches(location.id(), location.area())
                    .then(|| Emotion {
                        location,
                        ..emotion.clone()
                    })
            })
            .collect())
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        let location = Location {
            id: Uuid::new_v4(),
            name: location.name,
            area: location.area,
            coordinates: location.coordinates,
        };
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.locations.push(location.clone());
        Ok(location)
    }

    async fn update_location(
        &self,
        id: Uuid,
        update: LocationUpdate,
    ) -> Result<Option<Location>, StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .locations
            .iter_mut()
            .find(|l| l.id == id)
            .map(|location| {
                update.apply(location);
                location.clone()
            }))
    }

    async fn delete_location(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let before = tables.locations.len();
        tables.locations.retain(|l| l.id != id);
        Ok(tables.locations.len() < before)
    }

    async fn insert_report(&self, report: NewReport) -> Result<Report, StoreError> {
        let now = Utc::now();
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let stored = Report {
            id: Uuid::new_v4(),
            user_type: report.user_type,
            issue_type: report.issue_type,
            description: report.description,
            location: LocationRef::Unresolved(report.location_id),
            coordinates: report.coordinates,
            created_at: now,
            updated_at: now,
        };
        let resolved = Report {
            location: tables.resolve(report.location_id),
            ..stored.clone()
        };
        tables.reports.push(stored);
        Ok(resolved)
    }

    async fn insert_emotion(&self, emotion: NewEmotion) -> Result<Emotion, StoreError> {
        let now = Utc::now();
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let stored = Emotion {
            id: Uuid::new_v4(),
            emotion: emotion.emotion,
            user_type: emotion.user_type,
            description: emotion.description,
            location: LocationRef::Unresolved(emotion.location_id),
            created_at: now,
            updated_at: now,
        };
        let resolved = Emotion {
            location: tables.resolve(emotion.location_id),
            ..stored.clone()
        };
        tables.emotions.push(stored);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use access_map_report_models::{Coordinate, EmotionKind, IssueType, UserType};

    use super::*;

    fn new_location(name: &str, area: &str) -> NewLocation {
        NewLocation {
            name: name.to_string(),
            area: area.to_string(),
            coordinates: vec![Coordinate::new(3.0, 4.0)],
        }
    }

    fn new_report(location_id: Uuid) -> NewReport {
        NewReport {
            user_type: UserType::BikeUser,
            issue_type: IssueType::PoorLighting,
            description: "Dark underpass".to_string(),
            location_id,
            coordinates: Coordinate::new(3.0, 4.0),
        }
    }

    #[tokio::test]
    async fn filters_by_area_and_location() {
        let store = MemoryRecordStore::new();
        let a = store.insert_location(new_location("A", "North")).await.unwrap();
        let b = store.insert_location(new_location("B", "South")).await.unwrap();

        store.insert_report(new_report(a.id)).await.unwrap();
        store.insert_report(new_report(b.id)).await.unwrap();
        store.insert_report(new_report(b.id)).await.unwrap();

        assert_eq!(store.reports(&RecordFilter::All).await.unwrap().len(), 3);
        assert_eq!(
            store
                .reports(&RecordFilter::Area("South".to_string()))
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            store
                .reports(&RecordFilter::Location(a.id))
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.locations(Some("North")).await.unwrap(), vec![a]);
        assert_eq!(store.locations(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn references_follow_location_changes() {
        let store = MemoryRecordStore::new();
        let a = store.insert_location(new_location("A", "North")).await.unwrap();

        let emotion = store
            .insert_emotion(NewEmotion {
                emotion: EmotionKind::Good,
                user_type: UserType::GeneralPublic,
                description: Some("Wide paths".to_string()),
                location_id: a.id,
            })
            .await
            .unwrap();
        assert_eq!(emotion.location.area(), Some("North"));

        store
            .update_location(
                a.id,
                LocationUpdate {
                    area: Some("East".to_string()),
                    ..LocationUpdate::default()
                },
            )
            .await
            .unwrap();
        let emotions = store.emotions(&RecordFilter::All).await.unwrap();
        assert_eq!(emotions[0].location.area(), Some("East"));

        assert!(store.delete_location(a.id).await.unwrap());
        let emotions = store.emotions(&RecordFilter::All).await.unwrap();
        assert_eq!(emotions[0].location, LocationRef::Unresolved(a.id));
        assert!(
            store
                .emotions(&RecordFilter::Area("East".to_string()))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn report_for_missing_location_is_unresolved() {
        let store = MemoryRecordStore::new();
        let missing = Uuid::new_v4();
        let report = store.insert_report(new_report(missing)).await.unwrap();
        assert_eq!(report.location, LocationRef::Unresolved(missing));
    }
}
