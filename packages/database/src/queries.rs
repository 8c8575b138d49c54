//! `SQLite`-backed [`RecordStore`] using `switchy_database`.

use std::fmt::Debug;
use std::str::FromStr;

use access_map_report_models::{
    Coordinate, Emotion, Location, LocationRef, LocationUpdate, NewEmotion, NewLocation,
    NewReport, Report,
};
use chrono::{DateTime, Utc};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::{RecordFilter, RecordStore, StoreError};

const LOCATION_COLUMNS: &str = "l.name AS location_name, l.area AS location_area, \
     l.coordinates AS location_coordinates";

/// Record store over a `switchy_database` connection.
pub struct SqliteRecordStore {
    db: Box<dyn Database>,
}

impl SqliteRecordStore {
    /// Wraps a connection whose schema has already been ensured (see
    /// [`crate::db::open_db`]).
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db }
    }
}

fn conversion(column: &str, detail: impl Debug) -> StoreError {
    StoreError::Conversion {
        message: format!("column '{column}': {detail:?}"),
    }
}

fn text(row: &switchy_database::Row, column: &str) -> Result<String, StoreError> {
    row.to_value::<String>(column)
        .map_err(|e| conversion(column, e))
}

fn parsed<T>(row: &switchy_database::Row, column: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Debug,
{
    text(row, column)?
        .parse()
        .map_err(|e| conversion(column, e))
}

fn timestamp(row: &switchy_database::Row, column: &str) -> Result<DateTime<Utc>, StoreError> {
    let value = text(row, column)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion(column, e))
}

fn row_to_location(row: &switchy_database::Row) -> Result<Location, StoreError> {
    Ok(Location {
        id: parsed(row, "id")?,
        name: text(row, "name")?,
        area: text(row, "area")?,
        coordinates: serde_json::from_str(&text(row, "coordinates")?)?,
    })
}

/// Builds the location reference from the `LEFT JOIN`ed location columns.
fn joined_location(
    row: &switchy_database::Row,
    location_id: Uuid,
) -> Result<LocationRef, StoreError> {
    let name: Option<String> = row.to_value("location_name").unwrap_or(None);
    let area: Option<String> = row.to_value("location_area").unwrap_or(None);
    let coordinates: Option<String> = row.to_value("location_coordinates").unwrap_or(None);

    Ok(match (name, area, coordinates) {
        (Some(name), Some(area), Some(coordinates)) => LocationRef::Resolved(Location {
            id: location_id,
            name,
            area,
            coordinates: serde_json::from_str(&coordinates)?,
        }),
        _ => LocationRef::Unresolved(location_id),
    })
}

fn row_to_report(row: &switchy_database::Row) -> Result<Report, StoreError> {
    let location_id = parsed(row, "location_id")?;
    let longitude: f64 = row
        .to_value("longitude")
        .map_err(|e| conversion("longitude", e))?;
    let latitude: f64 = row
        .to_value("latitude")
        .map_err(|e| conversion("latitude", e))?;

    Ok(Report {
        id: parsed(row, "id")?,
        user_type: parsed(row, "user_type")?,
        issue_type: parsed(row, "issue_type")?,
        description: text(row, "description")?,
        location: joined_location(row, location_id)?,
        coordinates: Coordinate::new(longitude, latitude),
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn row_to_emotion(row: &switchy_database::Row) -> Result<Emotion, StoreError> {
    let location_id = parsed(row, "location_id")?;

    Ok(Emotion {
        id: parsed(row, "id")?,
        emotion: parsed(row, "emotion")?,
        user_type: parsed(row, "user_type")?,
        description: row.to_value("description").unwrap_or(None),
        location: joined_location(row, location_id)?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

/// Builds the WHERE clause for `filter` against a record table aliased
/// `alias` joined to `locations l`.
fn where_clause(filter: &RecordFilter, alias: &str) -> (String, Vec<DatabaseValue>) {
    match filter {
        RecordFilter::All => (String::new(), Vec::new()),
        RecordFilter::Location(id) => (
            format!(" WHERE {alias}.location_id = $1"),
            vec![DatabaseValue::String(id.to_string())],
        ),
        RecordFilter::Area(area) => (
            " WHERE l.area = $1".to_string(),
            vec![DatabaseValue::String(area.clone())],
        ),
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteRecordStore {
    async fn locations(&self, area: Option<&str>) -> Result<Vec<Location>, StoreError> {
        let rows = match area {
            Some(area) => {
                self.db
                    .query_raw_params(
                        "SELECT * FROM locations WHERE area = $1 ORDER BY rowid",
                        &[DatabaseValue::String(area.to_string())],
                    )
                    .await?
            }
            None => {
                self.db
                    .query_raw_params("SELECT * FROM locations ORDER BY rowid", &[])
                    .await?
            }
        };

        rows.iter().map(row_to_location).collect()
    }

    async fn location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT * FROM locations WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await?;

        rows.first().map(row_to_location).transpose()
    }

    async fn reports(&self, filter: &RecordFilter) -> Result<Vec<Report>, StoreError> {
        let (wc, params) = where_clause(filter, "r");
        let sql = format!(
            "SELECT r.*, {LOCATION_COLUMNS}
             FROM reports r
             LEFT JOIN locations l ON l.id = r.location_id{wc}
             ORDER BY r.rowid"
        );

        let rows = self.db.query_raw_params(&sql, &params).await?;
        log::debug!("Fetched {} reports for {filter:?}", rows.len());

        rows.iter().map(row_to_report).collect()
    }

    async fn emotions(&self, filter: &RecordFilter) -> Result<Vec<Emotion>, StoreError> {
        let (wc, params) = where_clause(filter, "e");
        let sql = format!(
            "SELECT e.*, {LOCATION_COLUMNS}
             FROM emotions e
             LEFT JOIN locations l ON l.id = e.location_id{wc}
             ORDER BY e.rowid"
        );

        let rows = self.db.query_raw_params(&sql, &params).await?;
        log::debug!("Fetched {} emotions for {filter:?}", rows.len());

        rows.iter().map(row_to_emotion).collect()
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        let location = Location {
            id: Uuid::new_v4(),
            name: location.name,
            area: location.area,
            coordinates: location.coordinates,
        };

        self.db
            .exec_raw_params(
                "INSERT INTO locations (id, name, area, coordinates) VALUES ($1, $2, $3, $4)",
                &[
                    DatabaseValue::String(location.id.to_string()),
                    DatabaseValue::String(location.name.clone()),
                    DatabaseValue::String(location.area.clone()),
                    DatabaseValue::String(serde_json::to_string(&location.coordinates)?),
                ],
            )
            .await?;

        Ok(location)
    }

    async fn update_location(
        &self,
        id: Uuid,
        update: LocationUpdate,
    ) -> Result<Option<Location>, StoreError> {
        let Some(mut location) = self.location(id).await? else {
            return Ok(None);
        };
        update.apply(&mut location);

        self.db
            .exec_raw_params(
                "UPDATE locations SET name = $1, area = $2, coordinates = $3 WHERE id = $4",
                &[
                    DatabaseValue::String(location.name.clone()),
                    DatabaseValue::String(location.area.clone()),
                    DatabaseValue::String(serde_json::to_string(&location.coordinates)?),
                    DatabaseValue::String(id.to_string()),
                ],
            )
            .await?;

        Ok(Some(location))
    }

    async fn delete_location(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .db
            .exec_raw_params(
                "DELETE FROM locations WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await?;

        Ok(deleted > 0)
    }

    async fn insert_report(&self, report: NewReport) -> Result<Report, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        self.db
            .exec_raw_params(
                "INSERT INTO reports (id, user_type, issue_type, description, location_id,
                                      longitude, latitude, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    DatabaseValue::String(id.to_string()),
                    DatabaseValue::String(report.user_type.to_string()),
                    DatabaseValue::String(report.issue_type.to_string()),
                    DatabaseValue::String(report.description.clone()),
                    DatabaseValue::String(report.location_id.to_string()),
                    DatabaseValue::Real64(report.coordinates.longitude()),
                    DatabaseValue::Real64(report.coordinates.latitude()),
                    DatabaseValue::String(now.to_rfc3339()),
                    DatabaseValue::String(now.to_rfc3339()),
                ],
            )
            .await?;

        let location = self
            .location(report.location_id)
            .await?
            .map_or(LocationRef::Unresolved(report.location_id), LocationRef::Resolved);

        Ok(Report {
            id,
            user_type: report.user_type,
            issue_type: report.issue_type,
            description: report.description,
            location,
            coordinates: report.coordinates,
            created_at: now,
            updated_at: now,
        })
    }

    async fn insert_emotion(&self, emotion: NewEmotion) -> Result<Emotion, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        self.db
            .exec_raw_params(
                "INSERT INTO emotions (id, emotion, user_type, description, location_id,
                                       created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    DatabaseValue::String(id.to_string()),
                    DatabaseValue::String(emotion.emotion.to_string()),
                    DatabaseValue::String(emotion.user_type.to_string()),
                    emotion
                        .description
                        .clone()
                        .map_or(DatabaseValue::Null, DatabaseValue::String),
                    DatabaseValue::String(emotion.location_id.to_string()),
                    DatabaseValue::String(now.to_rfc3339()),
                    DatabaseValue::String(now.to_rfc3339()),
                ],
            )
            .await?;

        let location = self
            .location(emotion.location_id)
            .await?
            .map_or(LocationRef::Unresolved(emotion.location_id), LocationRef::Resolved);

        Ok(Emotion {
            id,
            emotion: emotion.emotion,
            user_type: emotion.user_type,
            description: emotion.description,
            location,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use access_map_report_models::{EmotionKind, IssueType, UserType};

    use super::*;
    use crate::db::open_db;

    async fn temp_store(name: &str) -> (SqliteRecordStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("access_map_{name}_{}", Uuid::new_v4()));
        let db = open_db(&dir.join("records.db")).await.unwrap();
        (SqliteRecordStore::new(db), dir)
    }

    fn new_location(name: &str, area: &str) -> NewLocation {
        NewLocation {
            name: name.to_string(),
            area: area.to_string(),
            coordinates: vec![Coordinate::new(-87.62, 41.88), Coordinate::new(-87.63, 41.89)],
        }
    }

    fn new_report(issue_type: IssueType, location_id: Uuid) -> NewReport {
        NewReport {
            user_type: UserType::Pwd,
            issue_type,
            description: "Kerb too high".to_string(),
            location_id,
            coordinates: Coordinate::new(-87.62, 41.88),
        }
    }

    #[tokio::test]
    async fn stores_and_expands_records() {
        let (store, dir) = temp_store("expand").await;

        let main = store.insert_location(new_location("Main St", "Downtown")).await.unwrap();
        let park = store.insert_location(new_location("Park Ave", "Riverside")).await.unwrap();

        store.insert_report(new_report(IssueType::NoRamps, main.id)).await.unwrap();
        store.insert_report(new_report(IssueType::Other, park.id)).await.unwrap();
        store
            .insert_emotion(NewEmotion {
                emotion: EmotionKind::Uneasy,
                user_type: UserType::Elderly,
                description: None,
                location_id: main.id,
            })
            .await
            .unwrap();

        let all = store.reports(&RecordFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].issue_type, IssueType::NoRamps);
        assert_eq!(all[0].location, LocationRef::Resolved(main.clone()));

        let downtown = store
            .reports(&RecordFilter::Area("Downtown".to_string()))
            .await
            .unwrap();
        assert_eq!(downtown.len(), 1);

        let at_park = store.reports(&RecordFilter::Location(park.id)).await.unwrap();
        assert_eq!(at_park[0].issue_type, IssueType::Other);

        let emotions = store.emotions(&RecordFilter::Location(main.id)).await.unwrap();
        assert_eq!(emotions.len(), 1);
        assert_eq!(emotions[0].emotion, EmotionKind::Uneasy);
        assert_eq!(emotions[0].description, None);

        assert_eq!(store.locations(Some("Riverside")).await.unwrap(), vec![park]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn deleted_location_leaves_unresolved_references() {
        let (store, dir) = temp_store("delete").await;

        let main = store.insert_location(new_location("Main St", "Downtown")).await.unwrap();
        store.insert_report(new_report(IssueType::Obstruction, main.id)).await.unwrap();

        assert!(store.delete_location(main.id).await.unwrap());
        assert!(!store.delete_location(main.id).await.unwrap());
        assert!(store.location(main.id).await.unwrap().is_none());

        let reports = store.reports(&RecordFilter::All).await.unwrap();
        assert_eq!(reports[0].location, LocationRef::Unresolved(main.id));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn updates_location_fields() {
        let (store, dir) = temp_store("update").await;

        let main = store.insert_location(new_location("Main St", "Downtown")).await.unwrap();
        let updated = store
            .update_location(
                main.id,
                LocationUpdate {
                    area: Some("Midtown".to_string()),
                    ..LocationUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.area, "Midtown");
        assert_eq!(updated.name, "Main St");
        assert_eq!(store.location(main.id).await.unwrap(), Some(updated));
        assert!(
            store
                .update_location(Uuid::new_v4(), LocationUpdate::default())
                .await
                .unwrap()
                .is_none()
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
