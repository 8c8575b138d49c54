#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics aggregation engine for accessibility reports and emotions.
//!
//! Turns snapshots of [`Report`](access_map_report_models::Report) and
//! [`Emotion`](access_map_report_models::Emotion) records into
//! percentage-normalized breakdowns, groups them by area, and renders the
//! resulting statistics into prompts for narrative generation.
//!
//! Everything here is synchronous and pure. Callers fetch the records and
//! invoke the narrative generator; this crate only shapes data.

pub mod areas;
pub mod breakdown;
pub mod prompts;

#[cfg(test)]
pub(crate) mod fixtures {
    use access_map_report_models::{
        Coordinate, Emotion, EmotionKind, IssueType, Location, LocationRef, Report, UserType,
    };
    use uuid::Uuid;

    pub fn location(name: &str, area: &str) -> Location {
        Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
            area: area.to_string(),
            coordinates: vec![Coordinate::new(-87.62, 41.88)],
        }
    }

    pub fn report(issue_type: IssueType, location: &Location) -> Report {
        report_at(issue_type, LocationRef::Resolved(location.clone()))
    }

    pub fn report_at(issue_type: IssueType, location: LocationRef) -> Report {
        let now = chrono::Utc::now();
        Report {
            id: Uuid::new_v4(),
            user_type: UserType::GeneralPublic,
            issue_type,
            description: format!("{issue_type} here"),
            location,
            coordinates: Coordinate::new(-87.62, 41.88),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn emotion(kind: EmotionKind, location: &Location) -> Emotion {
        emotion_at(kind, LocationRef::Resolved(location.clone()))
    }

    pub fn emotion_at(kind: EmotionKind, location: LocationRef) -> Emotion {
        let now = chrono::Utc::now();
        Emotion {
            id: Uuid::new_v4(),
            emotion: kind,
            user_type: UserType::Elderly,
            description: None,
            location,
            created_at: now,
            updated_at: now,
        }
    }
}
