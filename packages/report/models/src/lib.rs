#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Location, accessibility report, and emotion record types.
//!
//! This crate defines the canonical records collected by the access map:
//! named locations grouped into areas, citizen accessibility reports, and
//! emotional-response ratings. Reports and emotions reference their owning
//! [`Location`] by identity; when read with reference expansion the
//! reference is either [`LocationRef::Resolved`] or, if the location no
//! longer exists, [`LocationRef::Unresolved`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A closed categorical dimension that records can be broken down by.
///
/// Implementors are fieldless enums whose variants are listed in
/// declaration order by [`Category::all`] and indexed densely from zero by
/// [`Category::index`].
pub trait Category: Copy + Eq + std::fmt::Display + Serialize + 'static {
    /// JSON key under which the category label is emitted in a breakdown
    /// entry (e.g. `"type"` for issue types).
    const FIELD: &'static str;

    /// Returns all variants of this enum.
    fn all() -> &'static [Self];

    /// Returns the dense zero-based index of this variant.
    fn index(self) -> usize;
}

/// Who submitted a report or emotion rating.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserType {
    /// Member of the general public.
    GeneralPublic,
    /// Elderly pedestrian.
    Elderly,
    /// Person with a disability.
    Pwd,
    /// Cyclist.
    BikeUser,
}

impl Category for UserType {
    const FIELD: &'static str = "userType";

    fn all() -> &'static [Self] {
        &[Self::GeneralPublic, Self::Elderly, Self::Pwd, Self::BikeUser]
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Kind of accessibility problem described by a report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueType {
    /// Cracked, uneven, or broken pavement.
    BrokenPavement,
    /// No sidewalk at all.
    MissingSidewalk,
    /// Something blocking the path.
    Obstruction,
    /// Kerbs without ramps.
    NoRamps,
    /// Insufficient street lighting.
    PoorLighting,
    /// Anything not covered above.
    #[serde(rename = "others", alias = "other")]
    #[strum(to_string = "others", serialize = "other")]
    Other,
}

impl Category for IssueType {
    const FIELD: &'static str = "type";

    fn all() -> &'static [Self] {
        &[
            Self::BrokenPavement,
            Self::MissingSidewalk,
            Self::Obstruction,
            Self::NoRamps,
            Self::PoorLighting,
            Self::Other,
        ]
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// How a person felt at a location, from best to worst.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmotionKind {
    /// Felt good.
    #[serde(alias = "good!")]
    #[strum(to_string = "good", serialize = "good!")]
    Good,
    /// Felt okay.
    #[serde(alias = "okay!")]
    #[strum(to_string = "okay", serialize = "okay!")]
    Okay,
    /// No particular feeling.
    Neutral,
    /// Felt uneasy.
    Uneasy,
    /// Felt unsafe.
    Unsafe,
}

impl Category for EmotionKind {
    const FIELD: &'static str = "emotion";

    fn all() -> &'static [Self] {
        &[
            Self::Good,
            Self::Okay,
            Self::Neutral,
            Self::Uneasy,
            Self::Unsafe,
        ]
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A `[longitude, latitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate(pub [f64; 2]);

impl Coordinate {
    /// Creates a coordinate from longitude and latitude.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self([longitude, latitude])
    }

    /// Longitude component.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.0[0]
    }

    /// Latitude component.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.0[1]
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// A named place belonging to an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Unique location ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Area this location is grouped under.
    pub area: String,
    /// Outline of the location as ordered coordinate pairs.
    pub coordinates: Vec<Coordinate>,
}

/// A record's reference to its owning [`Location`].
///
/// Serialized as the full location object when resolved, or as the bare
/// location ID when the location could not be found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationRef {
    /// The referenced location exists.
    Resolved(Location),
    /// The referenced location does not exist (e.g. it was deleted).
    Unresolved(Uuid),
}

impl LocationRef {
    /// The referenced location ID.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Resolved(location) => location.id,
            Self::Unresolved(id) => *id,
        }
    }

    /// Area of the referenced location, if it resolved.
    #[must_use]
    pub fn area(&self) -> Option<&str> {
        match self {
            Self::Resolved(location) => Some(&location.area),
            Self::Unresolved(_) => None,
        }
    }

    /// The resolved location, if any.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::Resolved(location) => Some(location),
            Self::Unresolved(_) => None,
        }
    }
}

/// A citizen-submitted accessibility report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique report ID.
    pub id: Uuid,
    /// Who submitted the report.
    pub user_type: UserType,
    /// What kind of problem was reported.
    pub issue_type: IssueType,
    /// Free-text description.
    pub description: String,
    /// Owning location.
    pub location: LocationRef,
    /// Where exactly the problem is.
    pub coordinates: Coordinate,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// When the report was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An emotional-response rating for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emotion {
    /// Unique emotion ID.
    pub id: Uuid,
    /// How the person felt.
    pub emotion: EmotionKind,
    /// Who submitted the rating.
    pub user_type: UserType,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Owning location.
    pub location: LocationRef,
    /// When the rating was created.
    pub created_at: DateTime<Utc>,
    /// When the rating was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Error returned when a new or updated record fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecordError {
    /// Human-readable reason.
    pub message: String,
}

impl InvalidRecordError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InvalidRecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvalidRecordError {}

const INVALID_COORDINATES: &str =
    "Invalid coordinates format. Expected array of [longitude, latitude] pairs";

fn require_text(value: &str, field: &str) -> Result<(), InvalidRecordError> {
    if value.trim().is_empty() {
        return Err(InvalidRecordError::new(format!("{field} is required")));
    }
    Ok(())
}

fn validate_outline(coordinates: &[Coordinate]) -> Result<(), InvalidRecordError> {
    if coordinates.is_empty() || !coordinates.iter().all(|c| c.is_finite()) {
        return Err(InvalidRecordError::new(INVALID_COORDINATES));
    }
    Ok(())
}

/// Payload for creating a [`Location`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    /// Display name.
    pub name: String,
    /// Area name.
    pub area: String,
    /// Outline coordinates.
    pub coordinates: Vec<Coordinate>,
}

impl NewLocation {
    /// Checks required fields and coordinate validity.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError`] if the name or area is blank, or the
    /// outline is empty or contains a non-finite component.
    pub fn validate(&self) -> Result<(), InvalidRecordError> {
        require_text(&self.name, "name")?;
        require_text(&self.area, "area")?;
        validate_outline(&self.coordinates)
    }
}

/// Partial update for a [`Location`]. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New area name.
    pub area: Option<String>,
    /// New outline coordinates.
    pub coordinates: Option<Vec<Coordinate>>,
}

impl LocationUpdate {
    /// Checks the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError`] if a present field is invalid.
    pub fn validate(&self) -> Result<(), InvalidRecordError> {
        if let Some(name) = &self.name {
            require_text(name, "name")?;
        }
        if let Some(area) = &self.area {
            require_text(area, "area")?;
        }
        if let Some(coordinates) = &self.coordinates {
            validate_outline(coordinates)?;
        }
        Ok(())
    }

    /// Applies this update to `location` in place.
    pub fn apply(self, location: &mut Location) {
        if let Some(name) = self.name {
            location.name = name;
        }
        if let Some(area) = self.area {
            location.area = area;
        }
        if let Some(coordinates) = self.coordinates {
            location.coordinates = coordinates;
        }
    }
}

/// Payload for creating a [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    /// Who is submitting.
    pub user_type: UserType,
    /// What kind of problem.
    pub issue_type: IssueType,
    /// Free-text description.
    pub description: String,
    /// Owning location ID.
    pub location_id: Uuid,
    /// Where exactly the problem is.
    pub coordinates: Coordinate,
}

impl NewReport {
    /// Checks the description and coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError`] if the description is blank or the
    /// coordinate pair is not finite.
    pub fn validate(&self) -> Result<(), InvalidRecordError> {
        require_text(&self.description, "description")?;
        if !self.coordinates.is_finite() {
            return Err(InvalidRecordError::new(format!(
                "{:?} is not a valid coordinate pair!",
                self.coordinates.0
            )));
        }
        Ok(())
    }
}

/// Payload for creating an [`Emotion`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmotion {
    /// How the person felt.
    pub emotion: EmotionKind,
    /// Who is submitting.
    pub user_type: UserType,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Owning location ID.
    pub location_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_matches_position<C: Category + std::fmt::Debug>() {
        for (position, variant) in C::all().iter().enumerate() {
            assert_eq!(variant.index(), position, "{variant:?} index out of order");
        }
    }

    #[test]
    fn category_indices_are_dense() {
        index_matches_position::<UserType>();
        index_matches_position::<IssueType>();
        index_matches_position::<EmotionKind>();
    }

    #[test]
    fn issue_type_accepts_other_alias() {
        assert_eq!("other".parse::<IssueType>().unwrap(), IssueType::Other);
        assert_eq!("others".parse::<IssueType>().unwrap(), IssueType::Other);
        assert_eq!(IssueType::Other.to_string(), "others");
        assert_eq!(IssueType::NoRamps.to_string(), "no_ramps");

        let parsed: IssueType = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(parsed, IssueType::Other);
    }

    #[test]
    fn emotion_accepts_legacy_exclamation_values() {
        let good: EmotionKind = serde_json::from_str("\"good!\"").unwrap();
        assert_eq!(good, EmotionKind::Good);
        assert_eq!("okay!".parse::<EmotionKind>().unwrap(), EmotionKind::Okay);
        assert_eq!(EmotionKind::Good.to_string(), "good");
        assert_eq!(serde_json::to_string(&good).unwrap(), "\"good\"");
    }

    #[test]
    fn coordinate_requires_exactly_two_numbers() {
        assert!(serde_json::from_str::<Coordinate>("[1.5, 2.5]").is_ok());
        assert!(serde_json::from_str::<Coordinate>("[1.5]").is_err());
        assert!(serde_json::from_str::<Coordinate>("[1.5, 2.5, 3.5]").is_err());
        assert!(serde_json::from_str::<Coordinate>("[\"a\", 2.5]").is_err());
    }

    #[test]
    fn location_ref_round_trips_both_shapes() {
        let id = Uuid::new_v4();
        let unresolved: LocationRef =
            serde_json::from_value(serde_json::json!(id.to_string())).unwrap();
        assert_eq!(unresolved, LocationRef::Unresolved(id));
        assert_eq!(unresolved.area(), None);

        let location = Location {
            id,
            name: "Main St".to_string(),
            area: "Downtown".to_string(),
            coordinates: vec![Coordinate::new(1.0, 2.0)],
        };
        let json = serde_json::to_value(LocationRef::Resolved(location.clone())).unwrap();
        let resolved: LocationRef = serde_json::from_value(json).unwrap();
        assert_eq!(resolved.area(), Some("Downtown"));
        assert_eq!(resolved.id(), id);
    }

    #[test]
    fn new_location_validation() {
        let mut location = NewLocation {
            name: "Main St".to_string(),
            area: "Downtown".to_string(),
            coordinates: vec![Coordinate::new(-87.6, 41.8)],
        };
        assert!(location.validate().is_ok());

        location.coordinates.push(Coordinate::new(f64::NAN, 41.8));
        assert!(location.validate().is_err());

        location.coordinates.clear();
        assert!(location.validate().is_err());

        location.coordinates.push(Coordinate::new(1.0, 1.0));
        location.area = "  ".to_string();
        assert_eq!(location.validate().unwrap_err().message, "area is required");
    }

    #[test]
    fn location_update_applies_present_fields_only() {
        let mut location = Location {
            id: Uuid::new_v4(),
            name: "Old".to_string(),
            area: "Uptown".to_string(),
            coordinates: vec![Coordinate::new(0.0, 0.0)],
        };
        let update = LocationUpdate {
            name: Some("New".to_string()),
            ..LocationUpdate::default()
        };
        assert!(update.validate().is_ok());
        update.apply(&mut location);
        assert_eq!(location.name, "New");
        assert_eq!(location.area, "Uptown");
    }
}
