#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived analytics types for the access map.
//!
//! Breakdowns, area bundles, and report summaries are computed fresh for
//! every request and never persisted. Their JSON shapes are part of the
//! public API contract.

use access_map_report_models::{Category, EmotionKind, IssueType, UserType};
use serde::ser::{SerializeMap as _, Serializer};
use serde::Serialize;

/// Area name used for records whose location reference did not resolve.
pub const UNKNOWN_AREA: &str = "Unknown";

/// A share of a group, rounded to one decimal place.
///
/// Serialized as a one-decimal string (e.g. `"66.7"`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percentage(f64);

impl Percentage {
    /// Computes `count / total * 100`, rounded to one decimal.
    ///
    /// A zero `total` yields `0.0` rather than NaN.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(count: u64, total: u64) -> Self {
        if total == 0 {
            return Self(0.0);
        }
        let raw = count as f64 / total as f64 * 100.0;
        Self((raw * 10.0).round() / 10.0)
    }

    /// The rounded numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Count and percentage of one category within a group.
///
/// Serialized as `{ <C::FIELD>: category, count, percentage }`, e.g.
/// `{ "type": "broken_pavement", "count": 2, "percentage": "66.7" }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakdownEntry<C> {
    /// The category.
    pub category: C,
    /// Number of records in this category.
    pub count: u64,
    /// Share of the group total.
    pub percentage: Percentage,
}

impl<C: Category> Serialize for BreakdownEntry<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(C::FIELD, &self.category)?;
        map.serialize_entry("count", &self.count)?;
        map.serialize_entry("percentage", &self.percentage)?;
        map.end()
    }
}

#[derive(Serialize)]
struct CategoryShare {
    count: u64,
    percentage: Percentage,
}

/// Serializes breakdown entries as an ordered `{ category: { count, percentage } }` map.
#[allow(clippy::ptr_arg)]
fn as_category_map<C: Category, S: Serializer>(
    entries: &Vec<BreakdownEntry<C>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for entry in entries {
        map.serialize_entry(
            &entry.category,
            &CategoryShare {
                count: entry.count,
                percentage: entry.percentage,
            },
        )?;
    }
    map.end()
}

/// Aggregated statistics for one area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStatistics {
    /// Reports attributed to this area.
    pub total_reports: u64,
    /// Emotion ratings attributed to this area.
    pub total_emotions: u64,
    /// Issue types over this area's reports.
    #[serde(serialize_with = "as_category_map")]
    pub issue_breakdown: Vec<BreakdownEntry<IssueType>>,
    /// Emotions over this area's ratings.
    #[serde(serialize_with = "as_category_map")]
    pub emotion_breakdown: Vec<BreakdownEntry<EmotionKind>>,
    /// Submitter user types over this area's reports and ratings combined.
    #[serde(serialize_with = "as_category_map")]
    pub user_type_distribution: Vec<BreakdownEntry<UserType>>,
}

/// Per-area breakdown bundle returned by area analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaBundle {
    /// Area name, or [`UNKNOWN_AREA`].
    pub area: String,
    /// Statistics for the area.
    pub statistics: AreaStatistics,
}

/// Statistics for a global narrative report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    /// All reports.
    pub total_reports: u64,
    /// All emotion ratings.
    pub total_emotions: u64,
    /// Most frequent issues in display form, e.g. `"obstruction (4)"`.
    pub top_issues: Vec<String>,
    /// Every emotion with its share, e.g. `"good: 50.0%, unsafe: 50.0%"`.
    pub overall_sentiment: String,
}

/// Statistics for a narrative report scoped to one area or location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    /// Area or location name.
    pub name: String,
    /// Reports in scope.
    pub total_reports: u64,
    /// Emotion ratings in scope.
    pub total_emotions: u64,
    /// Issue types over the reports in scope.
    pub issues: Vec<BreakdownEntry<IssueType>>,
    /// Emotions over the ratings in scope.
    pub emotions: Vec<BreakdownEntry<EmotionKind>>,
    /// Submitter user types over reports and ratings in scope.
    pub user_types: Vec<BreakdownEntry<UserType>>,
}

/// System instruction and user content for one narrative generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    /// Fixed instruction for the model.
    pub system: String,
    /// Statistics rendered for the model.
    pub user: String,
}

/// Model settings for one report shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportProfile {
    /// Requested model ID.
    pub model: &'static str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(Percentage::of(2, 3).to_string(), "66.7");
        assert_eq!(Percentage::of(1, 3).to_string(), "33.3");
        assert_eq!(Percentage::of(1, 1).to_string(), "100.0");
        assert!((Percentage::of(1, 8).value() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_of_zero_total_is_zero() {
        let pct = Percentage::of(0, 0);
        assert!(!pct.value().is_nan());
        assert_eq!(pct.to_string(), "0.0");
    }

    #[test]
    fn breakdown_entry_uses_category_field_name() {
        let entry = BreakdownEntry {
            category: IssueType::BrokenPavement,
            count: 2,
            percentage: Percentage::of(2, 3),
        };
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            serde_json::json!({ "type": "broken_pavement", "count": 2, "percentage": "66.7" })
        );

        let entry = BreakdownEntry {
            category: EmotionKind::Unsafe,
            count: 1,
            percentage: Percentage::of(1, 1),
        };
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            serde_json::json!({ "emotion": "unsafe", "count": 1, "percentage": "100.0" })
        );
    }

    #[test]
    fn area_bundle_serializes_breakdowns_as_maps() {
        let bundle = AreaBundle {
            area: "Downtown".to_string(),
            statistics: AreaStatistics {
                total_reports: 1,
                total_emotions: 0,
                issue_breakdown: vec![BreakdownEntry {
                    category: IssueType::Other,
                    count: 1,
                    percentage: Percentage::of(1, 1),
                }],
                emotion_breakdown: Vec::new(),
                user_type_distribution: vec![BreakdownEntry {
                    category: UserType::BikeUser,
                    count: 1,
                    percentage: Percentage::of(1, 1),
                }],
            },
        };

        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            serde_json::json!({
                "area": "Downtown",
                "statistics": {
                    "totalReports": 1,
                    "totalEmotions": 0,
                    "issueBreakdown": { "others": { "count": 1, "percentage": "100.0" } },
                    "emotionBreakdown": {},
                    "userTypeDistribution": { "bike_user": { "count": 1, "percentage": "100.0" } },
                }
            })
        );
    }
}
