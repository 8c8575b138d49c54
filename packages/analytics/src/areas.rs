//! Per-area aggregation of reports and emotion ratings.
//!
//! Records are attributed to the area of their resolved location. A record
//! whose location did not resolve is attributed to [`UNKNOWN_AREA`] instead
//! of being dropped.

use std::collections::HashMap;

use access_map_analytics_models::{
    AreaBundle, AreaStatistics, GlobalSummary, ScopeSummary, UNKNOWN_AREA,
};
use access_map_report_models::{Emotion, EmotionKind, IssueType, LocationRef, Report, UserType};

use crate::breakdown::{
    CategoryCounts, TOP_ISSUE_COUNT, emotion_breakdown, issue_breakdown, sentiment_summary,
    top_issues, user_type_breakdown,
};

/// Grouping key derived from a record's location reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKey<'a> {
    /// The location resolved and belongs to this area.
    Resolved(&'a str),
    /// The location could not be resolved.
    Unresolved,
}

impl<'a> AreaKey<'a> {
    /// Derives the key for `location`.
    #[must_use]
    pub fn of(location: &'a LocationRef) -> Self {
        location.area().map_or(Self::Unresolved, Self::Resolved)
    }

    /// Area name used in output.
    #[must_use]
    pub const fn name(self) -> &'a str {
        match self {
            Self::Resolved(area) => area,
            Self::Unresolved => UNKNOWN_AREA,
        }
    }
}

struct AreaAccumulator<'a> {
    area: &'a str,
    issues: CategoryCounts<IssueType>,
    emotions: CategoryCounts<EmotionKind>,
    user_types: CategoryCounts<UserType>,
}

impl<'a> AreaAccumulator<'a> {
    fn new(area: &'a str) -> Self {
        Self {
            area,
            issues: CategoryCounts::new(),
            emotions: CategoryCounts::new(),
            user_types: CategoryCounts::new(),
        }
    }

    fn into_bundle(self) -> AreaBundle {
        AreaBundle {
            area: self.area.to_string(),
            statistics: AreaStatistics {
                total_reports: self.issues.total(),
                total_emotions: self.emotions.total(),
                issue_breakdown: self.issues.entries(),
                emotion_breakdown: self.emotions.entries(),
                user_type_distribution: self.user_types.entries(),
            },
        }
    }
}

/// Area accumulators in first-encountered order, indexed by area name.
#[derive(Default)]
struct AreaTable<'a> {
    index: HashMap<&'a str, usize>,
    areas: Vec<AreaAccumulator<'a>>,
}

impl<'a> AreaTable<'a> {
    fn entry(&mut self, key: AreaKey<'a>) -> &mut AreaAccumulator<'a> {
        let name = key.name();
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.areas.push(AreaAccumulator::new(name));
                let slot = self.areas.len() - 1;
                self.index.insert(name, slot);
                slot
            }
        };
        &mut self.areas[slot]
    }
}

/// Builds one [`AreaBundle`] per distinct area across `reports` and
/// `emotions`.
///
/// Each area's percentages are relative to that area's own totals. Areas
/// appear in the order they are first encountered, reports before emotions.
#[must_use]
pub fn aggregate_areas(reports: &[Report], emotions: &[Emotion]) -> Vec<AreaBundle> {
    let mut table = AreaTable::default();

    for report in reports {
        let area = table.entry(AreaKey::of(&report.location));
        area.issues.record(report.issue_type);
        area.user_types.record(report.user_type);
    }

    for emotion in emotions {
        let area = table.entry(AreaKey::of(&emotion.location));
        area.emotions.record(emotion.emotion);
        area.user_types.record(emotion.user_type);
    }

    log::debug!(
        "Aggregated {} reports and {} emotions into {} areas",
        reports.len(),
        emotions.len(),
        table.areas.len()
    );

    table
        .areas
        .into_iter()
        .map(AreaAccumulator::into_bundle)
        .collect()
}

/// Summarizes records already filtered to one area or location.
#[must_use]
pub fn summarize_scope(name: &str, reports: &[Report], emotions: &[Emotion]) -> ScopeSummary {
    ScopeSummary {
        name: name.to_string(),
        total_reports: reports.len() as u64,
        total_emotions: emotions.len() as u64,
        issues: issue_breakdown(reports),
        emotions: emotion_breakdown(emotions),
        user_types: user_type_breakdown(reports, emotions),
    }
}

/// Summarizes all records for the global report.
#[must_use]
pub fn summarize_global(reports: &[Report], emotions: &[Emotion]) -> GlobalSummary {
    GlobalSummary {
        total_reports: reports.len() as u64,
        total_emotions: emotions.len() as u64,
        top_issues: top_issues(reports, TOP_ISSUE_COUNT),
        overall_sentiment: sentiment_summary(emotions),
    }
}
