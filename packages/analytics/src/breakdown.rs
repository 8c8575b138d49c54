//! Count-and-percentage breakdowns over a categorical field.
//!
//! Counts accumulate into a [`CategoryCounts`] keyed by the closed category
//! enumeration, so a category that is absent is an explicit zero rather
//! than a missing key. Entries are only emitted for categories that occur,
//! which makes an empty input produce an empty breakdown.

use access_map_analytics_models::{BreakdownEntry, Percentage};
use access_map_report_models::{Category, Emotion, EmotionKind, IssueType, Report, UserType};

/// Number of issues listed in a global report.
pub const TOP_ISSUE_COUNT: usize = 3;

/// Sentiment description used when there are no emotion ratings.
pub const NO_DATA: &str = "no data";

/// Per-category counts over a closed category enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts<C: Category> {
    counts: Vec<u64>,
    first_seen: Vec<C>,
    total: u64,
}

impl<C: Category> Default for CategoryCounts<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> CategoryCounts<C> {
    /// Creates counts with every known category at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: vec![0; C::all().len()],
            first_seen: Vec::new(),
            total: 0,
        }
    }

    /// Counts one occurrence of `category`.
    pub fn record(&mut self, category: C) {
        let slot = &mut self.counts[category.index()];
        if *slot == 0 {
            self.first_seen.push(category);
        }
        *slot += 1;
        self.total += 1;
    }

    /// Occurrences of `category` so far.
    #[must_use]
    pub fn count(&self, category: C) -> u64 {
        self.counts[category.index()]
    }

    /// Occurrences of all categories.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Entries for every category that occurred, in first-encountered order.
    #[must_use]
    pub fn entries(&self) -> Vec<BreakdownEntry<C>> {
        self.first_seen
            .iter()
            .map(|&category| {
                let count = self.count(category);
                BreakdownEntry {
                    category,
                    count,
                    percentage: Percentage::of(count, self.total),
                }
            })
            .collect()
    }

    /// Entries sorted by descending count. Ties keep first-encountered order.
    #[must_use]
    pub fn ranked(&self) -> Vec<BreakdownEntry<C>> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

impl<C: Category> FromIterator<C> for CategoryCounts<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut counts = Self::new();
        for category in iter {
            counts.record(category);
        }
        counts
    }
}

/// Breaks `records` down by the category returned from `accessor`.
///
/// Entries are in first-encountered order and percentages are over
/// `records.len()`. An empty slice yields an empty breakdown.
pub fn breakdown<T, C: Category>(
    records: &[T],
    accessor: impl Fn(&T) -> C,
) -> Vec<BreakdownEntry<C>> {
    records
        .iter()
        .map(accessor)
        .collect::<CategoryCounts<C>>()
        .entries()
}

/// The `n` most frequent categories, by descending count.
pub fn top_entries<T, C: Category>(
    records: &[T],
    accessor: impl Fn(&T) -> C,
    n: usize,
) -> Vec<BreakdownEntry<C>> {
    let mut ranked = records
        .iter()
        .map(accessor)
        .collect::<CategoryCounts<C>>()
        .ranked();
    ranked.truncate(n);
    ranked
}

/// Issue types over `reports`.
#[must_use]
pub fn issue_breakdown(reports: &[Report]) -> Vec<BreakdownEntry<IssueType>> {
    breakdown(reports, |r| r.issue_type)
}

/// Emotions over `emotions`.
#[must_use]
pub fn emotion_breakdown(emotions: &[Emotion]) -> Vec<BreakdownEntry<EmotionKind>> {
    breakdown(emotions, |e| e.emotion)
}

/// Submitter user types over reports and ratings combined.
#[must_use]
pub fn user_type_breakdown(
    reports: &[Report],
    emotions: &[Emotion],
) -> Vec<BreakdownEntry<UserType>> {
    reports
        .iter()
        .map(|r| r.user_type)
        .chain(emotions.iter().map(|e| e.user_type))
        .collect::<CategoryCounts<UserType>>()
        .entries()
}

/// The `n` most reported issues in display form, e.g. `"no_ramps (4)"`.
#[must_use]
pub fn top_issues(reports: &[Report], n: usize) -> Vec<String> {
    top_entries(reports, |r| r.issue_type, n)
        .into_iter()
        .map(|entry| format!("{} ({})", entry.category, entry.count))
        .collect()
}

/// Every emotion with its share, e.g. `"good: 66.7%, unsafe: 33.3%"`.
///
/// Returns [`NO_DATA`] when there are no ratings.
#[must_use]
pub fn sentiment_summary(emotions: &[Emotion]) -> String {
    let entries = emotion_breakdown(emotions);
    if entries.is_empty() {
        return NO_DATA.to_string();
    }
    entries
        .iter()
        .map(|entry| format!("{}: {}%", entry.category, entry.percentage))
        .collect::<Vec<_>>()
        .join(", ")
}
