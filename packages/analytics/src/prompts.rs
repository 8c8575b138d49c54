//! Prompt rendering for narrative reports.
//!
//! Each report shape has a fixed system instruction, a user block that
//! interpolates the statistics, and a [`ReportProfile`] with the model
//! settings to request.

use access_map_analytics_models::{
    BreakdownEntry, GlobalSummary, PromptPair, ReportProfile, ScopeSummary,
};
use access_map_report_models::Category;

/// Model settings for the global report.
pub const GLOBAL_REPORT_PROFILE: ReportProfile = ReportProfile {
    model: "gpt-4-1106-preview",
    temperature: 0.7,
    max_tokens: 500,
};

/// Model settings for area and location reports.
pub const SCOPE_REPORT_PROFILE: ReportProfile = ReportProfile {
    model: "gpt-4o-mini",
    temperature: 0.7,
    max_tokens: 350,
};

const GLOBAL_SYSTEM_PROMPT: &str = "You are an AI analyst specialized in analyzing urban infrastructure data. \
Generate a professional, concise report about sidewalk conditions based on the provided data. \
Focus on key insights and actionable recommendations.";

const SCOPE_SYSTEM_PROMPT: &str = "Analyze sidewalk condition data for a specific area. \
Provide concise insights and targeted recommendations.";

/// Renders the prompt for the global report.
#[must_use]
pub fn global_report_prompt(summary: &GlobalSummary) -> PromptPair {
    let top_issues = if summary.top_issues.is_empty() {
        "none".to_string()
    } else {
        summary.top_issues.join(", ")
    };

    PromptPair {
        system: GLOBAL_SYSTEM_PROMPT.to_string(),
        user: format!(
            r"Generate a detailed analysis based on the following data:
Total Reports: {total_reports}
Total Emotions Recorded: {total_emotions}
Top Issues: {top_issues}
Overall Sentiment: {sentiment}

Please include:
1. Summary of key findings
2. Analysis of top issues
3. Sentiment analysis
4. Recommendations for improvement",
            total_reports = summary.total_reports,
            total_emotions = summary.total_emotions,
            sentiment = summary.overall_sentiment,
        ),
    }
}

/// Renders breakdown entries as a JSON array.
///
/// Serialization failure is logged and rendered as an empty array so the
/// prompt keeps its shape.
fn entries_json<C: Category>(label: &str, entries: &[BreakdownEntry<C>]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|e| {
        log::warn!("Failed to serialize {label} breakdown for prompt: {e}");
        "[]".to_string()
    })
}

/// Renders the prompt for an area or location report.
///
/// The breakdowns are embedded as JSON arrays so the model receives the
/// structured counts rather than pre-formatted text.
#[must_use]
pub fn scope_report_prompt(summary: &ScopeSummary) -> PromptPair {
    let issues = entries_json("issue", &summary.issues);
    let emotions = entries_json("emotion", &summary.emotions);

    PromptPair {
        system: SCOPE_SYSTEM_PROMPT.to_string(),
        user: format!(
            r"Generate a focused analysis for {name}:
Reports: {total_reports}
Emotions: {total_emotions}
Issue Breakdown: {issues}
Emotion Distribution: {emotions}",
            name = summary.name,
            total_reports = summary.total_reports,
            total_emotions = summary.total_emotions,
        ),
    }
}

#[cfg(test)]
mod tests {
    use access_map_report_models::{EmotionKind, IssueType};

    use super::*;
    use crate::areas::{summarize_global, summarize_scope};
    use crate::fixtures::{emotion, location, report};

    #[test]
    fn global_prompt_interpolates_statistics() {
        let a = location("A", "Downtown");
        let reports = vec![
            report(IssueType::NoRamps, &a),
            report(IssueType::NoRamps, &a),
            report(IssueType::Obstruction, &a),
        ];
        let emotions = vec![emotion(EmotionKind::Uneasy, &a)];

        let prompt = global_report_prompt(&summarize_global(&reports, &emotions));

        assert_eq!(prompt.system, GLOBAL_SYSTEM_PROMPT);
        assert!(prompt.user.contains("Total Reports: 3\n"));
        assert!(prompt.user.contains("Total Emotions Recorded: 1\n"));
        assert!(prompt.user.contains("Top Issues: no_ramps (2), obstruction (1)\n"));
        assert!(prompt.user.contains("Overall Sentiment: uneasy: 100.0%\n"));
        assert!(prompt.user.ends_with("4. Recommendations for improvement"));
    }

    #[test]
    fn global_prompt_without_data() {
        let prompt = global_report_prompt(&summarize_global(&[], &[]));

        assert!(prompt.user.contains("Top Issues: none\n"));
        assert!(prompt.user.contains("Overall Sentiment: no data\n"));
    }

    #[test]
    fn scope_prompt_embeds_structured_breakdowns() {
        let a = location("Main St", "Downtown");
        let reports = vec![
            report(IssueType::BrokenPavement, &a),
            report(IssueType::BrokenPavement, &a),
            report(IssueType::PoorLighting, &a),
        ];

        let prompt = scope_report_prompt(&summarize_scope("Main St", &reports, &[]));

        assert_eq!(prompt.system, SCOPE_SYSTEM_PROMPT);
        assert_eq!(
            prompt.user,
            "Generate a focused analysis for Main St:\n\
             Reports: 3\n\
             Emotions: 0\n\
             Issue Breakdown: [{\"type\":\"broken_pavement\",\"count\":2,\"percentage\":\"66.7\"},\
             {\"type\":\"poor_lighting\",\"count\":1,\"percentage\":\"33.3\"}]\n\
             Emotion Distribution: []"
        );
    }

    #[test]
    fn breakdown_json_keeps_array_shape() {
        let a = location("A", "Downtown");
        let reports = vec![report(IssueType::NoRamps, &a)];
        let summary = summarize_scope("A", &reports, &[]);

        assert_eq!(
            entries_json("issue", &summary.issues),
            r#"[{"type":"no_ramps","count":1,"percentage":"100.0"}]"#
        );
        assert_eq!(entries_json("emotion", &summary.emotions), "[]");
    }

    #[test]
    fn prompts_are_deterministic() {
        let a = location("A", "Downtown");
        let reports = vec![report(IssueType::Other, &a)];
        let summary = summarize_scope("A", &reports, &[]);

        assert_eq!(scope_report_prompt(&summary), scope_report_prompt(&summary));
    }
}
