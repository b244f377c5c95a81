//! Keyword-based preference extraction from student utterances.

use tracing::debug;

use super::model::{PreferenceCategory, UserPreferences};

const POSITIVE_SIGNALS: &[&str] = &["like", "love", "enjoy", "interested", "prefer"];

const NEGATIVE_SIGNALS: &[&str] = &[
    "don't like",
    "dislike",
    "boring",
    "not interested",
    "avoid",
];

const TIME_SIGNALS: &[&str] = &["morning", "afternoon", "evening", "night", "online", "hybrid"];

fn vocabulary(category: PreferenceCategory) -> &'static [&'static str] {
    match category {
        PreferenceCategory::Positive => POSITIVE_SIGNALS,
        PreferenceCategory::Negative => NEGATIVE_SIGNALS,
        PreferenceCategory::Time => TIME_SIGNALS,
    }
}

const CATEGORIES: [PreferenceCategory; 3] = [
    PreferenceCategory::Positive,
    PreferenceCategory::Negative,
    PreferenceCategory::Time,
];

/// Scans utterances for sentiment and scheduling signals.
///
/// Each category is checked independently, so one utterance can land in
/// several buckets ("I don't like mornings" is negative, positive and time).
pub struct PreferenceExtractor;

impl PreferenceExtractor {
    /// Categories whose vocabulary appears in `utterance`.
    pub fn matches(utterance: &str) -> Vec<PreferenceCategory> {
        let lowered = utterance.to_lowercase();
        CATEGORIES
            .into_iter()
            .filter(|c| vocabulary(*c).iter().any(|kw| lowered.contains(kw)))
            .collect()
    }

    /// Append `utterance` to every matching bucket. Returns the matches.
    pub fn extract(utterance: &str, preferences: &mut UserPreferences) -> Vec<PreferenceCategory> {
        let matched = Self::matches(utterance);
        for category in &matched {
            preferences.bucket_mut(*category).push(utterance.to_string());
        }
        if !matched.is_empty() {
            debug!(categories = ?matched, "Recorded preference signals");
        }
        matched
    }
}
