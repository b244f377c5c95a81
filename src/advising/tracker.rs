//! Course identifier extraction and no-repeat tracking.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::model::StudentProfile;

/// Extraction rules, most specific first. Group 1 is the course code.
static COURSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "Course CS 100"
        r"(?i)Course ([A-Z]+\s*\d+)",
        // "CS 100,"
        r"(?i)([A-Z]+\s*\d+),",
        // "CS 100 titled"
        r"(?i)([A-Z]+\s*\d+)\s+titled",
        // "recommend CS 100"
        r"(?i)recommend\s+([A-Z]+\s*\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("course pattern is a valid regex"))
    .collect()
});

/// Keeps `StudentProfile::recommended_courses` free of repeats.
pub struct RecommendationTracker;

impl RecommendationTracker {
    /// Find the first course code in generated text, e.g. `"CS 435"` → `"CS435"`.
    pub fn extract(text: &str) -> Option<String> {
        COURSE_PATTERNS.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| normalize(m.as_str()))
        })
    }

    /// Record a course unless already present. Returns true if it was added.
    pub fn track(profile: &mut StudentProfile, course: &str) -> bool {
        if profile.recommended_courses.iter().any(|c| c == course) {
            return false;
        }
        profile.recommended_courses.push(course.to_string());
        info!(
            session_id = %profile.session_id,
            course = course,
            total = profile.recommended_courses.len(),
            "Tracked new course recommendation"
        );
        true
    }

    /// Extract from `text` and track the result. Returns the newly added code.
    pub fn observe(profile: &mut StudentProfile, text: &str) -> Option<String> {
        let course = Self::extract(text)?;
        Self::track(profile, &course).then_some(course)
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
