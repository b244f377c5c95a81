//! Student profile and turn response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{ConversationPhase, IntakeField, NextStep};

fn default_major() -> String {
    "Computer Science".to_string()
}

/// Who authored a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Advisor,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Advisor => write!(f, "advisor"),
        }
    }
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Preference bucket a user utterance can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceCategory {
    Positive,
    Negative,
    Time,
}

/// Accumulated sentiment and scheduling signals from the student's messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positive_signals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative_signals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_preferences: Vec<String>,
}

impl UserPreferences {
    pub fn bucket_mut(&mut self, category: PreferenceCategory) -> &mut Vec<String> {
        match category {
            PreferenceCategory::Positive => &mut self.positive_signals,
            PreferenceCategory::Negative => &mut self.negative_signals,
            PreferenceCategory::Time => &mut self.time_preferences,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positive_signals.is_empty()
            && self.negative_signals.is_empty()
            && self.time_preferences.is_empty()
    }

    /// Render for prompt injection. Empty when nothing has been collected.
    pub fn context(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => format!("User Preferences: {json}"),
            Err(_) => String::new(),
        }
    }
}

/// Everything known about the student, resent by the caller every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub session_id: String,
    #[serde(default = "default_major")]
    pub major: String,

    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub time_preference: Option<String>,
    #[serde(default)]
    pub career_goals: Option<String>,

    #[serde(default)]
    pub follow_up_response: Option<String>,
    #[serde(default)]
    pub final_choice: Option<String>,
    #[serde(default)]
    pub last_user_query: Option<String>,
    #[serde(default)]
    pub recommendation_text: Option<String>,
    #[serde(default)]
    pub last_recommendation_feedback: Option<String>,

    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    /// Course identifiers already recommended, in the order they were given.
    #[serde(default)]
    pub recommended_courses: Vec<String>,
    #[serde(default)]
    pub user_preferences: UserPreferences,
    #[serde(default)]
    pub conversation_phase: ConversationPhase,
    #[serde(default)]
    pub current_recommendation_count: u32,
}

impl StudentProfile {
    /// A fresh profile at the start of a session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            major: default_major(),
            year: None,
            time_preference: None,
            career_goals: None,
            follow_up_response: None,
            final_choice: None,
            last_user_query: None,
            recommendation_text: None,
            last_recommendation_feedback: None,
            conversation_history: Vec::new(),
            recommended_courses: Vec::new(),
            user_preferences: UserPreferences::default(),
            conversation_phase: ConversationPhase::default(),
            current_recommendation_count: 0,
        }
    }

    /// Stored answer for an intake field.
    pub fn answer(&self, field: IntakeField) -> Option<&str> {
        match field {
            IntakeField::Year => self.year.as_deref(),
            IntakeField::TimePreference => self.time_preference.as_deref(),
            IntakeField::CareerGoals => self.career_goals.as_deref(),
        }
    }

    pub fn set_answer(&mut self, field: IntakeField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            IntakeField::Year => self.year = value,
            IntakeField::TimePreference => self.time_preference = value,
            IntakeField::CareerGoals => self.career_goals = value,
        }
    }

    /// One-paragraph profile summary for prompts.
    pub fn summary(&self) -> String {
        fn or_unknown(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("unknown")
        }
        format!(
            "Major: {}, Year: {}, Time Preference: {}, Career Goals: {}",
            self.major,
            or_unknown(&self.year),
            or_unknown(&self.time_preference),
            or_unknown(&self.career_goals),
        )
    }
}

/// Extra state returned alongside a reply so the client can render progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<ConversationPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_courses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<usize>,
}

impl ConversationContext {
    /// Phase and recommendation count only.
    pub fn progress(profile: &StudentProfile) -> Self {
        Self {
            phase: Some(profile.conversation_phase),
            recommendation_count: Some(profile.current_recommendation_count),
            ..Default::default()
        }
    }

    /// Progress plus the recommended courses and history length.
    pub fn full(profile: &StudentProfile) -> Self {
        Self {
            recommended_courses: Some(profile.recommended_courses.clone()),
            history_length: Some(profile.conversation_history.len()),
            ..Self::progress(profile)
        }
    }
}

/// What the advisor says and what it expects next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub next_step: NextStep,
    pub response_text: String,
    #[serde(default)]
    pub conversation_context: ConversationContext,
}

impl AdvisorResponse {
    pub fn new(next_step: NextStep, response_text: impl Into<String>) -> Self {
        Self {
            next_step,
            response_text: response_text.into(),
            conversation_context: ConversationContext::default(),
        }
    }

    pub fn with_context(mut self, context: ConversationContext) -> Self {
        self.conversation_context = context;
        self
    }
}

/// Result of a successful turn: the updated profile and the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub profile: StudentProfile,
    #[serde(flatten)]
    pub response: AdvisorResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_starts_in_intake() {
        let p = StudentProfile::new("s-1");
        assert_eq!(p.session_id, "s-1");
        assert_eq!(p.major, "Computer Science");
        assert_eq!(p.conversation_phase, ConversationPhase::InitialQuestions);
        assert_eq!(p.current_recommendation_count, 0);
        assert!(IntakeField::ALL.iter().all(|f| p.answer(*f).is_none()));
        assert!(p.conversation_history.is_empty());
        assert!(p.user_preferences.is_empty());
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let p: StudentProfile = serde_json::from_str(r#"{"session_id":"abc"}"#).unwrap();
        assert_eq!(p, StudentProfile::new("abc"));
    }

    #[test]
    fn answers_map_to_fields() {
        let mut p = StudentProfile::new("s");
        p.set_answer(IntakeField::TimePreference, "Evening");
        assert_eq!(p.time_preference.as_deref(), Some("Evening"));
        assert_eq!(p.answer(IntakeField::TimePreference), Some("Evening"));
        assert!(p.answer(IntakeField::Year).is_none());
    }

    #[test]
    fn profile_serde_roundtrip() {
        let mut p = StudentProfile::new("s");
        p.set_answer(IntakeField::Year, "Junior");
        p.conversation_phase = ConversationPhase::ContinuousRecommendations;
        p.recommended_courses.push("CS435".to_string());
        p.conversation_history
            .push(ConversationTurn::new(TurnRole::Advisor, "Try CS 435."));
        p.user_preferences.positive_signals.push("I love algorithms".into());

        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"conversation_phase\":\"continuous_recommendations\""));
        assert!(json.contains("\"role\":\"advisor\""));
        let parsed: StudentProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }

    #[test]
    fn summary_marks_unknown_fields() {
        let mut p = StudentProfile::new("s");
        p.set_answer(IntakeField::Year, "Freshman");
        let summary = p.summary();
        assert!(summary.contains("Year: Freshman"));
        assert!(summary.contains("Career Goals: unknown"));
    }

    #[test]
    fn preferences_context() {
        let mut prefs = UserPreferences::default();
        assert_eq!(prefs.context(), "");
        prefs.bucket_mut(PreferenceCategory::Time).push("mornings please".into());
        let ctx = prefs.context();
        assert!(ctx.starts_with("User Preferences:"));
        assert!(ctx.contains("time_preferences"));
        assert!(!ctx.contains("positive_signals"));
    }

    #[test]
    fn empty_context_serializes_as_empty_object() {
        let response = AdvisorResponse::new(NextStep::Field(IntakeField::Year), "Which year?");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["next_step"], "year");
        assert_eq!(json["conversation_context"], serde_json::json!({}));
    }

    #[test]
    fn full_context_reports_history_length() {
        let mut p = StudentProfile::new("s");
        p.current_recommendation_count = 2;
        p.recommended_courses = vec!["CS100".into(), "MATH111".into()];
        p.conversation_history
            .push(ConversationTurn::new(TurnRole::User, "another"));
        let ctx = ConversationContext::full(&p);
        assert_eq!(ctx.recommendation_count, Some(2));
        assert_eq!(ctx.history_length, Some(1));
        assert_eq!(ctx.recommended_courses.as_ref().map(Vec::len), Some(2));
    }
}
