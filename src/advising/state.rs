//! Advising state machine: conversation phases, intake field status, and the
//! directives returned to the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Coarse stage of the advising dialogue.
///
/// Progresses linearly: InitialQuestions → ContinuousRecommendations →
/// Concluded. Never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    InitialQuestions,
    ContinuousRecommendations,
    Concluded,
}

impl ConversationPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationPhase) -> bool {
        use ConversationPhase::*;
        matches!(
            (self, target),
            (InitialQuestions, ContinuousRecommendations) | (ContinuousRecommendations, Concluded)
        )
    }

    /// Whether the conversation is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Concluded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialQuestions => "initial_questions",
            Self::ContinuousRecommendations => "continuous_recommendations",
            Self::Concluded => "concluded",
        }
    }
}

impl fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile attribute collected during intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeField {
    Year,
    TimePreference,
    CareerGoals,
}

impl IntakeField {
    pub const ALL: [IntakeField; 3] = [Self::Year, Self::TimePreference, Self::CareerGoals];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::TimePreference => "time_preference",
            Self::CareerGoals => "career_goals",
        }
    }
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntakeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown intake field '{s}'"))
    }
}

/// Where an intake field stands on the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// No answer yet; the question must be asked.
    Unanswered,
    /// Answered with no outstanding retries. Treated as already confirmed.
    Confirmed,
    /// Retries exceeded the limit (or the validator skipped it); the answer is
    /// accepted as-is.
    Skipped,
    /// Answered after at least one re-ask; must be validated again.
    NeedsValidation { retries: u32 },
}

impl FieldStatus {
    /// Derive the status from the stored answer and retry count.
    ///
    /// A fresh answer with zero retries is indistinguishable from one that
    /// was already validated, so both count as `Confirmed`.
    pub fn evaluate(answer: Option<&str>, retries: u32, limit: u32) -> Self {
        match answer {
            None => Self::Unanswered,
            Some(_) if retries == 0 => Self::Confirmed,
            Some(_) if retries > limit => Self::Skipped,
            Some(_) => Self::NeedsValidation { retries },
        }
    }

    /// Whether later fields may be asked.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Skipped)
    }
}

/// Machine-readable instruction telling the caller what is expected next.
///
/// Serialized as a bare string (`"year"`, `"follow_up_response"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextStep {
    /// The caller should fill this intake field.
    Field(IntakeField),
    FollowUpResponse,
    FirstRecommendationGiven,
    ContinuousConversation,
    Complete,
}

impl NextStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Field(field) => field.as_str(),
            Self::FollowUpResponse => "follow_up_response",
            Self::FirstRecommendationGiven => "first_recommendation_given",
            Self::ContinuousConversation => "continuous_conversation",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NextStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow_up_response" => Ok(Self::FollowUpResponse),
            "first_recommendation_given" => Ok(Self::FirstRecommendationGiven),
            "continuous_conversation" => Ok(Self::ContinuousConversation),
            "complete" => Ok(Self::Complete),
            other => other
                .parse::<IntakeField>()
                .map(Self::Field)
                .map_err(|_| format!("unknown next step '{other}'")),
        }
    }
}

impl Serialize for NextStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NextStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
