//! Advising conversation: intake, follow-ups, and open-ended course
//! recommendations.
//!
//! A conversation is driven one turn at a time by `AdvisingManager`. The
//! caller owns the `StudentProfile`, sends it in with each turn, and keeps
//! the updated copy that comes back. Only intake retry counters live on the
//! server side, in a `RetryStore`.

pub mod curriculum;
pub mod history;
pub mod intent;
pub mod manager;
pub mod model;
pub mod preferences;
pub mod prompts;
pub mod retry;
pub mod state;
pub mod tracker;

pub use history::ConversationLog;
pub use intent::{Intent, IntentClassifier};
pub use manager::AdvisingManager;
pub use model::{
    AdvisorResponse, ConversationContext, ConversationTurn, PreferenceCategory, StudentProfile,
    TurnOutcome, TurnRole, UserPreferences,
};
pub use preferences::PreferenceExtractor;
pub use retry::{InMemoryRetryStore, RetryStore, spawn_eviction_task};
pub use state::{ConversationPhase, FieldStatus, IntakeField, NextStep};
pub use tracker::RecommendationTracker;
