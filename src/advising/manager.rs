//! AdvisingManager runs one conversation turn through intake validation,
//! follow-up questions, the first recommendation, and the open-ended
//! recommendation loop.
//!
//! The manager holds no per-conversation state besides intake retry
//! counters. Each turn takes the caller's profile, works on a copy, and
//! returns the copy only if every step succeeded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogProvider;
use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

use super::history::ConversationLog;
use super::intent::{Intent, IntentClassifier};
use super::model::{AdvisorResponse, ConversationContext, StudentProfile, TurnOutcome, TurnRole};
use super::preferences::PreferenceExtractor;
use super::prompts::{
    self, CLOSING_MESSAGE, CONCLUDED_MESSAGE, IDLE_MESSAGE, NextRecommendationContext,
    ValidationVerdict,
};
use super::retry::RetryStore;
use super::state::{ConversationPhase, FieldStatus, NextStep};
use super::tracker::RecommendationTracker;

/// Coordinates a single advising turn against the model, the catalog, and
/// the retry store.
pub struct AdvisingManager {
    llm: Arc<dyn LlmProvider>,
    catalog: Arc<dyn CatalogProvider>,
    retries: Arc<dyn RetryStore>,
    config: AdvisorConfig,
    log: ConversationLog,
}

impl AdvisingManager {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        catalog: Arc<dyn CatalogProvider>,
        retries: Arc<dyn RetryStore>,
        config: AdvisorConfig,
    ) -> Self {
        let log = ConversationLog::new(config.max_history);
        Self {
            llm,
            catalog,
            retries,
            config,
            log,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Forget intake retry state for a session. Profiles are owned by the
    /// caller and are not touched.
    pub fn reset_session(&self, session_id: &str) -> bool {
        self.retries.reset(session_id)
    }

    /// Advance the conversation by one turn.
    ///
    /// On error the caller keeps its original profile; no retry counter is
    /// written unless the turn's generation calls all succeeded.
    pub async fn process_turn(&self, input: &StudentProfile) -> Result<TurnOutcome, AdvisorError> {
        if !self.catalog.is_loaded().await {
            warn!(session_id = %input.session_id, "Turn refused: course catalog not loaded");
            return Err(AdvisorError::ServiceUnavailable {
                reason: "course schedule data not available".to_string(),
            });
        }

        let mut profile = input.clone();
        let response = if profile.conversation_phase.is_terminal() {
            debug!(session_id = %profile.session_id, "Turn after conclusion");
            AdvisorResponse::new(NextStep::Complete, CONCLUDED_MESSAGE)
        } else if profile.conversation_phase == ConversationPhase::ContinuousRecommendations {
            self.continuous_turn(&mut profile).await?
        } else {
            self.initial_turn(&mut profile).await?
        };

        info!(
            session_id = %profile.session_id,
            phase = %profile.conversation_phase,
            next_step = %response.next_step,
            "Turn processed"
        );
        Ok(TurnOutcome { profile, response })
    }

    // ── Initial phase ───────────────────────────────────────────────

    async fn initial_turn(
        &self,
        profile: &mut StudentProfile,
    ) -> Result<AdvisorResponse, AdvisorError> {
        if let Some(response) = self.intake_step(profile).await? {
            return Ok(response);
        }

        if profile.follow_up_response.is_none() {
            let catalog = self.catalog.catalog_text().await;
            let text = self
                .generate(
                    prompts::follow_up_prompt(profile, &catalog, None),
                    prompts::follow_up_system_prompt(false),
                )
                .await?;
            return Ok(AdvisorResponse::new(NextStep::FollowUpResponse, text));
        }

        if profile.final_choice.is_none() {
            return self.first_recommendation(profile).await;
        }

        Ok(idle_response(profile))
    }

    /// Walk the intake fields in order. `None` means every field is resolved.
    async fn intake_step(
        &self,
        profile: &StudentProfile,
    ) -> Result<Option<AdvisorResponse>, AdvisorError> {
        let limit = self.config.retry_limit;
        let session_id = profile.session_id.as_str();

        for (idx, question) in self.config.intake.iter().enumerate() {
            let field = question.field;
            let stored = self.retries.get(session_id, field);

            let status = FieldStatus::evaluate(profile.answer(field), stored, limit);
            if status.is_resolved() {
                continue;
            }
            let FieldStatus::NeedsValidation { retries } = status else {
                debug!(session_id = session_id, field = %field, "Asking intake question");
                return Ok(Some(AdvisorResponse::new(
                    NextStep::Field(field),
                    question.question.clone(),
                )));
            };

            let answer = profile.answer(field).unwrap_or_default();
            let reply = self
                .generate(
                    prompts::validation_prompt(field, &question.question, answer, retries),
                    prompts::validation_system_prompt(limit),
                )
                .await?;
            let next = self.step_after(idx);

            let response = match prompts::parse_validation_reply(&reply) {
                ValidationVerdict::Repeat(text) => {
                    let retries = retries.saturating_add(1);
                    self.retries.set(session_id, field, retries);
                    info!(session_id = session_id, field = %field, retries = retries, "Re-asking intake question");
                    AdvisorResponse::new(NextStep::Field(field), text)
                }
                ValidationVerdict::Skip(text) => {
                    self.retries.set(session_id, field, limit.saturating_add(1));
                    info!(session_id = session_id, field = %field, "Skipping intake question");
                    AdvisorResponse::new(next, text)
                }
                ValidationVerdict::Accept(text) if next == NextStep::FollowUpResponse => {
                    let catalog = self.catalog.catalog_text().await;
                    let follow_up = self
                        .generate(
                            prompts::follow_up_prompt(profile, &catalog, Some(&text)),
                            prompts::follow_up_system_prompt(true),
                        )
                        .await?;
                    self.retries.set(session_id, field, 0);
                    AdvisorResponse::new(next, follow_up)
                }
                ValidationVerdict::Accept(text) => {
                    self.retries.set(session_id, field, 0);
                    AdvisorResponse::new(next, text)
                }
            };
            return Ok(Some(response));
        }

        Ok(None)
    }

    fn step_after(&self, idx: usize) -> NextStep {
        self.config
            .intake
            .get(idx + 1)
            .map(|q| NextStep::Field(q.field))
            .unwrap_or(NextStep::FollowUpResponse)
    }

    async fn first_recommendation(
        &self,
        profile: &mut StudentProfile,
    ) -> Result<AdvisorResponse, AdvisorError> {
        let catalog = self.catalog.catalog_text().await;
        let text = self
            .generate(
                prompts::first_recommendation_prompt(profile, &catalog),
                prompts::first_recommendation_system_prompt(),
            )
            .await?;

        RecommendationTracker::observe(profile, &text);
        transition(profile, ConversationPhase::ContinuousRecommendations);
        profile.recommendation_text = Some(text.clone());
        profile.current_recommendation_count = 1;
        self.log
            .append(&mut profile.conversation_history, TurnRole::Advisor, text.clone());

        Ok(
            AdvisorResponse::new(NextStep::FirstRecommendationGiven, text)
                .with_context(ConversationContext::progress(profile)),
        )
    }

    // ── Continuous phase ────────────────────────────────────────────

    async fn continuous_turn(
        &self,
        profile: &mut StudentProfile,
    ) -> Result<AdvisorResponse, AdvisorError> {
        let Some(utterance) = profile.last_user_query.clone() else {
            return Ok(idle_response(profile));
        };

        self.log
            .append(&mut profile.conversation_history, TurnRole::User, utterance.clone());
        PreferenceExtractor::extract(&utterance, &mut profile.user_preferences);

        let intent = IntentClassifier::classify(&utterance);
        debug!(session_id = %profile.session_id, intent = ?intent, "Classified utterance");

        let text = match intent {
            Intent::EndConversation => {
                transition(profile, ConversationPhase::Concluded);
                CLOSING_MESSAGE.to_string()
            }
            Intent::NewRecommendation => {
                profile.current_recommendation_count += 1;
                let text = self.next_recommendation(profile).await?;
                RecommendationTracker::observe(profile, &text);
                profile.recommendation_text = Some(text.clone());
                text
            }
            Intent::Feedback => {
                let recent = ConversationLog::recent_context(
                    &profile.conversation_history,
                    self.config.feedback_messages,
                );
                let text = self
                    .generate(
                        prompts::feedback_prompt(profile, &utterance, &recent),
                        prompts::feedback_system_prompt(),
                    )
                    .await?;
                profile.last_recommendation_feedback = Some(utterance);
                text
            }
        };

        self.log
            .append(&mut profile.conversation_history, TurnRole::Advisor, text.clone());

        Ok(
            AdvisorResponse::new(NextStep::ContinuousConversation, text)
                .with_context(ConversationContext::full(profile)),
        )
    }

    async fn next_recommendation(&self, profile: &StudentProfile) -> Result<String, AdvisorError> {
        let catalog = self.catalog.catalog_text().await;
        let conversation = ConversationLog::recent_context(
            &profile.conversation_history,
            self.config.recent_messages,
        );
        let preferences = profile.user_preferences.context();
        let excluded = prompts::exclusion_list(&profile.recommended_courses);

        let prompt = prompts::next_recommendation_prompt(
            profile,
            &NextRecommendationContext {
                conversation: &conversation,
                preferences: &preferences,
                excluded: &excluded,
                catalog: &catalog,
            },
        );
        self.generate(prompt, prompts::next_recommendation_system_prompt(&excluded))
            .await
    }

    async fn generate(
        &self,
        prompt: String,
        system: impl Into<String>,
    ) -> Result<String, AdvisorError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(prompt),
        ]);
        let response = self.llm.complete(request).await.map_err(|e| {
            warn!(model = self.llm.model_name(), error = %e, "Generation failed");
            AdvisorError::from(e)
        })?;
        Ok(response.content.trim().to_string())
    }
}

fn idle_response(profile: &StudentProfile) -> AdvisorResponse {
    AdvisorResponse::new(NextStep::ContinuousConversation, IDLE_MESSAGE)
        .with_context(ConversationContext::progress(profile))
}

fn transition(profile: &mut StudentProfile, target: ConversationPhase) {
    let from = profile.conversation_phase;
    if from.can_transition_to(target) {
        profile.conversation_phase = target;
        info!(session_id = %profile.session_id, from = %from, to = %target, "Conversation phase advanced");
    } else {
        warn!(session_id = %profile.session_id, from = %from, to = %target, "Ignoring invalid phase transition");
    }
}
