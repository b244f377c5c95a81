//! Bridges rig-core completion models to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionError, CompletionModel, Message};

use crate::error::LlmError;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// Adapter around any rig `CompletionModel`.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

/// Clamp rig's 64-bit usage counts into our 32-bit fields.
fn token_count(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn map_error(provider: &str, err: CompletionError) -> LlmError {
    let reason = err.to_string();
    let lowered = reason.to_lowercase();
    if lowered.contains("401") || lowered.contains("authentication") || lowered.contains("api key")
    {
        return LlmError::AuthFailed {
            provider: provider.to_string(),
        };
    }
    if lowered.contains("429") || lowered.contains("rate limit") {
        return LlmError::RateLimited {
            provider: provider.to_string(),
            retry_after: None,
        };
    }
    LlmError::RequestFailed {
        provider: provider.to_string(),
        reason,
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let preamble = request.system_prompt();

        // The last user message is the prompt; anything before it is history.
        let mut history: Vec<Message> = Vec::new();
        let mut prompt: Option<String> = None;
        for message in &request.messages {
            match message.role {
                Role::System => {}
                Role::User => {
                    if let Some(previous) = prompt.take() {
                        history.push(Message::user(previous));
                    }
                    prompt = Some(message.content.clone());
                }
                Role::Assistant => {
                    if let Some(previous) = prompt.take() {
                        history.push(Message::user(previous));
                    }
                    history.push(Message::assistant(message.content.clone()));
                }
            }
        }
        let prompt = prompt.ok_or_else(|| LlmError::InvalidResponse {
            provider: self.model_name.clone(),
            reason: "completion request has no user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(Message::user(prompt));
        if !history.is_empty() {
            builder = builder.messages(history);
        }
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&self.model_name, e))?;

        let content = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "empty completion".to_string(),
            });
        }

        Ok(CompletionResponse {
            content: content.trim().to_string(),
            input_tokens: token_count(response.usage.input_tokens),
            output_tokens: token_count(response.usage.output_tokens),
            finish_reason: FinishReason::Stop,
        })
    }
}
