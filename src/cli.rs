//! Line-oriented front-ends for the advisor.
//!
//! The interactive REPL plays the stateless caller: it keeps the profile
//! between turns and routes each typed line into whichever field the last
//! directive asked for. The JSON mode takes one serialized profile per line
//! and answers with one `TurnOutcome` per line.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, warn};
use uuid::Uuid;

use crate::advising::{AdvisingManager, NextStep, StudentProfile};
use crate::error::AdvisorError;

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reset,
    Say(String),
}

impl Command {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => None,
            "/quit" | "/exit" => Some(Self::Quit),
            "/reset" => Some(Self::Reset),
            text => Some(Self::Say(text.to_string())),
        }
    }
}

/// Store the student's reply in the field the last directive asked for.
///
/// Returns false when the directive expects no input (the conversation is
/// complete, or no turn has run yet).
pub fn apply_reply(profile: &mut StudentProfile, expecting: Option<NextStep>, text: &str) -> bool {
    match expecting {
        Some(NextStep::Field(field)) => profile.set_answer(field, text),
        Some(NextStep::FollowUpResponse) => profile.follow_up_response = Some(text.to_string()),
        Some(NextStep::FirstRecommendationGiven | NextStep::ContinuousConversation) => {
            profile.last_user_query = Some(text.to_string())
        }
        Some(NextStep::Complete) | None => return false,
    }
    true
}

/// Interactive advising session over a reader/writer pair.
pub struct InteractiveSession {
    manager: Arc<AdvisingManager>,
    profile: StudentProfile,
    expecting: Option<NextStep>,
}

impl InteractiveSession {
    pub fn new(manager: Arc<AdvisingManager>) -> Self {
        Self {
            manager,
            profile: StudentProfile::new(Uuid::new_v4().to_string()),
            expecting: None,
        }
    }

    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    /// Run until EOF or `/quit`.
    pub async fn run<R, W>(&mut self, reader: R, mut out: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.turn(self.profile.clone(), &mut out).await?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                None => continue,
                Some(Command::Quit) => break,
                Some(Command::Reset) => {
                    self.manager.reset_session(&self.profile.session_id);
                    self.profile = StudentProfile::new(Uuid::new_v4().to_string());
                    self.expecting = None;
                    out.write_all(b"Starting a new session.\n").await?;
                    self.turn(self.profile.clone(), &mut out).await?;
                }
                Some(Command::Say(_)) if self.expecting.is_none() => {
                    // The opening turn never succeeded; try it again.
                    self.turn(self.profile.clone(), &mut out).await?;
                }
                Some(Command::Say(text)) => {
                    let mut pending = self.profile.clone();
                    if !apply_reply(&mut pending, self.expecting, &text) {
                        out.write_all(b"Type /reset to start a new session or /quit to leave.\n")
                            .await?;
                        continue;
                    }
                    self.turn(pending, &mut out).await?;
                }
            }
        }
        out.flush().await
    }

    /// Run one turn. The stored profile only advances when the turn succeeds.
    async fn turn<W: AsyncWrite + Unpin>(
        &mut self,
        pending: StudentProfile,
        out: &mut W,
    ) -> std::io::Result<()> {
        match self.manager.process_turn(&pending).await {
            Ok(outcome) => {
                self.profile = outcome.profile;
                self.expecting = Some(outcome.response.next_step);
                out.write_all(format!("\n{}\n\n", outcome.response.response_text).as_bytes())
                    .await?;
            }
            Err(e) => {
                warn!(session_id = %pending.session_id, error = %e, "Turn failed");
                let hint = if e.is_retryable() {
                    "Please try again in a moment."
                } else {
                    "Please try again."
                };
                out.write_all(format!("Sorry, something went wrong: {e}. {hint}\n").as_bytes())
                    .await?;
            }
        }
        out.flush().await
    }
}

/// One JSON profile per input line, one JSON result per output line.
///
/// Lines that fail to parse or fail the turn produce an `{"error": ..}`
/// object instead, so the stream stays aligned with its input.
pub async fn run_json<R, W>(manager: &AdvisingManager, reader: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let value = match serde_json::from_str::<StudentProfile>(&line) {
            Ok(profile) => match manager.process_turn(&profile).await {
                Ok(outcome) => serde_json::to_value(&outcome).unwrap_or_else(|e| {
                    error!(error = %e, "Failed to serialize turn outcome");
                    serde_json::json!({ "error": e.to_string(), "retryable": false })
                }),
                Err(e) => error_value(&e),
            },
            Err(e) => serde_json::json!({
                "error": format!("invalid profile: {e}"),
                "retryable": false,
            }),
        };
        out.write_all(value.to_string().as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }
    Ok(())
}

fn error_value(err: &AdvisorError) -> serde_json::Value {
    serde_json::json!({
        "error": err.to_string(),
        "retryable": err.is_retryable(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::advising::{IntakeField, InMemoryRetryStore};
    use crate::catalog::{CourseRecord, StaticCatalog};
    use crate::config::AdvisorConfig;
    use crate::error::LlmError;
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

    struct CannedLlm {
        replies: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let content = self.replies.lock().unwrap().pop_front().ok_or_else(|| {
                LlmError::RequestFailed {
                    provider: "canned".into(),
                    reason: "no more replies".into(),
                }
            })?;
            Ok(CompletionResponse {
                content,
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn manager(replies: &[&str]) -> Arc<AdvisingManager> {
        let llm = Arc::new(CannedLlm {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        });
        let catalog = Arc::new(StaticCatalog::new(vec![CourseRecord {
            course_code: "CS 435".into(),
            title: "Advanced Data Structures".into(),
            ..Default::default()
        }]));
        Arc::new(AdvisingManager::new(
            llm,
            catalog,
            Arc::new(InMemoryRetryStore::new()),
            AdvisorConfig::default(),
        ))
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("  "), None);
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("/reset "), Some(Command::Reset));
        assert_eq!(
            Command::parse(" Junior "),
            Some(Command::Say("Junior".to_string()))
        );
    }

    #[test]
    fn replies_land_in_requested_field() {
        let mut p = StudentProfile::new("s");
        assert!(apply_reply(&mut p, Some(NextStep::Field(IntakeField::Year)), "Junior"));
        assert_eq!(p.year.as_deref(), Some("Junior"));

        assert!(apply_reply(&mut p, Some(NextStep::FollowUpResponse), "security"));
        assert_eq!(p.follow_up_response.as_deref(), Some("security"));

        assert!(apply_reply(&mut p, Some(NextStep::ContinuousConversation), "another"));
        assert_eq!(p.last_user_query.as_deref(), Some("another"));

        assert!(!apply_reply(&mut p, Some(NextStep::Complete), "hello?"));
        assert!(!apply_reply(&mut p, None, "hello?"));
    }

    #[tokio::test]
    async fn interactive_session_walks_intake() {
        let mut session = InteractiveSession::new(manager(&[
            "What area of security interests you?",
            "Course CS 435, titled Advanced Data Structures. Want more?",
        ]));
        let input: &[u8] = b"Junior\nEvening\nCybersecurity\nNetworks\n/quit\nignored\n";
        let mut output = Vec::new();
        session.run(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("What Student Year are you in?"));
        assert!(text.contains("preferred time for classes"));
        assert!(text.contains("What area of security interests you?"));
        assert!(text.contains("Course CS 435"));

        let profile = session.profile();
        assert_eq!(profile.career_goals.as_deref(), Some("Cybersecurity"));
        assert_eq!(profile.recommended_courses, vec!["CS435"]);
    }

    #[tokio::test]
    async fn failed_turn_keeps_previous_profile() {
        let mut session = InteractiveSession::new(manager(&[]));
        let input: &[u8] = b"Junior\nEvening\nCybersecurity\n";
        let mut output = Vec::new();
        session.run(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Sorry, something went wrong"));
        // The follow-up turn failed, so the career goal was never committed.
        assert!(session.profile().career_goals.is_none());
        assert_eq!(session.profile().time_preference.as_deref(), Some("Evening"));
    }

    #[tokio::test]
    async fn reset_starts_a_new_profile() {
        let mut session = InteractiveSession::new(manager(&[]));
        let input: &[u8] = b"Junior\n/reset\n";
        let mut output = Vec::new();
        let first_id = session.profile().session_id.clone();
        session.run(input, &mut output).await.unwrap();

        assert_ne!(session.profile().session_id, first_id);
        assert!(session.profile().year.is_none());
        assert!(String::from_utf8(output).unwrap().contains("Starting a new session."));
    }

    #[tokio::test]
    async fn json_mode_emits_one_line_per_input() {
        let mgr = manager(&[]);
        let input: &[u8] = b"{\"session_id\":\"abc\"}\n\nnot json\n";
        let mut output = Vec::new();
        run_json(&mgr, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["next_step"], "year");
        assert_eq!(lines[0]["profile"]["session_id"], "abc");
        assert!(lines[1]["error"].as_str().unwrap().starts_with("invalid profile"));
    }
}
