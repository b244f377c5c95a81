//! Bounded conversation history kept inside the student profile.

use super::model::{ConversationTurn, TurnRole};

/// Append/trim policy for a profile's conversation history.
///
/// The history itself lives in `StudentProfile::conversation_history` so it
/// round-trips with the profile; this type only enforces the cap.
#[derive(Debug, Clone, Copy)]
pub struct ConversationLog {
    max_turns: usize,
}

impl ConversationLog {
    pub fn new(max_turns: usize) -> Self {
        Self { max_turns }
    }

    /// Add a turn, dropping the oldest entries once over capacity.
    pub fn append(
        &self,
        history: &mut Vec<ConversationTurn>,
        role: TurnRole,
        message: impl Into<String>,
    ) {
        history.push(ConversationTurn::new(role, message));
        self.trim(history);
    }

    /// Drop the oldest entries beyond capacity, keeping order.
    pub fn trim(&self, history: &mut Vec<ConversationTurn>) {
        if history.len() > self.max_turns {
            let excess = history.len() - self.max_turns;
            history.drain(..excess);
        }
    }

    /// The last `n` turns.
    pub fn last_n(history: &[ConversationTurn], n: usize) -> &[ConversationTurn] {
        let start = history.len().saturating_sub(n);
        &history[start..]
    }

    /// The last `n` turns rendered as `role: message` lines.
    pub fn recent_context(history: &[ConversationTurn], n: usize) -> String {
        Self::last_n(history, n)
            .iter()
            .map(|t| format!("{}: {}", t.role, t.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(history: &[ConversationTurn]) -> Vec<&str> {
        history.iter().map(|t| t.message.as_str()).collect()
    }

    #[test]
    fn append_under_capacity_keeps_everything() {
        let log = ConversationLog::new(5);
        let mut history = Vec::new();
        log.append(&mut history, TurnRole::User, "hi");
        log.append(&mut history, TurnRole::Advisor, "hello");
        assert_eq!(messages(&history), vec!["hi", "hello"]);
        assert_eq!(history[0].role, TurnRole::User);
    }

    #[test]
    fn oldest_entries_are_evicted_first() {
        let log = ConversationLog::new(3);
        let mut history = Vec::new();
        for i in 0..7 {
            log.append(&mut history, TurnRole::User, format!("m{i}"));
            assert!(history.len() <= 3);
        }
        assert_eq!(messages(&history), vec!["m4", "m5", "m6"]);
    }

    #[test]
    fn trim_handles_oversized_incoming_history() {
        let log = ConversationLog::new(2);
        let mut history: Vec<ConversationTurn> = (0..5)
            .map(|i| ConversationTurn::new(TurnRole::Advisor, format!("m{i}")))
            .collect();
        log.trim(&mut history);
        assert_eq!(messages(&history), vec!["m3", "m4"]);
    }

    #[test]
    fn recent_context_formats_last_turns() {
        let log = ConversationLog::new(10);
        let mut history = Vec::new();
        log.append(&mut history, TurnRole::Advisor, "Try CS 100.");
        log.append(&mut history, TurnRole::User, "sounds boring");
        log.append(&mut history, TurnRole::Advisor, "How about CS 113?");

        assert_eq!(
            ConversationLog::recent_context(&history, 2),
            "user: sounds boring\nadvisor: How about CS 113?"
        );
        assert_eq!(ConversationLog::last_n(&history, 10).len(), 3);
        assert_eq!(ConversationLog::recent_context(&[], 5), "");
    }
}
