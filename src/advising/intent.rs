//! Intent classification for utterances in the recommendation phase.

const END_SIGNALS: &[&str] = &[
    "done",
    "finish",
    "complete",
    "that's all",
    "no more",
    "goodbye",
    "bye",
    "exit",
];

const NEW_RECOMMENDATION_SIGNALS: &[&str] = &[
    "another",
    "next",
    "more",
    "different",
    "something else",
    "what else",
    "other options",
    "more recommendations",
];

/// What the student wants from the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    EndConversation,
    NewRecommendation,
    Feedback,
}

/// Literal keyword classifier. Checks run in priority order: ending the
/// conversation wins over asking for another recommendation.
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn classify(utterance: &str) -> Intent {
        if Self::wants_to_end(utterance) {
            Intent::EndConversation
        } else if Self::wants_new_recommendation(utterance) {
            Intent::NewRecommendation
        } else {
            Intent::Feedback
        }
    }

    pub fn wants_to_end(utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        END_SIGNALS.iter().any(|s| lowered.contains(s))
    }

    pub fn wants_new_recommendation(utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        NEW_RECOMMENDATION_SIGNALS.iter().any(|s| lowered.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn something_else_is_a_new_recommendation() {
        assert_eq!(
            IntentClassifier::classify("I'd like something else"),
            Intent::NewRecommendation
        );
    }

    #[test]
    fn ending_takes_priority() {
        assert_eq!(
            IntentClassifier::classify("that's all, goodbye"),
            Intent::EndConversation
        );
        // "no more" contains "more" but ending wins.
        assert_eq!(
            IntentClassifier::classify("No more for today"),
            Intent::EndConversation
        );
    }

    #[test]
    fn new_recommendation_signals() {
        for text in [
            "Give me another one",
            "What's NEXT?",
            "any other options?",
            "something different please",
        ] {
            assert_eq!(IntentClassifier::classify(text), Intent::NewRecommendation, "{text}");
        }
    }

    #[test]
    fn everything_else_is_feedback() {
        assert_eq!(
            IntentClassifier::classify("Who teaches that section?"),
            Intent::Feedback
        );
        assert_eq!(IntentClassifier::classify(""), Intent::Feedback);
    }
}
