//! System instructions, prompt builders, and validator reply parsing.

use super::curriculum::CS_PLAN_OF_STUDY;
use super::model::StudentProfile;
use super::state::IntakeField;

/// Returned when the student ends the conversation.
pub const CLOSING_MESSAGE: &str = "Thank you for the great conversation! Feel free to come back \
anytime if you need more course recommendations. Good luck with your studies!";

/// Returned for any turn after the conversation has concluded.
pub const CONCLUDED_MESSAGE: &str =
    "Our conversation has ended. Would you like to start a new session?";

/// Returned in the recommendation phase when there is nothing to respond to.
pub const IDLE_MESSAGE: &str =
    "I'm here to help you with more course recommendations! What would you like to know?";

/// System instruction for validating one intake answer.
pub fn validation_system_prompt(retry_limit: u32) -> String {
    format!(
        "You are an NJIT academic advisor. Your task is to confirm the student's answer. \
         Your responses must be extremely short, clear, and highly conversational for \
         text-to-speech. Do not use markdown characters or bullet points.\n\
         Rules:\n\
         - If the answer is valid/meaningful → Respond with a polite, one-sentence confirmation, \
         e.g., 'Got it. Moving to the next question.'\n\
         - If invalid/irrelevant and retries < {retry_limit} → Start your response with 'REPEAT:' \
         and politely say they didn't answer correctly, then clearly repeat the question.\n\
         - If invalid again (retries == {retry_limit}) → Start your response with 'SKIP:' and say \
         'I'll skip this for now and move on.'\n\
         Do not include any other text besides the required output."
    )
}

/// User prompt carrying the answer under validation.
pub fn validation_prompt(field: IntakeField, question: &str, answer: &str, retries: u32) -> String {
    let answer = if answer.trim().is_empty() {
        "[no response]"
    } else {
        answer
    };
    format!(
        "Question: {question}\n\
         Field: {field}\n\
         Student Answer: {answer}\n\
         Retry Count: {retries}"
    )
}

/// What the validator decided about an intake answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// Ask again; carries the re-prompt.
    Repeat(String),
    /// Give up on this field; carries the transition text.
    Skip(String),
    /// Accept; carries the confirmation text.
    Accept(String),
}

/// Interpret a validator reply by its prefix (case-insensitive).
///
/// Anything without a recognised prefix is treated as acceptance, so a
/// drifting reply format never blocks intake progress.
pub fn parse_validation_reply(reply: &str) -> ValidationVerdict {
    let trimmed = reply.trim();
    if let Some(rest) = strip_prefix_ignore_case(trimmed, "REPEAT:") {
        ValidationVerdict::Repeat(rest.trim().to_string())
    } else if let Some(rest) = strip_prefix_ignore_case(trimmed, "SKIP:") {
        ValidationVerdict::Skip(rest.trim().to_string())
    } else {
        ValidationVerdict::Accept(trimmed.to_string())
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

const FOLLOW_UP_RULES: &str = "You must now ask three distinct, personalized follow-up questions \
to prepare for the final recommendation. Your response must be highly conversational and clear \
for text-to-speech. Your entire response must be under 3 short sentences. Do not use markdown \
characters, lists, or symbols in your response. Do not give any recommendations yet.";

/// System instruction for the follow-up questions.
///
/// With `after_confirmation`, the advisor first acknowledges the last intake
/// answer in the same reply.
pub fn follow_up_system_prompt(after_confirmation: bool) -> String {
    if after_confirmation {
        format!(
            "You are an expert, friendly, and encouraging NJIT advisor. The student has answered \
             the initial questions. Acknowledge the last answer briefly, then smoothly transition \
             into the follow-up questions. {FOLLOW_UP_RULES}"
        )
    } else {
        format!(
            "You are an expert, friendly, and encouraging NJIT advisor. The student has finished \
             the initial questions. {FOLLOW_UP_RULES}"
        )
    }
}

pub fn follow_up_prompt(
    profile: &StudentProfile,
    catalog: &str,
    confirmation: Option<&str>,
) -> String {
    let acknowledge = confirmation
        .map(|c| format!("Acknowledge this confirmation first: '{c}'\n\n"))
        .unwrap_or_default();
    format!(
        "{acknowledge}Student Profile:\n{}\n\nCourse Data:\n{catalog}",
        profile.summary()
    )
}

/// System instruction for the first recommendation.
pub fn first_recommendation_system_prompt() -> &'static str {
    "You are an NJIT Computer Science Academic Advisor. Based on all collected info, provide \
     the single best-fit course recommendation. Be highly conversational and accessible for \
     text-to-speech. Quote the course details directly from the provided schedule data. Do not \
     use greetings or re-introductions. Start directly with the recommendation. End by asking if \
     they'd like more recommendations or have questions about this course. Keep your response \
     to exactly 3 concise sentences."
}

pub fn first_recommendation_prompt(profile: &StudentProfile, catalog: &str) -> String {
    format!(
        "CURRICULUM GUIDE:\n{CS_PLAN_OF_STUDY}\n\n\
         STUDENT PROFILE:\n{}\n\
         Follow-up Answers:\n{}\n\n\
         AVAILABLE COURSES:\n{catalog}",
        profile.summary(),
        profile.follow_up_response.as_deref().unwrap_or(""),
    )
}

/// Comma-separated exclusion list, or `None` when nothing was recommended.
pub fn exclusion_list(courses: &[String]) -> String {
    if courses.is_empty() {
        "None".to_string()
    } else {
        courses.join(", ")
    }
}

/// System instruction for every recommendation after the first.
pub fn next_recommendation_system_prompt(excluded: &str) -> String {
    format!(
        "You are a conversational NJIT Computer Science academic advisor. The student wants \
         ANOTHER course recommendation. CRITICAL: You have already recommended these courses: \
         {excluded}. DO NOT recommend any of these courses again. Find a DIFFERENT course that \
         fits their profile. Be conversational, mention the specific course details including \
         CRN, and ask if they want more options. Keep response to 2-3 sentences maximum."
    )
}

pub struct NextRecommendationContext<'a> {
    pub conversation: &'a str,
    pub preferences: &'a str,
    pub excluded: &'a str,
    pub catalog: &'a str,
}

pub fn next_recommendation_prompt(
    profile: &StudentProfile,
    ctx: &NextRecommendationContext<'_>,
) -> String {
    format!(
        "CURRICULUM GUIDE:\n{CS_PLAN_OF_STUDY}\n\n\
         STUDENT PROFILE:\n{}\n\n\
         CONVERSATION HISTORY:\n{}\n\n\
         USER PREFERENCES:\n{}\n\n\
         COURSES ALREADY RECOMMENDED (MUST NOT REPEAT): {}\n\n\
         RECOMMENDATION COUNT: {}\n\n\
         AVAILABLE COURSES (pick a DIFFERENT course than already recommended):\n{}",
        profile.summary(),
        ctx.conversation,
        ctx.preferences,
        ctx.excluded,
        profile.current_recommendation_count,
        ctx.catalog,
    )
}

/// System instruction for responding to general feedback.
pub fn feedback_system_prompt() -> &'static str {
    "You are a conversational NJIT academic advisor. The student just gave you feedback about a \
     course recommendation. Respond naturally to their comment, acknowledge their feedback, and \
     then smoothly transition to asking if they'd like another recommendation or have specific \
     questions. Keep your response conversational, engaging, and under 2 sentences for \
     text-to-speech clarity. Always end with a question to keep the conversation going."
}

pub fn feedback_prompt(profile: &StudentProfile, utterance: &str, recent: &str) -> String {
    format!(
        "Student just said: '{utterance}'\n\n\
         Recent conversation context:\n{recent}\n\n\
         Student profile: {} {} student interested in {}",
        profile.year.as_deref().unwrap_or("a"),
        profile.major,
        profile.career_goals.as_deref().unwrap_or("exploring their options"),
    )
}
