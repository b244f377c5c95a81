//! Course section records as exported by the registrar.

use serde::{Deserialize, Deserializer, Serialize};

/// One course section. Accepts the field-name variants seen across registrar
/// exports (`COURSE`, `Course`, `course_code`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(
        default,
        alias = "COURSE",
        alias = "Course",
        alias = "course",
        deserialize_with = "text"
    )]
    pub course_code: String,
    #[serde(default, alias = "TITLE", alias = "Title", deserialize_with = "text")]
    pub title: String,
    #[serde(
        default,
        alias = "INSTRUCTOR",
        alias = "Instructor",
        deserialize_with = "text"
    )]
    pub instructor: String,
    #[serde(
        default,
        alias = "INSTRUCTION_METHOD",
        alias = "DELIVERY_MODE",
        alias = "Delivery Mode",
        deserialize_with = "text"
    )]
    pub delivery_mode: String,
    #[serde(default, alias = "CREDITS", alias = "Credits", deserialize_with = "text")]
    pub credits: String,
    #[serde(default, alias = "DAYS", alias = "Days", deserialize_with = "text")]
    pub days: String,
    #[serde(default, alias = "TIMES", alias = "Times", deserialize_with = "text")]
    pub times: String,
    #[serde(default, alias = "CRN", deserialize_with = "text")]
    pub crn: String,
    #[serde(default, alias = "SECTION", alias = "Section", deserialize_with = "text")]
    pub section: String,
    #[serde(default, alias = "STATUS", alias = "Status", deserialize_with = "text")]
    pub status: String,
    #[serde(default, alias = "COMMENTS", alias = "Comments", deserialize_with = "text")]
    pub comments: String,
}

/// Registrar exports mix strings, numbers, and nulls for the same column.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

impl CourseRecord {
    /// A record needs at least a course code and a title to be offered.
    pub fn is_valid(&self) -> bool {
        !self.course_code.trim().is_empty() && !self.title.trim().is_empty()
    }

    fn schedule(&self) -> String {
        format!("{} {}", self.days, self.times).trim().to_string()
    }

    /// Single-paragraph form used in the catalog snapshot handed to the model.
    pub fn to_prompt_line(&self) -> String {
        format!(
            "Course {}, titled {}. It is taught by {} and is a {} course worth {} credits. \
             The schedule is {} with CRN {}.",
            self.course_code,
            self.title,
            self.instructor,
            self.delivery_mode,
            self.credits,
            self.schedule(),
            self.crn,
        )
    }

    /// Multi-line form for people.
    pub fn display(&self) -> String {
        format!(
            "{}: {}\nInstructor: {}\nSchedule: {}\nCredits: {} | Mode: {} | CRN: {}",
            self.course_code,
            self.title,
            self.instructor,
            self.schedule(),
            self.credits,
            self.delivery_mode,
            self.crn,
        )
    }
}

/// Join records into the snapshot text.
pub fn snapshot_text(records: &[CourseRecord]) -> String {
    records
        .iter()
        .map(CourseRecord::to_prompt_line)
        .collect::<Vec<_>>()
        .join("\n---\n")
}
