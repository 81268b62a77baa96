use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cv_id: Option<Uuid>,
    pub cv_name: String,
    pub role: String,
    pub status: String,
    pub score: Option<i32>,
    pub correct_count: Option<i32>,
    pub total_questions: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewQuestionRow {
    pub id: String,
    pub interview_id: Uuid,
    pub position: i32,
    pub question_text: String,
    /// `{"options": [{"id": "...", "text": "..."}]}` as produced by the workflow.
    pub options_json: Value,
    pub correct_option_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewAnswerRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub answer_text: Option<String>,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Draft,
    Scheduled,
    Finished,
}

impl InterviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Draft => "draft",
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InterviewStatus::Draft),
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "finished" => Ok(InterviewStatus::Finished),
            other => Err(format!("unknown interview status '{other}'")),
        }
    }
}
