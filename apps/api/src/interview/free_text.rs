use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::workflow_client::{endpoints, WorkflowClient, WorkflowError};

/// Free-text answers are scored 1..=5 by the workflow.
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Deserialize)]
pub struct FreeTextAnswerRequest {
    pub user_id: Uuid,
    pub question_id: String,
    pub answer_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowAnswerRequest<'a> {
    interview_id: Uuid,
    question_id: &'a str,
    answer_text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowFeedback {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    short_feedback: Option<String>,
    #[serde(default)]
    improvement_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    pub score: Option<u8>,
    pub short_feedback: Option<String>,
    pub improvement_tips: Vec<String>,
}

impl From<WorkflowFeedback> for AnswerFeedback {
    fn from(w: WorkflowFeedback) -> Self {
        AnswerFeedback {
            score: w
                .score
                .filter(|s| s.is_finite())
                .map(|s| s.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8),
            short_feedback: w.short_feedback.filter(|f| !f.trim().is_empty()),
            improvement_tips: w
                .improvement_tips
                .into_iter()
                .filter(|t| !t.trim().is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowFinishRequest {
    interview_id: Uuid,
}

/// Sends one written answer for scoring and returns the workflow's feedback.
pub async fn submit_free_text_answer(
    workflow: &WorkflowClient,
    interview_id: Uuid,
    question_id: &str,
    answer_text: &str,
) -> Result<AnswerFeedback, AppError> {
    if answer_text.trim().is_empty() {
        return Err(AppError::Validation("answer_text cannot be empty".to_string()));
    }
    if question_id.trim().is_empty() {
        return Err(AppError::Validation("question_id cannot be empty".to_string()));
    }

    let feedback: WorkflowFeedback = workflow
        .post_json(
            endpoints::INTERVIEW_ANSWER,
            &WorkflowAnswerRequest {
                interview_id,
                question_id,
                answer_text: answer_text.trim(),
            },
        )
        .await?;
    Ok(feedback.into())
}

/// Asks the workflow to close a free-text interview and synthesize its report.
pub async fn finish_free_text_interview(
    workflow: &WorkflowClient,
    interview_id: Uuid,
) -> Result<Value, WorkflowError> {
    workflow
        .post_json(endpoints::INTERVIEW_FINISH, &WorkflowFinishRequest { interview_id })
        .await
}
