use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cv::{CvRow, Language};
use crate::workflow_client::{endpoints, WorkflowClient, WorkflowError};

/// Question count reported when the workflow does not list the generated questions.
pub const DEFAULT_QUESTION_COUNT: usize = 8;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub user_id: Uuid,
    pub cv_id: Uuid,
    pub position_title: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowStartRequest<'a> {
    cv_id: Uuid,
    position_title: &'a str,
    language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowStartResponse {
    interview_id: Value,
    #[serde(default)]
    questions: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub struct StartedInterview {
    pub interview_id: Uuid,
    pub question_count: usize,
}

pub async fn start_interview(
    pool: &PgPool,
    workflow: &WorkflowClient,
    request: &StartInterviewRequest,
) -> Result<StartedInterview, AppError> {
    let position_title = request.position_title.trim();
    if position_title.is_empty() {
        return Err(AppError::Validation(
            "position_title cannot be empty".to_string(),
        ));
    }
    if !workflow.is_configured() {
        return Err(WorkflowError::NotConfigured.into());
    }

    let cv: Option<CvRow> = sqlx::query_as("SELECT * FROM cvs WHERE id = $1 AND user_id = $2")
        .bind(request.cv_id)
        .bind(request.user_id)
        .fetch_optional(pool)
        .await?;
    if cv.is_none() {
        return Err(AppError::NotFound(format!("CV {} not found", request.cv_id)));
    }

    let response: WorkflowStartResponse = workflow
        .post_json(
            endpoints::INTERVIEW_START,
            &WorkflowStartRequest {
                cv_id: request.cv_id,
                position_title,
                language: request.language,
            },
        )
        .await?;

    let started = interpret_start_response(response)?;
    info!(
        "Interview {} started for user {} ({} questions)",
        started.interview_id, request.user_id, started.question_count
    );
    Ok(started)
}

fn interpret_start_response(response: WorkflowStartResponse) -> Result<StartedInterview, WorkflowError> {
    let raw_id = match &response.interview_id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let interview_id = raw_id.trim().parse::<Uuid>().map_err(|_| {
        WorkflowError::Malformed(format!("interviewId '{raw_id}' is not a UUID"))
    })?;

    let question_count = response
        .questions
        .map(|q| q.len())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_QUESTION_COUNT);

    Ok(StartedInterview {
        interview_id,
        question_count,
    })
}
