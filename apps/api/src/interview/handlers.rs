use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::free_text::{
    finish_free_text_interview, submit_free_text_answer, AnswerFeedback, FreeTextAnswerRequest,
};
use crate::interview::ownership::ensure_interview_owner;
use crate::interview::start::{start_interview, StartInterviewRequest, StartedInterview};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FinishInterviewRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/interviews
///
/// Asks the workflow to generate questions for the given CV and position.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<StartedInterview>), AppError> {
    let started = start_interview(&state.db, &state.workflow, &req).await?;
    Ok((StatusCode::CREATED, Json(started)))
}

/// POST /api/v1/interviews/:id/answers
pub async fn handle_free_text_answer(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<FreeTextAnswerRequest>,
) -> Result<Json<AnswerFeedback>, AppError> {
    ensure_interview_owner(state.interviews.as_ref(), interview_id, req.user_id).await?;
    let feedback =
        submit_free_text_answer(&state.workflow, interview_id, &req.question_id, &req.answer_text)
            .await?;
    Ok(Json(feedback))
}

/// POST /api/v1/interviews/:id/finish
///
/// Returns the workflow's report for a free-text interview as-is.
pub async fn handle_finish_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<FinishInterviewRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_interview_owner(state.interviews.as_ref(), interview_id, req.user_id).await?;
    let report = finish_free_text_interview(&state.workflow, interview_id).await?;
    Ok(Json(report))
}
