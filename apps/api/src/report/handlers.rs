use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::report::builder::{build_report, load_report_rows, InterviewReport};
use crate::routes::UserIdQuery;
use crate::state::AppState;

/// GET /api/v1/interviews/:id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<InterviewReport>, AppError> {
    let rows = load_report_rows(&state.db, interview_id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
    Ok(Json(build_report(&rows)))
}
