//! Axum route handlers for the multiple-choice session API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::ownership::ensure_interview_owner;
use crate::routes::UserIdQuery;
use crate::session::finisher::dispatch_finish;
use crate::session::loader::load_question_set;
use crate::session::models::FinishPayload;
use crate::session::registry::{LoadStart, Lookup};
use crate::session::walker::{McqSession, SessionPhase, SessionView, Step};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionActionRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub user_id: Uuid,
    pub option_id: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SessionResponse {
    Loading {
        interview_id: Uuid,
        phase: SessionPhase,
    },
    Active(SessionView),
}

/// POST /api/v1/interviews/:id/session
///
/// Loads the question set from the workflow service and opens a session.
/// Loading an interview that already has a session in progress returns that session.
pub async fn handle_load_session(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<SessionActionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if !state.workflow.is_configured() {
        return Err(crate::workflow_client::WorkflowError::NotConfigured.into());
    }
    ensure_interview_owner(state.interviews.as_ref(), interview_id, req.user_id).await?;

    let ticket = match state.sessions.begin_load(interview_id, req.user_id)? {
        LoadStart::Existing(session) => {
            return Ok(Json(SessionResponse::Active(session.lock().await.view())));
        }
        LoadStart::Started(ticket) => ticket,
    };

    // On any error the ticket is dropped and the loading slot released.
    let set = load_question_set(&state.workflow, &interview_id.to_string()).await?;
    let session = McqSession::new(set)?;
    let view = session.view();
    ticket.complete(session);

    info!(
        "Session opened for interview {interview_id} ({} questions)",
        view.total_questions
    );
    Ok(Json(SessionResponse::Active(view)))
}

/// GET /api/v1/interviews/:id/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = match state.sessions.lookup(interview_id, params.user_id)? {
        Lookup::Loading => SessionResponse::Loading {
            interview_id,
            phase: SessionPhase::Loading,
        },
        Lookup::Ready(session) => SessionResponse::Active(session.lock().await.view()),
    };
    Ok(Json(response))
}

/// POST /api/v1/interviews/:id/session/select
pub async fn handle_select_option(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SessionView>, AppError> {
    let shared = state.sessions.ready(interview_id, req.user_id)?;
    let mut session = shared.lock().await;
    session.select(&req.option_id)?;
    Ok(Json(session.view()))
}

/// POST /api/v1/interviews/:id/session/submit
///
/// Reveals correctness for the selected option. Submitting the last answer finishes
/// the session, sends the results to the workflow service in the background and
/// releases the session; this response carries its final view.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<SessionActionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let shared = state.sessions.ready(interview_id, req.user_id)?;
    let mut session = shared.lock().await;

    if let Step::Revealed {
        finish: Some(payload),
        ..
    } = session.submit()?
    {
        hand_off(&state, interview_id, payload);
    }
    let view = session.view();
    release_if_finished(&state, interview_id, &view);
    Ok(Json(view))
}

/// POST /api/v1/interviews/:id/session/next
pub async fn handle_next_question(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<SessionActionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let shared = state.sessions.ready(interview_id, req.user_id)?;
    let mut session = shared.lock().await;

    if let Step::Finished(payload) = session.next() {
        hand_off(&state, interview_id, payload);
    }
    let view = session.view();
    release_if_finished(&state, interview_id, &view);
    Ok(Json(view))
}

fn hand_off(state: &AppState, interview_id: Uuid, payload: FinishPayload) {
    info!(
        "Session for interview {interview_id} finished: {}/{} correct",
        payload.correct_count, payload.total_questions
    );
    dispatch_finish(state.finish_sink.clone(), payload);
}

fn release_if_finished(state: &AppState, interview_id: Uuid, view: &SessionView) {
    if view.phase == SessionPhase::Finished && state.sessions.remove(interview_id) {
        debug!("Released finished session for interview {interview_id}");
    }
}
