pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::account::handlers as account;
use crate::cv::extract::MAX_CV_BYTES;
use crate::cv::handlers as cv;
use crate::interview::handlers as interview;
use crate::report::handlers as report;
use crate::session::handlers as session;
use crate::state::AppState;

/// Room for the multipart framing and text fields around the CV file.
const CV_BODY_OVERHEAD: usize = 1024 * 1024;

/// `?user_id=` on GET/DELETE routes. Authentication happens upstream; the caller
/// passes the signed-in user's id.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Account
        .route("/api/v1/users", post(account::handle_sign_in))
        .route("/api/v1/dashboard", get(account::handle_get_dashboard))
        .route("/api/v1/settings", patch(account::handle_update_settings))
        .route("/api/v1/account", delete(account::handle_delete_account))
        // CVs
        .route(
            "/api/v1/cvs",
            post(cv::handle_create_cv)
                .layer(DefaultBodyLimit::max(MAX_CV_BYTES + CV_BODY_OVERHEAD)),
        )
        // Interviews
        .route("/api/v1/interviews", post(interview::handle_start_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_free_text_answer),
        )
        .route(
            "/api/v1/interviews/:id/finish",
            post(interview::handle_finish_interview),
        )
        .route("/api/v1/interviews/:id/report", get(report::handle_get_report))
        // Multiple-choice session
        .route(
            "/api/v1/interviews/:id/session",
            post(session::handle_load_session).get(session::handle_get_session),
        )
        .route(
            "/api/v1/interviews/:id/session/select",
            post(session::handle_select_option),
        )
        .route(
            "/api/v1/interviews/:id/session/submit",
            post(session::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/session/next",
            post(session::handle_next_question),
        )
        .with_state(state)
}
