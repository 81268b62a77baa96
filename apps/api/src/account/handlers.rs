use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::dashboard::{load_dashboard, DashboardData};
use crate::account::deletion::{delete_account_data, DeletionSummary};
use crate::account::settings::{update_settings, SettingsUpdate, UserSettings};
use crate::account::users::{ensure_user, find_user, looks_like_email, SignedInUser};
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub update: SettingsUpdate,
}

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub ok: bool,
    pub deleted: DeletionSummary,
    pub closed_sessions: usize,
}

/// POST /api/v1/users
///
/// Called by the auth layer after sign-in; creates the user on first sight.
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<UserRow>, AppError> {
    if !looks_like_email(&req.email) {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid e-mail address",
            req.email
        )));
    }
    let user = ensure_user(
        &state.db,
        SignedInUser {
            email: req.email.trim(),
            name: req.name.as_deref(),
            picture: req.picture.as_deref(),
        },
    )
    .await?;
    Ok(Json(user))
}

/// GET /api/v1/dashboard
pub async fn handle_get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardData>, AppError> {
    let data = load_dashboard(&state.db, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", params.user_id)))?;
    Ok(Json(data))
}

/// PATCH /api/v1/settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<UserSettings>, AppError> {
    if find_user(&state.db, req.user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }
    let settings = update_settings(&state.db, req.user_id, &req.update).await?;
    Ok(Json(settings))
}

/// DELETE /api/v1/account
///
/// Removes the user's CVs, interviews and settings, and closes any live sessions.
pub async fn handle_delete_account(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DeleteAccountResponse>, AppError> {
    let deleted = delete_account_data(&state.db, params.user_id).await?;
    let closed_sessions = state.sessions.remove_owned_by(params.user_id);
    Ok(Json(DeleteAccountResponse {
        ok: true,
        deleted,
        closed_sessions,
    }))
}
