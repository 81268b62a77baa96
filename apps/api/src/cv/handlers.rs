use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::cv::ingest::{ingest_cv, CvCreated, CvForm};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/cvs (multipart/form-data)
///
/// Fields: `user_id`, `name`, `language` (hu|en), and `file` (PDF) or `text_content`.
pub async fn handle_create_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CvCreated>), AppError> {
    let mut form = CvForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let bad_field = |e: MultipartError| AppError::Validation(format!("Could not read field '{name}': {e}"));
        match name.as_str() {
            "file" => form.file = Some(field.bytes().await.map_err(bad_field)?),
            "user_id" => form.user_id = Some(field.text().await.map_err(bad_field)?),
            "name" => form.name = Some(field.text().await.map_err(bad_field)?),
            "language" => form.language = Some(field.text().await.map_err(bad_field)?),
            "text_content" => form.text_content = Some(field.text().await.map_err(bad_field)?),
            _ => {}
        }
    }

    let created = ingest_cv(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        &state.workflow,
        form.into_upload()?,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
