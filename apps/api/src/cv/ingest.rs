use std::future::Future;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::account::users::find_user;
use crate::cv::extract::extract_pdf_text;
use crate::errors::AppError;
use crate::models::cv::Language;
use crate::workflow_client::{endpoints, WorkflowClient, WorkflowError};

/// Raw multipart fields, before validation.
#[derive(Debug, Default)]
pub struct CvForm {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub text_content: Option<String>,
    pub file: Option<Bytes>,
}

#[derive(Debug)]
pub enum CvSource {
    Pdf(Bytes),
    Text(String),
}

#[derive(Debug)]
pub struct CvUpload {
    pub user_id: Uuid,
    pub name: String,
    pub language: Language,
    pub source: CvSource,
}

impl CvForm {
    /// A file wins over pasted text when both are sent.
    pub fn into_upload(self) -> Result<CvUpload, AppError> {
        let user_id = self
            .user_id
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?
            .parse::<Uuid>()
            .map_err(|e| AppError::Validation(format!("user_id is not a valid UUID: {e}")))?;

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("CV name is required".to_string()))?;

        let language = match self.language.as_deref() {
            None | Some("") => Language::default(),
            Some(raw) => raw.parse().map_err(AppError::Validation)?,
        };

        let source = match (self.file.filter(|f| !f.is_empty()), self.text_content) {
            (Some(file), _) => CvSource::Pdf(file),
            (None, Some(text)) if !text.trim().is_empty() => CvSource::Text(text.trim().to_string()),
            _ => {
                return Err(AppError::Validation(
                    "Either a PDF file or text_content is required".to_string(),
                ))
            }
        };

        Ok(CvUpload {
            user_id,
            name,
            language,
            source,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CvProcessRequest<'a> {
    cv_id: Uuid,
    name: &'a str,
    language: Language,
    text_content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct CvProcessResponse {
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CvCreated {
    pub cv_id: Uuid,
    pub summary: Option<String>,
}

pub fn cv_object_key(user_id: Uuid, cv_id: Uuid) -> String {
    format!("cvs/{user_id}/{cv_id}.pdf")
}

pub async fn ingest_cv(
    pool: &PgPool,
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    workflow: &WorkflowClient,
    upload: CvUpload,
) -> Result<CvCreated, AppError> {
    // Nothing is stored if the CV could never be processed.
    if !workflow.is_configured() {
        return Err(WorkflowError::NotConfigured.into());
    }
    if find_user(pool, upload.user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", upload.user_id)));
    }

    let cv_id = Uuid::new_v4();
    let text_content = match &upload.source {
        CvSource::Text(text) => {
            insert_cv_row(pool, cv_id, &upload, text, None).await?;
            text.clone()
        }
        CvSource::Pdf(file) => {
            let text = extract_pdf_text(file.clone()).await?;
            let key = cv_object_key(upload.user_id, cv_id);
            with_stored_original(
                s3,
                s3_bucket,
                &key,
                file.clone(),
                insert_cv_row(pool, cv_id, &upload, &text, Some(&key)),
            )
            .await?;
            text
        }
    };

    info!("Stored CV {cv_id} for user {}", upload.user_id);

    let processed: CvProcessResponse = workflow
        .post_json(
            endpoints::CV_PROCESS,
            &CvProcessRequest {
                cv_id,
                name: &upload.name,
                language: upload.language,
                text_content: &text_content,
            },
        )
        .await
        .map_err(|e| {
            warn!("CV {cv_id} is stored but the workflow did not process it: {e}");
            e
        })?;

    Ok(CvCreated {
        cv_id,
        summary: processed.summary,
    })
}

async fn insert_cv_row(
    pool: &PgPool,
    cv_id: Uuid,
    upload: &CvUpload,
    text_content: &str,
    s3_key: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO cvs (id, user_id, title, language, text_content, s3_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(cv_id)
    .bind(upload.user_id)
    .bind(&upload.name)
    .bind(upload.language.as_str())
    .bind(text_content)
    .bind(s3_key)
    .execute(pool)
    .await?;
    Ok(())
}

/// Uploads the original file, then runs `record`. When `record` fails the object is
/// deleted again so no file is left without a CV row.
async fn with_stored_original<T, F>(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    file: Bytes,
    record: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(file))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("CV upload failed: {e}")))?;
    info!("Uploaded CV original to s3://{bucket}/{key}");

    match record.await {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(delete_err) = s3.delete_object().bucket(bucket).key(key).send().await {
                warn!("Could not remove s3://{bucket}/{key} after a failed insert: {delete_err}");
            }
            Err(e)
        }
    }
}
