/// Workflow client: the single point of entry for every call to the external
/// workflow-automation service (question generation, scoring, CV processing).
///
/// No other module talks to the workflow service directly. Calls are never retried;
/// each failure surfaces once to the caller.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod endpoints;

#[cfg(test)]
pub mod test_support;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("WORKFLOW_BASE_URL is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Workflow returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed workflow payload: {0}")]
    Malformed(String),
}

#[derive(Clone)]
pub struct WorkflowClient {
    client: Client,
    base_url: Option<String>,
}

impl WorkflowClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, WorkflowError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Resolves a webhook path against the base URL.
    /// Fails before any request is attempted when no base URL is configured.
    pub fn url(&self, path: &str) -> Result<String, WorkflowError> {
        let base = self.base_url.as_deref().ok_or(WorkflowError::NotConfigured)?;
        Ok(format!("{base}/{}", path.trim_start_matches('/')))
    }

    /// GETs a webhook with query parameters and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WorkflowError> {
        let url = self.url(path)?;
        debug!("Workflow GET {url}");

        let response = self.client.get(&url).query(query).send().await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POSTs a JSON body and decodes the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, WorkflowError> {
        let body = self.post(path, body).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POSTs a JSON body where only the status matters; the response body is ignored.
    pub async fn post_json_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), WorkflowError> {
        self.post(path, body).await.map(|_| ())
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String, WorkflowError> {
        let url = self.url(path)?;
        debug!("Workflow POST {url}");

        let response = self.client.post(&url).json(body).send().await?;
        read_success_body(response).await
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, WorkflowError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(WorkflowError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    use super::test_support::spawn_fake_server;
    use super::*;

    fn client(base: Option<String>) -> WorkflowClient {
        WorkflowClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let c = client(Some("http://n8n.local/".to_string()));
        assert_eq!(
            c.url("/webhook/interview-start").unwrap(),
            "http://n8n.local/webhook/interview-start"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_before_request() {
        let c = client(None);
        assert!(!c.is_configured());
        let result: Result<Value, _> = c.get_json(endpoints::MCQ_SESSION, &[]).await;
        assert!(matches!(result, Err(WorkflowError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_non_success_status_surfaces_body() {
        let base = spawn_fake_server(Router::new().route(
            "/webhook/interview-answer",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad answer") }),
        ))
        .await;

        let result: Result<Value, _> = client(Some(base))
            .post_json(endpoints::INTERVIEW_ANSWER, &json!({}))
            .await;
        match result {
            Err(WorkflowError::Status { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad answer");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_passes_query() {
        let base = spawn_fake_server(Router::new().route(
            "/echo",
            get(
                |axum::extract::Query(q): axum::extract::Query<HashMap<String, String>>| async move {
                    Json(q)
                },
            ),
        ))
        .await;

        let echoed: Value = client(Some(base))
            .get_json("echo", &[("interviewId", "abc 1")])
            .await
            .unwrap();
        assert_eq!(echoed["interviewId"], "abc 1");
    }

    #[tokio::test]
    async fn test_post_json_unit_ignores_empty_body() {
        let base = spawn_fake_server(
            Router::new().route("/interview-mcq-finish", post(|| async { StatusCode::OK })),
        )
        .await;

        client(Some(base))
            .post_json_unit(endpoints::MCQ_FINISH, &json!({ "interviewId": "x" }))
            .await
            .unwrap();
    }
}
