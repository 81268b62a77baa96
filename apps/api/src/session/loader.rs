//! Session Loader: fetches the question set for an interview from the workflow
//! service and normalizes it into a `QuestionSet`.
//!
//! The workflow answers in one of two shapes:
//! - a session object `{interviewId, positionTitle, language, questions: [...]}`;
//! - the raw question rows `[{id, question_text, options_json: {options}, correct_option_id}]`.
//!
//! Both are decoded through the untagged `SessionPayload` and normalized right here,
//! so nothing downstream ever sees the row shape.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::info;

use crate::models::cv::Language;
use crate::session::models::{McqOption, Question, QuestionSet};
use crate::workflow_client::{endpoints, WorkflowClient, WorkflowError};

/// Position title used when the workflow only returns question rows.
const FALLBACK_POSITION_TITLE: &str = "Interview";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SessionPayload {
    Rows(Vec<QuestionRowPayload>),
    Direct(DirectSessionPayload),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectSessionPayload {
    #[serde(deserialize_with = "id_string")]
    pub interview_id: String,
    pub position_title: String,
    #[serde(default)]
    pub cv_name: Option<String>,
    #[serde(default)]
    pub language: Language,
    pub questions: Vec<DirectQuestionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectQuestionPayload {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub text: String,
    pub options: Vec<OptionPayload>,
    #[serde(deserialize_with = "id_string")]
    pub correct_option_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRowPayload {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub interview_id: Option<Value>,
    pub question_text: String,
    pub options_json: OptionsJson,
    #[serde(deserialize_with = "id_string")]
    pub correct_option_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OptionsJson {
    pub options: Vec<OptionPayload>,
}

#[derive(Debug, Deserialize)]
pub struct OptionPayload {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub text: String,
}

impl From<OptionPayload> for McqOption {
    fn from(o: OptionPayload) -> Self {
        McqOption { id: o.id, text: o.text }
    }
}

/// Row ids come out of the database as numbers or strings depending on the workflow.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_to_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected string or number id, got {value}")))
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Fetches and normalizes the question set for `interview_id`.
/// Any failure leaves nothing behind: the caller gets one error and no partial state.
pub async fn load_question_set(
    client: &WorkflowClient,
    interview_id: &str,
) -> Result<QuestionSet, WorkflowError> {
    let payload: SessionPayload = client
        .get_json(endpoints::MCQ_SESSION, &[("interviewId", interview_id)])
        .await?;

    let set = normalize(payload, interview_id)?;
    info!(
        "Loaded {} questions for interview {}",
        set.questions.len(),
        set.interview_id
    );
    Ok(set)
}

/// Converts either response shape into a validated `QuestionSet`, preserving order.
pub fn normalize(payload: SessionPayload, requested_id: &str) -> Result<QuestionSet, WorkflowError> {
    let set = match payload {
        SessionPayload::Direct(direct) => QuestionSet {
            interview_id: direct.interview_id,
            position_title: direct.position_title,
            cv_name: direct.cv_name.filter(|n| !n.trim().is_empty()),
            language: direct.language,
            questions: direct
                .questions
                .into_iter()
                .enumerate()
                .map(|(i, q)| Question {
                    id: q.id,
                    order: i + 1,
                    text: q.text,
                    options: q.options.into_iter().map(McqOption::from).collect(),
                    correct_option_id: q.correct_option_id,
                })
                .collect(),
        },
        SessionPayload::Rows(rows) => {
            let interview_id = rows
                .first()
                .and_then(|r| r.interview_id.as_ref())
                .and_then(value_to_id)
                .unwrap_or_else(|| requested_id.to_string());
            QuestionSet {
                interview_id,
                position_title: FALLBACK_POSITION_TITLE.to_string(),
                cv_name: None,
                language: Language::Hu,
                questions: rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| Question {
                        id: r.id,
                        order: i + 1,
                        text: r.question_text,
                        options: r
                            .options_json
                            .options
                            .into_iter()
                            .map(McqOption::from)
                            .collect(),
                        correct_option_id: r.correct_option_id,
                    })
                    .collect(),
            }
        }
    };

    validate(&set)?;
    Ok(set)
}

fn validate(set: &QuestionSet) -> Result<(), WorkflowError> {
    if set.questions.is_empty() {
        return Err(WorkflowError::Malformed(format!(
            "interview {} has no questions",
            set.interview_id
        )));
    }

    let mut question_ids = HashSet::new();
    for q in &set.questions {
        if !question_ids.insert(q.id.as_str()) {
            return Err(WorkflowError::Malformed(format!(
                "duplicate question id '{}'",
                q.id
            )));
        }
        let mut option_ids = HashSet::new();
        if !q.options.iter().all(|o| option_ids.insert(o.id.as_str())) {
            return Err(WorkflowError::Malformed(format!(
                "question '{}' has duplicate option ids",
                q.id
            )));
        }
        if !q.has_option(&q.correct_option_id) {
            return Err(WorkflowError::Malformed(format!(
                "question '{}' names correct option '{}' which is not among its options",
                q.id, q.correct_option_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    use super::*;
    use crate::workflow_client::test_support::spawn_fake_server;

    fn direct_json() -> Value {
        json!({
            "interviewId": "iv-42",
            "positionTitle": "Junior Rust Developer",
            "cvName": "Backend CV",
            "language": "en",
            "questions": [
                {
                    "id": "q1",
                    "text": "What does the borrow checker enforce?",
                    "options": [
                        { "id": "a", "text": "Aliasing XOR mutability" },
                        { "id": "b", "text": "Garbage collection" }
                    ],
                    "correctOptionId": "a"
                },
                {
                    "id": "q2",
                    "text": "Which trait enables `?` conversion?",
                    "options": [
                        { "id": "a", "text": "Into" },
                        { "id": "b", "text": "From" }
                    ],
                    "correctOptionId": "b"
                }
            ]
        })
    }

    fn rows_json() -> Value {
        json!([
            {
                "id": "q1",
                "interview_id": "iv-42",
                "question_text": "What does the borrow checker enforce?",
                "options_json": { "options": [
                    { "id": "a", "text": "Aliasing XOR mutability" },
                    { "id": "b", "text": "Garbage collection" }
                ]},
                "correct_option_id": "a"
            },
            {
                "id": "q2",
                "interview_id": "iv-42",
                "question_text": "Which trait enables `?` conversion?",
                "options_json": { "options": [
                    { "id": "a", "text": "Into" },
                    { "id": "b", "text": "From" }
                ]},
                "correct_option_id": "b"
            }
        ])
    }

    fn parse(value: Value) -> SessionPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_direct_shape_is_decoded_as_direct() {
        assert!(matches!(parse(direct_json()), SessionPayload::Direct(_)));
        assert!(matches!(parse(rows_json()), SessionPayload::Rows(_)));
    }

    #[test]
    fn test_rows_normalize_to_same_questions_as_direct() {
        let direct = normalize(parse(direct_json()), "iv-42").unwrap();
        let rows = normalize(parse(rows_json()), "iv-42").unwrap();

        assert_eq!(direct.questions, rows.questions);
        assert_eq!(rows.interview_id, "iv-42");
        assert_eq!(rows.position_title, FALLBACK_POSITION_TITLE);
        assert_eq!(rows.language, Language::Hu);
        assert_eq!(direct.language, Language::En);
        assert_eq!(direct.cv_name.as_deref(), Some("Backend CV"));
    }

    #[test]
    fn test_order_follows_server_order() {
        let set = normalize(parse(rows_json()), "iv-42").unwrap();
        let ids: Vec<_> = set.questions.iter().map(|q| (q.order, q.id.as_str())).collect();
        assert_eq!(ids, vec![(1, "q1"), (2, "q2")]);
    }

    #[test]
    fn test_rows_without_interview_id_fall_back_to_requested_id() {
        let rows = json!([{
            "id": 7,
            "question_text": "Q",
            "options_json": { "options": [{ "id": 1, "text": "x" }] },
            "correct_option_id": 1
        }]);
        let set = normalize(parse(rows), "requested").unwrap();
        assert_eq!(set.interview_id, "requested");
        assert_eq!(set.questions[0].id, "7");
        assert_eq!(set.questions[0].correct_option_id, "1");
    }

    #[test]
    fn test_empty_question_list_is_rejected() {
        let result = normalize(parse(json!([])), "iv");
        assert!(matches!(result, Err(WorkflowError::Malformed(_))));
    }

    #[test]
    fn test_correct_option_must_exist() {
        let mut body = direct_json();
        body["questions"][0]["correctOptionId"] = json!("z");
        let result = normalize(parse(body), "iv-42");
        assert!(matches!(result, Err(WorkflowError::Malformed(_))));
    }

    #[test]
    fn test_duplicate_option_ids_are_rejected() {
        let mut body = direct_json();
        body["questions"][1]["options"][1]["id"] = json!("a");
        body["questions"][1]["correctOptionId"] = json!("a");
        let result = normalize(parse(body), "iv-42");
        assert!(matches!(result, Err(WorkflowError::Malformed(_))));
    }

    fn client(base: String) -> WorkflowClient {
        WorkflowClient::new(Some(base), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_load_over_http_returns_normalized_set() {
        let base = spawn_fake_server(Router::new().route(
            "/interview-mcq-session",
            get(|| async { Json(rows_json()) }),
        ))
        .await;

        let set = load_question_set(&client(base), "iv-42").await.unwrap();
        assert_eq!(set.questions.len(), 2);
        assert_eq!(set.questions[1].correct_option_id, "b");
    }

    #[tokio::test]
    async fn test_load_server_error_yields_single_error_without_retry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let base = spawn_fake_server(Router::new().route(
            "/interview-mcq-session",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::INTERNAL_SERVER_ERROR, "workflow crashed")
                }
            }),
        ))
        .await;

        let result = load_question_set(&client(base), "iv-42").await;
        assert!(matches!(
            result,
            Err(WorkflowError::Status { status: 500, .. })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_undecodable_body_is_an_error() {
        let base = spawn_fake_server(Router::new().route(
            "/interview-mcq-session",
            get(|| async { "<html>not json</html>" }),
        ))
        .await;

        let result = load_question_set(&client(base), "iv-42").await;
        assert!(matches!(result, Err(WorkflowError::Parse(_))));
    }
}
