use serde::{Deserialize, Serialize};

use crate::models::cv::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOption {
    pub id: String,
    pub text: String,
}

/// One generated question. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    /// 1-based display order, assigned from the order the workflow returned.
    pub order: usize,
    pub text: String,
    pub options: Vec<McqOption>,
    pub correct_option_id: String,
}

impl Question {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

/// Canonical question set every response shape is normalized into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub interview_id: String,
    pub position_title: String,
    pub cv_name: Option<String>,
    pub language: Language,
    pub questions: Vec<Question>,
}

/// An answer recorded by the walker. Created once per question, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_option_id: String,
    pub correct: bool,
}

/// Body of the finish webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishPayload {
    pub interview_id: String,
    pub total_questions: usize,
    pub correct_count: usize,
    pub answers: Vec<AnswerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_payload_uses_workflow_field_names() {
        let payload = FinishPayload {
            interview_id: "iv-1".to_string(),
            total_questions: 1,
            correct_count: 1,
            answers: vec![AnswerRecord {
                question_id: "q1".to_string(),
                selected_option_id: "a".to_string(),
                correct: true,
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["interviewId"], "iv-1");
        assert_eq!(json["totalQuestions"], 1);
        assert_eq!(json["correctCount"], 1);
        assert_eq!(json["answers"][0]["questionId"], "q1");
        assert_eq!(json["answers"][0]["selectedOptionId"], "a");
        assert_eq!(json["answers"][0]["correct"], true);
    }
}
