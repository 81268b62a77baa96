use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::interview::{InterviewAnswerRow, InterviewQuestionRow, InterviewRow};
use crate::session::models::McqOption;

#[derive(Debug, Clone, Serialize)]
pub struct InterviewReport {
    pub interview_id: Uuid,
    pub role: String,
    pub cv_name: String,
    pub status: String,
    /// Scheduled time when known, otherwise creation time.
    pub date: DateTime<Utc>,
    pub score: u32,
    pub correct_count: u32,
    pub total_questions: Option<u32>,
    pub items: Vec<ReportItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportItem {
    pub question_id: String,
    pub position: Option<i32>,
    pub question_text: String,
    pub options: Vec<McqOption>,
    pub correct_option_id: Option<String>,
    pub selected_option_id: Option<String>,
    pub answer_text: Option<String>,
    pub is_correct: bool,
}

/// Everything the report needs, as read from the database.
pub struct ReportRows {
    pub interview: InterviewRow,
    pub answers: Vec<InterviewAnswerRow>,
    pub questions: Vec<InterviewQuestionRow>,
}

/// Reads the interview (scoped to its owner), its answers in answer order and the
/// questions they reference. Returns `None` when the interview is not the user's.
pub async fn load_report_rows(
    pool: &PgPool,
    interview_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ReportRows>> {
    let interview: Option<InterviewRow> =
        sqlx::query_as("SELECT * FROM interviews WHERE id = $1 AND user_id = $2")
            .bind(interview_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let Some(interview) = interview else {
        return Ok(None);
    };

    let answers: Vec<InterviewAnswerRow> = sqlx::query_as(
        "SELECT * FROM interview_answers WHERE interview_id = $1 ORDER BY created_at ASC",
    )
    .bind(interview_id)
    .fetch_all(pool)
    .await?;

    let question_ids: Vec<String> = answers.iter().map(|a| a.question_id.clone()).collect();
    let questions: Vec<InterviewQuestionRow> = if question_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as("SELECT * FROM interview_questions WHERE id = ANY($1)")
            .bind(&question_ids)
            .fetch_all(pool)
            .await?
    };

    Ok(Some(ReportRows {
        interview,
        answers,
        questions,
    }))
}

pub fn build_report(rows: &ReportRows) -> InterviewReport {
    let ReportRows {
        interview,
        answers,
        questions,
    } = rows;

    let total_questions = interview
        .total_questions
        .map(non_negative)
        .or_else(|| (!answers.is_empty()).then(|| answers.len() as u32));

    let correct_count = interview
        .correct_count
        .map(non_negative)
        .unwrap_or_else(|| answers.iter().filter(|a| a.is_correct).count() as u32);

    let score = interview
        .score
        .map(non_negative)
        .unwrap_or_else(|| percentage(correct_count, total_questions));

    let by_id: HashMap<&str, &InterviewQuestionRow> =
        questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let items = answers
        .iter()
        .map(|answer| {
            let question = by_id.get(answer.question_id.as_str());
            ReportItem {
                question_id: answer.question_id.clone(),
                position: question.map(|q| q.position),
                question_text: question.map(|q| q.question_text.clone()).unwrap_or_default(),
                options: question.map(|q| parse_options(q)).unwrap_or_default(),
                correct_option_id: question.and_then(|q| q.correct_option_id.clone()),
                selected_option_id: answer.selected_option_id.clone(),
                answer_text: answer.answer_text.clone(),
                is_correct: answer.is_correct,
            }
        })
        .collect();

    InterviewReport {
        interview_id: interview.id,
        role: interview.role.clone(),
        cv_name: interview.cv_name.clone(),
        status: interview.status.clone(),
        date: interview.scheduled_at.unwrap_or(interview.created_at),
        score,
        correct_count,
        total_questions,
        items,
    }
}

fn non_negative(v: i32) -> u32 {
    v.max(0) as u32
}

fn percentage(correct: u32, total: Option<u32>) -> u32 {
    match total {
        Some(total) if total > 0 => ((correct as f64 / total as f64) * 100.0).round() as u32,
        _ => 0,
    }
}

fn parse_options(question: &InterviewQuestionRow) -> Vec<McqOption> {
    question
        .options_json
        .get("options")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
