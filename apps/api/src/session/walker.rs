//! Session Walker: the multiple-choice interview state machine.
//!
//! ```text
//! Loading → AwaitingSelection ⇄ AnswerRevealed → Finished
//! ```
//!
//! `Loading` exists only as a registry slot while the question set is fetched; a
//! `McqSession` is always constructed from a complete `QuestionSet`.
//!
//! Invariants:
//! - `answers.len() <= questions.len()`;
//! - the session is finished iff every question has exactly one answer;
//! - the finish payload is handed out at most once.
//!
//! Actions that do not apply to the current phase return `Step::Ignored` and leave
//! the session untouched.

use serde::Serialize;
use thiserror::Error;

use crate::models::cv::Language;
use crate::session::models::{AnswerRecord, FinishPayload, McqOption, Question, QuestionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    AwaitingSelection,
    AnswerRevealed,
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("option '{0}' does not belong to the current question")]
    UnknownOption(String),

    #[error("an option must be selected before submitting")]
    NoSelection,

    #[error("an interview needs at least one question")]
    EmptyQuestionSet,
}

/// Outcome of a walker action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Selected,
    /// The answer was recorded. `finish` is set when this was the last question.
    Revealed {
        record: AnswerRecord,
        finish: Option<FinishPayload>,
    },
    Advanced {
        index: usize,
    },
    Finished(FinishPayload),
    Ignored,
}

#[derive(Debug, Clone)]
pub struct McqSession {
    set: QuestionSet,
    index: usize,
    selected: Option<String>,
    revealed: Option<AnswerRecord>,
    answers: Vec<AnswerRecord>,
    correct_count: usize,
    finished: bool,
    finish_handed_out: bool,
}

impl McqSession {
    pub fn new(set: QuestionSet) -> Result<Self, SessionError> {
        if set.questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }
        Ok(Self {
            set,
            index: 0,
            selected: None,
            revealed: None,
            answers: Vec::new(),
            correct_count: 0,
            finished: false,
            finish_handed_out: false,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        if self.finished {
            SessionPhase::Finished
        } else if self.revealed.is_some() {
            SessionPhase::AnswerRevealed
        } else {
            SessionPhase::AwaitingSelection
        }
    }

    pub fn total_questions(&self) -> usize {
        self.set.questions.len()
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[cfg(test)]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_question(&self) -> &Question {
        &self.set.questions[self.index]
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.set.questions.len()
    }

    /// Holds `option_id` as the pending choice. May be changed until submission.
    pub fn select(&mut self, option_id: &str) -> Result<Step, SessionError> {
        if self.phase() != SessionPhase::AwaitingSelection {
            return Ok(Step::Ignored);
        }
        if !self.current_question().has_option(option_id) {
            return Err(SessionError::UnknownOption(option_id.to_string()));
        }
        self.selected = Some(option_id.to_string());
        Ok(Step::Selected)
    }

    /// Records the pending choice for the current question and reveals its correctness.
    /// On the last question this also finishes the session.
    pub fn submit(&mut self) -> Result<Step, SessionError> {
        if self.phase() != SessionPhase::AwaitingSelection {
            return Ok(Step::Ignored);
        }
        let selected = self.selected.clone().ok_or(SessionError::NoSelection)?;

        let question = self.current_question();
        let record = AnswerRecord {
            question_id: question.id.clone(),
            correct: selected == question.correct_option_id,
            selected_option_id: selected,
        };

        self.answers.push(record.clone());
        if record.correct {
            self.correct_count += 1;
        }
        self.revealed = Some(record.clone());

        let finish = if self.is_last() { self.finish() } else { None };
        Ok(Step::Revealed { record, finish })
    }

    /// Moves past a revealed answer.
    pub fn next(&mut self) -> Step {
        if self.phase() != SessionPhase::AnswerRevealed {
            return Step::Ignored;
        }
        if self.is_last() {
            return match self.finish() {
                Some(payload) => Step::Finished(payload),
                None => Step::Ignored,
            };
        }
        self.revealed = None;
        self.selected = None;
        self.index += 1;
        Step::Advanced { index: self.index }
    }

    fn finish(&mut self) -> Option<FinishPayload> {
        self.finished = true;
        if self.finish_handed_out {
            return None;
        }
        self.finish_handed_out = true;
        Some(FinishPayload {
            interview_id: self.set.interview_id.clone(),
            total_questions: self.total_questions(),
            correct_count: self.correct_count,
            answers: self.answers.clone(),
        })
    }

    pub fn view(&self) -> SessionView {
        let phase = self.phase();
        let current_question = (phase != SessionPhase::Finished).then(|| {
            let q = self.current_question();
            QuestionView {
                id: q.id.clone(),
                order: q.order,
                text: q.text.clone(),
                options: q.options.clone(),
                correct_option_id: (phase == SessionPhase::AnswerRevealed)
                    .then(|| q.correct_option_id.clone()),
            }
        });

        SessionView {
            interview_id: self.set.interview_id.clone(),
            position_title: self.set.position_title.clone(),
            cv_name: self.set.cv_name.clone(),
            language: self.set.language,
            phase,
            index: self.index,
            total_questions: self.total_questions(),
            current_question,
            selected_option_id: self.selected.clone(),
            feedback: self.revealed.clone(),
            correct_count: self.correct_count,
            answers: self.answers.clone(),
        }
    }
}

/// Recomputes the correct-count from recorded answers against the question set.
#[cfg(test)]
pub fn replay_correct_count(questions: &[Question], answers: &[AnswerRecord]) -> usize {
    answers
        .iter()
        .filter(|a| {
            questions
                .iter()
                .find(|q| q.id == a.question_id)
                .is_some_and(|q| q.correct_option_id == a.selected_option_id)
        })
        .count()
}

/// What a client sees of a session. The correct option stays hidden until revealed.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub interview_id: String,
    pub position_title: String,
    pub cv_name: Option<String>,
    pub language: Language,
    pub phase: SessionPhase,
    pub index: usize,
    pub total_questions: usize,
    pub current_question: Option<QuestionView>,
    pub selected_option_id: Option<String>,
    pub feedback: Option<AnswerRecord>,
    pub correct_count: usize,
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub order: usize,
    pub text: String,
    pub options: Vec<McqOption>,
    pub correct_option_id: Option<String>,
}
