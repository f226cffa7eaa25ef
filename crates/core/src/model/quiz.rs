use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Fraction of correct answers required to pass a quiz (boundary inclusive).
pub const PASS_MARK: f64 = 0.60;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has already been submitted")]
    AlreadySubmitted,

    #[error("only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("quiz has no questions")]
    NoQuestions,
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// A multiple-choice question keyed by option letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
}

//
// ─── QUIZ STATE ────────────────────────────────────────────────────────────────
//

/// Result of grading a submitted quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub score: u32,
    pub total: u32,
    pub percent: f64,
    pub passed: bool,
}

/// In-memory answer sheet for the quiz lesson currently on screen.
///
/// Answers may be changed freely until submission; after submission the sheet
/// is frozen until `reset` (the "Retake Quiz" path).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    answers: BTreeMap<usize, String>,
    submitted: bool,
    score: u32,
}

impl QuizState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer for a question. Returns false (and records nothing)
    /// once the quiz has been submitted.
    pub fn select_option(&mut self, question_index: usize, option_key: impl Into<String>) -> bool {
        if self.submitted {
            return false;
        }
        self.answers.insert(question_index, option_key.into());
        true
    }

    #[must_use]
    pub fn answer(&self, question_index: usize) -> Option<&str> {
        self.answers.get(&question_index).map(String::as_str)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// True when every question index in `0..total` has a recorded answer.
    ///
    /// This is the gate for the submit control; submitting with missing
    /// answers is prevented here rather than handled as a runtime error path.
    #[must_use]
    pub fn all_answered(&self, total: usize) -> bool {
        total > 0 && (0..total).all(|index| self.answers.contains_key(&index))
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Grade the answer sheet against the given questions and freeze it.
    ///
    /// Answers are left untouched so a results view can show what was chosen;
    /// a retake goes through `reset`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` on a second submission,
    /// `QuizError::NoQuestions` for an empty question list, and
    /// `QuizError::Incomplete` when any question is unanswered.
    pub fn submit(&mut self, questions: &[QuizQuestion]) -> Result<QuizOutcome, QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if !self.all_answered(questions.len()) {
            return Err(QuizError::Incomplete {
                answered: self.answered_count(),
                total: questions.len(),
            });
        }

        let score = questions
            .iter()
            .enumerate()
            .filter(|(index, question)| self.answer(*index) == Some(question.correct_answer.as_str()))
            .count();
        let score = u32::try_from(score).unwrap_or(u32::MAX);
        let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);

        let percent = f64::from(score) / f64::from(total) * 100.0;
        let passed = f64::from(score) / f64::from(total) >= PASS_MARK;

        self.submitted = true;
        self.score = score;

        Ok(QuizOutcome {
            score,
            total,
            percent,
            passed,
        })
    }

    /// Clear answers, submission flag, and score unconditionally.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.submitted = false;
        self.score = 0;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
