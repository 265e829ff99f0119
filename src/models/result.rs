// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One graded answer inside a result snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: i64,

    /// `None` when the student left the question unanswered.
    pub selected_option_id: Option<String>,

    pub is_correct: bool,
}

/// An immutable record of one graded exam attempt.
/// Created exactly once per submission; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,

    pub exam_id: i64,

    pub user_id: i64,

    pub exam_title: String,

    pub exam_date: DateTime<Utc>,

    pub duration_minutes: i64,

    /// Percentage score on the fixed 0-100 scale.
    pub score: i64,

    pub total_score: i64,

    pub correct_answers: usize,

    pub total_questions: usize,

    pub answers: Vec<AnswerRecord>,

    pub submitted_at: DateTime<Utc>,
}
