// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lifecycle status of an exam.
///
/// Transitions are monotonic: `Upcoming` -> `Ongoing` once the scheduled
/// time is reached, `Ongoing` -> `Completed` once a submission lands.
/// There is no reverse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Upcoming,
    Ongoing,
    Completed,
}

/// A scheduled exam as stored and served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,

    pub title: String,

    pub subject: String,

    /// When the exam opens for taking.
    pub scheduled_date: DateTime<Utc>,

    /// Allotted time per attempt, in minutes.
    pub duration_minutes: i64,

    /// Expected size of the question set (display metadata; the actual
    /// set lives next to the exam in the store).
    pub questions_count: usize,

    pub status: ExamStatus,

    /// Score of the graded attempt, set once the exam is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<i64>,
}

/// DTO for scheduling a new exam (admin form).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 100, message = "Title is required (max 100 characters)"))]
    pub title: String,

    #[validate(length(min = 1, max = 50, message = "Subject is required (max 50 characters)"))]
    pub subject: String,

    pub scheduled_date: DateTime<Utc>,

    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: i64,

    #[validate(range(min = 1, max = 200, message = "Question count must be between 1 and 200"))]
    pub questions_count: usize,
}

/// DTO for editing an exam that has not started yet.
/// All fields optional; absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Subject must be between 1 and 50 characters"))]
    pub subject: Option<String>,

    pub scheduled_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: Option<i64>,

    #[validate(range(min = 1, max = 200, message = "Question count must be between 1 and 200"))]
    pub questions_count: Option<usize>,
}
