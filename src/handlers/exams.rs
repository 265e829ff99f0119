// src/handlers/exams.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{exam::ExamStatus, question::PublicQuestion},
    store::ExamStore,
};

/// Lists all exams visible to the student, with statuses refreshed
/// against the current time.
pub async fn list_exams(State(store): State<ExamStore>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_exams()))
}

/// Retrieves a single exam by ID.
pub async fn get_exam(
    State(store): State<ExamStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = store
        .get_exam(id)
        .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Retrieves the question set of an exam.
///
/// While the exam is not completed the answer keys stay hidden; once it
/// is completed the full questions (correct option, explanation) are
/// revealed for review.
pub async fn get_exam_questions(
    State(store): State<ExamStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = store
        .get_exam(id)
        .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;
    let questions = store
        .questions(id)
        .ok_or_else(|| AppError::NotFound("No questions available for this exam".to_string()))?;

    if exam.status == ExamStatus::Completed {
        return Ok(Json(questions).into_response());
    }

    let public: Vec<PublicQuestion> = questions.iter().map(PublicQuestion::from).collect();
    Ok(Json(public).into_response())
}
