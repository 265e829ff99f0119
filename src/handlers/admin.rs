// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam::{CreateExamRequest, UpdateExamRequest},
        question::CreateQuestionRequest,
    },
    store::ExamStore,
};

/// Lists all exams for the admin dashboard.
pub async fn list_exams(State(store): State<ExamStore>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_exams()))
}

/// Schedules a new exam.
///
/// Validation failures come back as 400 with the field errors inline so
/// the form can render them next to the offending inputs.
pub async fn create_exam(
    State(store): State<ExamStore>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exam = store.create_exam(payload);
    tracing::info!("Exam '{}' scheduled for {}", exam.title, exam.scheduled_date);
    Ok((StatusCode::CREATED, Json(exam)))
}

/// Edits an exam that has not started yet.
pub async fn update_exam(
    State(store): State<ExamStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exam = store.update_exam(id, payload)?;
    Ok(Json(exam))
}

/// Deletes an exam and its question set.
pub async fn delete_exam(
    State(store): State<ExamStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_exam(id)?;
    tracing::info!("Exam {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the question set of an upcoming exam.
///
/// Question content is externally supplied; the portal never invents
/// questions or answer keys of its own.
pub async fn replace_questions(
    State(store): State<ExamStore>,
    Path(id): Path<i64>,
    Json(payload): Json<Vec<CreateQuestionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest(
            "An exam needs at least one question".to_string(),
        ));
    }
    for (i, question) in payload.iter().enumerate() {
        if let Err(validation_errors) = question.validate() {
            return Err(AppError::BadRequest(format!(
                "Question {}: {}",
                i + 1,
                validation_errors
            )));
        }
        if !question.correct_option_exists() {
            return Err(AppError::BadRequest(format!(
                "Question {}: correct_option_id does not match any option",
                i + 1
            )));
        }
    }

    let questions = store.replace_questions(id, payload)?;
    tracing::info!("Question set of exam {} replaced ({} questions)", id, questions.len());
    Ok(Json(questions))
}

/// Every recorded result, for the performance view.
pub async fn list_all_results(
    State(store): State<ExamStore>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.all_results()))
}
