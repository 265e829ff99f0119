// src/handlers/attempt.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError, session::SessionManager, store::ExamStore, utils::jwt::Claims,
};

/// DTO for answering the current question.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    pub question_id: i64,
    #[validate(length(min = 1, max = 50, message = "Option id must be between 1 and 50 characters"))]
    pub option_id: String,
}

/// DTO for jumping to a question by index.
#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub index: i64,
}

/// Starts an attempt for an ongoing exam, or resumes the one already in
/// progress. This is where the countdown begins.
pub async fn start_attempt(
    State(store): State<ExamStore>,
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let snapshot = sessions.start(&store, user_id, exam_id)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Current state of the attempt: phase, current question, time left,
/// answered count.
pub async fn get_attempt(
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(sessions.snapshot(user_id, exam_id)?))
}

/// Records an answer for a question of the attempt. Overwrites any
/// earlier selection for the same question.
pub async fn answer_question(
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let snapshot = sessions.with_session(user_id, exam_id, |session| {
        session.select_answer(payload.question_id, payload.option_id)
    })?;
    Ok(Json(snapshot))
}

/// Jumps to a question by index. An out-of-range index is ignored and
/// the snapshot comes back unchanged.
pub async fn go_to_question(
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<GoToRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let snapshot = sessions.with_session(user_id, exam_id, |session| {
        session.go_to(payload.index);
        Ok(())
    })?;
    Ok(Json(snapshot))
}

pub async fn next_question(
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let snapshot = sessions.with_session(user_id, exam_id, |session| {
        session.next();
        Ok(())
    })?;
    Ok(Json(snapshot))
}

pub async fn previous_question(
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let snapshot = sessions.with_session(user_id, exam_id, |session| {
        session.previous();
        Ok(())
    })?;
    Ok(Json(snapshot))
}

/// Submits the attempt: grades it, records the immutable result and
/// tears down the session. A submission already in flight, or a
/// re-submit of a finished attempt, yields 409.
pub async fn submit_attempt(
    State(store): State<ExamStore>,
    State(sessions): State<SessionManager>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    match sessions.submit(&store, user_id, exam_id) {
        Ok(result) => Ok(Json(result)),
        Err(AppError::NotFound(_)) if store.result_for_exam(user_id, exam_id).is_some() => {
            Err(AppError::Conflict(
                "The exam has already been submitted".to_string(),
            ))
        }
        Err(e) => Err(e),
    }
}
