// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, store::ExamStore, utils::jwt::Claims};

/// Lists the current student's results, newest first.
pub async fn list_my_results(
    State(store): State<ExamStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(store.results_for_user(user_id)))
}

/// The current student's most recent result for one exam.
pub async fn get_result_by_exam(
    State(store): State<ExamStore>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let result = store
        .result_for_exam(user_id, exam_id)
        .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

    Ok(Json(result))
}
