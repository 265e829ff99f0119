// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// A multiple-choice question with its answer key.
/// Immutable once the owning exam has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub text: String,

    pub options: Vec<QuestionOption>,

    /// Identity of the single correct option.
    pub correct_option_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// DTO for sending a question to a student during an active attempt
/// (excludes the answer key and explanation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub options: Vec<QuestionOption>,
}

impl From<&Question> for PublicQuestion {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            options: question.options.clone(),
        }
    }
}

/// DTO for uploading a question as part of an exam's question set.
/// The question ID is assigned by the store; option IDs are caller-chosen
/// and must be unique within the question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000, message = "Question text must be between 1 and 1000 characters"))]
    pub text: String,

    #[validate(custom(function = validate_options))]
    pub options: Vec<QuestionOption>,

    #[validate(length(min = 1, max = 50))]
    pub correct_option_id: String,

    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
}

fn validate_options(options: &[QuestionOption]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("at_least_two_options"));
    }
    for opt in options {
        if opt.id.is_empty() || opt.id.len() > 50 {
            return Err(validator::ValidationError::new("invalid_option_id"));
        }
        if opt.text.is_empty() || opt.text.len() > 500 {
            return Err(validator::ValidationError::new("invalid_option_text"));
        }
    }
    let mut ids: Vec<&str> = options.iter().map(|o| o.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != options.len() {
        return Err(validator::ValidationError::new("duplicate_option_id"));
    }
    Ok(())
}

impl CreateQuestionRequest {
    /// Cross-field check the derive cannot express: the designated correct
    /// option must actually be one of the options.
    pub fn correct_option_exists(&self) -> bool {
        self.options.iter().any(|o| o.id == self.correct_option_id)
    }
}
