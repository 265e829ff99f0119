// src/session/answers.rs

use std::collections::{HashMap, HashSet};

use crate::error::AppError;
use crate::models::question::Question;

/// Tracks the student's current selections during an attempt, keyed by
/// question ID. Selections may only reference questions that belong to
/// the exam's question set.
#[derive(Debug)]
pub struct AnswerSheet {
    question_ids: HashSet<i64>,
    selected: HashMap<i64, String>,
}

impl AnswerSheet {
    pub fn new(questions: &[Question]) -> Self {
        Self {
            question_ids: questions.iter().map(|q| q.id).collect(),
            selected: HashMap::new(),
        }
    }

    /// Records (or overwrites) the selection for a question. Idempotent
    /// under repeated identical calls. Selecting the same option id that
    /// is already stored changes nothing; selecting a different one
    /// replaces it. The option id itself is not checked against the
    /// question's option list: an off-list selection simply grades as
    /// incorrect.
    pub fn select(&mut self, question_id: i64, option_id: String) -> Result<(), AppError> {
        if !self.question_ids.contains(&question_id) {
            return Err(AppError::BadRequest(format!(
                "Question {} is not part of this exam",
                question_id
            )));
        }
        self.selected.insert(question_id, option_id);
        Ok(())
    }

    pub fn selected(&self, question_id: i64) -> Option<&str> {
        self.selected.get(&question_id).map(|s| s.as_str())
    }

    /// Number of questions with a selection.
    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selections(&self) -> &HashMap<i64, String> {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionOption;

    fn question(id: i64) -> Question {
        Question {
            id,
            text: format!("Question {}?", id),
            options: vec![
                QuestionOption {
                    id: "a".to_string(),
                    text: "Option A".to_string(),
                },
                QuestionOption {
                    id: "b".to_string(),
                    text: "Option B".to_string(),
                },
            ],
            correct_option_id: "a".to_string(),
            explanation: None,
        }
    }

    #[test]
    fn select_is_idempotent() {
        let questions = vec![question(1), question(2)];
        let mut sheet = AnswerSheet::new(&questions);

        sheet.select(1, "a".to_string()).unwrap();
        sheet.select(1, "a".to_string()).unwrap();

        assert_eq!(sheet.selected(1), Some("a"));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn select_overwrites_previous_choice() {
        let questions = vec![question(1)];
        let mut sheet = AnswerSheet::new(&questions);

        sheet.select(1, "a".to_string()).unwrap();
        sheet.select(1, "b".to_string()).unwrap();

        assert_eq!(sheet.selected(1), Some("b"));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn unknown_question_is_rejected() {
        let questions = vec![question(1)];
        let mut sheet = AnswerSheet::new(&questions);

        let err = sheet.select(99, "a".to_string());
        assert!(err.is_err());
        assert_eq!(sheet.answered_count(), 0);
        assert_eq!(sheet.selected(99), None);
    }
}
