// src/session/grader.rs

use std::collections::HashMap;

use crate::models::question::Question;
use crate::models::result::AnswerRecord;

/// Every exam is scored on the same fixed scale, regardless of how many
/// questions it has.
pub const TOTAL_SCORE: i64 = 100;

/// Output of grading: per-question correctness plus the aggregate score.
#[derive(Debug, Clone)]
pub struct GradedAttempt {
    pub answers: Vec<AnswerRecord>,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub score: i64,
}

/// Grades a set of selections against a question list.
///
/// Pure and deterministic: a question is correct iff the selected option
/// id equals its answer key; an unanswered question is incorrect. The
/// aggregate score is `round(100 * correct / total)`; an empty question
/// list grades to zero.
pub fn grade(questions: &[Question], selections: &HashMap<i64, String>) -> GradedAttempt {
    let mut correct_answers = 0;
    let mut answers = Vec::with_capacity(questions.len());

    for question in questions {
        let selected = selections.get(&question.id);
        let is_correct = selected.is_some_and(|s| *s == question.correct_option_id);
        if is_correct {
            correct_answers += 1;
        }
        answers.push(AnswerRecord {
            question_id: question.id,
            selected_option_id: selected.cloned(),
            is_correct,
        });
    }

    let total_questions = questions.len();
    let score = if total_questions == 0 {
        0
    } else {
        ((correct_answers as f64 / total_questions as f64) * TOTAL_SCORE as f64).round() as i64
    };

    GradedAttempt {
        answers,
        correct_answers,
        total_questions,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionOption;

    fn question(id: i64, correct: &str) -> Question {
        Question {
            id,
            text: format!("Question {}?", id),
            options: ["a", "b", "c", "d"]
                .iter()
                .map(|o| QuestionOption {
                    id: o.to_string(),
                    text: format!("Option {}", o.to_uppercase()),
                })
                .collect(),
            correct_option_id: correct.to_string(),
            explanation: None,
        }
    }

    #[test]
    fn four_question_scenario_scores_fifty() {
        // Correct keys {q1:a, q2:b, q3:c, q4:d}; student answers
        // {q1:a, q2:x, q3:c, q4: unanswered} -> 2 correct, score 50.
        let questions = vec![
            question(1, "a"),
            question(2, "b"),
            question(3, "c"),
            question(4, "d"),
        ];
        let mut selections = HashMap::new();
        selections.insert(1, "a".to_string());
        selections.insert(2, "x".to_string());
        selections.insert(3, "c".to_string());

        let graded = grade(&questions, &selections);

        assert_eq!(graded.score, 50);
        assert_eq!(graded.correct_answers, 2);
        assert_eq!(graded.total_questions, 4);
        assert_eq!(graded.answers.len(), 4);
        assert!(graded.answers[0].is_correct);
        assert!(!graded.answers[1].is_correct);
        assert!(graded.answers[2].is_correct);
        assert!(!graded.answers[3].is_correct);
        assert_eq!(graded.answers[3].selected_option_id, None);
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = vec![question(1, "a"), question(2, "b"), question(3, "c")];
        let mut selections = HashMap::new();
        selections.insert(1, "a".to_string());
        selections.insert(2, "c".to_string());

        let first = grade(&questions, &selections);
        let second = grade(&questions, &selections);

        assert_eq!(first.score, second.score);
        assert_eq!(first.correct_answers, second.correct_answers);
        for (a, b) in first.answers.iter().zip(second.answers.iter()) {
            assert_eq!(a.is_correct, b.is_correct);
            assert_eq!(a.selected_option_id, b.selected_option_id);
        }
    }

    #[test]
    fn unanswered_never_counts_as_correct() {
        let questions = vec![question(1, "a"), question(2, "b")];
        let selections = HashMap::new();

        let graded = grade(&questions, &selections);

        assert_eq!(graded.correct_answers, 0);
        assert_eq!(graded.score, 0);
        assert!(graded.answers.iter().all(|a| !a.is_correct));
    }

    #[test]
    fn score_is_rounded_to_nearest_percent() {
        // 1 of 3 correct -> 33.33.. -> 33; 2 of 3 -> 66.66.. -> 67.
        let questions = vec![question(1, "a"), question(2, "b"), question(3, "c")];

        let mut one = HashMap::new();
        one.insert(1, "a".to_string());
        assert_eq!(grade(&questions, &one).score, 33);

        let mut two = HashMap::new();
        two.insert(1, "a".to_string());
        two.insert(2, "b".to_string());
        assert_eq!(grade(&questions, &two).score, 67);
    }

    #[test]
    fn empty_question_list_grades_to_zero() {
        let graded = grade(&[], &HashMap::new());
        assert_eq!(graded.score, 0);
        assert_eq!(graded.total_questions, 0);
        assert!(graded.answers.is_empty());
    }
}
