// src/store.rs

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{
    exam::{CreateExamRequest, Exam, ExamStatus, UpdateExamRequest},
    question::{CreateQuestionRequest, Question},
    result::ExamResult,
    user::User,
};
use crate::session::grader::{GradedAttempt, TOTAL_SCORE};

/// In-memory backing store for the portal.
///
/// One instance is created at process start and handed around through
/// `AppState`; nothing lives in ambient module state and nothing survives
/// a restart. Results are append-only; exams follow the monotonic
/// upcoming -> ongoing -> completed lifecycle.
#[derive(Clone, Default)]
pub struct ExamStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    next_user_id: i64,
    next_exam_id: i64,
    next_result_id: i64,
    users: Vec<User>,
    exams: Vec<Exam>,
    /// Question sets keyed by exam ID, in presentation order.
    questions: HashMap<i64, Vec<Question>>,
    results: Vec<ExamResult>,
}

impl StoreInner {
    fn exam_mut(&mut self, exam_id: i64) -> Option<&mut Exam> {
        self.exams.iter_mut().find(|e| e.id == exam_id)
    }

    /// Applies the time-driven half of the lifecycle: an upcoming exam
    /// whose scheduled date has been reached becomes ongoing. Completed
    /// exams never move again.
    fn refresh_status(exam: &mut Exam, now: DateTime<Utc>) {
        if exam.status == ExamStatus::Upcoming && now >= exam.scheduled_date {
            exam.status = ExamStatus::Ongoing;
        }
    }
}

impl ExamStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Users ----

    /// Inserts a user with an already-hashed password.
    /// Fails with `Conflict` if the username is taken.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.read().unwrap();
        inner.users.iter().find(|u| u.username == username).cloned()
    }

    // ---- Exams ----

    pub fn list_exams(&self) -> Vec<Exam> {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        for exam in inner.exams.iter_mut() {
            StoreInner::refresh_status(exam, now);
        }
        inner.exams.clone()
    }

    pub fn get_exam(&self, exam_id: i64) -> Option<Exam> {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        let exam = inner.exam_mut(exam_id)?;
        StoreInner::refresh_status(exam, now);
        Some(exam.clone())
    }

    pub fn create_exam(&self, req: CreateExamRequest) -> Exam {
        let mut inner = self.inner.write().unwrap();
        inner.next_exam_id += 1;
        let exam = Exam {
            id: inner.next_exam_id,
            title: req.title,
            subject: req.subject,
            scheduled_date: req.scheduled_date,
            duration_minutes: req.duration_minutes,
            questions_count: req.questions_count,
            status: ExamStatus::Upcoming,
            score: None,
            max_score: None,
        };
        inner.exams.push(exam.clone());
        exam
    }

    /// Edits exam metadata. Only upcoming exams may be edited; once an
    /// exam has started its definition is frozen.
    pub fn update_exam(&self, exam_id: i64, req: UpdateExamRequest) -> Result<Exam, AppError> {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        let exam = inner
            .exam_mut(exam_id)
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;
        StoreInner::refresh_status(exam, now);
        if exam.status != ExamStatus::Upcoming {
            return Err(AppError::Conflict(
                "Exam has already started and can no longer be edited".to_string(),
            ));
        }
        if let Some(title) = req.title {
            exam.title = title;
        }
        if let Some(subject) = req.subject {
            exam.subject = subject;
        }
        if let Some(scheduled_date) = req.scheduled_date {
            exam.scheduled_date = scheduled_date;
        }
        if let Some(duration_minutes) = req.duration_minutes {
            exam.duration_minutes = duration_minutes;
        }
        if let Some(questions_count) = req.questions_count {
            exam.questions_count = questions_count;
        }
        Ok(exam.clone())
    }

    pub fn delete_exam(&self, exam_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.exams.len();
        inner.exams.retain(|e| e.id != exam_id);
        if inner.exams.len() == before {
            return Err(AppError::NotFound("Exam not found".to_string()));
        }
        inner.questions.remove(&exam_id);
        Ok(())
    }

    // ---- Questions ----

    pub fn questions(&self, exam_id: i64) -> Option<Vec<Question>> {
        let inner = self.inner.read().unwrap();
        inner.questions.get(&exam_id).cloned()
    }

    /// Replaces the question set of an upcoming exam. Question IDs are
    /// assigned here (1..=n in upload order); the exam's advertised
    /// question count is synced to the actual set.
    pub fn replace_questions(
        &self,
        exam_id: i64,
        requests: Vec<CreateQuestionRequest>,
    ) -> Result<Vec<Question>, AppError> {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        let exam = inner
            .exam_mut(exam_id)
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;
        StoreInner::refresh_status(exam, now);
        if exam.status != ExamStatus::Upcoming {
            return Err(AppError::Conflict(
                "Exam has already started; its questions are frozen".to_string(),
            ));
        }
        exam.questions_count = requests.len();

        let questions: Vec<Question> = requests
            .into_iter()
            .enumerate()
            .map(|(i, req)| Question {
                id: (i + 1) as i64,
                text: req.text,
                options: req.options,
                correct_option_id: req.correct_option_id,
                explanation: req.explanation,
            })
            .collect();
        inner.questions.insert(exam_id, questions.clone());
        Ok(questions)
    }

    /// Inserts an exam together with its question set, bypassing the
    /// lifecycle guards. Used for startup seeding and test fixtures only;
    /// the HTTP surface always goes through `create_exam`/`replace_questions`.
    pub fn seed_exam(
        &self,
        title: &str,
        subject: &str,
        scheduled_date: DateTime<Utc>,
        duration_minutes: i64,
        questions: Vec<Question>,
    ) -> Exam {
        let mut inner = self.inner.write().unwrap();
        inner.next_exam_id += 1;
        let exam = Exam {
            id: inner.next_exam_id,
            title: title.to_string(),
            subject: subject.to_string(),
            scheduled_date,
            duration_minutes,
            questions_count: questions.len(),
            status: ExamStatus::Upcoming,
            score: None,
            max_score: None,
        };
        let exam_id = exam.id;
        inner.exams.push(exam.clone());
        inner.questions.insert(exam_id, questions);
        exam
    }

    // ---- Results ----

    /// Appends the result of a graded attempt and completes the exam.
    ///
    /// This is the single point where a `Result` comes into existence and
    /// where an exam transitions to `Completed`. Fails with `NotFound`
    /// when the exam was deleted mid-attempt; the caller surfaces that as
    /// a retryable submission failure.
    pub fn record_result(
        &self,
        user_id: i64,
        exam_id: i64,
        graded: GradedAttempt,
    ) -> Result<ExamResult, AppError> {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        let exam = inner
            .exam_mut(exam_id)
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;

        exam.status = ExamStatus::Completed;
        exam.score = Some(graded.score);
        exam.max_score = Some(TOTAL_SCORE);
        let exam_title = exam.title.clone();
        let exam_date = exam.scheduled_date;
        let duration_minutes = exam.duration_minutes;

        inner.next_result_id += 1;
        let result = ExamResult {
            id: inner.next_result_id,
            exam_id,
            user_id,
            exam_title,
            exam_date,
            duration_minutes,
            score: graded.score,
            total_score: TOTAL_SCORE,
            correct_answers: graded.correct_answers,
            total_questions: graded.total_questions,
            answers: graded.answers,
            submitted_at: now,
        };
        inner.results.push(result.clone());
        Ok(result)
    }

    /// All results of one student, newest first.
    pub fn results_for_user(&self, user_id: i64) -> Vec<ExamResult> {
        let inner = self.inner.read().unwrap();
        let mut results: Vec<ExamResult> = inner
            .results
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.reverse();
        results
    }

    /// The most recent result of one student for one exam.
    pub fn result_for_exam(&self, user_id: i64, exam_id: i64) -> Option<ExamResult> {
        let inner = self.inner.read().unwrap();
        inner
            .results
            .iter()
            .rev()
            .find(|r| r.user_id == user_id && r.exam_id == exam_id)
            .cloned()
    }

    /// Every recorded result (admin performance view), newest first.
    pub fn all_results(&self) -> Vec<ExamResult> {
        let inner = self.inner.read().unwrap();
        let mut results = inner.results.clone();
        results.reverse();
        results
    }
}
