// src/session/mod.rs

pub mod answers;
pub mod grader;
pub mod timer;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{
    exam::{Exam, ExamStatus},
    question::{PublicQuestion, Question},
    result::ExamResult,
};
use crate::store::ExamStore;

use answers::AnswerSheet;
use grader::GradedAttempt;
use timer::{ExamTimer, TimerPhase};

/// Where an attempt is in its life.
///
/// `Active` accepts answers and navigation; `Submitting` is the
/// single-in-flight window between a submit trigger and the recorded
/// result; `Submitted` is terminal and read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Active,
    Submitting,
    Submitted,
}

/// The live, mutable state of one student taking one exam.
///
/// Owns its own countdown and answer sheet; nothing is shared between
/// sessions. Constructed only after the exam and its questions have been
/// fetched, so there is no separate loading state here.
pub struct ExamSession {
    exam: Exam,
    questions: Vec<Question>,
    answers: AnswerSheet,
    current_index: usize,
    phase: SessionPhase,
    timer: ExamTimer,
}

/// Read-only view of a session, served to the presentation layer.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub exam_id: i64,
    pub exam_title: String,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub total_questions: usize,
    pub answered_count: usize,
    pub remaining_seconds: u64,
    pub timer_phase: TimerPhase,
}

impl ExamSession {
    pub fn new(exam: Exam, questions: Vec<Question>, timer: ExamTimer) -> Self {
        let answers = AnswerSheet::new(&questions);
        Self {
            exam,
            questions,
            answers,
            current_index: 0,
            phase: SessionPhase::Active,
            timer,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    fn ensure_active(&self) -> Result<(), AppError> {
        match self.phase {
            SessionPhase::Active => {}
            SessionPhase::Submitting => {
                return Err(AppError::Conflict(
                    "The exam is being submitted".to_string(),
                ));
            }
            SessionPhase::Submitted => {
                return Err(AppError::Conflict(
                    "The exam has already been submitted".to_string(),
                ));
            }
        }
        if self.timer.is_expired() {
            // Expired but the forced submission has not landed yet.
            return Err(AppError::Conflict(
                "Time is up; no further changes are accepted".to_string(),
            ));
        }
        Ok(())
    }

    /// Records an answer. Rejected once the session has left `Active` or
    /// the time has expired.
    pub fn select_answer(&mut self, question_id: i64, option_id: String) -> Result<(), AppError> {
        self.ensure_active()?;
        self.answers.select(question_id, option_id)
    }

    /// Jumps to a question by index. Out-of-range indices are ignored and
    /// the current index is left unchanged.
    pub fn go_to(&mut self, index: i64) {
        if self.phase != SessionPhase::Active {
            return;
        }
        if index >= 0 && (index as usize) < self.questions.len() {
            self.current_index = index as usize;
        }
    }

    /// Moves to the next question, clamped at the last one.
    pub fn next(&mut self) {
        if self.phase == SessionPhase::Active && self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
    }

    /// Moves to the previous question, clamped at the first one.
    pub fn previous(&mut self) {
        if self.phase == SessionPhase::Active && self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    /// Claims the single in-flight submission slot.
    ///
    /// Returns `true` exactly once per successful submission cycle: a
    /// second caller (double click, or timer expiry racing a manual
    /// submit) gets `false` and must not grade or record anything.
    pub fn begin_submit(&mut self) -> bool {
        if self.phase == SessionPhase::Active {
            self.phase = SessionPhase::Submitting;
            true
        } else {
            false
        }
    }

    /// Finalizes a successful submission. The session becomes read-only
    /// and its countdown is cancelled.
    pub fn complete_submit(&mut self) {
        self.phase = SessionPhase::Submitted;
        self.timer.cancel();
    }

    /// Rolls back a failed submission so the student can retry.
    /// The countdown keeps running.
    pub fn fail_submit(&mut self) {
        if self.phase == SessionPhase::Submitting {
            self.phase = SessionPhase::Active;
        }
    }

    pub fn grade(&self) -> GradedAttempt {
        grader::grade(&self.questions, self.answers.selections())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            exam_id: self.exam.id,
            exam_title: self.exam.title.clone(),
            phase: self.phase,
            current_index: self.current_index,
            current_question: self.questions.get(self.current_index).map(PublicQuestion::from),
            total_questions: self.questions.len(),
            answered_count: self.answers.answered_count(),
            remaining_seconds: self.timer.remaining_seconds(),
            timer_phase: self.timer.phase(),
        }
    }
}

type SessionKey = (i64, i64); // (user_id, exam_id)
type SessionMap = Mutex<HashMap<SessionKey, Arc<Mutex<ExamSession>>>>;

/// Registry of live sessions, at most one per (user, exam).
///
/// Hands out snapshots and routes mutations to the owning session. Timer
/// expiry is wired back through a weak reference so a torn-down registry
/// (or an already-removed session) turns the expiry into a no-op.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<SessionMap>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self, user_id: i64, exam_id: i64) -> Result<Arc<Mutex<ExamSession>>, AppError> {
        self.sessions
            .lock()
            .unwrap()
            .get(&(user_id, exam_id))
            .cloned()
            .ok_or_else(|| AppError::NotFound("No active session for this exam".to_string()))
    }

    /// Starts an attempt, or resumes the one already in progress.
    ///
    /// The exam must be ongoing: upcoming and completed exams cannot be
    /// attempted. The countdown starts here and expiry forces a
    /// submission through the same path as a manual submit.
    pub fn start(
        &self,
        store: &ExamStore,
        user_id: i64,
        exam_id: i64,
    ) -> Result<SessionSnapshot, AppError> {
        if let Ok(existing) = self.session(user_id, exam_id) {
            return Ok(existing.lock().unwrap().snapshot());
        }

        let exam = store
            .get_exam(exam_id)
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;
        match exam.status {
            ExamStatus::Upcoming => {
                return Err(AppError::Conflict("The exam has not started yet".to_string()));
            }
            ExamStatus::Completed => {
                return Err(AppError::Conflict(
                    "The exam has already been completed".to_string(),
                ));
            }
            ExamStatus::Ongoing => {}
        }

        let questions = store
            .questions(exam_id)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::NotFound("No questions available for this exam".to_string()))?;

        let total = Duration::from_secs(exam.duration_minutes.max(0) as u64 * 60);
        let weak: Weak<SessionMap> = Arc::downgrade(&self.sessions);
        let expiry_store = store.clone();
        let timer = ExamTimer::start(total, async move {
            let Some(sessions) = weak.upgrade() else {
                return;
            };
            let manager = SessionManager { sessions };
            tracing::info!("Time expired for exam {}, forcing submission", exam_id);
            match manager.submit(&expiry_store, user_id, exam_id) {
                Ok(result) => {
                    tracing::info!(
                        "Forced submission recorded for exam {}: score {}",
                        exam_id,
                        result.score
                    );
                }
                Err(e) => {
                    tracing::warn!("Forced submission for exam {} not recorded: {}", exam_id, e);
                }
            }
        });

        let session = ExamSession::new(exam, questions, timer);
        let snapshot = session.snapshot();
        self.sessions
            .lock()
            .unwrap()
            .insert((user_id, exam_id), Arc::new(Mutex::new(session)));

        tracing::info!("Attempt started for exam {} by user {}", exam_id, user_id);
        Ok(snapshot)
    }

    /// Runs a closure against the live session and returns a fresh snapshot.
    pub fn with_session<F>(
        &self,
        user_id: i64,
        exam_id: i64,
        f: F,
    ) -> Result<SessionSnapshot, AppError>
    where
        F: FnOnce(&mut ExamSession) -> Result<(), AppError>,
    {
        let session = self.session(user_id, exam_id)?;
        let mut session = session.lock().unwrap();
        f(&mut session)?;
        Ok(session.snapshot())
    }

    pub fn snapshot(&self, user_id: i64, exam_id: i64) -> Result<SessionSnapshot, AppError> {
        let session = self.session(user_id, exam_id)?;
        let snapshot = session.lock().unwrap().snapshot();
        Ok(snapshot)
    }

    /// Grades and records the attempt; used by both the explicit submit
    /// endpoint and the timer expiry path.
    ///
    /// The two triggers collapse into one logical submission: whoever
    /// claims the in-flight slot first grades and records, the loser gets
    /// `Conflict`. On a transient failure (the exam vanished mid-attempt)
    /// the session rolls back to `Active` so the student can retry.
    pub fn submit(
        &self,
        store: &ExamStore,
        user_id: i64,
        exam_id: i64,
    ) -> Result<ExamResult, AppError> {
        let session_arc = self.session(user_id, exam_id)?;
        let mut session = session_arc.lock().unwrap();

        if !session.begin_submit() {
            return Err(AppError::Conflict(
                "A submission for this exam is already in progress".to_string(),
            ));
        }

        let graded = session.grade();
        match store.record_result(user_id, exam_id, graded) {
            Ok(result) => {
                session.complete_submit();
                drop(session);
                self.sessions.lock().unwrap().remove(&(user_id, exam_id));
                tracing::info!(
                    "Exam {} submitted by user {}: {}/{} correct, score {}",
                    exam_id,
                    user_id,
                    result.correct_answers,
                    result.total_questions,
                    result.score
                );
                Ok(result)
            }
            Err(e) => {
                session.fail_submit();
                Err(AppError::SubmissionFailed(format!(
                    "Could not record the submission: {}",
                    e
                )))
            }
        }
    }
}
