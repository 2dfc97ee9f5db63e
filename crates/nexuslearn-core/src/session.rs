//! Quiz session state machine.
//!
//! One [`QuizSession`] drives a single attempt at a fixed, ordered list of
//! questions:
//!
//! ```text
//! InProgress(0, {}) -> InProgress(1, answers) -> ... -> Finished(answers)
//!        ^                                                   |
//!        +---------------------- restart --------------------+
//! ```
//!
//! The first answer to a question locks it. Advancing requires the current
//! question to be answered. When the last question is advanced past, the
//! percentage is handed to the injected [`ScoreStore`], if any.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{Question, Quiz, SubjectSlug};
use crate::scores::ScoreStore;

/// `round(100 * score / total)`, or `None` when there are no questions.
pub fn percentage(score: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let score = score.min(total);
    // Integer round-half-up of 100 * score / total.
    Some(((200 * score + total) / (2 * total)) as u8)
}

/// Outcome of [`QuizSession::select_answer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The answer was recorded for the current question.
    Recorded { correct: bool },
    /// The current question already has an answer; nothing changed.
    AlreadyAnswered,
    /// The option is not one of the current question's options; nothing changed.
    UnknownOption,
    /// The session is finished; nothing changed.
    Finished,
    /// The quiz has no questions.
    NoQuestions,
}

/// Outcome of a successful [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at `index`.
    Next { index: usize },
    /// The last question was advanced past.
    Finished(Outcome),
}

/// Final grade of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub score: usize,
    pub total: usize,
    pub percentage: u8,
    /// Whether the percentage reached the score store.
    pub saved: bool,
}

/// Position within the quiz, e.g. "Question 2 of 3".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based position of the current question (0 for an empty quiz).
    pub position: usize,
    pub total: usize,
    /// `position / total`, in `[0, 1]`.
    pub fraction: f64,
}

/// One row of the post-quiz review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question: String,
    pub selected: Option<String>,
    pub answer: String,
    pub correct: bool,
}

impl ReviewItem {
    /// The chosen option, or "Not answered".
    pub fn selected_or_placeholder(&self) -> &str {
        self.selected.as_deref().unwrap_or("Not answered")
    }
}

struct ScoreRecorder {
    subject: SubjectSlug,
    store: Arc<dyn ScoreStore>,
}

/// A single attempt at a quiz.
pub struct QuizSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    title: String,
    questions: Arc<[Question]>,
    current_index: usize,
    selected: BTreeMap<usize, String>,
    finished: bool,
    recorder: Option<ScoreRecorder>,
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("current_index", &self.current_index)
            .field("selected", &self.selected)
            .field("finished", &self.finished)
            .field("subject", &self.recorder.as_ref().map(|r| r.subject))
            .finish()
    }
}

impl QuizSession {
    /// Start a session over a snapshot of `questions`.
    pub fn new(title: impl Into<String>, questions: impl Into<Arc<[Question]>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            title: title.into(),
            questions: questions.into(),
            current_index: 0,
            selected: BTreeMap::new(),
            finished: false,
            recorder: None,
        }
    }

    /// Start a session over a catalog quiz.
    pub fn for_quiz(quiz: &Quiz) -> Self {
        Self::new(quiz.title.clone(), quiz.questions.clone())
    }

    /// Persist the percentage for `subject` into `store` when the session finishes.
    pub fn with_score_store(mut self, subject: SubjectSlug, store: Arc<dyn ScoreStore>) -> Self {
        self.recorder = Some(ScoreRecorder { subject, store });
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The question being asked, or `None` once finished or for an empty quiz.
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// The answer recorded for question `index`, if any.
    pub fn selected_answer(&self, index: usize) -> Option<&str> {
        self.selected.get(&index).map(String::as_str)
    }

    pub fn is_current_answered(&self) -> bool {
        self.selected.contains_key(&self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index + 1 == self.questions.len()
    }

    /// Record `option` as the answer to the current question.
    ///
    /// Only the first answer counts; later calls leave it unchanged.
    pub fn select_answer(&mut self, option: &str) -> Selection {
        if self.finished {
            return Selection::Finished;
        }
        let Some(question) = self.questions.get(self.current_index) else {
            return Selection::NoQuestions;
        };
        if self.selected.contains_key(&self.current_index) {
            return Selection::AlreadyAnswered;
        }
        if !question.has_option(option) {
            return Selection::UnknownOption;
        }

        let correct = question.is_correct(option);
        self.selected.insert(self.current_index, option.to_string());
        tracing::debug!(
            session = %self.id,
            index = self.current_index,
            correct,
            "answer recorded"
        );
        Selection::Recorded { correct }
    }

    /// Move past the current question.
    ///
    /// Rejected, with state unchanged, when the quiz is empty, already
    /// finished, or the current question has no answer yet.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.finished {
            return Err(SessionError::AlreadyFinished);
        }
        if self.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        if !self.is_current_answered() {
            return Err(SessionError::Unanswered {
                index: self.current_index,
            });
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            return Ok(Advance::Next {
                index: self.current_index,
            });
        }

        self.finished = true;
        Ok(Advance::Finished(self.complete()))
    }

    /// Back to the first question with no answers, from any state.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.selected.clear();
        self.finished = false;
        tracing::debug!(session = %self.id, "session restarted");
    }

    /// Number of recorded answers that match the canonical answer.
    ///
    /// Before the session finishes this is partial progress, not a grade.
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.selected.get(i).is_some_and(|s| q.is_correct(s)))
            .count()
    }

    /// The score as a rounded percentage of all questions.
    pub fn percentage(&self) -> Result<u8, SessionError> {
        percentage(self.score(), self.questions.len()).ok_or(SessionError::NoQuestions)
    }

    pub fn progress(&self) -> Progress {
        let total = self.questions.len();
        if total == 0 {
            return Progress {
                position: 0,
                total: 0,
                fraction: 0.0,
            };
        }
        let position = if self.finished {
            total
        } else {
            self.current_index + 1
        };
        Progress {
            position,
            total,
            fraction: position as f64 / total as f64,
        }
    }

    /// Per-question summary of answers against the canonical ones.
    pub fn review(&self) -> Vec<ReviewItem> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let selected = self.selected.get(&i).cloned();
                let correct = selected.as_deref().is_some_and(|s| q.is_correct(s));
                ReviewItem {
                    question: q.question.clone(),
                    selected,
                    answer: q.answer.clone(),
                    correct,
                }
            })
            .collect()
    }

    fn complete(&self) -> Outcome {
        let score = self.score();
        let total = self.questions.len();
        let pct = percentage(score, total).unwrap_or(0);

        let saved = match &self.recorder {
            Some(recorder) => match recorder.store.save(recorder.subject, pct) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        session = %self.id,
                        subject = %recorder.subject,
                        "failed to save quiz score: {e}"
                    );
                    false
                }
            },
            None => false,
        };

        tracing::info!(
            session = %self.id,
            title = %self.title,
            score,
            total,
            percentage = pct,
            elapsed_secs = (Utc::now() - self.started_at).num_seconds(),
            "quiz finished"
        );

        Outcome {
            score,
            total,
            percentage: pct,
            saved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::ScoreError;
    use crate::scores::{KvScoreStore, Scores};

    fn physics() -> QuizSession {
        let catalog = Catalog::builtin().unwrap();
        QuizSession::for_quiz(catalog.quiz(SubjectSlug::Physics).unwrap())
    }

    fn answer_all(session: &mut QuizSession, answers: &[&str]) -> Option<Outcome> {
        let mut outcome = None;
        for answer in answers {
            session.select_answer(answer);
            if let Advance::Finished(o) = session.advance().unwrap() {
                outcome = Some(o);
            }
        }
        outcome
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 3), Some(0));
        assert_eq!(percentage(1, 3), Some(33));
        assert_eq!(percentage(2, 3), Some(67));
        assert_eq!(percentage(3, 3), Some(100));
        assert_eq!(percentage(1, 8), Some(13));
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn all_correct_scores_100() {
        let mut session = physics();
        let outcome = answer_all(&mut session, &["Newton", "First Law", "1/2 mv^2"]).unwrap();
        assert!(session.is_finished());
        assert_eq!(session.score(), 3);
        assert_eq!(outcome.score, 3);
        assert_eq!(outcome.percentage, 100);
        assert_eq!(session.percentage().unwrap(), 100);
    }

    #[test]
    fn none_correct_scores_0() {
        let mut session = physics();
        let outcome = answer_all(&mut session, &["Joule", "Third Law", "mgh"]).unwrap();
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.percentage, 0);
    }

    #[test]
    fn first_answer_locks() {
        let mut session = physics();
        assert_eq!(
            session.select_answer("Joule"),
            Selection::Recorded { correct: false }
        );
        assert_eq!(session.select_answer("Newton"), Selection::AlreadyAnswered);
        assert_eq!(session.selected_answer(0), Some("Joule"));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut session = physics();
        assert_eq!(session.select_answer("newton"), Selection::UnknownOption);
        assert!(!session.is_current_answered());
        assert_eq!(
            session.select_answer("Newton"),
            Selection::Recorded { correct: true }
        );
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut session = physics();
        assert_eq!(
            session.advance(),
            Err(SessionError::Unanswered { index: 0 })
        );
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_finished());

        session.select_answer("Newton");
        assert_eq!(session.advance(), Ok(Advance::Next { index: 1 }));
        assert_eq!(
            session.advance(),
            Err(SessionError::Unanswered { index: 1 })
        );
    }

    #[test]
    fn finished_is_terminal_until_restart() {
        let mut session = physics();
        answer_all(&mut session, &["Newton", "First Law", "1/2 mv^2"]);

        assert_eq!(session.advance(), Err(SessionError::AlreadyFinished));
        assert_eq!(session.select_answer("Joule"), Selection::Finished);
        assert!(session.current_question().is_none());
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn restart_resets_from_any_state() {
        let mut session = physics();
        session.restart();
        assert_eq!(session.current_index(), 0);

        session.select_answer("Newton");
        session.advance().unwrap();
        session.select_answer("Second Law");
        session.restart();
        assert_eq!(session.current_index(), 0);
        assert!(session.selected_answer(0).is_none());
        assert!(!session.is_finished());

        answer_all(&mut session, &["Newton", "First Law", "mgh"]);
        assert!(session.is_finished());
        session.restart();
        assert_eq!(session.current_index(), 0);
        assert!(session.selected_answer(0).is_none());
        assert!(!session.is_finished());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn score_is_bounded_at_every_step() {
        let mut session = physics();
        let answers = ["Newton", "Second Law", "1/2 mv^2"];
        for answer in answers {
            assert!(session.score() <= session.len());
            session.select_answer(answer);
            session.select_answer("Pascal");
            assert!(session.score() <= session.len());
            session.advance().unwrap();
        }
        assert_eq!(session.score(), 2);
        assert_eq!(session.percentage().unwrap(), 67);
    }

    #[test]
    fn empty_quiz_reports_no_questions() {
        let mut session = QuizSession::new("Empty", Vec::<Question>::new());
        assert!(session.is_empty());
        assert_eq!(session.select_answer("anything"), Selection::NoQuestions);
        assert_eq!(session.advance(), Err(SessionError::NoQuestions));
        assert_eq!(session.percentage(), Err(SessionError::NoQuestions));
        assert_eq!(session.score(), 0);
        assert_eq!(session.progress().total, 0);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn progress_tracks_position() {
        let mut session = physics();
        assert_eq!(session.progress().position, 1);
        assert_eq!(session.progress().total, 3);
        session.select_answer("Newton");
        session.advance().unwrap();
        let p = session.progress();
        assert_eq!(p.position, 2);
        assert!((p.fraction - 2.0 / 3.0).abs() < 1e-9);
        assert!(!session.is_last_question());
        session.select_answer("First Law");
        session.advance().unwrap();
        assert!(session.is_last_question());
    }

    #[test]
    fn review_marks_each_question() {
        let mut session = physics();
        answer_all(&mut session, &["Newton", "Third Law", "1/2 mv^2"]);
        let review = session.review();
        assert_eq!(review.len(), 3);
        assert!(review[0].correct);
        assert!(!review[1].correct);
        assert_eq!(review[1].selected_or_placeholder(), "Third Law");
        assert_eq!(review[1].answer, "First Law");

        session.restart();
        assert_eq!(session.review()[0].selected_or_placeholder(), "Not answered");
    }

    #[test]
    fn finishing_saves_score_once() {
        let store = Arc::new(KvScoreStore::in_memory());
        store.save(SubjectSlug::Math, 90).unwrap();

        let mut session = physics().with_score_store(SubjectSlug::Physics, store.clone());
        answer_all(&mut session, &["Newton", "First Law", "ma"]);

        let scores = store.load();
        assert_eq!(scores[&SubjectSlug::Physics], 67);
        assert_eq!(scores[&SubjectSlug::Math], 90);
    }

    #[test]
    fn unfinished_session_saves_nothing() {
        let store = Arc::new(KvScoreStore::in_memory());
        let mut session = physics().with_score_store(SubjectSlug::Physics, store.clone());
        session.select_answer("Newton");
        session.advance().unwrap();
        assert!(store.load().is_empty());
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn load(&self) -> Scores {
            Scores::new()
        }

        fn save(&self, _: SubjectSlug, _: u8) -> Result<(), ScoreError> {
            Err(ScoreError::Storage(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn persistence_failure_does_not_block_completion() {
        let mut session = physics().with_score_store(SubjectSlug::Physics, Arc::new(BrokenStore));
        let outcome = answer_all(&mut session, &["Newton", "First Law", "1/2 mv^2"]).unwrap();
        assert!(session.is_finished());
        assert!(!outcome.saved);
        assert_eq!(outcome.percentage, 100);
    }

    #[test]
    fn question_snapshot_is_independent_of_source() {
        let mut questions = Catalog::builtin()
            .unwrap()
            .quiz(SubjectSlug::Math)
            .unwrap()
            .questions
            .clone();
        let session = QuizSession::new("Math Quiz", questions.clone());
        questions.reverse();
        assert_eq!(session.questions()[0].answer, "2");
    }
}
