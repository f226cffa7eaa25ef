use std::fmt;

use player_core::model::{
    Course, Lesson, LessonContent, Module, PASS_MARK, QuizError, QuizOutcome, QuizState, TextBody,
    progress_percent, ProgressStatus,
};
use player_core::navigator::{self, Position};

use super::progress::PlayerProgress;
use super::view::LessonView;

//
// ─── PLAYER SESSION ────────────────────────────────────────────────────────────
//

/// In-memory player state for one mounted course.
///
/// Owns the course content (immutable for the session), the current lesson
/// position, and the answer sheet for whichever quiz lesson is on screen.
/// All transitions originate from discrete UI events, so there is exactly one
/// writer and no interior locking.
pub struct PlayerSession {
    course: Course,
    position: Position,
    quiz: QuizState,
}

impl PlayerSession {
    /// Mount a course, resuming from a bookmark when it is still in range.
    ///
    /// An out-of-range bookmark (the course shrank since it was written) and
    /// a missing one both fall back to the first lesson. A course with no
    /// lessons is valid; it simply has no current lesson.
    #[must_use]
    pub fn new(course: Course, resume: Option<Position>) -> Self {
        let position = resume
            .filter(|pos| navigator::contains(&course.modules, *pos))
            .or_else(|| navigator::first(&course.modules))
            .unwrap_or(Position::START);

        Self {
            course,
            position,
            quiz: QuizState::new(),
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<(&Module, &Lesson)> {
        self.course.lesson_at(self.position)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Direct jump (sidebar click). Returns false and moves nothing when the
    /// target does not exist. Any movement discards quiz state.
    pub fn go_to(&mut self, position: Position) -> bool {
        if !navigator::contains(&self.course.modules, position) {
            return false;
        }
        self.position = position;
        self.quiz.reset();
        true
    }

    /// Advance one lesson. `None` (and no movement) at the last lesson and
    /// for empty courses.
    pub fn advance(&mut self) -> Option<Position> {
        let moved = navigator::next(&self.course.modules, self.position)?;
        self.position = moved;
        self.quiz.reset();
        Some(moved)
    }

    /// Retreat one lesson. `None` (and no movement) at the first lesson and
    /// for empty courses.
    pub fn retreat(&mut self) -> Option<Position> {
        let moved = navigator::previous(&self.course.modules, self.position)?;
        self.position = moved;
        self.quiz.reset();
        Some(moved)
    }

    /// True at the course's first lesson; the "previous" control disables.
    #[must_use]
    pub fn is_first_lesson(&self) -> bool {
        navigator::is_first(&self.course.modules, self.position)
    }

    /// True at the course's last lesson; the "next" control disables.
    #[must_use]
    pub fn is_last_lesson(&self) -> bool {
        navigator::is_last(&self.course.modules, self.position)
    }

    //
    // ─── QUIZ ──────────────────────────────────────────────────────────────────
    //

    /// Record an answer for the current quiz lesson. No-op (false) when the
    /// current lesson is not a quiz or the quiz was already submitted.
    pub fn select_quiz_option(
        &mut self,
        question_index: usize,
        option_key: impl Into<String>,
    ) -> bool {
        if self.current_questions().is_none() {
            return false;
        }
        self.quiz.select_option(question_index, option_key)
    }

    /// True when the submit control should be enabled: a quiz lesson is on
    /// screen, every question is answered, and nothing was submitted yet.
    #[must_use]
    pub fn can_submit_quiz(&self) -> bool {
        !self.quiz.is_submitted()
            && self
                .current_questions()
                .is_some_and(|questions| self.quiz.all_answered(questions.len()))
    }

    /// Grade the current quiz lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` when the current lesson is not a
    /// quiz, plus the grading errors from `QuizState::submit`.
    pub fn submit_quiz(&mut self) -> Result<QuizOutcome, QuizError> {
        let Some((_, lesson)) = self.course.lesson_at(self.position) else {
            return Err(QuizError::NoQuestions);
        };
        let LessonContent::Quiz { questions } = &lesson.content else {
            return Err(QuizError::NoQuestions);
        };
        self.quiz.submit(questions)
    }

    /// Explicit "Retake Quiz": clear the answer sheet and results.
    pub fn reset_quiz(&mut self) {
        self.quiz.reset();
    }

    fn current_questions(&self) -> Option<&[player_core::model::QuizQuestion]> {
        match &self.current_lesson()?.1.content {
            LessonContent::Quiz { questions } => Some(questions),
            _ => None,
        }
    }

    //
    // ─── SNAPSHOTS ─────────────────────────────────────────────────────────────
    //

    /// Returns a summary of the learner's place in the course.
    #[must_use]
    pub fn progress(&self) -> PlayerProgress {
        PlayerProgress {
            position: self.position,
            total_modules: self.course.total_modules(),
            total_lessons: self.course.total_lessons(),
            percent: progress_percent(
                self.position.module,
                self.course.total_modules(),
                ProgressStatus::InProgress,
            ),
            is_first_lesson: self.is_first_lesson(),
            is_last_lesson: self.is_last_lesson(),
            is_empty: self.course.is_empty(),
        }
    }

    /// Resolve what the render layer should show right now.
    ///
    /// Exactly one view per lesson kind, plus the results view once a quiz
    /// has been submitted and the empty state for courses without lessons.
    #[must_use]
    pub fn view(&self) -> LessonView<'_> {
        let Some((_, lesson)) = self.current_lesson() else {
            return LessonView::Empty;
        };

        match &lesson.content {
            LessonContent::Video { content } => LessonView::Video {
                title: &lesson.title,
                url: content,
            },
            LessonContent::Text {
                content: TextBody::Html(html),
            } => LessonView::TextHtml {
                title: &lesson.title,
                html,
            },
            LessonContent::Text {
                content: TextBody::Bullets(bullets),
            } => LessonView::TextBullets {
                title: &lesson.title,
                bullets,
            },
            LessonContent::Quiz { questions } => {
                if self.quiz.is_submitted() {
                    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
                    let passed = total > 0
                        && f64::from(self.quiz.score()) / f64::from(total) >= PASS_MARK;
                    LessonView::QuizResults {
                        title: &lesson.title,
                        score: self.quiz.score(),
                        total,
                        passed,
                    }
                } else {
                    LessonView::Quiz {
                        title: &lesson.title,
                        questions,
                        answers: &self.quiz,
                        can_submit: self.can_submit_quiz(),
                    }
                }
            }
            LessonContent::Roleplay {
                persona,
                objectives,
                initial_message,
            } => LessonView::Roleplay {
                title: &lesson.title,
                persona,
                objectives,
                initial_message: initial_message.as_deref(),
            },
        }
    }
}

impl fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSession")
            .field("course_id", &self.course.id)
            .field("position", &self.position)
            .field("quiz_submitted", &self.quiz.is_submitted())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 modules: ["Welcome" text, "Basics" bullets] then [final quiz].
    fn build_course() -> Course {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Test Course",
            "modules": [
                {"title": "M0", "lessons": [
                    {"title": "Welcome", "type": "text", "content": "<p>hi</p>"},
                    {"title": "Basics", "type": "text", "content": ["a", "b"]}
                ]},
                {"title": "M1", "lessons": [
                    {"title": "Final", "type": "quiz", "questions": [
                        {"question": "Q1", "options": {"a": "1", "b": "2"}, "correct_answer": "a"},
                        {"question": "Q2", "options": {"a": "1", "b": "2"}, "correct_answer": "b"}
                    ]}
                ]}
            ]
        }))
        .unwrap()
    }

    fn empty_course() -> Course {
        serde_json::from_value(serde_json::json!({
            "id": 2,
            "title": "Draft",
            "modules": []
        }))
        .unwrap()
    }

    #[test]
    fn starts_at_first_lesson_without_resume() {
        let session = PlayerSession::new(build_course(), None);
        assert_eq!(session.position(), Position::new(0, 0));
        assert!(session.is_first_lesson());
    }

    #[test]
    fn resumes_from_in_range_bookmark() {
        let session = PlayerSession::new(build_course(), Some(Position::new(1, 0)));
        assert_eq!(session.position(), Position::new(1, 0));
    }

    #[test]
    fn out_of_range_bookmark_falls_back_to_start() {
        let session = PlayerSession::new(build_course(), Some(Position::new(5, 9)));
        assert_eq!(session.position(), Position::new(0, 0));
    }

    #[test]
    fn advance_then_retreat_returns_to_origin() {
        let mut session = PlayerSession::new(build_course(), None);
        assert_eq!(session.advance(), Some(Position::new(0, 1)));
        assert_eq!(session.retreat(), Some(Position::new(0, 0)));
    }

    #[test]
    fn advance_rolls_over_module_boundary() {
        let mut session = PlayerSession::new(build_course(), Some(Position::new(0, 1)));
        assert_eq!(session.advance(), Some(Position::new(1, 0)));
        assert!(session.is_last_lesson());
        assert_eq!(session.advance(), None);
        assert_eq!(session.position(), Position::new(1, 0));
    }

    #[test]
    fn retreat_at_first_lesson_is_noop() {
        let mut session = PlayerSession::new(build_course(), None);
        assert_eq!(session.retreat(), None);
        assert_eq!(session.position(), Position::new(0, 0));
    }

    #[test]
    fn go_to_refuses_invalid_targets() {
        let mut session = PlayerSession::new(build_course(), None);
        assert!(!session.go_to(Position::new(3, 0)));
        assert_eq!(session.position(), Position::new(0, 0));
        assert!(session.go_to(Position::new(1, 0)));
    }

    #[test]
    fn navigation_discards_quiz_state() {
        let mut session = PlayerSession::new(build_course(), Some(Position::new(1, 0)));
        assert!(session.select_quiz_option(0, "a"));
        assert!(session.select_quiz_option(1, "b"));
        session.submit_quiz().unwrap();

        session.retreat();
        assert!(!session.quiz().is_submitted());
        assert_eq!(session.quiz().answered_count(), 0);
    }

    #[test]
    fn quiz_submit_gated_on_complete_answers() {
        let mut session = PlayerSession::new(build_course(), Some(Position::new(1, 0)));
        assert!(!session.can_submit_quiz());

        session.select_quiz_option(0, "a");
        assert!(!session.can_submit_quiz());

        session.select_quiz_option(1, "b");
        assert!(session.can_submit_quiz());

        let outcome = session.submit_quiz().unwrap();
        assert_eq!(outcome.score, 2);
        assert!(outcome.passed);
        assert!(!session.can_submit_quiz());
    }

    #[test]
    fn selecting_options_outside_quiz_lessons_is_noop() {
        let mut session = PlayerSession::new(build_course(), None);
        assert!(!session.select_quiz_option(0, "a"));
        assert!(session.submit_quiz().is_err());
    }

    #[test]
    fn view_dispatches_on_lesson_kind() {
        let mut session = PlayerSession::new(build_course(), None);
        assert!(matches!(session.view(), LessonView::TextHtml { .. }));

        session.advance();
        assert!(matches!(session.view(), LessonView::TextBullets { .. }));

        session.advance();
        assert!(matches!(session.view(), LessonView::Quiz { .. }));

        session.select_quiz_option(0, "a");
        session.select_quiz_option(1, "a");
        session.submit_quiz().unwrap();
        assert!(matches!(
            session.view(),
            LessonView::QuizResults { passed: false, score: 1, .. }
        ));
    }

    #[test]
    fn empty_course_renders_empty_state_and_never_moves() {
        let mut session = PlayerSession::new(empty_course(), None);
        assert!(matches!(session.view(), LessonView::Empty));
        assert_eq!(session.advance(), None);
        assert_eq!(session.retreat(), None);
        assert!(session.current_lesson().is_none());

        let progress = session.progress();
        assert!(progress.is_empty);
        assert_eq!(progress.percent, 0);
    }

    #[test]
    fn progress_snapshot_reports_position_and_percent() {
        let mut session = PlayerSession::new(build_course(), None);
        session.advance();
        session.advance();

        let progress = session.progress();
        assert_eq!(progress.position, Position::new(1, 0));
        assert_eq!(progress.total_modules, 2);
        assert_eq!(progress.total_lessons, 3);
        assert_eq!(progress.percent, 90); // round(2/2*100) capped at 90
        assert!(progress.is_last_lesson);
    }
}
