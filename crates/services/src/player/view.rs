use player_core::model::{QuizQuestion, QuizState};

/// What the render layer should show for the current lesson.
///
/// This is intentionally **not** a UI view-model:
/// - no markup, no pre-formatted strings
/// - no widget or framework assumptions
///
/// A frontend matches on this exhaustively, so a new lesson kind cannot be
/// forgotten at the render boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum LessonView<'a> {
    /// Embed the player at `url`.
    Video { title: &'a str, url: &'a str },

    /// Render a literal HTML body (old authoring format).
    TextHtml { title: &'a str, html: &'a str },

    /// Render an ordered bullet list (new authoring format).
    TextBullets { title: &'a str, bullets: &'a [String] },

    /// Question/option UI; `can_submit` drives the submit control.
    Quiz {
        title: &'a str,
        questions: &'a [QuizQuestion],
        answers: &'a QuizState,
        can_submit: bool,
    },

    /// Shown in place of the question UI once the quiz is submitted.
    QuizResults {
        title: &'a str,
        score: u32,
        total: u32,
        passed: bool,
    },

    /// Hand off to the conversational roleplay sub-view.
    Roleplay {
        title: &'a str,
        persona: &'a str,
        objectives: &'a [String],
        initial_message: Option<&'a str>,
    },

    /// The course has no lessons yet.
    Empty,
}
