use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::ids::CourseId;
use crate::model::quiz::QuizQuestion;
use crate::navigator::Position;

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A published course as served by the catalog endpoint.
///
/// Course content is read-only for the lifetime of a player session; the
/// backend is the single source of truth for the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Course {
    #[must_use]
    pub fn total_modules(&self) -> usize {
        self.modules.len()
    }

    /// Total number of lessons across all modules.
    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Returns true when the course has no lessons at all.
    ///
    /// An empty course is valid content (a draft the author has not filled
    /// in yet); the player renders an empty state for it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_lessons() == 0
    }

    /// Resolve a navigator position to the module and lesson it addresses.
    #[must_use]
    pub fn lesson_at(&self, position: Position) -> Option<(&Module, &Lesson)> {
        let module = self.modules.get(position.module)?;
        let lesson = module.lessons.get(position.lesson)?;
        Some((module, lesson))
    }
}

/// One titled group of lessons. Module order defines the navigation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A single lesson with its type-dependent payload.
///
/// The wire format carries a `type` discriminator next to the payload fields;
/// lessons without a discriminator are legacy text lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LessonWire")]
pub struct Lesson {
    pub title: String,
    #[serde(flatten)]
    pub content: LessonContent,
}

impl Lesson {
    /// Parsed embed URL for a video lesson. `Ok(None)` for other kinds.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if a video lesson carries a malformed URL.
    pub fn embed_url(&self) -> Result<Option<Url>, url::ParseError> {
        match &self.content {
            LessonContent::Video { content } => Url::parse(content).map(Some),
            _ => Ok(None),
        }
    }
}

/// Type-dependent lesson payload.
///
/// One variant per lesson kind the player can show; the render boundary
/// matches on this exhaustively, so adding a kind is a compile-time change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LessonContent {
    /// Embeddable video player URL.
    Video { content: String },
    /// Literal HTML or a bullet list, depending on the authoring format.
    Text { content: TextBody },
    /// Multiple-choice assessment.
    Quiz { questions: Vec<QuizQuestion> },
    /// Conversational practice delegated to the roleplay collaborator.
    Roleplay {
        persona: String,
        #[serde(default)]
        objectives: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_message: Option<String>,
    },
}

/// Text lesson body: either a literal HTML string (old authoring format) or
/// an ordered list of bullet points (new format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextBody {
    Html(String),
    Bullets(Vec<String>),
}

//
// ─── WIRE DECODING ─────────────────────────────────────────────────────────────
//

/// Raw lesson shape as authored in course JSON. The discriminator and most
/// payload fields are optional on the wire; decoding is permissive and
/// normalizes into `LessonContent`.
#[derive(Deserialize)]
struct LessonWire {
    title: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    content: Option<TextBody>,
    questions: Option<Vec<QuizQuestion>>,
    persona: Option<String>,
    #[serde(default)]
    objectives: Vec<String>,
    initial_message: Option<String>,
}

impl From<LessonWire> for Lesson {
    fn from(wire: LessonWire) -> Self {
        let content = match wire.kind.as_deref() {
            Some("video") => LessonContent::Video {
                content: match wire.content {
                    Some(TextBody::Html(url)) => url,
                    _ => String::new(),
                },
            },
            Some("quiz") => LessonContent::Quiz {
                questions: wire.questions.unwrap_or_default(),
            },
            Some("roleplay") => LessonContent::Roleplay {
                persona: wire.persona.unwrap_or_default(),
                objectives: wire.objectives,
                initial_message: wire.initial_message,
            },
            // Untyped lessons are legacy text content; unknown kinds fall
            // back to text rather than dropping the lesson.
            _ => LessonContent::Text {
                content: wire.content.unwrap_or_else(|| TextBody::Html(String::new())),
            },
        };

        Self {
            title: wire.title,
            content,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
