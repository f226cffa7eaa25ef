mod course;
mod ids;
mod progress;
mod quiz;

pub use course::{Course, Lesson, LessonContent, Module, TextBody};
pub use ids::CourseId;
pub use progress::{ProgressRecord, ProgressStatus, progress_percent};
pub use quiz::{PASS_MARK, QuizError, QuizOutcome, QuizQuestion, QuizState};
