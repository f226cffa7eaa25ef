mod progress;
mod roleplay;
mod session;
mod view;
mod workflow;

// Public API of the player subsystem.
pub use progress::PlayerProgress;
pub use roleplay::{ROLEPLAY_PASS_SCORE, RoleplaySession};
pub use session::PlayerSession;
pub use view::LessonView;
pub use workflow::{PlayerLoopService, QuizSubmission};
