#![forbid(unsafe_code)]

pub mod error;
pub mod player;

pub use error::{PlayerError, RoleplayError};

pub use player::{
    LessonView, PlayerLoopService, PlayerProgress, PlayerSession, QuizSubmission,
    ROLEPLAY_PASS_SCORE, RoleplaySession,
};
