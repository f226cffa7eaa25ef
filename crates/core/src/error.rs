use thiserror::Error;

use crate::model::QuizError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    // later:
    // Content(#[from] ContentError),
}
