//! Shared error types for the services crate.

use thiserror::Error;

use backend::ApiError;
use player_core::model::CourseId;

/// Errors that are fatal to mounting the player.
///
/// Everything else the player runs into (progress-save failures above all)
/// is deliberately non-fatal and only logged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `RoleplaySession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoleplayError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("conversation has already been graded")]
    AlreadyGraded,
    #[error(transparent)]
    Api(#[from] ApiError),
}
