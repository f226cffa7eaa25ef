use std::sync::Arc;

use backend::{ApiError, EnrollmentApi, ProgressAck, ProgressUpdate};
use player_core::Position;
use player_core::model::{CourseId, QuizError, QuizOutcome};

use crate::error::PlayerError;
use super::roleplay::ROLEPLAY_PASS_SCORE;
use super::session::PlayerSession;

/// Result of submitting a quiz through the workflow, including the
/// certificate id when the completion save minted one.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSubmission {
    pub outcome: QuizOutcome,
    pub certificate_id: Option<String>,
}

/// Orchestrates player mounting and best-effort progress persistence.
///
/// Every navigation step fires a save; transport failures are logged and
/// swallowed so a backend outage never blocks learning. Delivery is
/// at-most-once with no retries: a dropped save is simply dropped.
#[derive(Clone)]
pub struct PlayerLoopService {
    enrollments: Arc<dyn EnrollmentApi>,
}

impl PlayerLoopService {
    #[must_use]
    pub fn new(enrollments: Arc<dyn EnrollmentApi>) -> Self {
        Self { enrollments }
    }

    /// Mount the player for a course, resuming from the stored bookmark.
    ///
    /// The course fetch is fatal; a failed or missing enrollment fetch only
    /// means starting fresh.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::CourseNotFound` when the catalog has no such
    /// course, or `PlayerError::Api` when the catalog cannot be loaded.
    pub async fn start(&self, course_id: CourseId) -> Result<PlayerSession, PlayerError> {
        let course = self
            .enrollments
            .fetch_course(course_id)
            .await
            .map_err(|err| match err {
                ApiError::NotFound => PlayerError::CourseNotFound(course_id),
                other => PlayerError::Api(other),
            })?;

        let resume = match self.enrollments.fetch_enrollment(course_id).await {
            Ok(record) => record.and_then(|record| record.resume_position()),
            Err(err) => {
                tracing::debug!(%course_id, error = %err, "no stored progress, starting fresh");
                None
            }
        };

        Ok(PlayerSession::new(course, resume))
    }

    /// Direct jump (sidebar click), then a fire-and-forget bookmark save.
    /// Returns false when the target does not exist; nothing is saved then.
    pub async fn go_to(&self, session: &mut PlayerSession, position: Position) -> bool {
        if !session.go_to(position) {
            return false;
        }
        self.save_bookmark(session).await;
        true
    }

    /// Advance one lesson and save the new bookmark. `None` at the last
    /// lesson (nothing moves, nothing is saved).
    pub async fn advance(&self, session: &mut PlayerSession) -> Option<Position> {
        let moved = session.advance()?;
        self.save_bookmark(session).await;
        Some(moved)
    }

    /// Retreat one lesson and save the new bookmark. `None` at the first
    /// lesson.
    pub async fn retreat(&self, session: &mut PlayerSession) -> Option<Position> {
        let moved = session.retreat()?;
        self.save_bookmark(session).await;
        Some(moved)
    }

    /// Grade the current quiz lesson; a passing result marks the enrollment
    /// completed on the backend with the percentage as the recorded score.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for grading problems. A failed completion save is
    /// not an error here: it is logged and the submission still succeeds
    /// (the learner passed; the backend just missed hearing about it).
    pub async fn submit_quiz(
        &self,
        session: &mut PlayerSession,
    ) -> Result<QuizSubmission, QuizError> {
        let outcome = session.submit_quiz()?;

        let mut certificate_id = None;
        if outcome.passed {
            let position = session.position();
            let update = ProgressUpdate::completed(
                session.course().id,
                position.module,
                position.lesson,
                outcome.percent,
            );
            match self.enrollments.update_progress(&update).await {
                Ok(ack) => certificate_id = ack.certificate_id,
                Err(err) => tracing::warn!(
                    course_id = %session.course().id,
                    error = %err,
                    "failed to save quiz completion"
                ),
            }
        }

        Ok(QuizSubmission {
            outcome,
            certificate_id,
        })
    }

    /// Completion contract point for the roleplay sub-view: it reports a
    /// numeric score, and a passing score completes the enrollment.
    /// Returns the certificate id when the save minted one.
    pub async fn complete_roleplay(
        &self,
        session: &PlayerSession,
        score: u32,
    ) -> Option<String> {
        if score < ROLEPLAY_PASS_SCORE {
            return None;
        }

        let position = session.position();
        let update = ProgressUpdate::completed(
            session.course().id,
            position.module,
            position.lesson,
            f64::from(score),
        );
        match self.enrollments.update_progress(&update).await {
            Ok(ack) => ack.certificate_id,
            Err(err) => {
                tracing::warn!(
                    course_id = %session.course().id,
                    error = %err,
                    "failed to save roleplay completion"
                );
                None
            }
        }
    }

    /// Persist an arbitrary progress update and surface the outcome.
    ///
    /// The loop methods above are callers that choose to swallow the error;
    /// this is the seam for callers that want to see it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the save does not reach the backend.
    pub async fn save_progress(&self, update: &ProgressUpdate) -> Result<ProgressAck, ApiError> {
        self.enrollments.update_progress(update).await
    }

    async fn save_bookmark(&self, session: &PlayerSession) {
        let position = session.position();
        let update = ProgressUpdate::in_progress(
            session.course().id,
            position.module,
            position.lesson,
            session.course().total_modules(),
        );
        if let Err(err) = self.enrollments.update_progress(&update).await {
            tracing::warn!(
                course_id = %session.course().id,
                error = %err,
                "failed to save progress, continuing"
            );
        }
    }
}
