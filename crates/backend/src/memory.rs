use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use player_core::model::{Course, CourseId, ProgressRecord, ProgressStatus};

use crate::api::{
    ApiError, ChatMessage, EnrollmentApi, ProgressAck, ProgressUpdate, RoleplayApi,
    RoleplayFeedback,
};

/// In-memory stand-in for the enrollment and roleplay collaborators,
/// for testing and prototyping.
///
/// Mirrors the real backend's behavior where it matters to the player:
/// enrollments must exist before progress can be saved, a certificate id is
/// minted on first completion, and saves can be made to fail on demand to
/// exercise the swallow-errors policy.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    courses: Arc<Mutex<Vec<Course>>>,
    enrollments: Arc<Mutex<HashMap<CourseId, ProgressRecord>>>,
    saved: Arc<Mutex<Vec<ProgressUpdate>>>,
    fail_saves: Arc<AtomicBool>,
    chat_replies: Arc<Mutex<VecDeque<String>>>,
    feedback: Arc<Mutex<Option<RoleplayFeedback>>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a course to the catalog.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only type).
    pub fn insert_course(&self, course: Course) {
        self.courses.lock().unwrap().push(course);
    }

    /// Create a fresh enrollment for a course, as the purchase flow would.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only type).
    pub fn enroll(&self, course_id: CourseId) {
        self.enrollments.lock().unwrap().insert(
            course_id,
            ProgressRecord {
                progress: 0,
                status: ProgressStatus::InProgress,
                last_module_index: Some(0),
                last_lesson_index: Some(0),
                score: Some(0.0),
                certificate_id: None,
            },
        );
    }

    /// Overwrite the stored progress record, e.g. to simulate a returning
    /// learner with a bookmark.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only type).
    pub fn set_enrollment(&self, course_id: CourseId, record: ProgressRecord) {
        self.enrollments.lock().unwrap().insert(course_id, record);
    }

    /// Every update the player has sent, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only type).
    #[must_use]
    pub fn saved_updates(&self) -> Vec<ProgressUpdate> {
        self.saved.lock().unwrap().clone()
    }

    /// Make subsequent `update_progress` calls fail with a connection error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Queue a scripted assistant reply for the next `chat` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only type).
    pub fn push_chat_reply(&self, content: impl Into<String>) {
        self.chat_replies.lock().unwrap().push_back(content.into());
    }

    /// Set the grading report `feedback` will return.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only type).
    pub fn set_feedback(&self, feedback: RoleplayFeedback) {
        *self.feedback.lock().unwrap() = Some(feedback);
    }
}

#[async_trait]
impl EnrollmentApi for InMemoryBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn fetch_enrollment(&self, id: CourseId) -> Result<Option<ProgressRecord>, ApiError> {
        let guard = self
            .enrollments
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn update_progress(&self, update: &ProgressUpdate) -> Result<ProgressAck, ApiError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ApiError::Connection("injected save failure".into()));
        }

        let mut enrollments = self
            .enrollments
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        let record = enrollments
            .get_mut(&update.course_id)
            .ok_or(ApiError::NotFound)?;

        record.progress = update.progress;
        record.status = update.status;
        if update.score.is_some() {
            record.score = update.score;
        }
        record.last_module_index = Some(update.module_idx);
        record.last_lesson_index = Some(update.lesson_idx);

        if record.status == ProgressStatus::Completed && record.certificate_id.is_none() {
            record.certificate_id = Some(format!("CERT-{}", update.course_id));
        }
        let certificate_id = record.certificate_id.clone();
        drop(enrollments);

        self.saved
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))?
            .push(update.clone());

        Ok(ProgressAck {
            msg: "Progress updated".into(),
            certificate_id,
        })
    }
}

#[async_trait]
impl RoleplayApi for InMemoryBackend {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _persona: &str,
    ) -> Result<ChatMessage, ApiError> {
        let mut replies = self
            .chat_replies
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        let content = replies
            .pop_front()
            .unwrap_or_else(|| "Understood. Go on.".into());
        Ok(ChatMessage::assistant(content))
    }

    async fn feedback(
        &self,
        _messages: &[ChatMessage],
        _objectives: &[String],
    ) -> Result<RoleplayFeedback, ApiError> {
        let guard = self
            .feedback
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        guard.clone().ok_or(ApiError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_core::model::progress_percent;

    fn course(id: u64) -> Course {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Course {id}"),
            "modules": [
                {"title": "M1", "lessons": [{"title": "L1", "content": "<p>x</p>"}]}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_course_filters_the_catalog() {
        let api = InMemoryBackend::new();
        api.insert_course(course(1));
        api.insert_course(course(2));

        let found = api.fetch_course(CourseId::new(2)).await.unwrap();
        assert_eq!(found.id, CourseId::new(2));

        let missing = api.fetch_course(CourseId::new(9)).await;
        assert!(matches!(missing, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn update_progress_requires_an_enrollment() {
        let api = InMemoryBackend::new();
        let update = ProgressUpdate::in_progress(CourseId::new(1), 0, 0, 1);
        assert!(matches!(
            api.update_progress(&update).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn completed_save_mints_a_certificate_once() {
        let api = InMemoryBackend::new();
        let id = CourseId::new(5);
        api.enroll(id);

        let ack = api
            .update_progress(&ProgressUpdate::completed(id, 0, 0, 80.0))
            .await
            .unwrap();
        let cert = ack.certificate_id.clone().unwrap();

        let ack_again = api
            .update_progress(&ProgressUpdate::completed(id, 0, 0, 90.0))
            .await
            .unwrap();
        assert_eq!(ack_again.certificate_id, Some(cert));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_connection_errors() {
        let api = InMemoryBackend::new();
        let id = CourseId::new(1);
        api.enroll(id);
        api.set_fail_saves(true);

        let update = ProgressUpdate::in_progress(id, 0, 0, 1);
        assert!(matches!(
            api.update_progress(&update).await,
            Err(ApiError::Connection(_))
        ));
        assert!(api.saved_updates().is_empty());

        api.set_fail_saves(false);
        api.update_progress(&update).await.unwrap();
        assert_eq!(api.saved_updates().len(), 1);
    }

    #[tokio::test]
    async fn bookmark_round_trips_through_saves() {
        let api = InMemoryBackend::new();
        let id = CourseId::new(1);
        api.enroll(id);

        api.update_progress(&ProgressUpdate::in_progress(id, 2, 1, 5))
            .await
            .unwrap();

        let record = api.fetch_enrollment(id).await.unwrap().unwrap();
        assert_eq!(record.last_module_index, Some(2));
        assert_eq!(record.last_lesson_index, Some(1));
        assert_eq!(
            record.progress,
            progress_percent(2, 5, ProgressStatus::InProgress)
        );
    }
}
