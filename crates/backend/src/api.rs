use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use player_core::model::{Course, CourseId, ProgressRecord, ProgressStatus};

/// Errors surfaced by collaborator API adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("connection error: {0}")]
    Connection(String),
}

//
// ─── PROGRESS WIRE TYPES ───────────────────────────────────────────────────────
//

/// Body of `POST /update-progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub course_id: CourseId,
    pub progress: u8,
    pub status: ProgressStatus,
    pub score: Option<f64>,
    pub module_idx: usize,
    pub lesson_idx: usize,
}

/// Acknowledgment of a progress save. The backend mints a certificate id
/// the first time an enrollment reaches completed status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAck {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub certificate_id: Option<String>,
}

//
// ─── ROLEPLAY WIRE TYPES ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in a roleplay conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Grading report returned by the roleplay feedback endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleplayFeedback {
    pub score: u32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

//
// ─── API CONTRACTS ─────────────────────────────────────────────────────────────
//

/// Collaborator contract for course content and enrollment progress.
///
/// The backend owns all persistence; this seam only reads state and issues
/// best-effort writes. Whether a failed `update_progress` is swallowed is the
/// caller's decision, which is why it returns an explicit `Result` instead of
/// hiding the outcome.
#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    /// Load the full course catalog with nested modules and lessons.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the catalog cannot be fetched.
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// Locate one course by id.
    ///
    /// The backend exposes no single-course endpoint, so the default loads
    /// the catalog and filters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the id is not in the catalog.
    async fn fetch_course(&self, id: CourseId) -> Result<Course, ApiError> {
        self.list_courses()
            .await?
            .into_iter()
            .find(|course| course.id == id)
            .ok_or(ApiError::NotFound)
    }

    /// Fetch the learner's progress record for a course.
    ///
    /// `Ok(None)` means no enrollment bookmark exists yet (fresh start).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures.
    async fn fetch_enrollment(&self, id: CourseId) -> Result<Option<ProgressRecord>, ApiError>;

    /// Persist a navigation or completion bookmark.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the save does not reach the backend.
    async fn update_progress(&self, update: &ProgressUpdate) -> Result<ProgressAck, ApiError>;
}

/// Collaborator contract for the conversational roleplay service.
#[async_trait]
pub trait RoleplayApi: Send + Sync {
    /// Send the conversation so far and receive the assistant's next turn.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        persona: &str,
    ) -> Result<ChatMessage, ApiError>;

    /// Request a grading report for the finished conversation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or an undecodable report.
    async fn feedback(
        &self,
        messages: &[ChatMessage],
        objectives: &[String],
    ) -> Result<RoleplayFeedback, ApiError>;
}

/// Convenience for building an in-progress update from navigator state.
impl ProgressUpdate {
    #[must_use]
    pub fn in_progress(
        course_id: CourseId,
        module_idx: usize,
        lesson_idx: usize,
        total_modules: usize,
    ) -> Self {
        Self {
            course_id,
            progress: player_core::model::progress_percent(
                module_idx,
                total_modules,
                ProgressStatus::InProgress,
            ),
            status: ProgressStatus::InProgress,
            score: None,
            module_idx,
            lesson_idx,
        }
    }

    #[must_use]
    pub fn completed(
        course_id: CourseId,
        module_idx: usize,
        lesson_idx: usize,
        score: f64,
    ) -> Self {
        Self {
            course_id,
            progress: 100,
            status: ProgressStatus::Completed,
            score: Some(score),
            module_idx,
            lesson_idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_update_carries_capped_percent() {
        let update = ProgressUpdate::in_progress(CourseId::new(3), 4, 0, 5);
        assert_eq!(update.progress, 90);
        assert_eq!(update.status, ProgressStatus::InProgress);
        assert_eq!(update.score, None);
    }

    #[test]
    fn completed_update_forces_one_hundred() {
        let update = ProgressUpdate::completed(CourseId::new(3), 1, 2, 80.0);
        assert_eq!(update.progress, 100);
        assert_eq!(update.status, ProgressStatus::Completed);
        assert_eq!(update.score, Some(80.0));
    }

    #[test]
    fn update_serializes_backend_field_names() {
        let update = ProgressUpdate::in_progress(CourseId::new(9), 2, 1, 5);
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["course_id"], 9);
        assert_eq!(json["progress"], 60);
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["module_idx"], 2);
        assert_eq!(json["lesson_idx"], 1);
    }

    #[test]
    fn chat_messages_use_lowercase_roles() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        let json = serde_json::to_value(ChatMessage::assistant("hello")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
