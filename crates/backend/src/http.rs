use std::env;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use player_core::model::{Course, CourseId, ProgressRecord};

use crate::api::{
    ApiError, ChatMessage, EnrollmentApi, ProgressAck, ProgressUpdate, RoleplayApi,
    RoleplayFeedback,
};

/// Connection settings for the enrollment backend.
///
/// The auth token is injected here once instead of being looked up from
/// ambient storage by every caller; whoever constructs the backend owns the
/// session identity.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub auth_token: String,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        let auth_token = env::var("PLAYER_API_TOKEN").ok()?;
        if auth_token.trim().is_empty() {
            return None;
        }
        let base_url = env::var("PLAYER_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".into());
        Some(Self {
            base_url,
            auth_token,
        })
    }
}

/// HTTP adapter for the enrollment and roleplay collaborators.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;
        Ok(response)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.auth_token)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl EnrollmentApi for HttpBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let response = self.get("courses").await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn fetch_enrollment(&self, id: CourseId) -> Result<Option<ProgressRecord>, ApiError> {
        let response = self.get(&format!("enrollment/{id}")).await?;
        // The backend answers 404 for "not enrolled yet"; that is a fresh
        // start, not a failure.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(Some(response.json().await?))
    }

    async fn update_progress(&self, update: &ProgressUpdate) -> Result<ProgressAck, ApiError> {
        let response = self.post_json("update-progress", update).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    persona: &'a str,
}

#[derive(Serialize)]
struct FeedbackRequest<'a> {
    messages: &'a [ChatMessage],
    objectives: &'a [String],
}

#[async_trait]
impl RoleplayApi for HttpBackend {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        persona: &str,
    ) -> Result<ChatMessage, ApiError> {
        let response = self
            .post_json("roleplay/chat", &ChatRequest { messages, persona })
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn feedback(
        &self,
        messages: &[ChatMessage],
        objectives: &[String],
    ) -> Result<RoleplayFeedback, ApiError> {
        let response = self
            .post_json(
                "roleplay/feedback",
                &FeedbackRequest {
                    messages,
                    objectives,
                },
            )
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        // The grader sometimes returns the report as a JSON-encoded string
        // rather than an object; accept both shapes.
        let value: serde_json::Value = response.json().await?;
        let feedback = match value {
            serde_json::Value::String(raw) => serde_json::from_str(&raw)?,
            other => serde_json::from_value(other)?,
        };
        Ok(feedback)
    }
}
