use std::fmt;
use std::sync::Arc;

use backend::{ChatMessage, RoleplayApi, RoleplayFeedback};
use player_core::model::{Lesson, LessonContent};

use crate::error::RoleplayError;

/// Minimum grading score that counts a roleplay lesson as passed.
pub const ROLEPLAY_PASS_SCORE: u32 = 70;

/// Conversation state for one roleplay lesson.
///
/// The session only manages the dialogue and its grading report; lesson
/// navigation stays with the player (the roleplay view exposes next/previous
/// callbacks it does not implement itself).
pub struct RoleplaySession {
    api: Arc<dyn RoleplayApi>,
    persona: String,
    objectives: Vec<String>,
    initial_message: Option<String>,
    messages: Vec<ChatMessage>,
    feedback: Option<RoleplayFeedback>,
}

impl RoleplaySession {
    /// Build a session for a roleplay lesson. `None` for other lesson kinds.
    #[must_use]
    pub fn for_lesson(api: Arc<dyn RoleplayApi>, lesson: &Lesson) -> Option<Self> {
        let LessonContent::Roleplay {
            persona,
            objectives,
            initial_message,
        } = &lesson.content
        else {
            return None;
        };

        let mut session = Self {
            api,
            persona: persona.clone(),
            objectives: objectives.clone(),
            initial_message: initial_message.clone(),
            messages: Vec::new(),
            feedback: None,
        };
        session.seed();
        Some(session)
    }

    // The persona's opening line, when the lesson has one.
    fn seed(&mut self) {
        self.messages = self
            .initial_message
            .clone()
            .map(ChatMessage::assistant)
            .into_iter()
            .collect();
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&RoleplayFeedback> {
        self.feedback.as_ref()
    }

    /// True once a grading report with a passing score is in.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.feedback
            .as_ref()
            .is_some_and(|feedback| feedback.score >= ROLEPLAY_PASS_SCORE)
    }

    /// Send one learner turn and append the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns `RoleplayError::EmptyMessage` for whitespace-only input,
    /// `RoleplayError::AlreadyGraded` after `finish`, and transport errors
    /// from the collaborator. On transport failure the learner's turn stays
    /// in the transcript so it is not lost on retry.
    pub async fn send(&mut self, input: &str) -> Result<ChatMessage, RoleplayError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RoleplayError::EmptyMessage);
        }
        if self.feedback.is_some() {
            return Err(RoleplayError::AlreadyGraded);
        }

        self.messages.push(ChatMessage::user(trimmed));
        let reply = self.api.chat(&self.messages, &self.persona).await?;
        self.messages.push(reply.clone());
        Ok(reply)
    }

    /// End the conversation and request the grading report.
    ///
    /// # Errors
    ///
    /// Returns `RoleplayError::AlreadyGraded` on a second grading attempt
    /// (retakes go through `restart`), and transport errors otherwise.
    pub async fn finish(&mut self) -> Result<RoleplayFeedback, RoleplayError> {
        if self.feedback.is_some() {
            return Err(RoleplayError::AlreadyGraded);
        }

        let feedback = self.api.feedback(&self.messages, &self.objectives).await?;
        self.feedback = Some(feedback.clone());
        Ok(feedback)
    }

    /// "Try Again": drop the transcript and report, re-seed the opening line.
    pub fn restart(&mut self) {
        self.feedback = None;
        self.seed();
    }
}

impl fmt::Debug for RoleplaySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleplaySession")
            .field("messages_len", &self.messages.len())
            .field("graded", &self.feedback.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
