//! Per-user session state.
//!
//! A [`Session`] owns both flows for one user: the text chat and the image
//! chat, each with its own history. It is created on the user's first request
//! and consumed by [`Session::end`].

use tracing::{debug, info};

use crate::chat::config::ChatConfig;
use crate::chat::events::SessionEvent;
use crate::chat::text::TextChat;
use crate::chat::vision::ImageChat;
use crate::chat::{Submission, TurnOutcome};
use crate::collaborator::{ChatCollaborator, VisionCollaborator};
use crate::history::History;
use crate::observability::{SESSIONS_ENDED, SESSIONS_STARTED};
use crate::render::DisplaySlot;
use crate::reveal::RevealStatus;
use crate::types::{ImageQuery, Model};

/// Aggregated stats for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The session identifier.
    pub id: String,
    /// The model answering the text chat.
    pub text_model: Model,
    /// The model answering image questions.
    pub vision_model: Model,
    /// Turns currently in the text history.
    pub text_turns: usize,
    /// Turns currently in the image history.
    pub image_turns: usize,
    /// Total number of prompts dispatched across both flows.
    pub requests: u64,
    /// Prompts answered with the blocked message.
    pub blocked: u64,
    /// Prompts that ended in any other failure.
    pub failed: u64,
    /// Whether an image is loaded.
    pub image_loaded: bool,
}

/// One user's text chat and image chat.
pub struct Session<C: ChatCollaborator, V: VisionCollaborator> {
    id: String,
    config: ChatConfig,
    text: TextChat<C>,
    image: ImageChat<V>,
    requests: u64,
    blocked: u64,
    failed: u64,
}

impl<C: ChatCollaborator, V: VisionCollaborator> Session<C, V> {
    /// Starts a session with fresh flows built from `config`.
    pub fn new(id: impl Into<String>, config: ChatConfig, chat: C, vision: V) -> Self {
        let text = TextChat::new(chat, &config);
        let image = ImageChat::new(vision, &config);
        Self::with_flows(id, config, text, image)
    }

    /// Starts a session from flows the caller has already configured.
    pub fn with_flows(
        id: impl Into<String>,
        config: ChatConfig,
        text: TextChat<C>,
        image: ImageChat<V>,
    ) -> Self {
        let id = id.into();
        SESSIONS_STARTED.click();
        info!(session = %id, text_model = %config.text_model, vision_model = %config.vision_model, "session started");
        Self {
            id,
            config,
            text,
            image,
            requests: 0,
            blocked: 0,
            failed: 0,
        }
    }

    /// The session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The text flow.
    pub fn text(&self) -> &TextChat<C> {
        &self.text
    }

    /// The image flow.
    pub fn image(&self) -> &ImageChat<V> {
        &self.image
    }

    /// Dispatches one user action; prompts reveal their reply into `slot`.
    pub async fn handle(&mut self, event: SessionEvent, slot: &mut dyn DisplaySlot) -> Submission {
        debug!(session = %self.id, event = event.name(), "handling event");
        match event {
            SessionEvent::SubmitText(prompt) => self.submit_text(&prompt, slot).await,
            SessionEvent::ClearChat => {
                self.clear_chat();
                Submission::Ignored
            }
            SessionEvent::UploadImage(image) => {
                self.upload_image(image);
                Submission::Ignored
            }
            SessionEvent::RemoveImage => {
                self.remove_image();
                Submission::Ignored
            }
            SessionEvent::SubmitImagePrompt(prompt) => {
                self.submit_image_prompt(&prompt, slot).await
            }
        }
    }

    /// Sends a prompt to the text chat.
    pub async fn submit_text(&mut self, prompt: &str, slot: &mut dyn DisplaySlot) -> Submission {
        let submission = self.text.submit(prompt, slot).await;
        self.tally(&submission);
        submission
    }

    /// Forgets the text conversation.
    pub fn clear_chat(&mut self) {
        self.text.clear();
    }

    /// Replaces the image under discussion, emptying the image history.
    pub fn upload_image(&mut self, image: ImageQuery) {
        self.image.upload_image(image);
    }

    /// Drops the image under discussion, emptying the image history.
    pub fn remove_image(&mut self) {
        self.image.remove_image();
    }

    /// Asks a question about the current image.
    pub async fn submit_image_prompt(
        &mut self,
        prompt: &str,
        slot: &mut dyn DisplaySlot,
    ) -> Submission {
        let submission = self.image.submit(prompt, slot).await;
        self.tally(&submission);
        submission
    }

    /// Returns stats about the session.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            id: self.id.clone(),
            text_model: self.config.text_model.clone(),
            vision_model: self.config.vision_model.clone(),
            text_turns: self.text.history().len(),
            image_turns: self.image.history().len(),
            requests: self.requests,
            blocked: self.blocked,
            failed: self.failed,
            image_loaded: self.image.image().is_some(),
        }
    }

    /// Tears the session down, returning its final stats.
    pub fn end(self) -> SessionStats {
        let stats = self.stats();
        SESSIONS_ENDED.click();
        info!(
            session = %stats.id,
            requests = stats.requests,
            blocked = stats.blocked,
            failed = stats.failed,
            "session ended"
        );
        stats
    }

    fn tally(&mut self, submission: &Submission) {
        if let Submission::Answered(TurnOutcome { status, .. }) = submission {
            self.requests += 1;
            match status {
                RevealStatus::Completed => {}
                RevealStatus::Blocked => self.blocked += 1,
                RevealStatus::Failed => self.failed += 1,
            }
        }
    }
}
