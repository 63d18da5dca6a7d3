//! The single-image question flow.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chat::config::ChatConfig;
use crate::chat::{Submission, TurnOutcome};
use crate::client_logger::{ExchangeLogger, Flow};
use crate::collaborator::{VisionCollaborator, failed_stream};
use crate::history::{History, ImageHistory};
use crate::input::{Gate, admit_image};
use crate::observability::{GATE_EMPTY, IMAGE_MISSING, IMAGE_TURNS, IMAGE_UPLOADS};
use crate::render::DisplaySlot;
use crate::reveal::RevealRenderer;
use crate::types::{ImageQuery, Role, SafetySettings, Turn};

/// Questions about the currently uploaded image.
///
/// Each question is sent on its own, without earlier turns as context. The
/// history belongs to the image: replacing or removing the image empties it.
pub struct ImageChat<V: VisionCollaborator> {
    collaborator: V,
    history: ImageHistory,
    image: Option<ImageQuery>,
    renderer: RevealRenderer,
    safety: SafetySettings,
    display_width: u32,
    logger: Option<Arc<dyn ExchangeLogger>>,
}

impl<V: VisionCollaborator> ImageChat<V> {
    /// Creates an image chat answered by `collaborator`, with no image loaded.
    pub fn new(collaborator: V, config: &ChatConfig) -> Self {
        Self {
            collaborator,
            history: ImageHistory::new(),
            image: None,
            renderer: config.renderer(Flow::Image),
            safety: config.safety.clone(),
            display_width: config.display_width,
            logger: None,
        }
    }

    /// Replaces the reveal renderer.
    pub fn with_renderer(mut self, renderer: RevealRenderer) -> Self {
        self.renderer = renderer.for_flow(Flow::Image);
        if let Some(logger) = &self.logger {
            self.renderer = self.renderer.with_logger(Flow::Image, Arc::clone(logger));
        }
        self
    }

    /// Reports chunks, turns, and failures to `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.renderer = self.renderer.with_logger(Flow::Image, Arc::clone(&logger));
        self.logger = Some(logger);
        self
    }

    /// The image-flow history.
    pub fn history(&self) -> &ImageHistory {
        &self.history
    }

    /// The vision collaborator.
    pub fn collaborator(&self) -> &V {
        &self.collaborator
    }

    /// The loaded image, if any.
    pub fn image(&self) -> Option<&ImageQuery> {
        self.image.as_ref()
    }

    /// Loads `image`, replacing any previous one, and empties the history.
    pub fn upload_image(&mut self, image: ImageQuery) {
        let image = image.with_display_width(self.display_width);
        let size = image.display_size();
        info!(
            flow = %Flow::Image,
            media_type = image.media_type().mime_type(),
            bytes = image.bytes().len(),
            width = size.width,
            height = size.height,
            "image uploaded"
        );
        if !image.is_opaque() {
            warn!(
                flow = %Flow::Image,
                media_type = image.media_type().mime_type(),
                "image payload may carry transparency; expected a flattened JPEG"
            );
        }
        self.image = Some(image);
        IMAGE_UPLOADS.click();
        self.on_image_replaced();
    }

    /// Unloads the image and empties the history.
    pub fn remove_image(&mut self) {
        if self.image.take().is_some() {
            info!(flow = %Flow::Image, "image removed");
        }
        self.on_image_replaced();
    }

    /// Runs whenever the image changes; the old conversation no longer applies.
    pub fn on_image_replaced(&mut self) {
        self.history.clear();
        debug!(flow = %Flow::Image, "history cleared");
    }

    /// Asks one question about the loaded image and reveals the reply into `slot`.
    ///
    /// An empty prompt is ignored. Without an image the warning is shown in
    /// the slot and nothing is recorded. Otherwise the prompt and the final
    /// reply text, error text included, are appended to the history.
    pub async fn submit(&mut self, raw: &str, slot: &mut dyn DisplaySlot) -> Submission {
        let warning = &self.renderer.messages().missing_image;
        let (prompt, image) = match admit_image(raw, self.image.as_ref(), warning) {
            Ok(admitted) => admitted,
            Err(Gate::Empty) => {
                GATE_EMPTY.click();
                debug!(flow = %Flow::Image, "empty prompt not dispatched");
                return Submission::Ignored;
            }
            Err(Gate::MissingImage(warning)) => {
                IMAGE_MISSING.click();
                debug!(flow = %Flow::Image, "prompt arrived before any image");
                slot.warn(&warning);
                return Submission::Warned(warning);
            }
        };

        debug!(flow = %Flow::Image, chars = prompt.chars().count(), "dispatching prompt");
        let stream = match self
            .collaborator
            .generate_content(&prompt, image, &self.safety)
            .await
        {
            Ok(stream) => stream,
            Err(err) => failed_stream(err),
        };
        let reveal = self.renderer.reveal(stream, slot).await;
        IMAGE_TURNS.click();

        if let Some(logger) = &self.logger
            && let Some(err) = &reveal.error
        {
            logger.log_failure(Flow::Image, err);
        }
        self.history.append(Role::User, &prompt);
        self.history.append(Role::Assistant, &reveal.text);
        if let Some(logger) = &self.logger {
            for turn in self.history.turns().iter().rev().take(2).rev() {
                logger.log_turn(Flow::Image, turn);
            }
        }
        Submission::Answered(TurnOutcome {
            reply: Turn::assistant(reveal.text),
            status: reveal.status,
            updates: reveal.updates,
        })
    }
}
