//! Configuration types for the chat flows.
//!
//! [`ChatConfig`] holds every tunable of a session: the models, the safety
//! configuration sent with each request, the reveal cadence, and the
//! user-visible texts. It is built in code with the `with_*` methods or
//! loaded from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client_logger::Flow;
use crate::error::{Error, Result};
use crate::reveal::{Cadence, ErrorMessages, RevealRenderer};
use crate::types::{DEFAULT_DISPLAY_WIDTH, KnownModel, Model, SafetySettings};

/// Default placeholder shown while waiting for the first chunk.
const DEFAULT_LOADING_TEXT: &str = "Thinking...";

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// The model answering the text chat.
    pub text_model: Model,

    /// The model answering image questions.
    pub vision_model: Model,

    /// Safety configuration supplied identically to every request.
    pub safety: SafetySettings,

    /// Pacing of the streamed reveal.
    pub cadence: Cadence,

    /// Placeholder shown while waiting for the first chunk.
    pub loading_text: String,

    /// Texts shown when a turn fails or is rejected.
    pub messages: ErrorMessages,

    /// Width of the display copy of an uploaded image.
    pub display_width: u32,

    /// Seed for the reveal cadence; `None` seeds from the operating system.
    pub pacing_seed: Option<u64>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Text model: gemini-2.5-flash
    /// - Vision model: gemini-pro-vision
    /// - Safety: every category at BLOCK_NONE
    /// - Cadence: batches of 5 to 10 characters, 50ms apart, `_` cursor
    /// - Display width: 128
    pub fn new() -> Self {
        Self {
            text_model: Model::Known(KnownModel::Gemini25Flash),
            vision_model: Model::Known(KnownModel::GeminiProVision),
            safety: SafetySettings::default(),
            cadence: Cadence::default(),
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            messages: ErrorMessages::default(),
            display_width: DEFAULT_DISPLAY_WIDTH,
            pacing_seed: None,
        }
    }

    /// Parses a configuration from YAML; omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the result fails [`ChatConfig::validate`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or as [`ChatConfig::from_yaml_str`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::io(format!("failed to read config {}", path.display()), err)
        })?;
        Self::from_yaml_str(&content)
    }

    /// Serializes the configuration to YAML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unusable cadence or a zero display width.
    pub fn validate(&self) -> Result<()> {
        self.cadence.validate()?;
        if self.display_width == 0 {
            return Err(Error::validation(
                "display_width must be at least 1",
                Some("display_width".to_string()),
            ));
        }
        Ok(())
    }

    /// Builds the reveal renderer for one flow.
    pub fn renderer(&self, flow: Flow) -> RevealRenderer {
        let renderer = match self.pacing_seed {
            Some(seed) => RevealRenderer::seeded(self.cadence.clone(), self.messages.clone(), seed),
            None => RevealRenderer::new(self.cadence.clone(), self.messages.clone()),
        };
        renderer
            .with_loading_text(self.loading_text.clone())
            .for_flow(flow)
    }

    /// Sets the text model.
    pub fn with_text_model(mut self, model: Model) -> Self {
        self.text_model = model;
        self
    }

    /// Sets the vision model.
    pub fn with_vision_model(mut self, model: Model) -> Self {
        self.vision_model = model;
        self
    }

    /// Sets the safety configuration.
    pub fn with_safety(mut self, safety: SafetySettings) -> Self {
        self.safety = safety;
        self
    }

    /// Sets the reveal cadence.
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Sets the loading placeholder.
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Sets the failure texts.
    pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Sets the display width of uploaded images.
    pub fn with_display_width(mut self, width: u32) -> Self {
        self.display_width = width;
        self
    }

    /// Seeds the reveal cadence.
    pub fn with_pacing_seed(mut self, seed: Option<u64>) -> Self {
        self.pacing_seed = seed;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HarmBlockThreshold, HarmCategory};
    use std::time::Duration;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.text_model, Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(config.vision_model, Model::Known(KnownModel::GeminiProVision));
        assert_eq!(config.safety, SafetySettings::default());
        assert_eq!(config.cadence.min_batch, 5);
        assert_eq!(config.cadence.max_batch, 10);
        assert_eq!(config.cadence.delay(), Duration::from_millis(50));
        assert_eq!(config.cadence.cursor, "_");
        assert_eq!(config.loading_text, "Thinking...");
        assert_eq!(config.messages.failure, "Error! Please try again!");
        assert_eq!(config.messages.missing_image, "Please upload an image first");
        assert!(!config.messages.expose_detail);
        assert_eq!(config.display_width, 128);
        assert!(config.pacing_seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_text_model(Model::Known(KnownModel::Gemini25Pro))
            .with_vision_model(Model::Custom("vision-next".to_string()))
            .with_safety(SafetySettings::uniform(HarmBlockThreshold::BlockOnlyHigh))
            .with_cadence(Cadence::default().with_batch(2, 4).with_cursor("▌"))
            .with_loading_text("...")
            .with_display_width(256)
            .with_pacing_seed(Some(9));

        assert_eq!(config.text_model, Model::Known(KnownModel::Gemini25Pro));
        assert_eq!(config.vision_model, Model::Custom("vision-next".to_string()));
        assert_eq!(
            config.safety.threshold_for(HarmCategory::Harassment),
            Some(HarmBlockThreshold::BlockOnlyHigh)
        );
        assert_eq!(config.cadence.max_batch, 4);
        assert_eq!(config.cadence.cursor, "▌");
        assert_eq!(config.loading_text, "...");
        assert_eq!(config.display_width, 256);
        assert_eq!(config.pacing_seed, Some(9));
    }

    #[test]
    fn yaml_fills_defaults() {
        let yaml = r#"
text_model: gemini-1.5-pro
cadence:
  delay_ms: 0
messages:
  failure: "Something went wrong."
pacing_seed: 7
"#;
        let config = ChatConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.text_model, Model::Known(KnownModel::Gemini15Pro));
        assert_eq!(config.vision_model, Model::Known(KnownModel::GeminiProVision));
        assert_eq!(config.cadence.delay_ms, 0);
        assert_eq!(config.cadence.min_batch, 5);
        assert_eq!(config.messages.failure, "Something went wrong.");
        assert_eq!(config.messages.missing_image, "Please upload an image first");
        assert_eq!(config.pacing_seed, Some(7));
    }

    #[test]
    fn yaml_round_trip() {
        let config = ChatConfig::new().with_pacing_seed(Some(1));
        let yaml = config.to_yaml().unwrap();
        assert_eq!(ChatConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn invalid_yaml_config_is_rejected() {
        let err = ChatConfig::from_yaml_str("cadence:\n  min_batch: 12\n").unwrap_err();
        assert!(err.is_validation());

        let err = ChatConfig::from_yaml_str("display_width: 0\n").unwrap_err();
        assert!(err.is_validation());

        let err = ChatConfig::from_yaml_str("cadence: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ChatConfig::from_file("/nonexistent/mitra.yaml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn seeded_renderers_agree() {
        let config = ChatConfig::new().with_pacing_seed(Some(3));
        let mut a = config.renderer(Flow::Text);
        let mut b = config.renderer(Flow::Image);
        let xs: Vec<usize> = (0..32).map(|_| a.next_threshold()).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.next_threshold()).collect();
        assert_eq!(xs, ys);
    }
}
