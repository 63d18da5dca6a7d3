use serde::{Deserialize, Serialize};
use std::fmt;

/// A content-policy category the collaborator filters on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    /// Harassment content.
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,

    /// Hate speech and content.
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,

    /// Sexually explicit content.
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,

    /// Dangerous content.
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

impl HarmCategory {
    /// Every category, in the order they are sent.
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];
}

impl fmt::Display for HarmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmCategory::Harassment => write!(f, "HARM_CATEGORY_HARASSMENT"),
            HarmCategory::HateSpeech => write!(f, "HARM_CATEGORY_HATE_SPEECH"),
            HarmCategory::SexuallyExplicit => write!(f, "HARM_CATEGORY_SEXUALLY_EXPLICIT"),
            HarmCategory::DangerousContent => write!(f, "HARM_CATEGORY_DANGEROUS_CONTENT"),
        }
    }
}

/// The probability level at and above which content is blocked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    /// Never block.
    BlockNone,

    /// Block only high-probability content.
    BlockOnlyHigh,

    /// Block medium- and high-probability content.
    BlockMediumAndAbove,

    /// Block low-, medium- and high-probability content.
    BlockLowAndAbove,
}

impl fmt::Display for HarmBlockThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmBlockThreshold::BlockNone => write!(f, "BLOCK_NONE"),
            HarmBlockThreshold::BlockOnlyHigh => write!(f, "BLOCK_ONLY_HIGH"),
            HarmBlockThreshold::BlockMediumAndAbove => write!(f, "BLOCK_MEDIUM_AND_ABOVE"),
            HarmBlockThreshold::BlockLowAndAbove => write!(f, "BLOCK_LOW_AND_ABOVE"),
        }
    }
}

/// One category-to-threshold entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SafetySetting {
    /// The category being configured.
    pub category: HarmCategory,
    /// The threshold applied to it.
    pub threshold: HarmBlockThreshold,
}

/// The fixed safety configuration supplied identically to every request.
///
/// Each category appears at most once. The default covers every
/// [`HarmCategory`] at [`HarmBlockThreshold::BlockNone`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafetySettings(Vec<SafetySetting>);

impl SafetySettings {
    /// Settings applying one threshold to every category.
    pub fn uniform(threshold: HarmBlockThreshold) -> Self {
        Self(
            HarmCategory::ALL
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold,
                })
                .collect(),
        )
    }

    /// Sets the threshold for a category, replacing any existing entry.
    pub fn with_threshold(mut self, category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        match self.0.iter_mut().find(|s| s.category == category) {
            Some(setting) => setting.threshold = threshold,
            None => self.0.push(SafetySetting {
                category,
                threshold,
            }),
        }
        self
    }

    /// Returns the threshold configured for a category, if any.
    pub fn threshold_for(&self, category: HarmCategory) -> Option<HarmBlockThreshold> {
        self.0
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.threshold)
    }

    /// Iterates the entries in the order they are sent.
    pub fn iter(&self) -> impl Iterator<Item = &SafetySetting> {
        self.0.iter()
    }

    /// Number of configured categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no category is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self::uniform(HarmBlockThreshold::BlockNone)
    }
}
