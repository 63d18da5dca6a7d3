use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A generative model identifier.
///
/// This can be a predefined model or a custom string for models this crate
/// does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or private models)
    Custom(String),
}

/// Known model versions
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KnownModel {
    /// Gemini 2.5 Flash, the default text model.
    Gemini25Flash,

    /// Gemini 2.5 Pro.
    Gemini25Pro,

    /// Gemini 1.5 Flash.
    Gemini15Flash,

    /// Gemini 1.5 Pro.
    Gemini15Pro,

    /// Gemini Pro Vision, the default image model.
    GeminiProVision,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::Gemini25Flash => write!(f, "gemini-2.5-flash"),
            KnownModel::Gemini25Pro => write!(f, "gemini-2.5-pro"),
            KnownModel::Gemini15Flash => write!(f, "gemini-1.5-flash"),
            KnownModel::Gemini15Pro => write!(f, "gemini-1.5-pro"),
            KnownModel::GeminiProVision => write!(f, "gemini-pro-vision"),
        }
    }
}

/// Error returned when a string names no known model.
#[derive(Debug)]
pub struct KnownModelParseError {
    /// The string that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for KnownModelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model: {}", self.invalid_value)
    }
}

impl std::error::Error for KnownModelParseError {}

impl FromStr for KnownModel {
    type Err = KnownModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini-2.5-flash" => Ok(KnownModel::Gemini25Flash),
            "gemini-2.5-pro" => Ok(KnownModel::Gemini25Pro),
            "gemini-1.5-flash" => Ok(KnownModel::Gemini15Flash),
            "gemini-1.5-pro" => Ok(KnownModel::Gemini15Pro),
            "gemini-pro-vision" => Ok(KnownModel::GeminiProVision),
            _ => Err(KnownModelParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(s.to_string()),
        })
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse::<Model>().unwrap_or_else(|never| match never {}))
    }
}
