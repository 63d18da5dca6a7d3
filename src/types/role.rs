use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The author of a turn in a conversation.
///
/// The chat collaborator labels its own output `model`; the chat surface labels
/// it `assistant`. [`Role::display`] performs that translation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Text typed by the person using the front-end.
    User,

    /// Output as labelled by the chat collaborator's transcript.
    Model,

    /// Output as labelled by the chat surface.
    Assistant,
}

impl Role {
    /// Returns the role under which a turn is shown.
    ///
    /// `Model` becomes `Assistant`; every other role passes through unchanged.
    pub fn display(self) -> Role {
        match self {
            Role::Model => Role::Assistant,
            other => other,
        }
    }

    /// Returns true for output produced by a completion collaborator.
    pub fn is_reply(self) -> bool {
        matches!(self, Role::Model | Role::Assistant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Error returned when parsing an invalid role string.
#[derive(Debug)]
pub struct RoleParseError {
    /// The invalid string value that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown role: {}", self.invalid_value)
    }
}

impl std::error::Error for RoleParseError {}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            "assistant" => Ok(Role::Assistant),
            _ => Err(RoleParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_displays_as_assistant() {
        assert_eq!(Role::Model.display(), Role::Assistant);
        assert_eq!(Role::Assistant.display(), Role::Assistant);
        assert_eq!(Role::User.display(), Role::User);
    }

    #[test]
    fn serialization() {
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), r#""model""#);
        let role: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn parse() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        let err = "system".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown role: system");
    }
}
