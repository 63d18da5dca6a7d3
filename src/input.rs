//! Input gatekeeping.
//!
//! Checks the preconditions of each flow before anything is dispatched to a
//! collaborator, and normalizes the prompt for markdown display.

use std::fmt;

use crate::types::ImageQuery;

/// Why a submission was not dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// The prompt was empty or whitespace; nothing happens.
    Empty,
    /// An image question arrived with no image; the warning is shown.
    MissingImage(String),
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Empty => write!(f, "empty prompt"),
            Gate::MissingImage(warning) => write!(f, "{warning}"),
        }
    }
}

/// Turns every newline into a markdown soft line break.
pub fn normalize_prompt(raw: &str) -> String {
    raw.replace('\n', "  \n")
}

/// Admits a text-flow prompt.
///
/// # Errors
///
/// Returns [`Gate::Empty`] for an empty or whitespace-only prompt.
pub fn admit_text(raw: &str) -> Result<String, Gate> {
    if raw.trim().is_empty() {
        return Err(Gate::Empty);
    }
    Ok(normalize_prompt(raw))
}

/// Admits an image-flow prompt.
///
/// The prompt is checked before the image, so an empty submission never
/// raises the missing-image warning.
///
/// # Errors
///
/// Returns [`Gate::Empty`] for an empty prompt and [`Gate::MissingImage`]
/// carrying `warning` when no image has been uploaded.
pub fn admit_image<'a>(
    raw: &str,
    image: Option<&'a ImageQuery>,
    warning: &str,
) -> Result<(String, &'a ImageQuery), Gate> {
    let prompt = admit_text(raw)?;
    let image = image.ok_or_else(|| Gate::MissingImage(warning.to_string()))?;
    Ok((prompt, image))
}
