use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of the display copy shown next to the conversation.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 128;

/// Supported image media types
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,

    #[serde(rename = "image/png")]
    Png,

    #[serde(rename = "image/gif")]
    Gif,

    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageMediaType {
    /// Guess the media type from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMediaType::Jpeg),
            "png" => Some(ImageMediaType::Png),
            "gif" => Some(ImageMediaType::Gif),
            "webp" => Some(ImageMediaType::Webp),
            _ => None,
        }
    }

    /// The MIME string sent alongside the payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Gif => "image/gif",
            ImageMediaType::Webp => "image/webp",
        }
    }

    /// True for encodings without an alpha channel.
    pub fn is_opaque(self) -> bool {
        matches!(self, ImageMediaType::Jpeg)
    }
}

/// Pixel dimensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    /// Scale `width x height` to `target_width`, preserving the aspect ratio.
    ///
    /// The height is truncated, and never drops below one pixel.
    pub fn scaled_to_width(width: u32, height: u32, target_width: u32) -> Self {
        let ratio = f64::from(width) / f64::from(target_width);
        let scaled = (f64::from(height) / ratio) as u32;
        Self {
            width: target_width,
            height: scaled.max(1),
        }
    }
}

/// The single active image context of the image flow.
///
/// Holds the normalized payload handed to the vision collaborator together
/// with the source dimensions and the size of the resized display copy.
/// Decoding and re-encoding pixels is the host's job; the host hands over the
/// bytes it wants sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    media_type: ImageMediaType,
    data: Vec<u8>,
    size: DisplaySize,
    display: DisplaySize,
}

impl ImageQuery {
    /// Create a new image context from a normalized payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty payload or a zero dimension.
    pub fn new(media_type: ImageMediaType, data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::validation("image payload is empty", Some("data".to_string())));
        }
        if width == 0 || height == 0 {
            return Err(Error::validation(
                format!("image dimensions must be non-zero, got {width}x{height}"),
                Some("dimensions".to_string()),
            ));
        }
        let size = DisplaySize { width, height };
        Ok(Self {
            media_type,
            data,
            size,
            display: DisplaySize::scaled_to_width(width, height, DEFAULT_DISPLAY_WIDTH),
        })
    }

    /// Create an image context from a base64-encoded payload.
    ///
    /// # Errors
    ///
    /// Returns an encoding error for invalid base64, otherwise as [`ImageQuery::new`].
    pub fn from_base64(
        media_type: ImageMediaType,
        data: &str,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;
        Self::new(media_type, bytes, width, height)
    }

    /// Recompute the display copy for a different display width.
    pub fn with_display_width(mut self, width: u32) -> Self {
        self.display = DisplaySize::scaled_to_width(self.size.width, self.size.height, width);
        self
    }

    /// The payload's media type.
    pub fn media_type(&self) -> ImageMediaType {
        self.media_type
    }

    /// The raw payload.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// The payload encoded as standard base64, as sent inline to the collaborator.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Source dimensions.
    pub fn size(&self) -> DisplaySize {
        self.size
    }

    /// Dimensions of the resized display copy.
    pub fn display_size(&self) -> DisplaySize {
        self.display
    }

    /// True when the payload is already in a non-transparent encoding.
    pub fn is_opaque(&self) -> bool {
        self.media_type.is_opaque()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_copy_keeps_aspect_ratio() {
        let image = ImageQuery::new(ImageMediaType::Jpeg, vec![0xff, 0xd8], 1024, 768).unwrap();
        assert_eq!(image.display_size(), DisplaySize { width: 128, height: 96 });

        let image = image.with_display_width(256);
        assert_eq!(image.display_size(), DisplaySize { width: 256, height: 192 });
        assert_eq!(image.size(), DisplaySize { width: 1024, height: 768 });
    }

    #[test]
    fn very_wide_images_keep_one_row() {
        let size = DisplaySize::scaled_to_width(10_000, 3, 128);
        assert_eq!(size, DisplaySize { width: 128, height: 1 });
    }

    #[test]
    fn rejects_empty_payload() {
        let err = ImageQuery::new(ImageMediaType::Png, Vec::new(), 10, 10).unwrap_err();
        assert!(err.is_validation());
        let err = ImageQuery::new(ImageMediaType::Png, vec![1], 0, 10).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn base64_payload() {
        let image =
            ImageQuery::from_base64(ImageMediaType::Jpeg, "SGVsbG8gV29ybGQ=", 640, 480).unwrap();
        assert_eq!(image.bytes(), b"Hello World");
        assert_eq!(image.to_base64(), "SGVsbG8gV29ybGQ=");
        assert!(image.is_opaque());

        let err = ImageQuery::from_base64(ImageMediaType::Jpeg, "not base64!", 1, 1).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn media_types() {
        assert_eq!(ImageMediaType::from_extension("JPG"), Some(ImageMediaType::Jpeg));
        assert_eq!(ImageMediaType::from_extension("bmp"), None);
        assert_eq!(ImageMediaType::Png.mime_type(), "image/png");
        assert!(!ImageMediaType::Png.is_opaque());
        let json = serde_json::to_string(&ImageMediaType::Webp).unwrap();
        assert_eq!(json, r#""image/webp""#);
    }
}
