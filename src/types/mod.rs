// Public modules
pub mod image_query;
pub mod model;
pub mod role;
pub mod safety;
pub mod stream_chunk;
pub mod turn;

// Re-exports
pub use image_query::{DEFAULT_DISPLAY_WIDTH, DisplaySize, ImageMediaType, ImageQuery};
pub use model::{KnownModel, KnownModelParseError, Model};
pub use role::{Role, RoleParseError};
pub use safety::{HarmBlockThreshold, HarmCategory, SafetySetting, SafetySettings};
pub use stream_chunk::StreamChunk;
pub use turn::{DisplayEntry, Turn};
