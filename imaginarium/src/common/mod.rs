pub(crate) mod color_format;
pub(crate) mod error;

// Public API
pub use color_format::{ALL_FORMATS, Channel, ChannelCount, ChannelSize, ChannelType, ColorFormat};
pub use error::{Error, Result};
