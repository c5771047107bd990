// Color formats
pub use crate::common::{ALL_FORMATS, Channel, ChannelCount, ChannelSize, ChannelType, ColorFormat};

// Error handling
pub use crate::common::{Error, Result};

// Image types
pub use crate::image::{Image, ImageDesc, SUPPORTED_EXTENSIONS};
