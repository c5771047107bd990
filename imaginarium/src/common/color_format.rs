use bytemuck::Pod;
use num_traits::ToPrimitive;

use crate::common::error::{Error, Result};

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ChannelCount {
    #[default]
    L = 1,
    LA = 2,
    Rgb = 3,
    Rgba = 4,
}

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ChannelSize {
    #[default]
    _8bit = 1,
    _16bit = 2,
    _32bit = 4,
    _64bit = 8,
}

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ChannelType {
    #[default]
    UInt,
    Float,
}

#[derive(Clone, Copy, Debug, Hash, Default, PartialEq, Eq)]
pub struct ColorFormat {
    pub channel_count: ChannelCount,
    pub channel_size: ChannelSize,
    pub channel_type: ChannelType,
}

/// A primitive sample type that can back an image channel.
pub trait Channel: Pod + ToPrimitive {
    const SIZE: ChannelSize;
    const TYPE: ChannelType;
}

macro_rules! impl_channel {
    ($($ty:ty => ($size:ident, $kind:ident)),+ $(,)?) => {
        $(
            impl Channel for $ty {
                const SIZE: ChannelSize = ChannelSize::$size;
                const TYPE: ChannelType = ChannelType::$kind;
            }
        )+
    };
}

impl_channel!(
    u8 => (_8bit, UInt),
    u16 => (_16bit, UInt),
    u32 => (_32bit, UInt),
    u64 => (_64bit, UInt),
    f32 => (_32bit, Float),
    f64 => (_64bit, Float),
);

impl ChannelCount {
    pub fn channel_count(&self) -> u8 {
        *self as u8
    }
    pub fn byte_count(&self, channel_size: ChannelSize) -> u8 {
        self.channel_count() * channel_size.byte_count()
    }
    pub(crate) fn from_channel_count(count: u8) -> Result<ChannelCount> {
        match count {
            1 => Ok(ChannelCount::L),
            2 => Ok(ChannelCount::LA),
            3 => Ok(ChannelCount::Rgb),
            4 => Ok(ChannelCount::Rgba),
            _ => Err(Error::InvalidColorFormat(format!(
                "invalid channel count: {}",
                count
            ))),
        }
    }
}

impl ChannelSize {
    pub fn byte_count(&self) -> u8 {
        *self as u8
    }
    pub(crate) fn from_bit_count(bit_count: u8) -> Result<ChannelSize> {
        match bit_count {
            8 => Ok(ChannelSize::_8bit),
            16 => Ok(ChannelSize::_16bit),
            32 => Ok(ChannelSize::_32bit),
            64 => Ok(ChannelSize::_64bit),
            _ => Err(Error::InvalidColorFormat(format!(
                "invalid channel size: {} bits",
                bit_count
            ))),
        }
    }
}

impl ColorFormat {
    pub fn byte_count(&self) -> u8 {
        self.channel_count.byte_count(self.channel_size)
    }

    /// Size in bytes of a single channel sample.
    pub fn element_width(&self) -> u8 {
        self.channel_size.byte_count()
    }

    pub fn is_supported(&self) -> bool {
        ALL_FORMATS.contains(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_supported() {
            return Err(Error::InvalidColorFormat(format!(
                "unsupported color format: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Same channel layout, stored as samples of `T`.
    pub fn with_channel<T: Channel>(self) -> ColorFormat {
        ColorFormat {
            channel_count: self.channel_count,
            channel_size: T::SIZE,
            channel_type: T::TYPE,
        }
    }
}

impl From<(ChannelCount, ChannelSize, ChannelType)> for ColorFormat {
    fn from(value: (ChannelCount, ChannelSize, ChannelType)) -> Self {
        ColorFormat {
            channel_count: value.0,
            channel_size: value.1,
            channel_type: value.2,
        }
    }
}

macro_rules! define_color_formats {
    ($($name:ident => ($count:ident, $size:ident, $kind:ident)),+ $(,)?) => {
        impl ColorFormat {
            $(
                pub const $name: ColorFormat = ColorFormat {
                    channel_count: ChannelCount::$count,
                    channel_size: ChannelSize::$size,
                    channel_type: ChannelType::$kind,
                };
            )+
        }

        /// All supported color formats.
        pub const ALL_FORMATS: &[ColorFormat] = &[$(ColorFormat::$name),+];
    };
}

define_color_formats!(
    L_U8 => (L, _8bit, UInt),
    L_U16 => (L, _16bit, UInt),
    L_U32 => (L, _32bit, UInt),
    L_U64 => (L, _64bit, UInt),
    L_F32 => (L, _32bit, Float),
    L_F64 => (L, _64bit, Float),
    //
    LA_U8 => (LA, _8bit, UInt),
    LA_U16 => (LA, _16bit, UInt),
    LA_U32 => (LA, _32bit, UInt),
    LA_U64 => (LA, _64bit, UInt),
    LA_F32 => (LA, _32bit, Float),
    LA_F64 => (LA, _64bit, Float),
    //
    RGB_U8 => (Rgb, _8bit, UInt),
    RGB_U16 => (Rgb, _16bit, UInt),
    RGB_U32 => (Rgb, _32bit, UInt),
    RGB_U64 => (Rgb, _64bit, UInt),
    RGB_F32 => (Rgb, _32bit, Float),
    RGB_F64 => (Rgb, _64bit, Float),
    //
    RGBA_U8 => (Rgba, _8bit, UInt),
    RGBA_U16 => (Rgba, _16bit, UInt),
    RGBA_U32 => (Rgba, _32bit, UInt),
    RGBA_U64 => (Rgba, _64bit, UInt),
    RGBA_F32 => (Rgba, _32bit, Float),
    RGBA_F64 => (Rgba, _64bit, Float),
);

impl std::fmt::Display for ChannelCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelCount::L => write!(f, "L"),
            ChannelCount::LA => write!(f, "LA"),
            ChannelCount::Rgb => write!(f, "RGB"),
            ChannelCount::Rgba => write!(f, "RGBA"),
        }
    }
}

impl std::fmt::Display for ChannelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.byte_count() as u32 * 8)
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelType::UInt => write!(f, "u"),
            ChannelType::Float => write!(f, "f"),
        }
    }
}

impl std::fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}{}",
            self.channel_count, self.channel_type, self.channel_size
        )
    }
}
