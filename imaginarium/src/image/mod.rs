mod io;
mod tiff;


use std::path::Path;

use num_traits::{Float, NumCast};

use crate::common::{Channel, ChannelCount, ChannelSize, ChannelType, ColorFormat, Error, Result};

/// Supported image file extensions for reading and writing.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif"];

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: ColorFormat,
}

/// Tightly packed pixel data. Multi-byte samples are stored in native byte order.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

impl Image {
    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Returns the image bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn take_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        desc.color_format.validate()?;

        let bytes = vec![0; desc.size_in_bytes()];

        Ok(Image { desc, bytes })
    }

    pub fn new_with_data(desc: ImageDesc, bytes: Vec<u8>) -> Result<Image> {
        desc.color_format.validate()?;

        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidColorFormat(format!(
                "bytes length {} does not match expected size {}",
                bytes.len(),
                desc.size_in_bytes()
            )));
        }

        Ok(Image { desc, bytes })
    }

    /// Builds an image from interleaved samples of a primitive channel type.
    pub fn from_channels<T: Channel>(
        width: u32,
        height: u32,
        channel_count: ChannelCount,
        samples: &[T],
    ) -> Result<Image> {
        let color_format = ColorFormat::from((channel_count, T::SIZE, T::TYPE));
        let desc = ImageDesc::new(width, height, color_format);

        if samples.len() != desc.sample_count() {
            return Err(Error::InvalidColorFormat(format!(
                "sample count {} does not match {}",
                samples.len(),
                desc
            )));
        }

        Image::new_with_data(desc, bytemuck::cast_slice(samples).to_vec())
    }

    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Image> {
        let extension = extension_of(filename.as_ref())?;

        let image = match extension.as_str() {
            "png" | "jpeg" | "jpg" => io::load_png_jpeg(filename)?,
            "tiff" | "tif" => io::load_tiff(filename)?,

            _ => return Err(Error::InvalidExtension(extension)),
        };

        Ok(image)
    }

    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let extension = extension_of(filename.as_ref())?;

        match extension.as_str() {
            "png" => io::save_png(self, filename)?,
            "jpeg" | "jpg" => io::save_jpg(self, filename)?,
            "tiff" | "tif" => tiff::save_tiff(self, filename)?,

            _ => return Err(Error::InvalidExtension(extension)),
        };

        Ok(())
    }

    /// Returns every sample converted to the floating point type `T`.
    pub fn samples<T: Float>(&self) -> Vec<T> {
        let format = self.desc.color_format;
        match (format.channel_size, format.channel_type) {
            (ChannelSize::_8bit, _) => convert_samples::<u8, T>(&self.bytes),
            (ChannelSize::_16bit, _) => convert_samples::<u16, T>(&self.bytes),
            (ChannelSize::_32bit, ChannelType::UInt) => convert_samples::<u32, T>(&self.bytes),
            (ChannelSize::_32bit, ChannelType::Float) => convert_samples::<f32, T>(&self.bytes),
            (ChannelSize::_64bit, ChannelType::UInt) => convert_samples::<u64, T>(&self.bytes),
            (ChannelSize::_64bit, ChannelType::Float) => convert_samples::<f64, T>(&self.bytes),
        }
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.desc.color_format.byte_count()
    }
}

fn convert_samples<S: Channel, T: Float>(bytes: &[u8]) -> Vec<T> {
    let values: Vec<S> = bytemuck::pod_collect_to_vec(bytes);
    values
        .into_iter()
        .map(|v| <T as NumCast>::from(v).unwrap_or_else(T::nan))
        .collect()
}

fn extension_of(filename: &Path) -> Result<String> {
    Ok(filename
        .extension()
        .and_then(|os_str| os_str.to_str())
        .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))?
        .to_ascii_lowercase())
}

impl ImageDesc {
    pub fn new(width: u32, height: u32, color_format: ColorFormat) -> Self {
        Self {
            width,
            height,
            color_format,
        }
    }

    /// Number of samples, counting every channel of every pixel.
    pub fn sample_count(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.color_format.channel_count.channel_count() as usize
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.row_bytes()
    }

    /// Returns the number of bytes per row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.color_format.byte_count() as usize
    }

    /// True when both descriptors describe the same pixel grid and channel layout,
    /// whatever the sample type.
    pub fn same_shape(&self, other: &ImageDesc) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.color_format.channel_count == other.color_format.channel_count
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color_format)
    }
}
