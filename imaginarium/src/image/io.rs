use std::fs::File;
use std::path::Path;

use tiff::decoder::DecodingResult;

use crate::prelude::*;

pub(crate) fn load_png_jpeg<P: AsRef<Path>>(filename: P) -> Result<Image> {
    let img = image_lib::open(filename)?;

    let (channel_count, channel_size, channel_type) = match img.color() {
        image_lib::ColorType::L8 => (ChannelCount::L, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::L16 => (ChannelCount::L, ChannelSize::_16bit, ChannelType::UInt),
        image_lib::ColorType::La8 => (ChannelCount::LA, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::La16 => (ChannelCount::LA, ChannelSize::_16bit, ChannelType::UInt),
        image_lib::ColorType::Rgb8 => (ChannelCount::Rgb, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::Rgb16 => (ChannelCount::Rgb, ChannelSize::_16bit, ChannelType::UInt),
        image_lib::ColorType::Rgba8 => (ChannelCount::Rgba, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::Rgba16 => {
            (ChannelCount::Rgba, ChannelSize::_16bit, ChannelType::UInt)
        }
        image_lib::ColorType::Rgb32F => {
            (ChannelCount::Rgb, ChannelSize::_32bit, ChannelType::Float)
        }
        image_lib::ColorType::Rgba32F => {
            (ChannelCount::Rgba, ChannelSize::_32bit, ChannelType::Float)
        }
        _ => return Err(Error::UnsupportedColorType(format!("{:?}", img.color()))),
    };

    let color_format = ColorFormat::from((channel_count, channel_size, channel_type));
    let desc = ImageDesc::new(img.width(), img.height(), color_format);

    Image::new_with_data(desc, img.into_bytes())
}

pub(crate) fn load_tiff<P: AsRef<Path>>(filename: P) -> Result<Image> {
    // Scientific detector frames can exceed the default decoder limits
    let limits = tiff::decoder::Limits::unlimited();
    let mut decoder = tiff::decoder::Decoder::new(File::open(filename)?)?.with_limits(limits);

    let (channel_bits, channel_count) = match decoder.colortype()? {
        tiff::ColorType::Gray(b) => (b, ChannelCount::L),
        tiff::ColorType::GrayA(b) => (b, ChannelCount::LA),
        tiff::ColorType::RGB(b) => (b, ChannelCount::Rgb),
        tiff::ColorType::RGBA(b) => (b, ChannelCount::Rgba),
        other => {
            return Err(Error::UnsupportedColorType(format!("{:?}", other)));
        }
    };

    let img = decoder.read_image()?;
    let (bytes, channel_type): (Vec<u8>, ChannelType) = match &img {
        DecodingResult::U8(buf) => (buf.clone(), ChannelType::UInt),
        DecodingResult::U16(buf) => (bytemuck::cast_slice(buf).to_vec(), ChannelType::UInt),
        DecodingResult::U32(buf) => (bytemuck::cast_slice(buf).to_vec(), ChannelType::UInt),
        DecodingResult::U64(buf) => (bytemuck::cast_slice(buf).to_vec(), ChannelType::UInt),
        DecodingResult::F32(buf) => (bytemuck::cast_slice(buf).to_vec(), ChannelType::Float),
        DecodingResult::F64(buf) => (bytemuck::cast_slice(buf).to_vec(), ChannelType::Float),
        _ => {
            return Err(Error::UnsupportedFormat(
                "TIFF sample format not supported: signed integer samples".to_string(),
            ));
        }
    };

    let (w, h) = decoder.dimensions()?;

    let channel_size = ChannelSize::from_bit_count(channel_bits)?;
    let color_format = ColorFormat::from((channel_count, channel_size, channel_type));
    let desc = ImageDesc::new(w, h, color_format);

    Image::new_with_data(desc, bytes)
}

pub(crate) fn save_jpg<P: AsRef<Path>>(image: &Image, filename: P) -> Result<()> {
    let format = image.desc().color_format;

    if format.channel_type != ChannelType::UInt || format.channel_size != ChannelSize::_8bit {
        return Err(Error::UnsupportedFormat(format!("JPEG color format: {}", format)));
    }

    let color_type = match format.channel_count {
        ChannelCount::L => image_lib::ColorType::L8,
        ChannelCount::Rgb => image_lib::ColorType::Rgb8,
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "JPEG color format: {}",
                format
            )));
        }
    };

    image_lib::save_buffer_with_format(
        filename,
        image.bytes(),
        image.desc().width,
        image.desc().height,
        color_type,
        image_lib::ImageFormat::Jpeg,
    )?;

    Ok(())
}

pub(crate) fn save_png<P: AsRef<Path>>(image: &Image, filename: P) -> Result<()> {
    let format = image.desc().color_format;

    if format.channel_type != ChannelType::UInt {
        return Err(Error::UnsupportedFormat(format!("PNG color format: {}", format)));
    }

    let color_type = match (format.channel_size, format.channel_count) {
        (ChannelSize::_8bit, ChannelCount::L) => image_lib::ColorType::L8,
        (ChannelSize::_8bit, ChannelCount::LA) => image_lib::ColorType::La8,
        (ChannelSize::_8bit, ChannelCount::Rgb) => image_lib::ColorType::Rgb8,
        (ChannelSize::_8bit, ChannelCount::Rgba) => image_lib::ColorType::Rgba8,
        (ChannelSize::_16bit, ChannelCount::L) => image_lib::ColorType::L16,
        (ChannelSize::_16bit, ChannelCount::LA) => image_lib::ColorType::La16,
        (ChannelSize::_16bit, ChannelCount::Rgb) => image_lib::ColorType::Rgb16,
        (ChannelSize::_16bit, ChannelCount::Rgba) => image_lib::ColorType::Rgba16,
        _ => {
            return Err(Error::UnsupportedFormat(format!("PNG color format: {}", format)));
        }
    };

    image_lib::save_buffer_with_format(
        filename,
        image.bytes(),
        image.desc().width,
        image.desc().height,
        color_type,
        image_lib::ImageFormat::Png,
    )?;

    Ok(())
}
