use std::fs::File;
use std::path::Path;

use bytemuck::Pod;
use tiff::encoder::colortype::*;
use tiff::encoder::{colortype, TiffEncoder, TiffValue};
use tiff::tags::{PhotometricInterpretation, SampleFormat};

use crate::prelude::*;

// The tiff crate has no built-in gray+alpha colortypes.
macro_rules! define_gray_alpha {
    ($name:ident, $inner:ty, $bits:expr, int) => {
        define_gray_alpha!(@type $name, $inner, $bits, SampleFormat::Uint);

        impl $name {
            fn predict(row: &[$inner], result: &mut Vec<$inner>) {
                let stride = row.len().min(2);
                result.extend_from_slice(&row[..stride]);
                result.extend(
                    row.iter()
                        .zip(&row[stride..])
                        .map(|(prev, current)| current.wrapping_sub(*prev)),
                );
            }
        }
    };
    ($name:ident, $inner:ty, $bits:expr, float) => {
        define_gray_alpha!(@type $name, $inner, $bits, SampleFormat::IEEEFP);

        impl $name {
            fn predict(row: &[$inner], result: &mut Vec<$inner>) {
                result.extend_from_slice(row);
            }
        }
    };
    (@type $name:ident, $inner:ty, $bits:expr, $format:expr) => {
        struct $name;

        impl ColorType for $name {
            type Inner = $inner;
            const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::BlackIsZero;
            const BITS_PER_SAMPLE: &'static [u16] = &[$bits; 2];
            const SAMPLE_FORMAT: &'static [SampleFormat] = &[$format; 2];

            fn horizontal_predict(row: &[Self::Inner], result: &mut Vec<Self::Inner>) {
                Self::predict(row, result)
            }
        }
    };
}

define_gray_alpha!(GrayAlpha8U, u8, 8, int);
define_gray_alpha!(GrayAlpha16U, u16, 16, int);
define_gray_alpha!(GrayAlpha32U, u32, 32, int);
define_gray_alpha!(GrayAlpha64U, u64, 64, int);
define_gray_alpha!(GrayAlpha32F, f32, 32, float);
define_gray_alpha!(GrayAlpha64F, f64, 64, float);

macro_rules! dispatch_tiff {
    ($image:expr, $filename:expr, {
        $( ($count:ident, $size:ident, $type:ident) => $color_type:ty ),+ $(,)?
    }) => {
        match (
            $image.desc().color_format.channel_count,
            $image.desc().color_format.channel_size,
            $image.desc().color_format.channel_type,
        ) {
            $(
                (ChannelCount::$count, ChannelSize::$size, ChannelType::$type) => {
                    save_tiff_internal::<$color_type, _>($image, $filename)?
                }
            )+
            (_, _, _) => {
                return Err(Error::UnsupportedFormat(format!(
                    "TIFF format: {}",
                    $image.desc().color_format
                )));
            }
        }
    };
}

pub(crate) fn save_tiff<P: AsRef<Path>>(image: &Image, filename: P) -> Result<()> {
    dispatch_tiff!(image, filename, {
        // Gray
        (L, _8bit, UInt) => Gray8,
        (L, _16bit, UInt) => Gray16,
        (L, _32bit, UInt) => Gray32,
        (L, _64bit, UInt) => Gray64,
        (L, _32bit, Float) => Gray32Float,
        (L, _64bit, Float) => Gray64Float,
        // Gray + alpha
        (LA, _8bit, UInt) => GrayAlpha8U,
        (LA, _16bit, UInt) => GrayAlpha16U,
        (LA, _32bit, UInt) => GrayAlpha32U,
        (LA, _64bit, UInt) => GrayAlpha64U,
        (LA, _32bit, Float) => GrayAlpha32F,
        (LA, _64bit, Float) => GrayAlpha64F,
        // RGB
        (Rgb, _8bit, UInt) => RGB8,
        (Rgb, _16bit, UInt) => RGB16,
        (Rgb, _32bit, UInt) => RGB32,
        (Rgb, _64bit, UInt) => RGB64,
        (Rgb, _32bit, Float) => RGB32Float,
        (Rgb, _64bit, Float) => RGB64Float,
        // RGBA
        (Rgba, _8bit, UInt) => RGBA8,
        (Rgba, _16bit, UInt) => RGBA16,
        (Rgba, _32bit, UInt) => RGBA32,
        (Rgba, _64bit, UInt) => RGBA64,
        (Rgba, _32bit, Float) => RGBA32Float,
        (Rgba, _64bit, Float) => RGBA64Float,
    });

    Ok(())
}

fn save_tiff_internal<CT, P: AsRef<Path>>(image: &Image, filename: P) -> Result<()>
where
    CT: colortype::ColorType,
    CT::Inner: Pod,
    [CT::Inner]: TiffValue,
{
    // The byte buffer carries no alignment guarantee for wider samples
    let buf: Vec<CT::Inner> = bytemuck::pod_collect_to_vec(image.bytes());

    let mut file = File::create(filename)?;
    let mut tiff = TiffEncoder::new(&mut file)?;
    let img = tiff.new_image::<CT>(image.desc().width, image.desc().height)?;

    img.write_data(&buf)?;

    Ok(())
}
