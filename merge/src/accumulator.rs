//! Streaming sum, count and average over scalars or same-shaped images.

use imaginarium::{Channel, Image, ImageDesc};
use num_traits::{Float, NumCast};
use strum_macros::Display;

use crate::error::{Error, Result};

/// A value fed to an [`Accumulator`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Image(Image),
}

/// Element layout of a value, when it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueDesc {
    /// Bytes per element.
    pub element_width: u8,
    pub is_array: bool,
}

impl Value {
    /// Bare numbers carry no element type and are summed with plain f64 addition.
    pub fn descriptor(&self) -> Option<ValueDesc> {
        match self {
            Value::Scalar(_) => None,
            Value::Image(image) => Some(ValueDesc {
                element_width: image.desc().color_format.element_width(),
                is_array: true,
            }),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Value::Scalar(_) => None,
            Value::Image(image) => Some(image),
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Scalar(_) => "scalar".to_string(),
            Value::Image(image) => image.desc().to_string(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(value as f64)
    }
}

impl From<Image> for Value {
    fn from(image: Image) -> Self {
        Value::Image(image)
    }
}

/// Floating point type used for a running image sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Precision {
    F32,
    F64,
}

impl Precision {
    /// Elements up to 4 bytes wide are summed in f32, wider ones in f64.
    pub fn promote(element_width: u8) -> Self {
        if element_width <= 4 {
            Precision::F32
        } else {
            Precision::F64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Sum {
    Zero,
    Scalar(f64),
    F32 { desc: ImageDesc, data: Vec<f32> },
    F64 { desc: ImageDesc, data: Vec<f64> },
}

impl Sum {
    fn zeroed_like(value: &Value) -> Sum {
        let (Some(descriptor), Value::Image(image)) = (value.descriptor(), value) else {
            return Sum::Scalar(0.0);
        };

        let shape = *image.desc();
        let len = shape.sample_count();
        match Precision::promote(descriptor.element_width) {
            Precision::F32 => Sum::F32 {
                desc: with_channel::<f32>(shape),
                data: vec![0.0; len],
            },
            Precision::F64 => Sum::F64 {
                desc: with_channel::<f64>(shape),
                data: vec![0.0; len],
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            Sum::Zero | Sum::Scalar(_) => "scalar".to_string(),
            Sum::F32 { desc, .. } | Sum::F64 { desc, .. } => desc.to_string(),
        }
    }
}

/// Running sum and count of successively supplied values.
///
/// The first value decides the kind of the sum: an image allocates a zeroed buffer of
/// the same shape in promoted precision, a scalar keeps a plain f64. Later values must
/// have the same kind and shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    sum: Sum,
    count: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            sum: Sum::Zero,
            count: 0,
        }
    }

    /// Adds `value` to the running sum and returns the new count.
    ///
    /// A value whose kind or shape differs from the accumulated one is rejected and
    /// leaves the accumulator untouched.
    pub fn accumulate(&mut self, value: &Value) -> Result<usize> {
        if self.count == 0 {
            self.sum = Sum::zeroed_like(value);
        }

        match (&mut self.sum, value) {
            (Sum::Scalar(sum), Value::Scalar(v)) => *sum += v,
            (Sum::F32 { desc, data }, Value::Image(image)) => {
                check_shape(desc, image)?;
                add_samples(data, image);
            }
            (Sum::F64 { desc, data }, Value::Image(image)) => {
                check_shape(desc, image)?;
                add_samples(data, image);
            }
            (sum, value) => {
                return Err(Error::ShapeMismatch {
                    expected: sum.describe(),
                    actual: value.describe(),
                });
            }
        }

        self.count += 1;
        Ok(self.count)
    }

    pub fn reset(&mut self) {
        self.sum = Sum::Zero;
        self.count = 0;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Precision of the image sum, `None` while empty or summing scalars.
    pub fn precision(&self) -> Option<Precision> {
        match self.sum {
            Sum::Zero | Sum::Scalar(_) => None,
            Sum::F32 { .. } => Some(Precision::F32),
            Sum::F64 { .. } => Some(Precision::F64),
        }
    }

    /// The accumulated sum, scalar zero when nothing was accumulated.
    pub fn sum(&self) -> Value {
        match &self.sum {
            Sum::Zero => Value::Scalar(0.0),
            Sum::Scalar(sum) => Value::Scalar(*sum),
            Sum::F32 { desc, data } => Value::Image(to_image(desc, data)),
            Sum::F64 { desc, data } => Value::Image(to_image(desc, data)),
        }
    }

    /// `sum / count`, scalar zero when nothing was accumulated.
    pub fn average(&self) -> Value {
        if self.count == 0 {
            return Value::Scalar(0.0);
        }

        match &self.sum {
            Sum::Zero => Value::Scalar(0.0),
            Sum::Scalar(sum) => Value::Scalar(*sum / self.count as f64),
            Sum::F32 { desc, data } => Value::Image(to_image(desc, &divided(data, self.count))),
            Sum::F64 { desc, data } => Value::Image(to_image(desc, &divided(data, self.count))),
        }
    }
}

fn with_channel<T: Channel>(shape: ImageDesc) -> ImageDesc {
    ImageDesc::new(
        shape.width,
        shape.height,
        shape.color_format.with_channel::<T>(),
    )
}

fn check_shape(desc: &ImageDesc, image: &Image) -> Result<()> {
    if !desc.same_shape(image.desc()) {
        return Err(Error::shape_mismatch(desc, image.desc()));
    }
    Ok(())
}

fn add_samples<T: Float>(sum: &mut [T], image: &Image) {
    for (acc, v) in sum.iter_mut().zip(image.samples::<T>()) {
        *acc = *acc + v;
    }
}

fn divided<T: Float>(data: &[T], count: usize) -> Vec<T> {
    let count = <T as NumCast>::from(count).unwrap_or_else(T::one);
    data.iter().map(|&v| v / count).collect()
}

fn to_image<T: Channel>(desc: &ImageDesc, data: &[T]) -> Image {
    Image::from_channels(
        desc.width,
        desc.height,
        desc.color_format.channel_count,
        data,
    )
    .expect("sum buffer always matches its descriptor")
}
