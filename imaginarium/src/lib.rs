mod common;
mod image;

pub mod prelude;

pub use prelude::*;
