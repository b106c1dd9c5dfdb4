//! 8-bit indexed image buffers with clipped blits and an RLE sprite painter.

pub mod clip;
pub mod error;
pub mod image_buffer;
pub mod rle;
pub mod table;

pub use clip::{ClipRect, Clipped};
pub use error::{BufferError, RleError};
pub use image_buffer::{ImageBuffer8, Layout};
pub use table::{ColorTable, RemapTable, XformTable};
