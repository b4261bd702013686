//! Rendering module
//!
//! Pure: toy state in, draw commands out.

pub mod color;
pub mod draw;
pub mod pixels;

pub use color::{Color, Rgba8, palette};
pub use draw::{DrawCommand, DrawList};
pub use pixels::PixelBuffer;
