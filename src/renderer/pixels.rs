//! CPU pixel buffers for grid toys
//!
//! One pixel per cell; the platform scales the image up to the canvas.

use super::color::Rgba8;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<Rgba8>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![Rgba8::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Rgba8) {
        self.data[y * self.width + x] = color;
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba8 {
        self.data[y * self.width + x]
    }

    /// Raw RGBA bytes, row-major, ready for `ImageData`
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_layout() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(1, 0, Rgba8::new(1, 2, 3, 4));
        assert_eq!(buf.as_bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(buf.get(1, 0), Rgba8::new(1, 2, 3, 4));
    }
}
