//! Colors for draw commands and pixel buffers

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Straight-alpha color, channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// HSL color; hue in degrees, saturation/lightness in [0, 1]
    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::rgba(r + m, g + m, b + m, alpha.clamp(0.0, 1.0))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Linear blend toward `other`
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// CSS `rgba()` string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        let c = self.to_rgba8();
        format!("rgba({},{},{},{:.3})", c.r, c.g, c.b, self.a.clamp(0.0, 1.0))
    }

    pub fn to_rgba8(&self) -> Rgba8 {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba8 {
            r: q(self.r),
            g: q(self.g),
            b: q(self.b),
            a: q(self.a),
        }
    }
}

/// Packed pixel, byte layout matches canvas `ImageData`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Palette shared by several toys
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0.04, 0.04, 0.07);
    pub const FADE: Color = Color::rgba(0.04, 0.04, 0.07, 0.25);
    pub const WALL: Color = Color::rgb(0.45, 0.45, 0.5);
    pub const SAND: Color = Color::rgb(0.9, 0.75, 0.4);
    pub const PLATFORM: Color = Color::rgb(0.3, 0.55, 0.8);
    pub const TARGET: Color = Color::rgb(1.0, 0.35, 0.3);
    pub const BALL: Color = Color::WHITE;
    pub const GRID_LINE: Color = Color::rgba(1.0, 1.0, 1.0, 0.08);
}
