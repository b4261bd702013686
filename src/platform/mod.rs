//! Platform abstraction layer
//!
//! Handles the boilerplate every toy used to repeat:
//! - Surface sizing (CSS size × device pixel ratio)
//! - Pointer coordinates → canvas pixels
//! - Control values from DOM elements
//! - The frame-loop driver
//!
//! The browser backend lives in `web` (wasm32 only).

pub mod controls;
pub mod frame;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use controls::{ControlKind, ControlSpec, ControlValue};
pub use frame::FrameLoop;

use glam::Vec2;

use crate::sim::Bounds;

/// Backing-store size of a canvas laid out at `css` size on a `dpr` display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub css_width: f32,
    pub css_height: f32,
    pub dpr: f32,
}

impl SurfaceSize {
    pub fn from_css(css_width: f32, css_height: f32, dpr: f32) -> Self {
        Self {
            css_width: css_width.max(0.0),
            css_height: css_height.max(0.0),
            dpr: if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 },
        }
    }

    pub fn pixel_width(&self) -> u32 {
        (self.css_width * self.dpr).round() as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (self.css_height * self.dpr).round() as u32
    }

    /// Simulation bounds in canvas pixels
    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.pixel_width() as f32, self.pixel_height() as f32)
    }
}

/// A canvas's bounding client rectangle (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Map a client-space pointer position into canvas pixels.
///
/// `canvas_size` is the backing-store size; the ratio to the on-screen
/// rectangle folds in the device pixel ratio and any CSS scaling. A
/// collapsed rectangle maps everything to the origin.
pub fn client_to_canvas(client: Vec2, rect: &CanvasRect, canvas_size: Vec2) -> Vec2 {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = canvas_size / Vec2::new(rect.width, rect.height);
    (client - Vec2::new(rect.left, rect.top)) * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_scales_by_dpr() {
        let s = SurfaceSize::from_css(400.0, 300.0, 2.0);
        assert_eq!((s.pixel_width(), s.pixel_height()), (800, 600));
        assert_eq!(s.bounds().size(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_surface_size_bad_dpr() {
        let s = SurfaceSize::from_css(400.0, 300.0, 0.0);
        assert_eq!(s.pixel_width(), 400);
    }

    #[test]
    fn test_client_to_canvas_with_dpr() {
        let rect = CanvasRect {
            left: 10.0,
            top: 20.0,
            width: 400.0,
            height: 300.0,
        };
        let p = client_to_canvas(Vec2::new(110.0, 170.0), &rect, Vec2::new(800.0, 600.0));
        assert_eq!(p, Vec2::new(200.0, 300.0));
    }

    #[test]
    fn test_client_to_canvas_collapsed_rect() {
        let rect = CanvasRect {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };
        assert_eq!(client_to_canvas(Vec2::new(5.0, 5.0), &rect, Vec2::new(100.0, 100.0)), Vec2::ZERO);
    }
}
