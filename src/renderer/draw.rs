//! Draw lists: the output of a toy's `draw`
//!
//! Toys never touch a canvas. They append commands here and the platform
//! replays them (2D canvas on the web, counted and logged when headless).

use glam::Vec2;

use super::color::Color;
use super::pixels::PixelBuffer;
use crate::sim::Bounds;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface (translucent colors leave trails)
    Clear(Color),
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
    },
    Rect {
        rect: Bounds,
        fill: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
    },
    /// Pixel buffer stretched over `dest`
    Image {
        dest: Bounds,
        pixels: PixelBuffer,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all commands but keep the allocation for the next frame
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self, color: Color) {
        self.push(DrawCommand::Clear(color));
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, fill: Color) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            fill,
        });
    }

    pub fn rect(&mut self, rect: Bounds, fill: Color) {
        self.push(DrawCommand::Rect { rect, fill });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn polyline(&mut self, points: Vec<Vec2>, width: f32, color: Color) {
        if points.len() >= 2 {
            self.push(DrawCommand::Polyline {
                points,
                width,
                color,
            });
        }
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Color) {
        self.push(DrawCommand::Text {
            pos,
            text: text.into(),
            size,
            color,
        });
    }

    pub fn image(&mut self, dest: Bounds, pixels: PixelBuffer) {
        self.push(DrawCommand::Image { dest, pixels });
    }

    /// Number of commands of the circle kind (handy for headless stats)
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_nothing() {
        let mut list = DrawList::new();
        list.clear(Color::BLACK);
        list.circle(Vec2::ZERO, 2.0, Color::WHITE);
        assert_eq!(list.len(), 2);
        assert_eq!(list.circle_count(), 1);
        list.reset();
        assert!(list.is_empty());
    }

    #[test]
    fn test_degenerate_polyline_skipped() {
        let mut list = DrawList::new();
        list.polyline(vec![Vec2::ZERO], 1.0, Color::WHITE);
        assert!(list.is_empty());
    }
}
