//! Ripple tank: damped wave equation on a double-buffered grid

use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, cell_at, grid_dims, seeded_rng, unknown_control};
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, PixelBuffer};
use crate::settings::Settings;
use crate::sim::{Bounds, CellField, WaveRule};

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::slider("damping", "Damping", 0.9, 0.999),
    ControlSpec::checkbox("rain", "Rain"),
    ControlSpec::button("calm", "Calm"),
];

/// Amplitude of a pointer drop
const DROP: f32 = 1.0;
/// Chance per frame of a raindrop
const RAIN_CHANCE: f64 = 0.05;
/// Cells with |amplitude| below this count as still
const STILL: f32 = 0.01;

pub struct Ripple {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,
    cell_size: f32,

    field: CellField<f32>,
    rule: WaveRule,
    rain: bool,
}

impl Ripple {
    pub fn new(seed: u64, bounds: Bounds, settings: &Settings) -> Self {
        let cell_size = settings.cell_size();
        let (cols, rows) = grid_dims(&bounds, cell_size);
        Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            cell_size,
            field: CellField::new(cols, rows, 0.0),
            rule: WaveRule { damping: 0.97 },
            rain: false,
        }
    }

    pub fn field(&self) -> &CellField<f32> {
        &self.field
    }

    /// Disturb the cell under a canvas position. Edge cells never change.
    pub fn drop_at(&mut self, x: usize, y: usize, amplitude: f32) {
        let grid = self.field.current_mut();
        if grid.is_interior(x, y) {
            grid.set(x, y, amplitude);
        }
    }

    fn drop_at_canvas(&mut self, pos: glam::Vec2, amplitude: f32) {
        if let Some((x, y)) = cell_at(&self.bounds, self.field.width(), self.field.height(), pos) {
            self.drop_at(x, y, amplitude);
        }
    }

    /// Total absolute amplitude across the tank
    pub fn energy(&self) -> f32 {
        self.field.current().cells().iter().map(|v| v.abs()).sum()
    }
}

impl Toy for Ripple {
    fn name(&self) -> &'static str {
        "ripple"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.field.reset(0.0);
        log::info!(
            "Ripple reset ({}x{} cells)",
            self.field.width(),
            self.field.height()
        );
    }

    fn update(&mut self, input: &FrameInput, _dt: f32) {
        if let Some(pos) = input.pressed {
            self.drop_at_canvas(pos, DROP * 2.0);
        } else if let Some(pos) = input.drag() {
            self.drop_at_canvas(pos, DROP);
        }

        if self.rain && self.rng.random_bool(RAIN_CHANCE) {
            let x = self.rng.random_range(1..self.field.width() - 1);
            let y = self.rng.random_range(1..self.field.height() - 1);
            self.drop_at(x, y, DROP);
        }

        self.field.step(&self.rule);
    }

    fn draw(&self, list: &mut DrawList) {
        let grid = self.field.current();
        let mut pixels = PixelBuffer::new(grid.width(), grid.height());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let v = grid.get(x, y).clamp(-1.0, 1.0);
                let color = Color::hsla(205.0, 0.7, 0.3 + v * 0.25, 1.0);
                pixels.set(x, y, color.to_rgba8());
            }
        }
        list.image(self.bounds, pixels);
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        let (cols, rows) = grid_dims(&bounds, self.cell_size);
        self.field = CellField::new(cols, rows, 0.0);
    }

    fn population(&self) -> usize {
        self.field.current().count(|v| v.abs() > STILL)
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("damping", ControlValue::Number(v)) => self.rule.damping = *v,
            ("rain", ControlValue::Flag(on)) => self.rain = *on,
            ("calm", ControlValue::Pressed) => self.field.reset(0.0),
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn tank() -> Ripple {
        Ripple::new(1, Bounds::from_size(200.0, 100.0), &Settings::default())
    }

    #[test]
    fn test_grid_matches_cell_size() {
        let r = tank();
        assert_eq!((r.field().width(), r.field().height()), (40, 20));
    }

    #[test]
    fn test_drop_spreads_then_decays() {
        let mut r = tank();
        let press = FrameInput {
            pressed: Some(Vec2::new(100.0, 50.0)),
            ..Default::default()
        };
        r.update(&press, 1.0);
        for _ in 0..5 {
            r.update(&FrameInput::default(), 1.0);
        }
        assert!(r.population() > 4);

        for _ in 0..2000 {
            r.update(&FrameInput::default(), 1.0);
        }
        assert!(r.energy() < 1e-3, "energy = {}", r.energy());
    }

    #[test]
    fn test_edges_stay_still() {
        let mut r = tank();
        r.drop_at(0, 5, 1.0);
        r.drop_at(1, 1, 1.0);
        for _ in 0..50 {
            r.update(&FrameInput::default(), 1.0);
        }
        let g = r.field().current();
        for x in 0..g.width() {
            assert_eq!(g.get(x, 0), 0.0);
            assert_eq!(g.get(x, g.height() - 1), 0.0);
        }
    }

    #[test]
    fn test_rain_makes_waves() {
        let mut r = tank();
        r.set_control("rain", &ControlValue::Flag(true)).unwrap();
        for _ in 0..200 {
            r.update(&FrameInput::default(), 1.0);
        }
        assert!(r.energy() > 0.0);
    }

    #[test]
    fn test_draw_emits_one_image() {
        let r = tank();
        let mut list = DrawList::new();
        r.draw(&mut list);
        assert_eq!(list.len(), 1);
    }
}
