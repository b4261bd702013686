//! Conway's game of life

use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, cell_at, grid_dims, seeded_rng, unknown_control};
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, PixelBuffer, palette};
use crate::settings::Settings;
use crate::sim::{Bounds, CellField, Grid, LifeRule};

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::slider("interval", "Frames per generation", 1.0, 30.0),
    ControlSpec::slider("density", "Random fill", 0.05, 0.6),
    ControlSpec::checkbox("paused", "Paused"),
    ControlSpec::button("randomize", "Randomize"),
    ControlSpec::button("clear", "Clear"),
];

const ALIVE: Color = Color::rgb(0.55, 0.95, 0.6);

pub struct Life {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,
    cell_size: f32,

    field: CellField<bool>,
    timer: f32,

    interval: f32,
    density: f64,
    paused: bool,
}

impl Life {
    pub fn new(seed: u64, bounds: Bounds, settings: &Settings) -> Self {
        // Life reads better with chunkier cells than the fluid toys
        let cell_size = settings.cell_size() * 2.0;
        let (cols, rows) = grid_dims(&bounds, cell_size);
        let mut toy = Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            cell_size,
            field: CellField::new(cols, rows, false),
            timer: 0.0,
            interval: 6.0,
            density: 0.25,
            paused: false,
        };
        toy.reset();
        toy
    }

    pub fn grid(&self) -> &Grid<bool> {
        self.field.current()
    }

    pub fn generation(&self) -> u64 {
        self.field.generation()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fill interior cells at random; the border stays dead
    fn randomize(&mut self) {
        self.field.reset(false);
        let density = self.density;
        let grid = self.field.current_mut();
        for y in 1..grid.height() - 1 {
            for x in 1..grid.width() - 1 {
                grid.set(x, y, self.rng.random_bool(density));
            }
        }
    }

    pub fn toggle_cell(&mut self, x: usize, y: usize) {
        let grid = self.field.current_mut();
        if grid.is_interior(x, y) {
            let alive = grid.get(x, y);
            grid.set(x, y, !alive);
        }
    }
}

impl Toy for Life {
    fn name(&self) -> &'static str {
        "life"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.timer = 0.0;
        self.randomize();
        log::info!("Life reset, {} cells alive", self.population());
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        if input.toggle {
            self.paused = !self.paused;
        }
        if let Some(pos) = input.pressed {
            let (w, h) = (self.field.width(), self.field.height());
            if let Some((x, y)) = cell_at(&self.bounds, w, h, pos) {
                self.toggle_cell(x, y);
            }
        }

        if self.paused {
            return;
        }
        self.timer += dt;
        if self.timer >= self.interval {
            self.timer -= self.interval;
            self.field.step(&LifeRule);
        }
    }

    fn draw(&self, list: &mut DrawList) {
        let grid = self.grid();
        let mut pixels = PixelBuffer::new(grid.width(), grid.height());
        let (on, off) = (ALIVE.to_rgba8(), palette::BACKGROUND.to_rgba8());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                pixels.set(x, y, if grid.get(x, y) { on } else { off });
            }
        }
        list.image(self.bounds, pixels);
        if self.paused {
            list.text(self.bounds.min + glam::Vec2::new(10.0, 20.0), "Paused", 16.0, Color::WHITE);
        }
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        let (cols, rows) = grid_dims(&bounds, self.cell_size);
        self.field = CellField::new(cols, rows, false);
        self.randomize();
    }

    fn population(&self) -> usize {
        self.grid().count(|alive| alive)
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("interval", ControlValue::Number(v)) => {
                self.interval = v.max(1.0);
                // At most one catch-up generation after shortening
                self.timer = self.timer.min(self.interval);
            }
            ("density", ControlValue::Number(v)) => self.density = *v as f64,
            ("paused", ControlValue::Flag(on)) => self.paused = *on,
            ("randomize", ControlValue::Pressed) => self.randomize(),
            ("clear", ControlValue::Pressed) => self.field.reset(false),
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn life() -> Life {
        let mut l = Life::new(6, Bounds::from_size(200.0, 200.0), &Settings::default());
        l.set_control("clear", &ControlValue::Pressed).unwrap();
        l.set_control("interval", &ControlValue::Number(1.0)).unwrap();
        l
    }

    #[test]
    fn test_random_fill_leaves_border_dead() {
        let l = Life::new(6, Bounds::from_size(200.0, 200.0), &Settings::default());
        let g = l.grid();
        assert!(l.population() > 0);
        for x in 0..g.width() {
            assert!(!g.get(x, 0) && !g.get(x, g.height() - 1));
        }
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut l = life();
        for x in 4..=6 {
            l.toggle_cell(x, 5);
        }
        l.update(&FrameInput::default(), 1.0);
        let g = l.grid();
        assert!(g.get(5, 4) && g.get(5, 5) && g.get(5, 6));
        assert!(!g.get(4, 5) && !g.get(6, 5));

        l.update(&FrameInput::default(), 1.0);
        let g = l.grid();
        assert!(g.get(4, 5) && g.get(5, 5) && g.get(6, 5));
        assert_eq!(l.population(), 3);
    }

    #[test]
    fn test_toggle_key_pauses() {
        let mut l = life();
        let toggle = FrameInput {
            toggle: true,
            ..Default::default()
        };
        l.update(&toggle, 1.0);
        assert!(l.is_paused());
        let generation = l.generation();
        for _ in 0..10 {
            l.update(&FrameInput::default(), 1.0);
        }
        assert_eq!(l.generation(), generation);

        l.update(&toggle, 1.0);
        assert!(!l.is_paused());
    }

    #[test]
    fn test_interval_slows_generations() {
        let mut l = life();
        l.set_control("interval", &ControlValue::Number(5.0)).unwrap();
        for _ in 0..20 {
            l.update(&FrameInput::default(), 1.0);
        }
        assert_eq!(l.generation(), 4);
    }

    #[test]
    fn test_shorter_interval_keeps_pace() {
        let mut l = life();
        l.set_control("interval", &ControlValue::Number(30.0)).unwrap();
        for _ in 0..29 {
            l.update(&FrameInput::default(), 1.0);
        }
        assert_eq!(l.generation(), 0);

        l.set_control("interval", &ControlValue::Number(5.0)).unwrap();
        for _ in 0..20 {
            l.update(&FrameInput::default(), 1.0);
        }
        // One catch-up step, then every fifth frame
        assert_eq!(l.generation(), 5);
    }

    #[test]
    fn test_press_toggles_cell() {
        let mut l = life();
        l.set_control("paused", &ControlValue::Flag(true)).unwrap();
        let press = FrameInput {
            pressed: Some(Vec2::new(105.0, 105.0)),
            ..Default::default()
        };
        l.update(&press, 1.0);
        assert_eq!(l.population(), 1);
        l.update(&press, 1.0);
        assert_eq!(l.population(), 0);
    }
}
