//! Falling-sand sandbox
//!
//! The border is always wall, so every cell that can change is interior
//! and sand is conserved. The slide direction alternates each generation
//! to keep piles symmetric.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, cell_at, grid_dims, seeded_rng, unknown_control};
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, PixelBuffer, palette};
use crate::settings::Settings;
use crate::sim::{Bounds, CellField, Grid, Material, SandRule};

const MATERIALS: &[&str] = &["sand", "wall", "erase"];

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::select("material", "Material", MATERIALS),
    ControlSpec::slider("brush", "Brush size", 0.0, 6.0),
    ControlSpec::checkbox("faucet", "Faucet"),
    ControlSpec::button("clear", "Clear"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brush {
    Sand,
    Wall,
    Erase,
}

pub struct Sandbox {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,
    cell_size: f32,

    field: CellField<Material>,

    brush: Brush,
    brush_radius: isize,
    faucet: bool,
}

fn walled(field: &mut CellField<Material>) {
    field.reset(Material::Empty);
    let grid = field.current_mut();
    let (w, h) = (grid.width(), grid.height());
    for x in 0..w {
        grid.set(x, 0, Material::Wall);
        grid.set(x, h - 1, Material::Wall);
    }
    for y in 0..h {
        grid.set(0, y, Material::Wall);
        grid.set(w - 1, y, Material::Wall);
    }
}

impl Sandbox {
    pub fn new(seed: u64, bounds: Bounds, settings: &Settings) -> Self {
        let cell_size = settings.cell_size();
        let (cols, rows) = grid_dims(&bounds, cell_size);
        let mut toy = Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            cell_size,
            field: CellField::new(cols, rows, Material::Empty),
            brush: Brush::Sand,
            brush_radius: 2,
            faucet: true,
        };
        toy.reset();
        toy
    }

    pub fn grid(&self) -> &Grid<Material> {
        self.field.current()
    }

    pub fn sand_count(&self) -> usize {
        self.grid().count(|m| m == Material::Sand)
    }

    /// Paint a disc of cells around (cx, cy). Sand only lands on empty
    /// cells; the border is never touched.
    pub fn paint(&mut self, cx: usize, cy: usize, brush: Brush) {
        let r = self.brush_radius;
        let grid = self.field.current_mut();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let (x, y) = (cx as isize + dx, cy as isize + dy);
                if !grid.in_bounds(x, y) {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);
                if !grid.is_interior(x, y) {
                    continue;
                }
                match brush {
                    Brush::Sand if grid.get(x, y) == Material::Empty => {
                        grid.set(x, y, Material::Sand)
                    }
                    Brush::Sand => {}
                    Brush::Wall => grid.set(x, y, Material::Wall),
                    Brush::Erase => grid.set(x, y, Material::Empty),
                }
            }
        }
    }

    fn paint_canvas(&mut self, pos: Vec2) {
        let (w, h) = (self.field.width(), self.field.height());
        if let Some((x, y)) = cell_at(&self.bounds, w, h, pos) {
            self.paint(x, y, self.brush);
        }
    }

    fn pour(&mut self) {
        let w = self.field.width();
        let mid = w / 2;
        let spread = (w / 20).max(1);
        let x = self
            .rng
            .random_range(mid.saturating_sub(spread)..=mid + spread)
            .clamp(1, w - 2);
        let grid = self.field.current_mut();
        if grid.get(x, 1) == Material::Empty {
            grid.set(x, 1, Material::Sand);
        }
    }
}

impl Toy for Sandbox {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        walled(&mut self.field);
        log::info!(
            "Sandbox reset ({}x{} cells)",
            self.field.width(),
            self.field.height()
        );
    }

    fn update(&mut self, input: &FrameInput, _dt: f32) {
        if let Some(pos) = input.drag().or(input.pressed) {
            self.paint_canvas(pos);
        }
        if self.faucet {
            self.pour();
        }

        let rule = SandRule::new(self.field.generation() % 2 == 0);
        self.field.step(&rule);
    }

    fn draw(&self, list: &mut DrawList) {
        let grid = self.grid();
        let mut pixels = PixelBuffer::new(grid.width(), grid.height());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let color = match grid.get(x, y) {
                    Material::Empty => palette::BACKGROUND,
                    Material::Wall => palette::WALL,
                    // Fixed per-cell grain so piles read as texture
                    Material::Sand => {
                        let grain = ((x * 7 + y * 13) % 5) as f32 * 0.03;
                        palette::SAND.lerp(Color::BLACK, grain)
                    }
                };
                pixels.set(x, y, color.to_rgba8());
            }
        }
        list.image(self.bounds, pixels);
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        let (cols, rows) = grid_dims(&bounds, self.cell_size);
        self.field = CellField::new(cols, rows, Material::Empty);
        walled(&mut self.field);
    }

    fn population(&self) -> usize {
        self.sand_count()
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("material", ControlValue::Choice(name)) => {
                self.brush = match name.as_str() {
                    "wall" => Brush::Wall,
                    "erase" => Brush::Erase,
                    _ => Brush::Sand,
                }
            }
            ("brush", ControlValue::Number(v)) => self.brush_radius = v.round() as isize,
            ("faucet", ControlValue::Flag(on)) => self.faucet = *on,
            ("clear", ControlValue::Pressed) => walled(&mut self.field),
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }
}
