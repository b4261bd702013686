//! The toys
//!
//! Each toy is one owned state struct behind the [`Toy`] trait. `update` is
//! the only place state changes; `draw` only reads it. All randomness comes
//! from the toy's own seeded RNG, so `reset` always rebuilds the same
//! starting state.

pub mod bouncing;
pub mod fireworks;
pub mod life;
pub mod noise;
pub mod ripple;
pub mod sandbox;
pub mod sequencer;
pub mod snowfall;
pub mod targets;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{NoteEvent, SoundLoop};
use crate::error::{Result, ToyError};
use crate::platform::controls::{self, ControlSpec, ControlValue};
use crate::renderer::DrawList;
use crate::settings::Settings;
use crate::sim::Bounds;

/// Input for a single tick, already mapped into canvas pixels
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Last known pointer position
    pub pointer: Option<Vec2>,
    /// Pointer button/touch is down
    pub pointer_held: bool,
    /// Pointer went down at this position (one-shot)
    pub pressed: Option<Vec2>,
    /// Toggle key (space) was hit (one-shot)
    pub toggle: bool,
}

impl FrameInput {
    /// Clear one-shot inputs after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.pressed = None;
        self.toggle = false;
    }

    /// Pointer position while held
    pub fn drag(&self) -> Option<Vec2> {
        if self.pointer_held { self.pointer } else { None }
    }
}

pub trait Toy {
    fn name(&self) -> &'static str;

    /// Rebuild the starting state from the toy's seed
    fn reset(&mut self);

    /// Advance by `dt` frames
    fn update(&mut self, input: &FrameInput, dt: f32);

    fn draw(&self, list: &mut DrawList);

    /// Surface changed size
    fn resize(&mut self, bounds: Bounds);

    /// Live entities (particles, cells, balls...)
    fn population(&self) -> usize;

    fn controls(&self) -> &'static [ControlSpec] {
        &[]
    }

    fn set_control(&mut self, id: &str, _value: &ControlValue) -> Result<()> {
        Err(unknown_control(self.name(), id))
    }

    /// Notes requested since the last call
    fn drain_notes(&mut self) -> Vec<NoteEvent> {
        Vec::new()
    }

    /// Sample loop that should be sounding right now
    fn sound_loop(&self) -> Option<&SoundLoop> {
        None
    }
}

/// All toy names, in menu order
pub const NAMES: [&str; 9] = [
    "fireworks",
    "snowfall",
    "bouncing",
    "targets",
    "ripple",
    "sandbox",
    "life",
    "noise",
    "sequencer",
];

/// Build a toy by name with default settings
pub fn create(name: &str, seed: u64, bounds: Bounds) -> Result<Box<dyn Toy>> {
    create_with(name, seed, bounds, &Settings::default())
}

/// Build a toy by name; settings pick particle caps, cell size and trails
pub fn create_with(name: &str, seed: u64, bounds: Bounds, settings: &Settings) -> Result<Box<dyn Toy>> {
    let toy: Box<dyn Toy> = match name {
        "fireworks" => Box::new(fireworks::Fireworks::new(seed, bounds, settings)),
        "snowfall" => Box::new(snowfall::Snowfall::new(seed, bounds, settings)),
        "bouncing" => Box::new(bouncing::Bouncing::new(seed, bounds)),
        "targets" => Box::new(targets::Targets::new(seed, bounds, settings)),
        "ripple" => Box::new(ripple::Ripple::new(seed, bounds, settings)),
        "sandbox" => Box::new(sandbox::Sandbox::new(seed, bounds, settings)),
        "life" => Box::new(life::Life::new(seed, bounds, settings)),
        "noise" => Box::new(noise::Noise::new(seed, bounds)),
        "sequencer" => Box::new(sequencer::Sequencer::new(seed, bounds)),
        other => return Err(ToyError::UnknownToy(other.to_string())),
    };
    log::info!("Created toy '{}' with seed {}", toy.name(), seed);
    Ok(toy)
}

/// Parse a raw DOM value for control `id` and hand it to the toy
pub fn apply_control(toy: &mut dyn Toy, id: &str, raw: &str) -> Result<()> {
    let spec = controls::find(toy.controls(), id).ok_or_else(|| unknown_control(toy.name(), id))?;
    let value = ControlValue::parse(spec, raw)?;
    log::info!("{}: {} = {:?}", toy.name(), id, value);
    toy.set_control(id, &value)
}

pub(crate) fn unknown_control(toy: &'static str, id: &str) -> ToyError {
    ToyError::UnknownControl {
        toy,
        id: id.to_string(),
    }
}

pub(crate) fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Map a canvas position to a grid cell stretched over `bounds`
pub(crate) fn cell_at(bounds: &Bounds, cols: usize, rows: usize, pos: Vec2) -> Option<(usize, usize)> {
    if !bounds.contains(pos) || cols == 0 || rows == 0 {
        return None;
    }
    let rel = (pos - bounds.min) / bounds.size();
    let x = ((rel.x * cols as f32) as usize).min(cols - 1);
    let y = ((rel.y * rows as f32) as usize).min(rows - 1);
    Some((x, y))
}

/// Grid dimensions for cells of `cell_size` pixels over `bounds`
pub(crate) fn grid_dims(bounds: &Bounds, cell_size: f32) -> (usize, usize) {
    let cell = cell_size.max(1.0);
    let cols = (bounds.width() / cell).floor().max(3.0) as usize;
    let rows = (bounds.height() / cell).floor().max(3.0) as usize;
    (cols, rows)
}
