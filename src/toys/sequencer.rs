//! Step sequencer: a 16-step piano roll over a pentatonic scale
//!
//! Steps are scheduled from the tick clock. The `playing` flag is checked
//! before every step, so stopping never lets a queued step through.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, cell_at, seeded_rng, unknown_control};
use crate::audio::NoteEvent;
use crate::consts::TICK_RATE_HZ;
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, palette};
use crate::sim::{Bounds, Grid};

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::slider("bpm", "Tempo", 60.0, 200.0),
    ControlSpec::checkbox("play", "Play"),
    ControlSpec::button("clear", "Clear"),
    ControlSpec::button("random", "Random pattern"),
];

pub const STEPS: usize = 16;
pub const ROWS: usize = 8;
/// Lowest note (C4)
const BASE_NOTE: u8 = 60;
/// Major pentatonic offsets, bottom row first
const SCALE: [u8; ROWS] = [0, 2, 4, 7, 9, 12, 14, 16];
/// Steps per beat (sixteenth notes)
const STEPS_PER_BEAT: f32 = 4.0;
const PATTERN_DENSITY: f64 = 0.15;
const MARGIN: f32 = 20.0;

pub struct Sequencer {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,

    pattern: Grid<bool>,
    playing: bool,
    bpm: f32,
    /// Next step to sound
    step: usize,
    /// Step that sounded last, for the playhead
    current: Option<usize>,
    phase: f32,
    notes: Vec<NoteEvent>,
}

impl Sequencer {
    pub fn new(seed: u64, bounds: Bounds) -> Self {
        let mut toy = Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            pattern: Grid::new(STEPS, ROWS, false),
            playing: false,
            bpm: 120.0,
            step: 0,
            current: None,
            phase: 0.0,
            notes: Vec::new(),
        };
        toy.reset();
        toy
    }

    pub fn pattern(&self) -> &Grid<bool> {
        &self.pattern
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Row 0 is the top of the roll and the highest note
    pub fn row_note(row: usize) -> u8 {
        BASE_NOTE + SCALE[ROWS - 1 - row]
    }

    /// Ticks per step at the current tempo
    pub fn frames_per_step(&self) -> f32 {
        TICK_RATE_HZ as f32 * 60.0 / (self.bpm * STEPS_PER_BEAT)
    }

    pub fn toggle(&mut self, step: usize, row: usize) {
        if step < STEPS && row < ROWS {
            let on = self.pattern.get(step, row);
            self.pattern.set(step, row, !on);
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        if playing && !self.playing {
            // Sound the first step on the next tick
            self.phase = self.frames_per_step();
        }
        if !playing {
            self.current = None;
        }
        self.playing = playing;
    }

    fn roll_area(&self) -> Bounds {
        self.bounds.expand(-MARGIN)
    }

    fn randomize(&mut self) {
        for row in 0..ROWS {
            for step in 0..STEPS {
                let on = self.rng.random_bool(PATTERN_DENSITY);
                self.pattern.set(step, row, on);
            }
        }
    }

    fn play_step(&mut self) {
        let duration = self.frames_per_step() / TICK_RATE_HZ as f32 * 0.9;
        for row in 0..ROWS {
            if self.pattern.get(self.step, row) {
                self.notes.push(NoteEvent {
                    midi: Self::row_note(row),
                    duration,
                    velocity: 0.7,
                });
            }
        }
        self.current = Some(self.step);
        self.step = (self.step + 1) % STEPS;
    }
}

impl Toy for Sequencer {
    fn name(&self) -> &'static str {
        "sequencer"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.randomize();
        self.playing = false;
        self.step = 0;
        self.current = None;
        self.phase = 0.0;
        self.notes.clear();
        log::info!("Sequencer reset");
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        if input.toggle {
            self.set_playing(!self.playing);
        }
        if let Some(pos) = input.pressed {
            if let Some((step, row)) = cell_at(&self.roll_area(), STEPS, ROWS, pos) {
                self.toggle(step, row);
            }
        }

        if !self.playing {
            return;
        }
        let per_step = self.frames_per_step();
        self.phase += dt;
        while self.playing && self.phase >= per_step {
            self.phase -= per_step;
            self.play_step();
        }
    }

    fn draw(&self, list: &mut DrawList) {
        list.clear(palette::BACKGROUND);
        let area = self.roll_area();
        let cell = area.size() / Vec2::new(STEPS as f32, ROWS as f32);

        if let Some(step) = self.current {
            let origin = area.min + Vec2::new(step as f32 * cell.x, 0.0);
            list.rect(
                Bounds::from_origin_size(origin, Vec2::new(cell.x, area.height())),
                Color::WHITE.with_alpha(0.12),
            );
        }

        for row in 0..ROWS {
            let hue = row as f32 * 40.0;
            for step in 0..STEPS {
                let origin = area.min + Vec2::new(step as f32, row as f32) * cell;
                let rect = Bounds::from_origin_size(origin + 1.0, cell - 2.0);
                let fill = if self.pattern.get(step, row) {
                    Color::hsla(hue, 0.7, 0.55, 1.0)
                } else {
                    palette::GRID_LINE
                };
                list.rect(rect, fill);
            }
        }

        let status = format!(
            "{:.0} bpm  {}",
            self.bpm,
            if self.playing { "playing" } else { "stopped" }
        );
        list.text(self.bounds.min + Vec2::new(MARGIN, 14.0), status, 12.0, Color::WHITE);
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn population(&self) -> usize {
        self.pattern.count(|on| on)
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("bpm", ControlValue::Number(v)) => self.bpm = *v,
            ("play", ControlValue::Flag(on)) => self.set_playing(*on),
            ("clear", ControlValue::Pressed) => self.pattern.fill(false),
            ("random", ControlValue::Pressed) => self.randomize(),
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }

    fn drain_notes(&mut self) -> Vec<NoteEvent> {
        std::mem::take(&mut self.notes)
    }
}
