//! Noise machine: white, pink or brown noise with a scrolling waveform

use glam::Vec2;

use super::{FrameInput, Toy, unknown_control};
use crate::audio::{NoiseGenerator, NoiseKind, SAMPLE_RATE, SoundLoop, rms};
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, palette};
use crate::sim::Bounds;

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::select("color", "Color", &NoiseKind::ALL),
    ControlSpec::slider("volume", "Volume", 0.0, 1.0),
    ControlSpec::checkbox("play", "Play"),
];

/// Loop length in samples (one second)
const LOOP_LEN: usize = SAMPLE_RATE as usize;
/// Samples shown in the waveform
const WAVE_POINTS: usize = 256;
/// Samples the waveform window advances per frame
const SCROLL: usize = SAMPLE_RATE as usize / 60;

fn wave_color(kind: NoiseKind) -> Color {
    match kind {
        NoiseKind::White => Color::rgb(0.9, 0.9, 0.95),
        NoiseKind::Pink => Color::rgb(1.0, 0.55, 0.75),
        NoiseKind::Brown => Color::rgb(0.75, 0.5, 0.3),
    }
}

pub struct Noise {
    seed: u64,
    bounds: Bounds,

    kind: NoiseKind,
    volume: f32,
    playing: bool,

    block: SoundLoop,
    level: f32,
    offset: usize,
}

impl Noise {
    pub fn new(seed: u64, bounds: Bounds) -> Self {
        let mut toy = Self {
            seed,
            bounds,
            kind: NoiseKind::White,
            volume: 0.5,
            playing: false,
            block: SoundLoop::default(),
            level: 0.0,
            offset: 0,
        };
        toy.regenerate();
        toy
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// RMS level of the current loop
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Rebuild the loop from the seed for the current color and volume
    fn regenerate(&mut self) {
        let mut generator = NoiseGenerator::new(self.kind, self.seed);
        let mut samples = vec![0.0; LOOP_LEN];
        generator.fill(&mut samples);
        for s in &mut samples {
            *s = (*s * self.volume).clamp(-1.0, 1.0);
        }
        self.level = rms(&samples);
        self.block.replace(samples);
        log::debug!(
            "Noise loop v{}: {} at level {:.3}",
            self.block.version,
            self.kind.as_str(),
            self.level
        );
    }

    fn waveform(&self) -> Vec<Vec2> {
        let b = self.bounds;
        let mid = b.center().y;
        let amp = b.height() * 0.4;
        let samples = &self.block.samples;
        (0..WAVE_POINTS)
            .map(|i| {
                let s = samples[(self.offset + i) % samples.len()];
                let x = b.min.x + b.width() * i as f32 / (WAVE_POINTS - 1) as f32;
                Vec2::new(x, mid - s * amp)
            })
            .collect()
    }
}

impl Toy for Noise {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn reset(&mut self) {
        self.playing = false;
        self.offset = 0;
        self.regenerate();
        log::info!("Noise reset ({})", self.kind.as_str());
    }

    fn update(&mut self, input: &FrameInput, _dt: f32) {
        if input.toggle || input.pressed.is_some() {
            self.playing = !self.playing;
        }
        if self.playing {
            self.offset = (self.offset + SCROLL) % LOOP_LEN;
        }
    }

    fn draw(&self, list: &mut DrawList) {
        list.clear(palette::BACKGROUND);
        let b = self.bounds;
        list.line(
            Vec2::new(b.min.x, b.center().y),
            Vec2::new(b.max.x, b.center().y),
            1.0,
            palette::GRID_LINE,
        );

        let color = wave_color(self.kind);
        let color = if self.playing { color } else { color.with_alpha(0.35) };
        list.polyline(self.waveform(), 1.5, color);

        let label = format!(
            "{} noise  rms {:.2}{}",
            self.kind.as_str(),
            self.level,
            if self.playing { "" } else { "  (stopped)" }
        );
        list.text(b.min + Vec2::new(10.0, 20.0), label, 16.0, Color::WHITE);
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn population(&self) -> usize {
        usize::from(self.playing)
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("color", ControlValue::Choice(name)) => {
                self.kind = NoiseKind::from_str(name).unwrap_or_default();
                self.regenerate();
            }
            ("volume", ControlValue::Number(v)) => {
                self.volume = *v;
                self.regenerate();
            }
            ("play", ControlValue::Flag(on)) => self.playing = *on,
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }

    fn sound_loop(&self) -> Option<&SoundLoop> {
        self.playing.then_some(&self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise() -> Noise {
        Noise::new(3, Bounds::from_size(400.0, 200.0))
    }

    #[test]
    fn test_silent_until_played() {
        let mut n = noise();
        assert!(n.sound_loop().is_none());
        n.update(
            &FrameInput {
                toggle: true,
                ..Default::default()
            },
            1.0,
        );
        let block = n.sound_loop().unwrap();
        assert_eq!(block.samples.len(), LOOP_LEN);
    }

    #[test]
    fn test_color_change_bumps_version() {
        let mut n = noise();
        let before = n.block.version;
        crate::toys::apply_control(&mut n, "color", "Brown").unwrap();
        assert_eq!(n.kind(), NoiseKind::Brown);
        assert!(n.block.version > before);
    }

    #[test]
    fn test_volume_scales_level() {
        let mut n = noise();
        let loud = n.level();
        n.set_control("volume", &ControlValue::Number(0.1)).unwrap();
        assert!(n.level() < loud);
        n.set_control("volume", &ControlValue::Number(0.0)).unwrap();
        assert_eq!(n.level(), 0.0);
    }

    #[test]
    fn test_waveform_spans_width() {
        let n = noise();
        let points = n.waveform();
        assert_eq!(points.len(), WAVE_POINTS);
        assert_eq!(points[0].x, 0.0);
        assert!((points[WAVE_POINTS - 1].x - 400.0).abs() < 1e-3);
        assert!(points.iter().all(|p| (20.0..=180.0).contains(&p.y)));
    }

    #[test]
    fn test_scroll_only_while_playing() {
        let mut n = noise();
        n.update(&FrameInput::default(), 1.0);
        assert_eq!(n.offset, 0);
        n.set_control("play", &ControlValue::Flag(true)).unwrap();
        n.update(&FrameInput::default(), 1.0);
        assert_eq!(n.offset, SCROLL);
    }
}
