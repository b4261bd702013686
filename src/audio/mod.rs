//! Procedural audio
//!
//! Sample generators are pure and seeded so the audio toys can run (and be
//! tested) without a sound device. On the web, `web::AudioOut` turns
//! [`NoteEvent`]s into short-lived oscillator voices and plays
//! [`SoundLoop`]s through a looping buffer source.

#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Output sample rate assumed by the generators
pub const SAMPLE_RATE: u32 = 48_000;

/// Noise colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseKind {
    #[default]
    White,
    Pink,
    Brown,
}

impl NoiseKind {
    pub const ALL: [&'static str; 3] = ["white", "pink", "brown"];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseKind::White => "white",
            NoiseKind::Pink => "pink",
            NoiseKind::Brown => "brown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "white" => Some(NoiseKind::White),
            "pink" => Some(NoiseKind::Pink),
            "brown" | "brownian" | "red" => Some(NoiseKind::Brown),
            _ => None,
        }
    }
}

/// Streaming noise source
///
/// Pink noise uses Paul Kellet's filter bank. Brown noise is a leaky
/// integrator normalized by 1.02 and rescaled by 3.5; over very long runs
/// its level wanders, which is the behaviour the noise toy always had.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    kind: NoiseKind,
    rng: Pcg32,
    pink: [f32; 7],
    brown: f32,
}

impl NoiseGenerator {
    pub fn new(kind: NoiseKind, seed: u64) -> Self {
        Self {
            kind,
            rng: Pcg32::seed_from_u64(seed),
            pink: [0.0; 7],
            brown: 0.0,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.random_range(-1.0..1.0);
        match self.kind {
            NoiseKind::White => white,
            NoiseKind::Pink => {
                let b = &mut self.pink;
                b[0] = 0.99886 * b[0] + white * 0.0555179;
                b[1] = 0.99332 * b[1] + white * 0.0750759;
                b[2] = 0.96900 * b[2] + white * 0.1538520;
                b[3] = 0.86650 * b[3] + white * 0.3104856;
                b[4] = 0.55000 * b[4] + white * 0.5329522;
                b[5] = -0.7616 * b[5] - white * 0.0168980;
                let out = (b.iter().sum::<f32>() + white * 0.5362) * 0.11;
                b[6] = white * 0.115926;
                out
            }
            NoiseKind::Brown => {
                self.brown = (self.brown + 0.02 * white) / 1.02;
                self.brown * 3.5
            }
        }
    }

    pub fn fill(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            *s = self.next_sample();
        }
    }
}

/// Root-mean-square level of a block of samples
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Equal-tempered frequency of a MIDI note (A4 = 69 = 440 Hz)
pub fn note_frequency(midi: u8) -> f32 {
    440.0 * 2f32.powf((midi as f32 - 69.0) / 12.0)
}

/// A note requested by a toy this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub midi: u8,
    /// Seconds
    pub duration: f32,
    /// 0.0 - 1.0
    pub velocity: f32,
}

/// A block of samples a toy wants played on repeat
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoundLoop {
    pub samples: Vec<f32>,
    /// Bumped every time `samples` is regenerated
    pub version: u64,
}

impl SoundLoop {
    /// Replace the samples and mark the loop as changed
    pub fn replace(&mut self, samples: Vec<f32>) {
        self.samples = samples;
        self.version += 1;
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / SAMPLE_RATE as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_frequency() {
        assert!((note_frequency(69) - 440.0).abs() < 1e-3);
        assert!((note_frequency(81) - 880.0).abs() < 1e-2);
        assert!((note_frequency(60) - 261.63).abs() < 0.01);
    }

    #[test]
    fn test_noise_kind_parse() {
        assert_eq!(NoiseKind::from_str("Pink"), Some(NoiseKind::Pink));
        assert_eq!(NoiseKind::from_str("brownian"), Some(NoiseKind::Brown));
        assert_eq!(NoiseKind::from_str("blue"), None);
        for name in NoiseKind::ALL {
            assert_eq!(NoiseKind::from_str(name).map(|k| k.as_str()), Some(name));
        }
    }

    #[test]
    fn test_white_noise_bounded() {
        let mut g = NoiseGenerator::new(NoiseKind::White, 1);
        let mut buf = [0.0; 4096];
        g.fill(&mut buf);
        assert!(buf.iter().all(|s| (-1.0..1.0).contains(s)));
        // Uniform [-1, 1) has RMS 1/sqrt(3)
        assert!((rms(&buf) - 0.577).abs() < 0.03);
    }

    #[test]
    fn test_colored_noise_is_smoother_than_white() {
        let roughness = |kind| {
            let mut g = NoiseGenerator::new(kind, 9);
            let mut buf = vec![0.0; 8192];
            g.fill(&mut buf);
            let diffs: Vec<f32> = buf.windows(2).map(|w| w[1] - w[0]).collect();
            rms(&diffs) / rms(&buf).max(1e-6)
        };
        let white = roughness(NoiseKind::White);
        assert!(roughness(NoiseKind::Pink) < white);
        assert!(roughness(NoiseKind::Brown) < white);
    }

    #[test]
    fn test_same_seed_same_samples() {
        let mut a = NoiseGenerator::new(NoiseKind::Brown, 42);
        let mut b = NoiseGenerator::new(NoiseKind::Brown, 42);
        let (mut x, mut y) = ([0.0; 64], [0.0; 64]);
        a.fill(&mut x);
        b.fill(&mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn test_sound_loop_version_bumps() {
        let mut l = SoundLoop::default();
        l.replace(vec![0.0; SAMPLE_RATE as usize / 2]);
        assert_eq!(l.version, 1);
        assert!((l.duration_secs() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rms_empty() {
        assert_eq!(rms(&[]), 0.0);
    }
}
