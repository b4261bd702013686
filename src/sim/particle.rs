//! Generic 2D particle step
//!
//! Particles are plain records in a `Vec` owned by the toy. One call to
//! [`advance`] integrates every particle independently and drops the ones
//! that burned out or left the padded bounds.

use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Bounds;
use crate::polar_to_cartesian;

/// Life at or below this counts as dead (absorbs float drift from repeated decay)
pub const LIFE_EPSILON: f32 = 1e-4;
/// Floor for per-frame decay so lifetime always strictly decreases
pub const MIN_DECAY: f32 = 1e-4;

/// A short-lived visual point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime, 1.0 = fresh
    pub life: f32,
    /// Lifetime lost per frame
    pub decay: f32,
    pub size: f32,
    /// Hue in degrees, for HSL coloring
    pub hue: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            life: 1.0,
            decay: 0.02,
            size: 2.0,
            hue: 0.0,
        }
    }
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > LIFE_EPSILON
    }

    /// Opacity for rendering (life clamped to [0, 1])
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }

    /// Frames until this particle burns out (ignoring bounds)
    pub fn frames_left(&self) -> f32 {
        self.life / self.decay.max(MIN_DECAY)
    }
}

/// Per-frame configuration shared by every particle in a system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Acceleration, pixels/frame²
    pub gravity: Vec2,
    /// Velocity multiplier per frame (1.0 = no drag)
    pub drag: f32,
    /// Canvas bounds
    pub bounds: Bounds,
    /// How far outside `bounds` a particle may drift before it is dropped
    pub margin: f32,
}

impl ParticleConfig {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            gravity: Vec2::ZERO,
            drag: 1.0,
            bounds,
            margin: 50.0,
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = Vec2::new(0.0, gravity);
        self
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }
}

/// Advance every particle by `dt` frames and drop dead or escaped ones.
///
/// Each particle reads and writes only its own record, so the result does
/// not depend on iteration order. Returns the number of particles removed.
pub fn advance(particles: &mut Vec<Particle>, dt: f32, config: &ParticleConfig) -> usize {
    debug_assert!(dt > 0.0, "particle step needs a positive dt");

    let drag = config.drag.powf(dt);
    let limit = config.bounds.expand(config.margin);

    for p in particles.iter_mut() {
        p.vel += config.gravity * dt;
        p.pos += p.vel * dt;
        p.vel *= drag;
        p.life -= p.decay.max(MIN_DECAY) * dt;
    }

    let before = particles.len();
    particles.retain(|p| p.is_alive() && limit.contains(p.pos));
    before - particles.len()
}

/// Emit `count` particles from `origin` at equal angular spacing.
///
/// Speed is drawn uniformly from `speed`; every other field comes from
/// `template`. Stops early at `cap` total particles, spreading the shortened
/// burst over the full circle. Returns how many were emitted.
pub fn emit_burst<R: Rng>(
    particles: &mut Vec<Particle>,
    origin: Vec2,
    count: usize,
    speed: RangeInclusive<f32>,
    template: &Particle,
    rng: &mut R,
    cap: usize,
) -> usize {
    let room = cap.saturating_sub(particles.len());
    let count_to_emit = count.min(room);
    let (lo, hi) = ordered(speed);

    for i in 0..count_to_emit {
        let angle = i as f32 * std::f32::consts::TAU / count_to_emit as f32;
        let speed = rng.random_range(lo..=hi);
        particles.push(Particle {
            pos: origin,
            vel: polar_to_cartesian(speed, angle),
            ..*template
        });
    }

    count_to_emit
}

fn ordered(range: RangeInclusive<f32>) -> (f32, f32) {
    let (a, b) = range.into_inner();
    if a <= b { (a, b) } else { (b, a) }
}

/// Continuous spawner: `rate` particles per frame, fractional rates accumulate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emitter {
    /// Spawn positions are uniform over this area
    pub area: Bounds,
    pub rate: f32,
    /// Base velocity for new particles
    pub velocity: Vec2,
    /// Per-axis random velocity offset (± jitter)
    pub jitter: Vec2,
    pub template: Particle,
    accumulator: f32,
}

impl Emitter {
    pub fn new(area: Bounds, rate: f32, template: Particle) -> Self {
        Self {
            area,
            rate,
            velocity: Vec2::ZERO,
            jitter: Vec2::ZERO,
            template,
            accumulator: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2, jitter: Vec2) -> Self {
        self.velocity = velocity;
        self.jitter = jitter;
        self
    }

    /// Forget any fractional particle owed from earlier frames
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Spawn this frame's share of particles. Returns how many were spawned.
    pub fn emit<R: Rng>(
        &mut self,
        particles: &mut Vec<Particle>,
        dt: f32,
        rng: &mut R,
        cap: usize,
    ) -> usize {
        self.accumulator += self.rate.max(0.0) * dt;
        let due = self.accumulator.floor();
        self.accumulator -= due;

        let room = cap.saturating_sub(particles.len());
        let n = (due as usize).min(room);
        for _ in 0..n {
            let pos = self.area.min + self.area.size() * Vec2::new(rng.random(), rng.random());
            let jitter = self.jitter
                * Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
            particles.push(Particle {
                pos,
                vel: self.velocity + jitter,
                ..self.template
            });
        }
        n
    }
}
