//! Fireworks: rockets that burst into rings of sparks

use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, seeded_rng, unknown_control};
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, palette};
use crate::settings::Settings;
use crate::sim::{Bounds, Particle, ParticleConfig, advance, emit_burst};

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::slider("gravity", "Gravity", 0.0, 0.3),
    ControlSpec::slider("sparks", "Sparks per burst", 10.0, 200.0),
    ControlSpec::checkbox("auto", "Auto launch"),
];

const BURST_SPEED: RangeInclusive<f32> = 2.0..=6.0;
const SPARK_DRAG: f32 = 0.98;
/// Frames between automatic launches
const LAUNCH_GAP: RangeInclusive<f32> = 20.0..=60.0;
/// Frames from launch to burst
const FUSE: RangeInclusive<f32> = 40.0..=60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rocket {
    pos: Vec2,
    vel: Vec2,
    fuse: f32,
    hue: f32,
}

pub struct Fireworks {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,
    max_particles: usize,
    trails: bool,

    rockets: Vec<Rocket>,
    sparks: Vec<Particle>,
    launch_timer: f32,

    // Controls
    gravity: f32,
    spark_count: usize,
    auto_launch: bool,
}

impl Fireworks {
    pub fn new(seed: u64, bounds: Bounds, settings: &Settings) -> Self {
        Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            max_particles: settings.max_particles(),
            trails: settings.effective_trails(),
            rockets: Vec::new(),
            sparks: Vec::new(),
            launch_timer: 0.0,
            gravity: 0.08,
            spark_count: 50,
            auto_launch: true,
        }
    }

    pub fn sparks(&self) -> &[Particle] {
        &self.sparks
    }

    pub fn rocket_count(&self) -> usize {
        self.rockets.len()
    }

    /// Launch a rocket from the bottom edge that bursts at `target`
    pub fn launch(&mut self, target: Vec2) {
        let target = self.bounds.clamp(target);
        let start = Vec2::new(
            self.rng.random_range(self.bounds.min.x..=self.bounds.max.x),
            self.bounds.max.y,
        );
        let fuse = self.rng.random_range(FUSE);
        let hue = self.rng.random_range(0.0..360.0);
        self.rockets.push(Rocket {
            pos: start,
            vel: (target - start) / fuse,
            fuse,
            hue,
        });
    }

    fn random_target(&mut self) -> Vec2 {
        let b = self.bounds;
        Vec2::new(
            b.min.x + b.width() * self.rng.random_range(0.2..=0.8),
            b.min.y + b.height() * self.rng.random_range(0.15..=0.45),
        )
    }

    fn burst(&mut self, rocket: &Rocket) {
        let template = Particle {
            decay: self.rng.random_range(0.012..=0.02),
            size: 2.0,
            hue: rocket.hue,
            ..Default::default()
        };
        emit_burst(
            &mut self.sparks,
            rocket.pos,
            self.spark_count,
            BURST_SPEED,
            &template,
            &mut self.rng,
            self.max_particles,
        );
    }

    fn spark_config(&self) -> ParticleConfig {
        ParticleConfig::new(self.bounds)
            .with_gravity(self.gravity)
            .with_drag(SPARK_DRAG)
    }
}

impl Toy for Fireworks {
    fn name(&self) -> &'static str {
        "fireworks"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.rockets.clear();
        self.sparks.clear();
        self.launch_timer = 0.0;
        log::info!("Fireworks reset");
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        if let Some(target) = input.pressed {
            self.launch(target);
        }

        if self.auto_launch {
            self.launch_timer -= dt;
            if self.launch_timer <= 0.0 {
                let target = self.random_target();
                self.launch(target);
                self.launch_timer = self.rng.random_range(LAUNCH_GAP);
            }
        }

        // Rockets fly straight; gravity only acts on sparks
        let mut burst = Vec::new();
        self.rockets.retain_mut(|r| {
            r.pos += r.vel * dt;
            r.fuse -= dt;
            if r.fuse <= 0.0 {
                burst.push(*r);
                false
            } else {
                true
            }
        });
        for rocket in &burst {
            self.burst(rocket);
        }

        let config = self.spark_config();
        advance(&mut self.sparks, dt, &config);
    }

    fn draw(&self, list: &mut DrawList) {
        list.clear(if self.trails {
            palette::FADE
        } else {
            palette::BACKGROUND
        });

        for r in &self.rockets {
            list.circle(r.pos, 2.5, Color::hsla(r.hue, 1.0, 0.8, 1.0));
        }
        for p in &self.sparks {
            list.circle(p.pos, p.size, Color::hsla(p.hue, 1.0, 0.6, p.opacity()));
        }
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn population(&self) -> usize {
        self.rockets.len() + self.sparks.len()
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("gravity", ControlValue::Number(v)) => self.gravity = *v,
            ("sparks", ControlValue::Number(v)) => self.spark_count = v.round() as usize,
            ("auto", ControlValue::Flag(on)) => self.auto_launch = *on,
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> Fireworks {
        let mut fw = Fireworks::new(9, Bounds::from_size(400.0, 300.0), &Settings::default());
        fw.set_control("auto", &ControlValue::Flag(false)).unwrap();
        fw
    }

    fn run(fw: &mut Fireworks, frames: usize) {
        for _ in 0..frames {
            fw.update(&FrameInput::default(), 1.0);
        }
    }

    #[test]
    fn test_idle_without_auto_launch() {
        let mut fw = quiet();
        run(&mut fw, 120);
        assert_eq!(fw.population(), 0);
    }

    #[test]
    fn test_press_launches_then_bursts() {
        let mut fw = quiet();
        let input = FrameInput {
            pressed: Some(Vec2::new(200.0, 80.0)),
            ..Default::default()
        };
        fw.update(&input, 1.0);
        assert_eq!(fw.rocket_count(), 1);

        run(&mut fw, 61);
        assert_eq!(fw.rocket_count(), 0);
        assert_eq!(fw.sparks().len(), 50);
        // Sparks start near the target
        let center = fw.sparks().iter().map(|p| p.pos).sum::<Vec2>() / 50.0;
        assert!(center.distance(Vec2::new(200.0, 80.0)) < 40.0);
    }

    #[test]
    fn test_sparks_burn_out() {
        let mut fw = quiet();
        fw.launch(Vec2::new(200.0, 100.0));
        run(&mut fw, 61);
        assert!(!fw.sparks().is_empty());
        // Slowest decay is 0.012/frame
        run(&mut fw, 100);
        assert_eq!(fw.population(), 0);
    }

    #[test]
    fn test_spark_cap_from_settings() {
        let settings = Settings {
            quality: crate::QualityPreset::Low,
            ..Default::default()
        };
        let mut fw = Fireworks::new(1, Bounds::from_size(400.0, 300.0), &settings);
        fw.set_control("auto", &ControlValue::Flag(false)).unwrap();
        fw.set_control("sparks", &ControlValue::Number(200.0)).unwrap();
        for _ in 0..3 {
            fw.launch(Vec2::new(200.0, 100.0));
        }
        run(&mut fw, 61);
        assert!(fw.sparks().len() <= 300);
    }

    #[test]
    fn test_auto_launch_fires() {
        let mut fw = Fireworks::new(2, Bounds::from_size(400.0, 300.0), &Settings::default());
        fw.update(&FrameInput::default(), 1.0);
        assert_eq!(fw.rocket_count(), 1);
    }

    #[test]
    fn test_wrong_value_kind_rejected() {
        let mut fw = quiet();
        assert!(fw.set_control("gravity", &ControlValue::Flag(true)).is_err());
    }
}
