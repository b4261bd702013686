//! Targets: fling a ball at the pointer, knock out every target
//!
//! Each level is a handful of platforms and targets drawn from the toy's
//! RNG. Clearing a level starts a short celebration with confetti, then the
//! next level is generated.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, seeded_rng, unknown_control};
use crate::audio::NoteEvent;
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, palette};
use crate::settings::Settings;
use crate::sim::{
    Bounds, Disc, Particle, ParticleConfig, advance, bounce_in_bounds, circle_bounds_collision,
    emit_burst, reflect_velocity,
};

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::slider("power", "Launch power", 0.02, 0.1),
    ControlSpec::button("skip", "New level"),
];

const GRAVITY: f32 = 0.25;
const BALL_RADIUS: f32 = 8.0;
const TARGET_RADIUS: f32 = 12.0;
const MAX_LAUNCH_SPEED: f32 = 16.0;
const RESTITUTION: f32 = 0.7;
const PLATFORMS: usize = 3;
const TARGETS: usize = 3;
/// Frames of celebration before the next level
const CELEBRATION_FRAMES: f32 = 120.0;
/// A shot ends after this long even if the ball keeps rolling
const MAX_FLIGHT_FRAMES: f32 = 600.0;
const REST_SPEED: f32 = 0.2;

pub struct Targets {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,
    max_particles: usize,

    ball: Disc,
    in_flight: bool,
    flight_time: f32,

    platforms: Vec<Bounds>,
    targets: Vec<Vec2>,
    confetti: Vec<Particle>,

    level: u32,
    score: u32,
    celebrating: bool,
    celebration_timer: f32,
    aim: Option<Vec2>,
    notes: Vec<NoteEvent>,

    power: f32,
}

impl Targets {
    pub fn new(seed: u64, bounds: Bounds, settings: &Settings) -> Self {
        let mut toy = Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            max_particles: settings.max_particles(),
            ball: Disc::new(Vec2::ZERO, Vec2::ZERO, BALL_RADIUS),
            in_flight: false,
            flight_time: 0.0,
            platforms: Vec::new(),
            targets: Vec::new(),
            confetti: Vec::new(),
            level: 1,
            score: 0,
            celebrating: false,
            celebration_timer: 0.0,
            aim: None,
            notes: Vec::new(),
            power: 0.05,
        };
        toy.reset();
        toy
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn targets(&self) -> &[Vec2] {
        &self.targets
    }

    pub fn ball(&self) -> &Disc {
        &self.ball
    }

    fn launcher(&self) -> Vec2 {
        Vec2::new(self.bounds.min.x + 40.0, self.bounds.max.y - 40.0)
    }

    fn park_ball(&mut self) {
        self.ball = Disc::new(self.launcher(), Vec2::ZERO, BALL_RADIUS);
        self.in_flight = false;
        self.flight_time = 0.0;
    }

    /// Launch toward `target`; ignored while a shot is in the air
    pub fn launch(&mut self, target: Vec2) -> bool {
        if self.in_flight || self.celebrating {
            return false;
        }
        let vel = (target - self.launcher()) * self.power;
        self.ball.vel = vel.clamp_length_max(MAX_LAUNCH_SPEED);
        self.in_flight = true;
        self.flight_time = 0.0;
        true
    }

    fn generate_level(&mut self) {
        let b = self.bounds;
        let at = |fx: f32, fy: f32| b.min + b.size() * Vec2::new(fx, fy);

        self.platforms.clear();
        self.targets.clear();
        for _ in 0..PLATFORMS {
            let origin = at(
                self.rng.random_range(0.35..=0.8),
                self.rng.random_range(0.3..=0.8),
            );
            let size = Vec2::new(b.width() * self.rng.random_range(0.08..=0.15), 10.0);
            self.platforms.push(Bounds::from_origin_size(origin, size));
        }
        for _ in 0..TARGETS {
            self.targets.push(at(
                self.rng.random_range(0.4..=0.95),
                self.rng.random_range(0.15..=0.7),
            ));
        }
        self.park_ball();
        log::info!("Targets level {} generated", self.level);
    }

    fn confetti_burst(&mut self, origin: Vec2, count: usize) {
        let template = Particle {
            decay: 0.015,
            size: 3.0,
            hue: self.rng.random_range(0.0..360.0),
            ..Default::default()
        };
        emit_burst(
            &mut self.confetti,
            origin,
            count,
            1.0..=5.0,
            &template,
            &mut self.rng,
            self.max_particles,
        );
    }

    fn step_ball(&mut self, dt: f32) {
        let ball = &mut self.ball;
        ball.vel.y += GRAVITY * dt;
        ball.pos += ball.vel * dt;
        bounce_in_bounds(&mut ball.pos, &mut ball.vel, ball.radius, &self.bounds, RESTITUTION);

        for platform in &self.platforms {
            let hit = circle_bounds_collision(ball.pos, ball.radius, platform);
            if hit.hit {
                ball.pos += hit.normal * hit.penetration;
                if ball.vel.dot(hit.normal) < 0.0 {
                    ball.vel = reflect_velocity(ball.vel, hit.normal) * RESTITUTION;
                }
            }
        }

        let reach = ball.radius + TARGET_RADIUS;
        let pos = ball.pos;
        let before = self.targets.len();
        let mut hits = Vec::new();
        self.targets.retain(|t| {
            let hit = t.distance(pos) < reach;
            if hit {
                hits.push(*t);
            }
            !hit
        });
        for t in hits {
            self.score += 1;
            self.notes.push(NoteEvent {
                midi: 72 + (self.score % 12) as u8,
                duration: 0.15,
                velocity: 0.6,
            });
            self.confetti_burst(t, 12);
        }

        if before > 0 && self.targets.is_empty() {
            self.celebrating = true;
            self.celebration_timer = CELEBRATION_FRAMES;
            let center = self.bounds.center();
            self.confetti_burst(center, 120);
            log::info!("Targets level {} cleared, score {}", self.level, self.score);
        }

        self.flight_time += dt;
        let floor = self.bounds.max.y - self.ball.radius;
        let resting = self.ball.vel.length() < REST_SPEED && self.ball.pos.y >= floor - 0.5;
        if resting || self.flight_time >= MAX_FLIGHT_FRAMES {
            self.park_ball();
        }
    }
}

impl Toy for Targets {
    fn name(&self) -> &'static str {
        "targets"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.confetti.clear();
        self.notes.clear();
        self.level = 1;
        self.score = 0;
        self.celebrating = false;
        self.celebration_timer = 0.0;
        self.aim = None;
        self.generate_level();
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        self.aim = input.pointer;
        if let Some(target) = input.pressed {
            self.launch(target);
        }

        if self.in_flight {
            self.step_ball(dt);
        }

        if self.celebrating {
            self.celebration_timer -= dt;
            if self.celebration_timer <= 0.0 {
                self.celebrating = false;
                self.level += 1;
                self.generate_level();
            }
        }

        let config = ParticleConfig::new(self.bounds).with_gravity(0.1).with_drag(0.97);
        advance(&mut self.confetti, dt, &config);
    }

    fn draw(&self, list: &mut DrawList) {
        list.clear(palette::BACKGROUND);

        for p in &self.platforms {
            list.rect(*p, palette::PLATFORM);
        }
        for t in &self.targets {
            list.circle(*t, TARGET_RADIUS, palette::TARGET);
        }
        if let (false, Some(aim)) = (self.in_flight, self.aim) {
            list.line(self.launcher(), aim, 1.0, palette::GRID_LINE);
        }
        list.circle(self.ball.pos, self.ball.radius, palette::BALL);
        for c in &self.confetti {
            list.rect(
                Bounds::from_origin_size(c.pos, Vec2::splat(c.size)),
                Color::hsla(c.hue + c.pos.x, 0.9, 0.6, c.opacity()),
            );
        }

        let hud = format!("Level {}  Score {}", self.level, self.score);
        list.text(self.bounds.min + Vec2::new(10.0, 20.0), hud, 16.0, Color::WHITE);
        if self.celebrating {
            list.text(self.bounds.center(), "Level clear!", 32.0, Color::WHITE);
        }
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.generate_level();
    }

    fn population(&self) -> usize {
        self.targets.len() + self.confetti.len()
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("power", ControlValue::Number(v)) => self.power = *v,
            ("skip", ControlValue::Pressed) => {
                self.celebrating = false;
                self.level += 1;
                self.generate_level();
            }
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }

    fn drain_notes(&mut self) -> Vec<NoteEvent> {
        std::mem::take(&mut self.notes)
    }
}
