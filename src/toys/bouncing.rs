//! Bouncing balls: wall bounces and pairwise collisions

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{FrameInput, Toy, seeded_rng, unknown_control};
use crate::error::Result;
use crate::platform::{ControlSpec, ControlValue};
use crate::renderer::{Color, DrawList, palette};
use crate::sim::{Bounds, Disc, bounce_in_bounds, resolve_disc_pair};

const CONTROLS: &[ControlSpec] = &[
    ControlSpec::slider("gravity", "Gravity", 0.0, 1.0),
    ControlSpec::slider("restitution", "Bounciness", 0.3, 1.0),
    ControlSpec::checkbox("separate", "Push overlaps apart"),
    ControlSpec::button("shake", "Shake"),
];

const START_BALLS: usize = 12;
const MAX_BALLS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub disc: Disc,
    pub hue: f32,
}

pub struct Bouncing {
    seed: u64,
    rng: Pcg32,
    bounds: Bounds,

    balls: Vec<Ball>,

    gravity: f32,
    restitution: f32,
    separate: bool,
}

impl Bouncing {
    pub fn new(seed: u64, bounds: Bounds) -> Self {
        let mut toy = Self {
            seed,
            rng: seeded_rng(seed),
            bounds,
            balls: Vec::with_capacity(MAX_BALLS),
            gravity: 0.2,
            restitution: 0.9,
            separate: true,
        };
        toy.reset();
        toy
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn spawn(&mut self, pos: Vec2) {
        if self.balls.len() >= MAX_BALLS {
            return;
        }
        let radius = self.rng.random_range(8.0..=20.0);
        let vel = Vec2::new(
            self.rng.random_range(-4.0..=4.0),
            self.rng.random_range(-4.0..=0.0),
        );
        let hue = self.rng.random_range(0.0..360.0);
        self.balls.push(Ball {
            disc: Disc::new(pos, vel, radius),
            hue,
        });
    }

    fn shake(&mut self) {
        for ball in &mut self.balls {
            ball.disc.vel += Vec2::new(
                self.rng.random_range(-6.0..=6.0),
                self.rng.random_range(-10.0..=-4.0),
            );
        }
    }

    fn collide_pairs(&mut self) {
        let n = self.balls.len();
        for i in 0..n {
            let (head, tail) = self.balls.split_at_mut(i + 1);
            let a = &mut head[i].disc;
            for b in tail.iter_mut() {
                resolve_disc_pair(a, &mut b.disc, self.restitution, self.separate);
            }
        }
    }
}

impl Toy for Bouncing {
    fn name(&self) -> &'static str {
        "bouncing"
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.balls.clear();
        let area = self.bounds.expand(-20.0);
        for _ in 0..START_BALLS {
            let pos = Vec2::new(
                self.rng.random_range(area.min.x..=area.max.x.max(area.min.x)),
                self.rng.random_range(area.min.y..=area.max.y.max(area.min.y)),
            );
            self.spawn(pos);
        }
        log::info!("Bouncing reset with {} balls", self.balls.len());
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        if let Some(pos) = input.pressed {
            self.spawn(pos);
        }

        let gravity = Vec2::new(0.0, self.gravity);
        for ball in &mut self.balls {
            let d = &mut ball.disc;
            d.vel += gravity * dt;
            d.pos += d.vel * dt;
            bounce_in_bounds(&mut d.pos, &mut d.vel, d.radius, &self.bounds, self.restitution);
        }

        self.collide_pairs();

        // Separation can push a ball through a wall; pull it back in
        for ball in &mut self.balls {
            let d = &mut ball.disc;
            bounce_in_bounds(&mut d.pos, &mut d.vel, d.radius, &self.bounds, self.restitution);
        }
    }

    fn draw(&self, list: &mut DrawList) {
        list.clear(palette::BACKGROUND);
        for ball in &self.balls {
            list.circle(
                ball.disc.pos,
                ball.disc.radius,
                Color::hsla(ball.hue, 0.7, 0.6, 1.0),
            );
        }
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn population(&self) -> usize {
        self.balls.len()
    }

    fn controls(&self) -> &'static [ControlSpec] {
        CONTROLS
    }

    fn set_control(&mut self, id: &str, value: &ControlValue) -> Result<()> {
        match (id, value) {
            ("gravity", ControlValue::Number(v)) => self.gravity = *v,
            ("restitution", ControlValue::Number(v)) => self.restitution = *v,
            ("separate", ControlValue::Flag(on)) => self.separate = *on,
            ("shake", ControlValue::Pressed) => self.shake(),
            _ => return Err(unknown_control(self.name(), id)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::from_size(400.0, 300.0)
    }

    #[test]
    fn test_balls_stay_inside() {
        let mut toy = Bouncing::new(4, bounds());
        toy.set_control("shake", &ControlValue::Pressed).unwrap();
        for _ in 0..600 {
            toy.update(&FrameInput::default(), 1.0);
        }
        for ball in toy.balls() {
            let inner = bounds().expand(-ball.disc.radius + 1e-3);
            assert!(inner.contains(ball.disc.pos), "{:?}", ball.disc.pos);
            assert!(ball.disc.vel.is_finite());
        }
    }

    #[test]
    fn test_press_spawns_until_cap() {
        let mut toy = Bouncing::new(4, bounds());
        let input = FrameInput {
            pressed: Some(Vec2::new(200.0, 150.0)),
            ..Default::default()
        };
        for _ in 0..100 {
            toy.update(&input, 1.0);
        }
        assert_eq!(toy.population(), MAX_BALLS);
    }

    #[test]
    fn test_coincident_spawns_stay_finite() {
        let mut toy = Bouncing::new(4, bounds());
        toy.balls.clear();
        let input = FrameInput {
            pressed: Some(Vec2::new(100.0, 100.0)),
            ..Default::default()
        };
        toy.update(&input, 1.0);
        toy.balls.push(toy.balls[0]);
        for _ in 0..120 {
            toy.update(&FrameInput::default(), 1.0);
        }
        assert!(toy.balls().iter().all(|b| b.disc.pos.is_finite() && b.disc.vel.is_finite()));
    }

    #[test]
    fn test_energy_loss_with_low_restitution() {
        let mut toy = Bouncing::new(8, bounds());
        toy.set_control("restitution", &ControlValue::Number(0.3)).unwrap();
        for _ in 0..900 {
            toy.update(&FrameInput::default(), 1.0);
        }
        // Everything has settled near the floor
        let floor = bounds().max.y;
        assert!(toy.balls().iter().all(|b| b.disc.pos.y > floor - 150.0));
    }
}
