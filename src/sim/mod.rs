//! Deterministic simulation building blocks
//!
//! Everything in here is pure:
//! - Explicit `dt` only (frames, 1.0 = one tick)
//! - Seeded RNG only, passed in by the caller
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod grid;
pub mod particle;
pub mod rules;

pub use collision::{
    CollisionResult, Disc, bounce_in_bounds, circle_bounds_collision, reflect_velocity,
    resolve_disc_pair,
};
pub use geometry::Bounds;
pub use grid::{CellField, CellRule, Grid, ScanOrder};
pub use particle::{Emitter, Particle, ParticleConfig, advance, emit_burst};
pub use rules::{LifeRule, Material, SandRule, WaveRule};
