//! Toybox - small canvas toys on a shared simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation building blocks (particles, grids, collisions)
//! - `toys`: One owned state struct per toy, driven through the `Toy` trait
//! - `renderer`: Pure draw lists and pixel buffers
//! - `platform`: Surface sizing, coordinate mapping, controls, frame loop
//! - `audio`: Procedural sample generators and Web Audio voices

pub mod audio;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod toys;

pub use error::{Result, ToyError};
pub use settings::{QualityPreset, Settings};
pub use toys::{FrameInput, Toy};

use glam::Vec2;

/// Toy loop configuration constants
pub mod consts {
    /// Simulation tick rate; one tick is one "frame" of toy time
    pub const TICK_RATE_HZ: f64 = 60.0;
    /// Wall-clock length of one tick
    pub const TICK_SECONDS: f64 = 1.0 / TICK_RATE_HZ;
    /// Toy-time step passed to `update` per tick (velocities are pixels/frame)
    pub const FRAME_DT: f32 = 1.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame the loop will try to catch up on (tab switches etc.)
    pub const MAX_FRAME_SECONDS: f64 = 0.1;

    /// Default surface size for headless runs
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
