//! Frame-loop driver
//!
//! Turns platform frame timestamps into a whole number of fixed toy ticks,
//! then redraws once. One frame is fully processed before the next callback
//! is requested; stopping is a flag checked at the top of every frame.

use crate::consts::{FRAME_DT, MAX_FRAME_SECONDS, MAX_SUBSTEPS, TICK_SECONDS};
use crate::renderer::DrawList;
use crate::toys::{FrameInput, Toy};

/// Frames averaged for the FPS readout
const FPS_WINDOW: usize = 60;

#[derive(Debug, Clone)]
pub struct FrameLoop {
    accumulator: f64,
    last_time: Option<f64>,
    running: bool,
    ticks: u64,
    // FPS tracking
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_time: None,
            running: true,
            ticks: 0,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop; later frames do nothing and the platform stops rescheduling
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Total ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Feed a frame timestamp in milliseconds; returns how many ticks are due.
    ///
    /// The first frame runs exactly one tick. Long gaps are clamped to
    /// `MAX_FRAME_SECONDS` and at most `MAX_SUBSTEPS` ticks run per frame;
    /// time beyond that is dropped rather than carried over.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if !self.running {
            return 0;
        }

        let elapsed = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_SECONDS),
            None => TICK_SECONDS,
        };
        self.last_time = Some(now_ms);
        self.accumulator += elapsed;

        let mut substeps = 0;
        // Tolerance absorbs rounding in 1000/60 ms frame timestamps
        while self.accumulator + 1e-9 >= TICK_SECONDS && substeps < MAX_SUBSTEPS {
            self.accumulator = (self.accumulator - TICK_SECONDS).max(0.0);
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(TICK_SECONDS * 0.5);
        }
        self.ticks += substeps as u64;

        self.track_fps(now_ms);
        substeps
    }

    fn track_fps(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Oldest sample sits at the next write position
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((FPS_WINDOW - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    /// Run one platform frame: due ticks, then a fresh draw list.
    ///
    /// One-shot inputs are cleared after the first tick that sees them; if
    /// no tick is due they stay pending for the next frame.
    pub fn run_frame(
        &mut self,
        toy: &mut dyn Toy,
        input: &mut FrameInput,
        now_ms: f64,
        list: &mut DrawList,
    ) -> u32 {
        let substeps = self.advance(now_ms);
        if !self.running {
            return 0;
        }

        for _ in 0..substeps {
            toy.update(input, FRAME_DT);
            input.clear_one_shots();
        }

        list.reset();
        toy.draw(list);
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut fl = FrameLoop::new();
        assert_eq!(fl.advance(5000.0), 1);
    }

    #[test]
    fn test_steady_60hz_one_tick_per_frame() {
        let mut fl = FrameLoop::new();
        fl.advance(0.0);
        let total: u32 = (1..=120).map(|i| fl.advance(i as f64 * FRAME_MS)).sum();
        assert_eq!(total, 120);
        assert_eq!(fl.ticks(), 121);
    }

    #[test]
    fn test_120hz_display_ticks_every_other_frame() {
        let mut fl = FrameLoop::new();
        fl.advance(0.0);
        let total: u32 = (1..=120).map(|i| fl.advance(i as f64 * FRAME_MS / 2.0)).sum();
        assert!((59..=61).contains(&total), "total = {total}");
    }

    #[test]
    fn test_long_gap_is_capped() {
        let mut fl = FrameLoop::new();
        fl.advance(0.0);
        assert_eq!(fl.advance(10_000.0), MAX_SUBSTEPS);
        // Excess time was dropped, not queued
        assert!(fl.advance(10_000.0 + FRAME_MS) <= 2);
    }

    #[test]
    fn test_stop_halts_ticks() {
        let mut fl = FrameLoop::new();
        fl.advance(0.0);
        fl.stop();
        assert!(!fl.is_running());
        assert_eq!(fl.advance(FRAME_MS), 0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut fl = FrameLoop::new();
        for i in 1..=200 {
            fl.advance(i as f64 * FRAME_MS);
        }
        assert!((59..=61).contains(&fl.fps()), "fps = {}", fl.fps());
    }
}
