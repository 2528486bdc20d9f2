//! Fixed-rate frame clock

use crate::consts::{MAX_SUBSTEPS, TICKS_PER_SECOND};

/// Longest frame accepted before clamping (seconds)
pub const MAX_FRAME_SECS: f32 = 0.25;

/// Accumulates wall time and hands out whole simulation ticks
#[derive(Debug, Clone)]
pub struct FrameClock {
    tick_rate: f32,
    accumulator: f32,
    paused: bool,
}

impl FrameClock {
    /// `tick_rate` in ticks per second
    pub fn new(tick_rate: f32) -> Self {
        Self {
            tick_rate: tick_rate.max(1.0),
            accumulator: 0.0,
            paused: false,
        }
    }

    /// Seconds per tick
    pub fn step(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Normalized delta for one tick (1.0 == one 60 Hz frame)
    pub fn delta(&self) -> f32 {
        TICKS_PER_SECOND / self.tick_rate
    }

    /// Add elapsed wall time and return how many ticks to run now
    ///
    /// At most `MAX_SUBSTEPS` ticks are returned per call; time beyond that
    /// is dropped rather than carried into the next frame.
    pub fn advance(&mut self, elapsed_secs: f32) -> u32 {
        if self.paused || !(elapsed_secs > 0.0) {
            return 0;
        }
        self.accumulator += elapsed_secs.min(MAX_FRAME_SECS);

        let step = self.step();
        let mut ticks = 0;
        while self.accumulator >= step && ticks < MAX_SUBSTEPS {
            self.accumulator -= step;
            ticks += 1;
        }
        if self.accumulator >= step {
            log::debug!("Frame clock dropped {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        ticks
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume without replaying time spent paused
    pub fn resume(&mut self) {
        self.paused = false;
        self.accumulator = 0.0;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(0.01), 0);
        assert_eq!(clock.advance(0.01), 1);
        assert_eq!(clock.delta(), 1.0);
    }

    #[test]
    fn test_caps_substeps_and_drops_backlog() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(0.2), MAX_SUBSTEPS);
        assert_eq!(clock.advance(0.001), 0);
    }

    #[test]
    fn test_paused_time_is_excluded() {
        let mut clock = FrameClock::default();
        clock.advance(0.015);
        clock.pause();
        assert_eq!(clock.advance(1.0), 0);
        clock.resume();
        assert!(!clock.is_paused());
        assert_eq!(clock.advance(0.015), 0);
        assert_eq!(clock.advance(0.002), 1);
    }

    #[test]
    fn test_faster_tick_rate_shrinks_delta() {
        let clock = FrameClock::new(120.0);
        assert_eq!(clock.delta(), 0.5);
    }
}
