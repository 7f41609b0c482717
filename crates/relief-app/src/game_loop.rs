//! Fixed-rate update ticks decoupled from the redraw rate.
//!
//! Terrain rotation advances a constant amount per tick, so ticks must run at
//! a steady 60 Hz no matter how fast the surface presents.

use std::time::Instant;

use tracing::warn;

/// Update tick length: 60 Hz.
pub const TICK_DT: f64 = 1.0 / 60.0;

/// Longest frame the accumulator will absorb. Anything slower is clamped and
/// the simulation runs slow instead of bursting through catch-up ticks.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator over measured frame time.
///
/// [`advance`](Self::advance) is pure and takes the elapsed time explicitly;
/// [`frame`](Self::frame) measures it against the wall clock.
#[derive(Debug)]
pub struct FixedTimestep {
    last_frame: Instant,
    accumulator: f64,
    ticks: u64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedTimestep {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Feed `elapsed` seconds into the accumulator and return how many update
    /// ticks are now due.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        let mut elapsed = elapsed.max(0.0);
        if elapsed > MAX_FRAME_TIME {
            warn!(
                "Frame took {:.1}ms, clamping to {:.1}ms",
                elapsed * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            elapsed = MAX_FRAME_TIME;
        }

        self.accumulator += elapsed;
        let mut due = 0;
        while self.accumulator >= TICK_DT {
            self.accumulator -= TICK_DT;
            due += 1;
        }
        self.ticks += u64::from(due);
        due
    }

    /// Measure time since the previous frame, run `update` once per due tick,
    /// and return the number of ticks run.
    pub fn frame(&mut self, mut update: impl FnMut(f64)) -> u32 {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let due = self.advance(elapsed.as_secs_f64());
        for _ in 0..due {
            update(TICK_DT);
        }
        due
    }

    /// Restart timing from now without running ticks for the gap, e.g. after
    /// the window was minimized.
    pub fn reset_clock(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
    }

    /// Ticks run since construction.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_frame_runs_no_tick() {
        let mut step = FixedTimestep::new();
        assert_eq!(step.advance(0.010), 0);
        assert_eq!(step.tick_count(), 0);
    }

    #[test]
    fn test_accumulates_across_frames() {
        let mut step = FixedTimestep::new();
        assert_eq!(step.advance(0.010), 0);
        assert_eq!(step.advance(0.010), 1);
        // 20 ms leaves ~3.3 ms over, so another 10 ms completes a tick.
        assert_eq!(step.advance(0.010), 0);
        assert_eq!(step.advance(0.010), 1);
        assert_eq!(step.tick_count(), 2);
    }

    #[test]
    fn test_one_second_is_sixty_ticks() {
        let mut step = FixedTimestep::new();
        let mut total = 0;
        for _ in 0..100 {
            total += step.advance(0.01);
        }
        // Accumulated float error may leave the last tick just short.
        assert!((59..=60).contains(&total), "{total}");
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut step = FixedTimestep::new();
        let due = step.advance(5.0);
        // 250 ms is 15 ticks, give or take float error on the last one.
        assert!((14..=15).contains(&due), "{due}");
    }

    #[test]
    fn test_negative_elapsed_ignored() {
        let mut step = FixedTimestep::new();
        assert_eq!(step.advance(-1.0), 0);
        // Nothing was subtracted from the accumulator.
        assert_eq!(step.advance(0.010), 0);
        assert_eq!(step.advance(0.010), 1);
    }

    #[test]
    fn test_ticks_never_outrun_elapsed_time() {
        let mut step = FixedTimestep::new();
        let mut elapsed_total = 0.0;
        for elapsed in [0.003, 0.017, 0.1, 0.033, 0.0166] {
            step.advance(elapsed);
            elapsed_total += elapsed;
            let simulated = step.tick_count() as f64 * TICK_DT;
            assert!(simulated <= elapsed_total + 1e-9);
            assert!(elapsed_total - simulated < TICK_DT);
        }
    }

    #[test]
    fn test_reset_clock_drops_accumulated_time() {
        let mut step = FixedTimestep::new();
        step.advance(0.01);
        step.reset_clock();
        // Without the reset these 10 ms would complete a tick.
        assert_eq!(step.advance(0.01), 0);
    }

    #[test]
    fn test_frame_calls_update_per_tick() {
        let mut step = FixedTimestep::new();
        let mut calls = 0;
        let due = step.frame(|dt| {
            assert_eq!(dt, TICK_DT);
            calls += 1;
        });
        assert_eq!(calls, due);
    }
}
