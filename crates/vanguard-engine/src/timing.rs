//! Frame timing.
//!
//! Outer frames run at the configured frame rate; the stage advances in
//! fixed ticks fed from an accumulator. Frame deltas come either from the
//! wall clock or from a simulated clock that advances by exactly one frame
//! budget per call.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Most fixed ticks run for one outer frame.
const MAX_UPDATES_PER_FRAME: u32 = 10;

/// Frame timing manager.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time budget per outer frame
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Accumulator for fixed ticks
    accumulator: f32,
    /// Fixed tick delta
    fixed_dt: f32,
    /// Maximum delta time to prevent spiral of death
    max_dt: f32,
    /// Follow the wall clock instead of simulating frames
    realtime: bool,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl FrameTiming {
    /// Create a timing manager for `frame_rate` outer frames and `tick_rate`
    /// fixed ticks per second.
    #[must_use]
    pub fn new(frame_rate: u32, tick_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        Self {
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(frame_rate)),
            last_frame: Instant::now(),
            accumulator: 0.0,
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            max_dt: 0.25,
            realtime: false,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Follow the wall clock and sleep out the frame budget.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Get the fixed tick delta.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Delta time for the next frame.
    ///
    /// Simulated clocks return the frame budget; realtime clocks return the
    /// measured time since the previous call, clamped to 250ms.
    pub fn delta_time(&mut self) -> f32 {
        let dt = if self.realtime {
            let now = Instant::now();
            let dt = (now - self.last_frame).as_secs_f32();
            self.last_frame = now;
            dt
        } else {
            self.frame_budget.as_secs_f32()
        };
        let clamped_dt = dt.min(self.max_dt);

        self.frame_times.push_back(clamped_dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }

        clamped_dt
    }

    /// Accumulate time for fixed ticks.
    /// Returns the number of ticks that should run.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_UPDATES_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Sleep for the remainder of the frame budget (realtime only).
    pub fn sleep_remainder(&self) {
        if !self.realtime {
            return;
        }

        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Get the average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }

    /// Reset timing (call after a pause).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.frame_times.clear();
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(60, 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_delta_is_frame_budget() {
        let mut timing = FrameTiming::new(50, 60);
        let dt = timing.delta_time();
        assert!((dt - 0.02).abs() < 1e-6);
        assert!((timing.average_frame_time_ms() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_accumulate_matching_rates() {
        let mut timing = FrameTiming::default();
        let mut ticks = 0;
        for _ in 0..60 {
            let dt = timing.delta_time();
            ticks += timing.accumulate(dt);
        }
        assert!((59..=60).contains(&ticks));
    }

    #[test]
    fn test_accumulate_slow_frames() {
        let mut timing = FrameTiming::new(30, 60);
        let dt = timing.delta_time();
        assert_eq!(timing.accumulate(dt + 1e-4), 2);
    }

    #[test]
    fn test_accumulate_spiral_guard() {
        let mut timing = FrameTiming::new(60, 100);
        assert_eq!(timing.accumulate(5.0), MAX_UPDATES_PER_FRAME);
        // Backlog dropped
        assert_eq!(timing.accumulate(0.0), 0);
    }

    #[test]
    fn test_zero_rates_clamped() {
        let timing = FrameTiming::new(0, 0);
        assert!((timing.fixed_dt() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut timing = FrameTiming::default();
        timing.delta_time();
        timing.accumulate(0.01);
        timing.reset();
        assert_eq!(timing.average_frame_time_ms(), 0.0);
        assert_eq!(timing.accumulate(0.0), 0);
    }
}
