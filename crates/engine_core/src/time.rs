//! Time management for the frame loop.

use std::time::{Duration, Instant};

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time when the loop started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a time manager whose first frame is measured from `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.advance_to(Instant::now());
    }

    /// Advance the clock to an explicit timestamp.
    pub fn advance_to(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.elapsed = now.saturating_duration_since(self.start_time);
        self.frame_count += 1;
    }

    /// Get the delta time in milliseconds (the unit gameplay timers run on).
    pub fn delta_millis(&self) -> f32 {
        self.delta.as_secs_f32() * 1000.0
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_tracks_time_between_frames() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.advance_to(start + Duration::from_millis(16));
        assert!((time.delta_millis() - 16.0).abs() < 1e-3);
        time.advance_to(start + Duration::from_millis(50));
        assert!((time.delta_millis() - 34.0).abs() < 1e-3);
        assert!((time.elapsed_seconds() - 0.05).abs() < 1e-6);
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn first_delta_is_zero() {
        let time = Time::starting_at(Instant::now());
        assert_eq!(time.delta_millis(), 0.0);
        assert_eq!(time.frame_count(), 0);
    }
}
