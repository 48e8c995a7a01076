//! Rolling frame-rate tracker.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frames kept in the rolling average
const WINDOW: usize = 60;

pub struct FpsTracker {
    frame_times: VecDeque<Duration>,
    last_frame: Instant,
    last_report: Instant,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(WINDOW),
            last_frame: now,
            last_report: now,
        }
    }

    /// Record a frame finishing now; logs the average once per second
    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    fn record_frame_at(&mut self, now: Instant) {
        let frame_time = now - self.last_frame;
        self.last_frame = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > WINDOW {
            self.frame_times.pop_front();
        }

        if now - self.last_report > Duration::from_secs(1) {
            log::info!("FPS: {:.1}", self.current_fps());
            self.last_report = now;
        }
    }

    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total.as_secs_f32() / self.frame_times.len() as f32;

        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tracker_reports_zero() {
        assert_eq!(FpsTracker::new().current_fps(), 0.0);
    }

    #[test]
    fn test_average_over_steady_frames() {
        let start = Instant::now();
        let mut tracker = FpsTracker::starting_at(start);

        for i in 1..=10 {
            tracker.record_frame_at(start + Duration::from_millis(20 * i));
        }

        assert!((tracker.current_fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_window_drops_old_frames() {
        let start = Instant::now();
        let mut tracker = FpsTracker::starting_at(start);
        let mut now = start;

        // Slow frames first, then a full window of fast ones
        for _ in 0..10 {
            now += Duration::from_millis(100);
            tracker.record_frame_at(now);
        }
        for _ in 0..WINDOW {
            now += Duration::from_millis(10);
            tracker.record_frame_at(now);
        }

        assert_eq!(tracker.frame_times.len(), WINDOW);
        assert!((tracker.current_fps() - 100.0).abs() < 0.01);
    }
}
