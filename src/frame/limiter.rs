// src/frame/limiter.rs
//! Frame-rate throttling on a fixed-interval schedule.

use std::time::{Duration, Instant};

/// Admits at most `target_fps` frames per second.
///
/// Deadlines advance by a fixed interval rather than from the admission
/// time, so small per-frame jitter does not accumulate into drift. After
/// a long stall the schedule is resnapped to now instead of burst-firing
/// every missed frame.
pub struct FpsLimiter {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FpsLimiter {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: Self::interval_for(target_fps),
            next_deadline: None,
        }
    }

    fn interval_for(target_fps: u32) -> Duration {
        Duration::from_secs(1) / target_fps.max(1)
    }

    /// Changes the target rate; the current deadline is kept.
    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.interval = Self::interval_for(target_fps);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a frame may render at `now`. Admitting a frame advances
    /// the schedule.
    pub fn should_render(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.next_deadline else {
            // First frame renders immediately.
            self.next_deadline = Some(now + self.interval);
            return true;
        };
        if now < deadline {
            return false;
        }
        // Resnap after falling more than one interval behind.
        let behind = now.duration_since(deadline);
        self.next_deadline = if behind > self.interval {
            Some(now + self.interval)
        } else {
            Some(deadline + self.interval)
        };
        true
    }

    /// How long the caller may sleep before the next admission.
    pub fn sleep_hint(&self, now: Instant) -> Duration {
        match self.next_deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Forgets the schedule; the next frame renders immediately.
    pub fn reset(&mut self) {
        self.next_deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_admitted() {
        let mut limiter = FpsLimiter::new(60);
        assert!(limiter.should_render(Instant::now()));
    }

    #[test]
    fn back_to_back_frames_are_throttled() {
        let mut limiter = FpsLimiter::new(60);
        let t0 = Instant::now();
        assert!(limiter.should_render(t0));
        assert!(!limiter.should_render(t0 + Duration::from_millis(1)));
        assert!(limiter.should_render(t0 + Duration::from_millis(17)));
    }

    #[test]
    fn schedule_does_not_drift() {
        let mut limiter = FpsLimiter::new(100);
        let t0 = Instant::now();
        assert!(limiter.should_render(t0));

        // Each frame arrives 2ms late; over 10 frames the cadence must
        // stay at 10ms, not stretch to 12ms.
        let mut admitted = 0;
        for i in 1..=10u64 {
            if limiter.should_render(t0 + Duration::from_millis(i * 10 + 2)) {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }

    #[test]
    fn stall_resnaps_instead_of_bursting() {
        let mut limiter = FpsLimiter::new(100);
        let t0 = Instant::now();
        assert!(limiter.should_render(t0));

        // One second of stall must admit a single catch-up frame, then
        // throttle again.
        let t1 = t0 + Duration::from_secs(1);
        assert!(limiter.should_render(t1));
        assert!(!limiter.should_render(t1 + Duration::from_millis(1)));
    }

    #[test]
    fn sleep_hint_counts_down() {
        let mut limiter = FpsLimiter::new(50);
        let t0 = Instant::now();
        limiter.should_render(t0);
        let hint = limiter.sleep_hint(t0 + Duration::from_millis(5));
        assert!(hint <= Duration::from_millis(15));
        assert!(hint >= Duration::from_millis(10));
    }
}
