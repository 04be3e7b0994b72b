// src/frame/metrics.rs
//! Rolling frame-time sampling and process memory readings.

use std::collections::VecDeque;
use std::time::Duration;

/// Frames kept in the rolling window.
const WINDOW: usize = 120;

/// Point-in-time performance reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfSnapshot {
    /// Frames per second derived from the average frame time.
    pub fps: f32,
    /// Mean frame time over the window, in milliseconds.
    pub avg_frame_ms: f32,
    /// Worst frame time over the window, in milliseconds.
    pub worst_frame_ms: f32,
    /// Resident set size in megabytes, when the platform exposes it.
    pub rss_mb: Option<f32>,
}

/// Sink for frame-time samples and source of rolling statistics.
pub struct PerformanceMetrics {
    samples: VecDeque<Duration>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW),
        }
    }

    /// Records the duration of one rendered frame.
    pub fn record_frame(&mut self, elapsed: Duration) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Current rolling statistics; `None` until at least one frame was
    /// recorded.
    pub fn snapshot(&self) -> Option<PerfSnapshot> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        let avg = total / self.samples.len() as u32;
        let worst = self.samples.iter().max().copied().unwrap_or(avg);
        let avg_ms = avg.as_secs_f32() * 1000.0;
        let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
        Some(PerfSnapshot {
            fps,
            avg_frame_ms: avg_ms,
            worst_frame_ms: worst.as_secs_f32() * 1000.0,
            rss_mb: read_rss_mb(),
        })
    }

    /// Drops all samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Resident set size of this process in megabytes.
#[cfg(target_os = "linux")]
fn read_rss_mb() -> Option<f32> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    let page_size = 4096u64;
    Some((resident_pages * page_size) as f32 / (1024.0 * 1024.0))
}

#[cfg(not(target_os = "linux"))]
fn read_rss_mb() -> Option<f32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics_have_no_snapshot() {
        let metrics = PerformanceMetrics::new();
        assert!(metrics.snapshot().is_none());
    }

    #[test]
    fn snapshot_reflects_samples() {
        let mut metrics = PerformanceMetrics::new();
        metrics.record_frame(Duration::from_millis(10));
        metrics.record_frame(Duration::from_millis(20));
        let snap = metrics.snapshot().unwrap();
        assert!((snap.avg_frame_ms - 15.0).abs() < 0.5);
        assert!((snap.worst_frame_ms - 20.0).abs() < 0.5);
        assert!((snap.fps - 1000.0 / 15.0).abs() < 2.0);
    }

    #[test]
    fn window_is_bounded() {
        let mut metrics = PerformanceMetrics::new();
        for _ in 0..(WINDOW + 50) {
            metrics.record_frame(Duration::from_millis(16));
        }
        assert_eq!(metrics.sample_count(), WINDOW);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn rss_is_readable_on_linux() {
        assert!(read_rss_mb().is_some_and(|mb| mb > 0.0));
    }
}
