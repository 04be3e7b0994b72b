// src/spectrum/mod.rs
//! Spectral data snapshots and the provider contract.

mod resample;
mod smoothing;

pub use resample::{resample_avg, resample_avg_into, resample_max, resample_max_into};
pub use smoothing::SmoothingBuffer;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// One completed spectrum snapshot: normalized magnitudes in `0..=1`.
#[derive(Debug, Clone)]
pub struct SpectralData {
    /// Ordered per-band magnitudes, each in `0..=1`.
    pub magnitudes: Vec<f32>,
    /// Capture time of the audio block this spectrum came from.
    pub timestamp: Instant,
}

impl SpectralData {
    /// Creates a snapshot stamped with the current time.
    pub fn new(magnitudes: Vec<f32>) -> Self {
        Self {
            magnitudes,
            timestamp: Instant::now(),
        }
    }

    /// True when the snapshot carries no bands.
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// Pull-based, non-blocking source of the latest completed spectrum.
///
/// Returns `None` until the first spectrum is ready. The engine never
/// blocks on this; a `None` frame falls back to the previous data or the
/// idle placeholder.
pub trait SpectrumSource: Send + Sync {
    /// Latest completed snapshot, or `None` if none is ready yet.
    fn latest(&self) -> Option<SpectralData>;
}

/// Single-writer, last-value-wins spectrum slot.
///
/// The audio/FFT producer publishes whole snapshots; the render thread
/// only ever observes a completed one, never a partial write.
#[derive(Default)]
pub struct SharedSpectrum {
    slot: Mutex<Option<SpectralData>>,
}

impl SharedSpectrum {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, data: SpectralData) {
        *self.slot.lock() = Some(data);
    }

    /// Clears the slot, e.g. when capture stops.
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}

impl SpectrumSource for SharedSpectrum {
    fn latest(&self) -> Option<SpectralData> {
        self.slot.lock().clone()
    }
}

/// Deterministic synthetic spectrum for headless demos and tests.
///
/// Produces a few drifting harmonic humps over a noise floor, which is
/// enough motion to exercise smoothing, peaks, and the frame cache.
pub struct SyntheticSource {
    bands: usize,
    phase: Mutex<f32>,
}

impl SyntheticSource {
    pub fn new(bands: usize) -> Self {
        Self {
            bands: bands.max(1),
            phase: Mutex::new(0.0),
        }
    }

    /// Advances the animation and returns the next snapshot.
    pub fn step(&self) -> SpectralData {
        let mut phase = self.phase.lock();
        *phase += 0.08;
        let t = *phase;
        drop(phase);

        let n = self.bands;
        let magnitudes = (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                // Low-end hump plus two moving resonances.
                let base = (1.0 - x).powi(2) * 0.55;
                let hump1 = (-(x - (0.3 + 0.15 * t.sin())).powi(2) / 0.004).exp() * 0.8;
                let hump2 = (-(x - (0.7 + 0.10 * (t * 0.7).cos())).powi(2) / 0.003).exp() * 0.6;
                let shimmer = ((t * 3.0 + i as f32 * 0.9).sin() * 0.05).abs();
                (base + hump1 + hump2 + shimmer).clamp(0.0, 1.0)
            })
            .collect();
        SpectralData::new(magnitudes)
    }
}

impl SpectrumSource for SyntheticSource {
    fn latest(&self) -> Option<SpectralData> {
        Some(self.step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_spectrum_is_last_value_wins() {
        let shared = SharedSpectrum::new();
        assert!(shared.latest().is_none());

        shared.publish(SpectralData::new(vec![0.1; 8]));
        shared.publish(SpectralData::new(vec![0.9; 8]));
        let latest = shared.latest().unwrap();
        assert_eq!(latest.magnitudes, vec![0.9; 8]);

        shared.invalidate();
        assert!(shared.latest().is_none());
    }

    #[test]
    fn synthetic_source_stays_normalized() {
        let source = SyntheticSource::new(32);
        for _ in 0..50 {
            let data = source.latest().unwrap();
            assert_eq!(data.magnitudes.len(), 32);
            assert!(data.magnitudes.iter().all(|m| (0.0..=1.0).contains(m)));
        }
    }
}
