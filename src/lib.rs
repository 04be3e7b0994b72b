// src/lib.rs
//! Wavescope - a real-time audio-spectrum rendering engine.
//!
//! The engine turns a stream of normalized FFT magnitudes into styled
//! frames on a pixel canvas: a factory caches one renderer per visual
//! style, a per-surface orchestrator decides between placeholder, cached
//! frame, and live render, and a shared renderer core handles smoothing,
//! resampling, layout, and resource pooling.

pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod frame;
pub mod pool;
pub mod render;
pub mod spectrum;

pub use config::{RenderQuality, RenderStyle};
pub use engine::{BrushProvider, FrameResult, RenderContext, SurfaceRenderer};
pub use error::{EngineError, Result};
pub use factory::{CancelFlag, RendererFactory};
pub use render::{Brush, SpectrumRenderer};
pub use spectrum::{SpectralData, SpectrumSource};
