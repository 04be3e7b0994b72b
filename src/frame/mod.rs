// src/frame/mod.rs
//! Frame presentation support: cached-frame replay, frame-rate
//! throttling, performance sampling, and the idle placeholder.

pub mod cache;
pub mod limiter;
pub mod metrics;
pub mod placeholder;

pub use cache::FrameCache;
pub use limiter::FpsLimiter;
pub use metrics::{PerfSnapshot, PerformanceMetrics};
pub use placeholder::Placeholder;
