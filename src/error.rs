// src/error.rs
//! Error types for the rendering engine.

use crate::config::RenderStyle;
use crate::pool::PoolError;

/// Result alias carrying the engine error type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Common error type for the engine crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No renderer constructor is registered for the requested style.
    #[error("no renderer registered for style `{0}`")]
    UnknownStyle(RenderStyle),

    /// Renderer creation was cancelled before it committed.
    #[error("renderer creation for `{0}` was cancelled")]
    Cancelled(RenderStyle),

    /// An operation was attempted on a disposed component.
    #[error("{0} used after dispose")]
    Disposed(&'static str),

    /// A drawing surface could not be allocated or has invalid dimensions.
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    /// A drawing resource failed to allocate or clone.
    #[error("drawing resource failure: {0}")]
    Resource(String),

    /// Object pool failure.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Wrapper around standard IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a resource error from any displayable cause.
    pub fn resource<T: std::fmt::Display>(cause: T) -> Self {
        Self::Resource(cause.to_string())
    }
}
