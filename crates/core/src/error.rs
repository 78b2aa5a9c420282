//! Error types for configuration parsing and session lifecycle.
//!
//! Classification and simulation are total and never produce these; errors
//! only arise where text or threads cross into the engine.

use thiserror::Error;

/// Invalid user configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown effect style '{0}' (expected trail, swirl, burst or blended)")]
    UnknownEffectStyle(String),

    #[error("unknown performance mode '{0}' (expected low, balanced or high)")]
    UnknownPerformanceMode(String),

    #[error("invalid color '{0}' (expected #rrggbb)")]
    InvalidColor(String),

    #[error("intensity must be within [0, 1], got {0}")]
    IntensityOutOfRange(f32),
}

/// Failure while running or tearing down a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{task} task failed: {source}")]
    TaskFailed {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}
