//! Error types for engine setup.
//!
//! Only configuration can fail. Once `PingPongEngine::configure` has
//! succeeded, every per-sample operation is total: indices wrap, setters
//! accept any value, and loudness problems are reported, not raised.

use thiserror::Error;

/// Errors raised while configuring the engine or resolving parameter names.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The host handed us a sample rate that is zero, negative or not finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// The configured maximum delay time cannot size a delay line.
    #[error("maximum delay time must be positive and finite, got {0} ms")]
    InvalidMaxDelay(f32),

    /// The read/write offset leaves no room for the interpolation taps.
    #[error("initial latency of {latency} samples is below the minimum of {minimum}")]
    LatencyTooSmall {
        /// Latency that was requested.
        latency: usize,
        /// Smallest latency that keeps every tap behind the write index.
        minimum: usize,
    },

    /// A parameter name that does not match any of the six engine parameters.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
