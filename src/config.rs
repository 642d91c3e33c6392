//! # Engine Configuration
//!
//! Everything about the engine that is fixed between two calls to
//! `configure()`: how much delay memory to reserve, how far the write
//! head runs ahead of the read head, how the two channels see each
//! other's cross signal, and the fixed gains on the cross paths.
//!
//! ## Sizing the Delay Lines
//!
//! The delay memory is derived from the longest delay the controls can
//! reach rather than from a fixed worst-case size:
//!
//! ```text
//! capacity = ceil(max_delay_ms * sample_rate / 1000) + latency + lookahead + 1
//! ```
//!
//! At 48 kHz with the defaults (2000 ms, 8 samples of latency) that is
//! 96012 samples, about 375 KB per line.

use crate::dsp::delay_line::INTERPOLATION_LOOKAHEAD;
use crate::error::{ConfigError, Result};

/// Longest delay the Delay L/R controls can ask for.
pub const DEFAULT_MAX_DELAY_MS: f32 = 2000.0;

/// How many samples the write index leads the read index by.
pub const DEFAULT_LATENCY_SAMPLES: usize = 8;

/// When each channel samples the opposite channel's cross-signal history.
///
/// Processing a frame handles the left channel first, then the right.
/// The left channel therefore cannot see anything the right channel
/// computes during the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossReadTiming {
    /// The left channel uses the right cross-line tap captured on the
    /// previous frame; the right channel uses the left tap captured on
    /// this frame. This adds one sample to the right-to-left path and is
    /// the classic character of this delay.
    #[default]
    Sequential,

    /// Both taps are read on the current frame before either cross
    /// signal is computed, so both directions have identical timing.
    Symmetric,
}

/// Setup-time settings for [`PingPongEngine`](crate::dsp::engine::PingPongEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Longest delay (in milliseconds) the delay lines must hold.
    pub max_delay_ms: f32,

    /// Initial distance between the write and read indices.
    pub latency_samples: usize,

    /// Ordering of the cross-channel reads.
    pub cross_read_timing: CrossReadTiming,

    /// Gain on the delayed input before it enters each cross signal
    /// (`[left, right]`).
    pub input_gains: [f32; 2],

    /// Gain on each cross signal in the wet output (`[left, right]`).
    pub output_gains: [f32; 2],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            latency_samples: DEFAULT_LATENCY_SAMPLES,
            cross_read_timing: CrossReadTiming::default(),
            input_gains: [1.0, 1.0],
            output_gains: [1.0, 1.0],
        }
    }
}

impl EngineConfig {
    pub fn with_max_delay_ms(mut self, max_delay_ms: f32) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_latency_samples(mut self, latency_samples: usize) -> Self {
        self.latency_samples = latency_samples;
        self
    }

    pub fn with_cross_read_timing(mut self, timing: CrossReadTiming) -> Self {
        self.cross_read_timing = timing;
        self
    }

    pub fn with_input_gains(mut self, left: f32, right: f32) -> Self {
        self.input_gains = [left, right];
        self
    }

    pub fn with_output_gains(mut self, left: f32, right: f32) -> Self {
        self.output_gains = [left, right];
        self
    }

    /// Check the settings that do not depend on the sample rate.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_delay_ms.is_finite() && self.max_delay_ms > 0.0) {
            return Err(ConfigError::InvalidMaxDelay(self.max_delay_ms));
        }
        if self.latency_samples < INTERPOLATION_LOOKAHEAD {
            return Err(ConfigError::LatencyTooSmall {
                latency: self.latency_samples,
                minimum: INTERPOLATION_LOOKAHEAD,
            });
        }
        Ok(())
    }

    /// Number of samples each delay line needs at `sample_rate`.
    ///
    /// The interpolation taps span from `latency + delay + 1` samples
    /// behind the write index up to the slot just before it, so the line
    /// gets the lookahead plus one spare slot on top of the longest delay.
    ///
    /// A sample rate so large that the size does not fit in a `usize` is
    /// rejected like any other invalid rate.
    pub fn delay_line_capacity(&self, sample_rate: f32) -> Result<usize> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        self.validate()?;

        // `as` saturates, so an overflowing product ends up at usize::MAX
        // and fails the additions below.
        let max_delay_samples = (self.max_delay_ms * sample_rate / 1000.0).ceil() as usize;
        max_delay_samples
            .checked_add(self.latency_samples)
            .and_then(|n| n.checked_add(INTERPOLATION_LOOKAHEAD + 1))
            .ok_or(ConfigError::InvalidSampleRate(sample_rate))
    }
}
