//! # Ping-Pong Engine
//!
//! Two channels, each with an input delay line and a cross delay line.
//! The cross signal of each channel is fed into the *opposite* channel's
//! cross signal, which is what makes the echoes bounce:
//!
//! ```text
//!  in_L ──┬──► [input line L] ── × a_L ──►(+)──► cross_L ──► [cross line L] ─┐
//!         │        (delay L)              ▲                                  │
//!         │                               └──── × fb_L ── [cross line R] ◄─┐ │
//!         │                                                (delay L)       │ │
//!         │                                                                │ │
//!  in_R ──┼──► [input line R] ── × a_R ──►(+)──► cross_R ──────────────────┘ │
//!         │        (delay R)              ▲                                  │
//!         │                               └──── × fb_R ── [cross line L] ◄───┘
//!         │                                                (delay R)
//!         │
//!         └──► wet = in + c × cross ──► equal-power mix with dry ──► × volume ──► out
//! ```
//!
//! An impulse on the left comes out on the left after delay L, on the
//! right after delay L + delay R (scaled by fb_R), back on the left after
//! 2·delay L + delay R (scaled by fb_R·fb_L), and so on. All delays are
//! measured from the delay lines' read heads, so every echo is a further
//! `latency` samples late.
//!
//! ## Per-Sample Steps
//!
//! 1. Smooth the five glide parameters (delays slow, the rest fast)
//! 2. Convert both delay times from milliseconds to samples
//! 3. Left channel: write input, read delayed input, build and store
//!    `cross_L`
//! 4. Right channel: the same with delay R and the left cross history
//! 5. Advance all four delay lines
//! 6. Turn the dry/wet control into equal-power gains
//! 7. Mix, apply volume, note anything above full scale

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use nih_plug::nih_debug_assert_failure;

use crate::config::{CrossReadTiming, EngineConfig};
use crate::dsp::delay_line::DelayLine;
use crate::dsp::mix::{db_to_gain, MixGains};
use crate::dsp::smoother::ParameterSmoother;
use crate::error::{ConfigError, Result};

/// The six controls the engine reads every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Left delay time in milliseconds.
    DelayL,
    /// Right delay time in milliseconds.
    DelayR,
    /// Amount of the right cross signal fed into the left one.
    FeedbackL,
    /// Amount of the left cross signal fed into the right one.
    FeedbackR,
    /// 0 = fully dry, 1 = fully wet.
    DryWet,
    /// Output level in decibels.
    Volume,
}

impl ParamId {
    pub const ALL: [ParamId; 6] = [
        ParamId::DelayL,
        ParamId::DelayR,
        ParamId::FeedbackL,
        ParamId::FeedbackR,
        ParamId::DryWet,
        ParamId::Volume,
    ];

    /// Stable identifier. Also the host-facing parameter ID.
    pub const fn name(self) -> &'static str {
        match self {
            ParamId::DelayL => "DEL_L",
            ParamId::DelayR => "DEL_R",
            ParamId::FeedbackL => "FEEDBACK_L",
            ParamId::FeedbackR => "FEEDBACK_R",
            ParamId::DryWet => "DRY_WET",
            ParamId::Volume => "VOLUME",
        }
    }

    /// Nominal `(min, max)` of the control. The engine itself accepts
    /// anything; this is what the control surface should enforce.
    pub const fn range(self) -> (f32, f32) {
        match self {
            ParamId::DelayL | ParamId::DelayR => (0.0, 2000.0),
            ParamId::FeedbackL | ParamId::FeedbackR | ParamId::DryWet => (0.0, 1.0),
            ParamId::Volume => (-20.0, 20.0),
        }
    }

    /// Value after `configure()`: no delay, no feedback, fully wet,
    /// unity volume.
    pub const fn default_value(self) -> f32 {
        match self {
            ParamId::DryWet => 1.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        ParamId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownParameter(s.to_string()))
    }
}

/// Output samples that went past full scale since the last report.
///
/// The engine never clips. This report is how a loud setting (high
/// volume, feedback close to 1 with both channels busy) gets noticed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoudnessReport {
    /// Number of individual channel samples with `|x| > 1.0`.
    pub clipped_samples: u32,
    /// Largest magnitude seen per channel (`[left, right]`).
    pub peak: [f32; 2],
}

impl LoudnessReport {
    pub fn is_clean(&self) -> bool {
        self.clipped_samples == 0
    }

    /// Fold a later report into this one.
    pub fn merge(&mut self, other: LoudnessReport) {
        self.clipped_samples = self.clipped_samples.saturating_add(other.clipped_samples);
        for (peak, other_peak) in self.peak.iter_mut().zip(other.peak) {
            *peak = peak.max(other_peak);
        }
    }

    #[inline]
    fn observe(&mut self, channel: usize, sample: f32) {
        let magnitude = sample.abs();
        if magnitude > 1.0 {
            self.clipped_samples = self.clipped_samples.saturating_add(1);
        }
        if magnitude > self.peak[channel] {
            self.peak[channel] = magnitude;
        }
    }
}

/// Convert a delay time to a (fractional) number of samples.
pub fn calculate_delay_samples(delay_ms: f32, sample_rate: f32) -> f32 {
    delay_ms * sample_rate / 1000.0
}

/// Delay memory and gains for one side of the stereo pair.
#[derive(Debug, Clone)]
struct Channel {
    input_line: DelayLine,
    cross_line: DelayLine,
    input_gain: f32,
    output_gain: f32,
}

impl Channel {
    fn new(capacity: NonZeroUsize, latency: usize, input_gain: f32, output_gain: f32) -> Self {
        Self {
            input_line: DelayLine::new(capacity, latency),
            cross_line: DelayLine::new(capacity, latency),
            input_gain,
            output_gain,
        }
    }

    /// Steps 3 and 4 for one channel. Returns the wet signal.
    ///
    /// `opposite_cross` is the other channel's cross history, already read
    /// at this channel's delay.
    #[inline]
    fn tick(&mut self, input: f32, delay_samples: f32, feedback: f32, opposite_cross: f32) -> f32 {
        self.input_line.write(input);
        let delayed_input = self.input_line.read_fractional(delay_samples);

        let cross = self.input_gain * delayed_input + feedback * opposite_cross;
        self.cross_line.write(cross);

        input + self.output_gain * cross
    }

    #[inline]
    fn advance(&mut self) {
        self.input_line.advance();
        self.cross_line.advance();
    }

    fn clear(&mut self) {
        self.input_line.clear();
        self.cross_line.clear();
    }
}

/// The parameter set: five smoothed controls plus the raw volume.
#[derive(Debug, Clone)]
struct Parameters {
    delay: [ParameterSmoother; 2],
    feedback: [ParameterSmoother; 2],
    dry_wet: ParameterSmoother,
    volume_db: f32,
    /// `volume_db` converted once per change instead of once per sample.
    volume_gain: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            delay: [
                ParameterSmoother::slow(ParamId::DelayL.default_value()),
                ParameterSmoother::slow(ParamId::DelayR.default_value()),
            ],
            feedback: [
                ParameterSmoother::fast(ParamId::FeedbackL.default_value()),
                ParameterSmoother::fast(ParamId::FeedbackR.default_value()),
            ],
            dry_wet: ParameterSmoother::fast(ParamId::DryWet.default_value()),
            volume_db: ParamId::Volume.default_value(),
            volume_gain: db_to_gain(ParamId::Volume.default_value()),
        }
    }
}

impl Parameters {
    fn smoother(&self, id: ParamId) -> Option<&ParameterSmoother> {
        match id {
            ParamId::DelayL => Some(&self.delay[0]),
            ParamId::DelayR => Some(&self.delay[1]),
            ParamId::FeedbackL => Some(&self.feedback[0]),
            ParamId::FeedbackR => Some(&self.feedback[1]),
            ParamId::DryWet => Some(&self.dry_wet),
            ParamId::Volume => None,
        }
    }

    fn smoother_mut(&mut self, id: ParamId) -> Option<&mut ParameterSmoother> {
        match id {
            ParamId::DelayL => Some(&mut self.delay[0]),
            ParamId::DelayR => Some(&mut self.delay[1]),
            ParamId::FeedbackL => Some(&mut self.feedback[0]),
            ParamId::FeedbackR => Some(&mut self.feedback[1]),
            ParamId::DryWet => Some(&mut self.dry_wet),
            ParamId::Volume => None,
        }
    }

    fn smoothers_mut(&mut self) -> impl Iterator<Item = &mut ParameterSmoother> {
        self.delay
            .iter_mut()
            .chain(self.feedback.iter_mut())
            .chain(std::iter::once(&mut self.dry_wet))
    }
}

/// The stereo ping-pong delay.
///
/// Create it with [`new()`](Self::new) (or `default()`), then call
/// [`configure()`](Self::configure) with the host's sample rate before
/// processing. An engine that was never configured, or whose last
/// `configure()` failed, passes audio through untouched.
#[derive(Debug, Clone)]
pub struct PingPongEngine {
    config: EngineConfig,
    sample_rate: f32,

    /// `[left, right]` once configured, empty before.
    channels: Vec<Channel>,

    params: Parameters,

    /// Right cross line read at delay L on the previous frame. Only used
    /// with [`CrossReadTiming::Sequential`].
    right_cross_carry: f32,

    loudness: LoudnessReport,
}

impl Default for PingPongEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PingPongEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            // Placeholder until configure() is called.
            sample_rate: 44100.0,
            channels: Vec::new(),
            params: Parameters::default(),
            right_cross_carry: 0.0,
            loudness: LoudnessReport::default(),
        }
    }

    /// (Re)build the engine for `sample_rate`.
    ///
    /// Allocates every delay line, zero-fills them, puts the heads back at
    /// their latency offset and returns all parameters to their defaults.
    /// On error the engine is left unconfigured.
    pub fn configure(&mut self, sample_rate: f32) -> Result<()> {
        self.channels.clear();

        let capacity = self.config.delay_line_capacity(sample_rate)?;
        let capacity =
            NonZeroUsize::new(capacity).ok_or(ConfigError::InvalidSampleRate(sample_rate))?;
        let latency = self.config.latency_samples;

        self.channels = (0..2)
            .map(|side| {
                Channel::new(
                    capacity,
                    latency,
                    self.config.input_gains[side],
                    self.config.output_gains[side],
                )
            })
            .collect();

        self.sample_rate = sample_rate;
        self.params = Parameters::default();
        self.right_cross_carry = 0.0;
        self.loudness = LoudnessReport::default();

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.channels.len() == 2
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Length of each delay line, or 0 before `configure()`.
    pub fn capacity(&self) -> usize {
        self.channels
            .first()
            .map(|channel| channel.input_line.capacity())
            .unwrap_or(0)
    }

    /// Set a raw parameter target. Accepts any value; never fails.
    #[inline]
    pub fn set_parameter(&mut self, id: ParamId, value: f32) {
        match self.params.smoother_mut(id) {
            Some(smoother) => smoother.set_target(value),
            None => {
                // Volume is only converted when it actually changes.
                if value != self.params.volume_db {
                    self.params.volume_db = value;
                    self.params.volume_gain = db_to_gain(value);
                }
            }
        }
    }

    /// The raw target last handed to [`set_parameter()`](Self::set_parameter).
    pub fn parameter(&self, id: ParamId) -> f32 {
        self.params
            .smoother(id)
            .map(ParameterSmoother::target)
            .unwrap_or(self.params.volume_db)
    }

    /// The value the last processed sample used. Volume is not smoothed,
    /// so for it this is the same as [`parameter()`](Self::parameter).
    pub fn smoothed_parameter(&self, id: ParamId) -> f32 {
        self.params
            .smoother(id)
            .map(ParameterSmoother::current)
            .unwrap_or(self.params.volume_db)
    }

    /// Jump every smoothed parameter to its target.
    pub fn snap_to_targets(&mut self) {
        for smoother in self.params.smoothers_mut() {
            smoother.snap_to_target();
        }
    }

    /// Silence all delay memory (transport stop). Parameter targets stay
    /// as they are; the smoothers jump to them.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.clear();
        }
        self.right_cross_carry = 0.0;
        self.snap_to_targets();
        self.loudness = LoudnessReport::default();
    }

    /// Process one stereo frame and return the output frame.
    #[inline]
    pub fn process_frame(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let [left, right] = self.channels.as_mut_slice() else {
            nih_debug_assert_failure!("PingPongEngine used before configure()");
            return (in_l, in_r);
        };

        // Step 1: smooth.
        let delay_l_ms = self.params.delay[0].next();
        let delay_r_ms = self.params.delay[1].next();
        let feedback_l = self.params.feedback[0].next();
        let feedback_r = self.params.feedback[1].next();
        let dry_wet = self.params.dry_wet.next();

        // Step 2: milliseconds to samples.
        let delay_l = calculate_delay_samples(delay_l_ms, self.sample_rate);
        let delay_r = calculate_delay_samples(delay_r_ms, self.sample_rate);

        // Steps 3 and 4: each channel reads the other's cross history at
        // its own delay. Writes made during this frame sit at least one
        // slot ahead of every tap, so reading before or after them gives
        // the same value.
        let right_at_delay_l = match self.config.cross_read_timing {
            CrossReadTiming::Sequential => self.right_cross_carry,
            CrossReadTiming::Symmetric => right.cross_line.read_fractional(delay_l),
        };
        let left_at_delay_r = left.cross_line.read_fractional(delay_r);

        let wet_l = left.tick(in_l, delay_l, feedback_l, right_at_delay_l);
        let wet_r = right.tick(in_r, delay_r, feedback_r, left_at_delay_r);

        if self.config.cross_read_timing == CrossReadTiming::Sequential {
            self.right_cross_carry = right.cross_line.read_fractional(delay_l);
        }

        // Step 5.
        left.advance();
        right.advance();

        // Steps 6 and 7.
        let gains = MixGains::from_dry_wet(dry_wet);
        let out_l = gains.apply(in_l, wet_l) * self.params.volume_gain;
        let out_r = gains.apply(in_r, wet_r) * self.params.volume_gain;

        self.loudness.observe(0, out_l);
        self.loudness.observe(1, out_r);

        (out_l, out_r)
    }

    /// Process interleaved `[left, right]` frames in place.
    pub fn process(&mut self, frames: &mut [[f32; 2]]) {
        for frame in frames.iter_mut() {
            let (l, r) = self.process_frame(frame[0], frame[1]);
            *frame = [l, r];
        }
    }

    /// Process planar channel buffers in place. Both slices are expected
    /// to have the same length; extra samples in the longer one are left
    /// untouched.
    pub fn process_split(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_frame(*l, *r);
        }
    }

    /// Return and clear the loudness statistics gathered since the last
    /// call.
    pub fn take_loudness_report(&mut self) -> LoudnessReport {
        std::mem::take(&mut self.loudness)
    }

    /// How long the echoes ring after the input goes silent.
    ///
    /// An echo only comes back to where it started after passing through
    /// both feedback amounts, so each round trip (two bounces) scales it by
    /// the loop gain `fb_L * fb_R`. Solving `gain^N = 0.001` (-60 dB) gives
    /// `N = -3 / log10(gain)` round trips; each bounce takes at most the
    /// longer of the two delays. Returns `None` when the loop gain is 1 or
    /// more and the echoes never die out.
    pub fn tail_samples(&self) -> Option<u32> {
        let feedback_l = self.parameter(ParamId::FeedbackL).abs();
        let feedback_r = self.parameter(ParamId::FeedbackR).abs();
        let loop_gain = feedback_l * feedback_r;
        if loop_gain >= 1.0 {
            return None;
        }

        let delay_ms = self.parameter(ParamId::DelayL).max(self.parameter(ParamId::DelayR));
        let bounce = calculate_delay_samples(delay_ms.max(0.0), self.sample_rate)
            + self.config.latency_samples as f32;

        // The first echo is the delayed input itself, the second its one
        // trip across to the other channel.
        let bounces = if feedback_l.max(feedback_r) == 0.0 {
            1.0
        } else if loop_gain > 0.001 {
            2.0 - 6.0 / loop_gain.log10()
        } else {
            2.0
        };

        Some((bounces * bounce).ceil() as u32)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
