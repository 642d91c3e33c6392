//! Property-based tests for the delay engine and its building blocks.
//!
//! Uses proptest to check the invariants that have to hold for every
//! setting: taps never read ahead of the writer, indices survive any
//! number of wraps, the feedback loop never blows up, and the channels
//! stay independent without feedback.

use std::num::NonZeroUsize;

use ping_pong_delay::dsp::delay_line::{lagrange4, DelayLine};
use ping_pong_delay::dsp::mix::db_to_gain;
use ping_pong_delay::dsp::smoother::smooth;
use ping_pong_delay::{CrossReadTiming, EngineConfig, ParamId, PingPongEngine};

const SAMPLE_RATE: f32 = 48000.0;

fn configured(config: EngineConfig, settings: &[(ParamId, f32)]) -> PingPongEngine {
    let mut engine = PingPongEngine::new(config);
    engine.configure(SAMPLE_RATE).unwrap();
    for &(id, value) in settings {
        engine.set_parameter(id, value);
    }
    engine.snap_to_targets();
    engine
}

fn timing(symmetric: bool) -> CrossReadTiming {
    if symmetric {
        CrossReadTiming::Symmetric
    } else {
        CrossReadTiming::Sequential
    }
}

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(64))]

    /// A freshly written sample is read back unchanged at zero delay once
    /// the latency has elapsed, whatever the latency and capacity.
    #[test]
    fn zero_delay_returns_written_value(
        value in -1.0f32..=1.0f32,
        latency in 3usize..32,
        extra in 3usize..256,
    ) {
        let capacity = NonZeroUsize::new(latency + extra).unwrap();
        let mut line = DelayLine::new(capacity, latency);

        line.write(value);
        line.advance();
        for _ in 1..latency {
            line.write(0.0);
            line.advance();
        }

        proptest::prop_assert_eq!(line.read_fractional(0.0), value);
    }

    /// After many trips around the ring, an integer delay still reads
    /// exactly the sample written `latency + delay` samples earlier.
    #[test]
    fn reads_survive_wraparound(
        samples in proptest::collection::vec(-1.0f32..=1.0f32, 600..1200),
        delay in 0usize..40,
    ) {
        let latency = 8;
        let mut line = DelayLine::new(NonZeroUsize::new(128).unwrap(), latency);

        for &sample in &samples {
            line.write(sample);
            line.advance();
        }

        let expected = samples[samples.len() - delay - latency];
        proptest::prop_assert_eq!(line.read_fractional(delay as f32), expected);
    }

    /// On a ramp, a delay of `d + f` lands `f` of the way from slot
    /// `read - d` towards the next newer slot.
    #[test]
    fn fractional_reads_reach_towards_newer_slot(
        start in -1.0f32..=1.0f32,
        delay in 0usize..40,
        frac in 0.0f32..1.0f32,
    ) {
        let latency = 8;
        let slope = 0.01;
        let mut line = DelayLine::new(NonZeroUsize::new(128).unwrap(), latency);

        let writes = 100;
        for n in 0..writes {
            line.write(start + n as f32 * slope);
            line.advance();
        }

        let at = (writes - latency - delay) as f32;
        let expected = start + (at + frac) * slope;
        let result = line.read_fractional(delay as f32 + frac);
        proptest::prop_assert!(
            (result - expected).abs() < 1e-4,
            "delay {} + {}: expected {}, got {}", delay, frac, expected, result
        );
    }

    /// The cubic kernel reproduces straight lines exactly.
    #[test]
    fn lagrange_is_exact_on_lines(
        offset in -1.0f32..=1.0f32,
        slope in -1.0f32..=1.0f32,
        frac in 0.0f32..1.0f32,
    ) {
        let taps = [offset - slope, offset, offset + slope, offset + 2.0 * slope];
        let result = lagrange4(frac, taps);
        proptest::prop_assert!((result - (offset + slope * frac)).abs() < 1e-4);
    }

    /// One smoothing step always lands between the old value and the target.
    #[test]
    fn smoothing_stays_between_endpoints(
        target in -2000.0f32..=2000.0f32,
        previous in -2000.0f32..=2000.0f32,
        coefficient in 0.0f32..1.0f32,
    ) {
        let next = smooth(target, previous, coefficient);
        let low = target.min(previous) - 1e-2;
        let high = target.max(previous) + 1e-2;
        proptest::prop_assert!(low <= next && next <= high);
    }

    /// Without feedback into the right channel, a left-only input never
    /// reaches the right output.
    #[test]
    fn no_right_output_without_feedback(
        input in proptest::collection::vec(-1.0f32..=1.0f32, 64),
        delay_l in 0.0f32..20.0,
        delay_r in 0.0f32..20.0,
        feedback_l in 0.0f32..=1.0,
        symmetric in proptest::bool::ANY,
    ) {
        let config = EngineConfig::default()
            .with_max_delay_ms(25.0)
            .with_cross_read_timing(timing(symmetric));
        let mut engine = configured(config, &[
            (ParamId::DelayL, delay_l),
            (ParamId::DelayR, delay_r),
            (ParamId::FeedbackL, feedback_l),
            (ParamId::FeedbackR, 0.0),
        ]);

        let frames = engine.capacity() + input.len();
        for n in 0..frames {
            let left = input.get(n).copied().unwrap_or(0.0);
            let (_, right) = engine.process_frame(left, 0.0);
            proptest::prop_assert_eq!(right, 0.0);
        }
    }

    /// With feedback up to 1 the echoes may ring forever but never grow
    /// past what went in.
    #[test]
    fn feedback_loop_stays_bounded(
        input in proptest::collection::vec(-1.0f32..=1.0f32, 16),
        delay_l in 0.5f32..20.0,
        delay_r in 0.5f32..20.0,
        feedback_l in 0.0f32..=1.0,
        feedback_r in 0.0f32..=1.0,
        symmetric in proptest::bool::ANY,
    ) {
        let config = EngineConfig::default()
            .with_max_delay_ms(25.0)
            .with_cross_read_timing(timing(symmetric));
        let mut engine = configured(config, &[
            (ParamId::DelayL, delay_l),
            (ParamId::DelayR, delay_r),
            (ParamId::FeedbackL, feedback_l),
            (ParamId::FeedbackR, feedback_r),
        ]);

        for n in 0..20_000 {
            let sample = input.get(n).copied().unwrap_or(0.0);
            let (l, r) = engine.process_frame(sample, -sample);
            proptest::prop_assert!(l.is_finite() && r.is_finite());
            proptest::prop_assert!(
                l.abs() <= 40.0 && r.abs() <= 40.0,
                "output grew to ({}, {}) at frame {}", l, r, n
            );
        }
    }

    /// Fully dry is the input scaled by the volume, for any other setting.
    #[test]
    fn fully_dry_is_scaled_input(
        input in proptest::collection::vec(-1.0f32..=1.0f32, 128),
        delay_l in 0.0f32..20.0,
        feedback_l in 0.0f32..=1.0,
        feedback_r in 0.0f32..=1.0,
        volume in -20.0f32..=20.0,
    ) {
        let mut engine = configured(EngineConfig::default(), &[
            (ParamId::DelayL, delay_l),
            (ParamId::FeedbackL, feedback_l),
            (ParamId::FeedbackR, feedback_r),
            (ParamId::DryWet, 0.0),
            (ParamId::Volume, volume),
        ]);
        let gain = db_to_gain(volume);

        for &sample in &input {
            let (l, r) = engine.process_frame(sample, sample * 0.5);
            proptest::prop_assert!((l - sample * gain).abs() < 1e-5);
            proptest::prop_assert!((r - sample * 0.5 * gain).abs() < 1e-5);
        }
    }
}
