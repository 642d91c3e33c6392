//! # Ping Pong Delay: An AU/VST3/CLAP Stereo Delay Plugin
//!
//! A stereo "ping-pong" delay built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//! Each channel's input is delayed, fed into the opposite channel's
//! feedback path, and bounced back and forth so the echoes alternate
//! between left and right. The result is blended with the dry signal
//! using an equal-power mix and scaled by an output volume.
//!
//! ## Layout
//!
//! - [`dsp`]: the real-time engine (delay lines, smoothing, mixing)
//! - [`config`]: setup-time engine settings
//! - [`error`]: setup errors
//! - `params`: the host-facing parameter set
//!
//! This file is the glue between the host and the engine: it configures
//! the engine when the host tells us the sample rate, forwards the
//! parameter values every sample, and reports when the output gets too
//! loud.
//!
//! ## Signal Flow
//!
//! ```text
//! Input L ──┬───────────────────────────────────── × g_dry ──┐
//!           └──► wet L = in L + cross L ─────────── × g_wet ─(+)── × volume ──► Output L
//!                               ▲
//!                 cross L = delayed in L + fb_L × (cross R, delayed by L)
//!                 cross R = delayed in R + fb_R × (cross L, delayed by R)
//!                               ▼
//! Input R ──┬──► wet R = in R + cross R ─────────── × g_wet ─(+)── × volume ──► Output R
//!           └───────────────────────────────────── × g_dry ──┘
//! ```
//!
//! See [`dsp::engine`] for the per-sample details.

pub mod config;
pub mod dsp;
pub mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

pub use config::{CrossReadTiming, EngineConfig};
pub use dsp::engine::{LoudnessReport, ParamId, PingPongEngine};
pub use error::ConfigError;
use params::PluginParams;

/// Work that must not happen on the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PluginTask {
    /// Some output samples went above full scale.
    OutputTooLoud(LoudnessReport),
}

/// The plugin: host parameters plus the engine that does the work.
///
/// Parameters are shared with the host via `Arc` and can be read from
/// any thread. The engine is owned by the audio thread and only touched
/// in `initialize()`, `reset()` and `process()`.
struct PingPongDelay {
    params: Arc<PluginParams>,
    engine: PingPongEngine,

    /// Loudness seen since the last report was sent.
    pending_loudness: LoudnessReport,

    /// Samples processed since the last report was sent.
    samples_since_report: usize,
}

impl Default for PingPongDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            // Unconfigured: the delay lines are allocated in initialize()
            // once the host tells us the sample rate.
            engine: PingPongEngine::default(),
            pending_loudness: LoudnessReport::default(),
            samples_since_report: 0,
        }
    }
}

impl PingPongDelay {
    /// Hand the latest loudness statistics to the background thread, at
    /// most once per second of audio.
    fn report_loudness(&mut self, samples: usize, context: &mut impl ProcessContext<Self>) {
        self.pending_loudness.merge(self.engine.take_loudness_report());
        self.samples_since_report += samples;

        let interval = self.engine.sample_rate() as usize;
        if self.samples_since_report >= interval {
            if !self.pending_loudness.is_clean() {
                context.execute_background(PluginTask::OutputTooLoud(self.pending_loudness));
            }
            self.pending_loudness = LoudnessReport::default();
            self.samples_since_report = 0;
        }
    }
}

impl Plugin for PingPongDelay {
    const NAME: &'static str = "Ping Pong Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo only: the whole point of the effect is the cross-feed
    // between exactly two channels.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // The engine reads the parameters every sample, so let the host's
    // automation points land on the exact sample they were drawn at.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = PluginTask;

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn task_executor(&mut self) -> TaskExecutor<Self> {
        Box::new(|task| match task {
            PluginTask::OutputTooLoud(report) => nih_warn!(
                "Output is too loud: {} samples above full scale (peak L {:.2}, R {:.2})",
                report.clipped_samples,
                report.peak[0],
                report.peak[1]
            ),
        })
    }

    /// Called when the plugin is loaded or the audio configuration
    /// changes. All delay memory is allocated here, sized from the sample
    /// rate, so `process()` never allocates.
    ///
    /// Returning `false` tells the host we can't run with this
    /// configuration, which keeps `process()` from ever being called on
    /// an engine that failed to configure.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate;

        match self.engine.configure(sample_rate) {
            Ok(()) => {
                nih_log!(
                    "Sample rate is {sample_rate} Hz, {} samples per delay line",
                    self.engine.capacity()
                );
                self.pending_loudness = LoudnessReport::default();
                self.samples_since_report = 0;
                true
            }
            Err(err) => {
                nih_error!("Could not configure the delay engine: {err}");
                false
            }
        }
    }

    /// Called when playback stops or the plugin is bypassed. Clears the
    /// delay lines so stale echoes don't play on the next start.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let samples = buffer.samples();

        for mut channel_samples in buffer.iter_samples() {
            for (id, value) in self.params.values() {
                self.engine.set_parameter(id, value);
            }

            let mut channels = channel_samples.iter_mut();
            let (Some(left), Some(right)) = (channels.next(), channels.next()) else {
                continue;
            };

            let (out_l, out_r) = self.engine.process_frame(*left, *right);
            *left = out_l;
            *right = out_r;
        }

        self.report_loudness(samples, context);

        // Keep the host calling process() after the input goes silent so
        // the echoes ring out instead of being cut off.
        match self.engine.tail_samples() {
            Some(tail) => ProcessStatus::Tail(tail),
            None => ProcessStatus::KeepAlive,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for PingPongDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.ping-pong-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A stereo delay whose echoes bounce between left and right");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for PingPongDelay {
    // 16 ASCII bytes; must be unique across all VST3 plugins.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssPingPong001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay, Vst3SubCategory::Stereo];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// clap_wrapper re-exports the CLAP entry point as AUv2 for Logic Pro.

nih_export_clap!(PingPongDelay);
nih_export_vst3!(PingPongDelay);

clap_wrapper::export_auv2!();
