//! # Plugin Parameters
//!
//! The six controls the host sees. Each parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to
//!   recall sessions and automation. These match [`ParamId::name()`] and
//!   must never change once published.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** and a **default value**, both taken from [`ParamId`] so
//!   the host and the engine agree on them.
//!
//! ## No Host-Side Smoothing
//!
//! nih-plug can smooth parameters itself (`with_smoother`), but the
//! engine already runs every control through its own one-pole smoother
//! with per-parameter coefficients. Smoothing twice would just make the
//! controls sluggish, so these parameters are handed over raw with
//! `.value()`.

use nih_plug::prelude::*;

use crate::dsp::engine::ParamId;

/// All user-facing parameters of the ping-pong delay.
#[derive(Params)]
pub struct PluginParams {
    /// **Delay L**: time until the first left echo, and the time each
    /// bounce takes to land on the left.
    #[id = "DEL_L"]
    pub delay_l: FloatParam,

    /// **Delay R**: time each bounce takes to land on the right.
    #[id = "DEL_R"]
    pub delay_r: FloatParam,

    /// **Feedback L**: how much of each right echo comes back on the left.
    #[id = "FEEDBACK_L"]
    pub feedback_l: FloatParam,

    /// **Feedback R**: how much of each left echo comes back on the right.
    ///
    /// With both feedbacks at 1.0 the echoes never decay. The engine
    /// allows it; the output is then only limited by the loudness report.
    #[id = "FEEDBACK_R"]
    pub feedback_r: FloatParam,

    /// **Dry/Wet**: 0% is fully dry, 100% fully wet (the default).
    #[id = "DRY_WET"]
    pub dry_wet: FloatParam,

    /// **Volume**: output level, ±20 dB.
    #[id = "VOLUME"]
    pub volume: FloatParam,
}

/// A linear parameter spanning the control's nominal range.
fn control(id: ParamId, name: &str) -> FloatParam {
    let (min, max) = id.range();
    FloatParam::new(name, id.default_value(), FloatRange::Linear { min, max })
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            delay_l: control(ParamId::DelayL, "Delay L")
                .with_unit(" ms")
                .with_step_size(0.1),
            delay_r: control(ParamId::DelayR, "Delay R")
                .with_unit(" ms")
                .with_step_size(0.1),

            feedback_l: control(ParamId::FeedbackL, "Feedback L")
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),
            feedback_r: control(ParamId::FeedbackR, "Feedback R")
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            dry_wet: control(ParamId::DryWet, "Dry/Wet")
                .with_unit("% wet")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            volume: control(ParamId::Volume, "Volume")
                .with_unit(" dB")
                .with_step_size(0.1),
        }
    }
}

impl PluginParams {
    /// The current host value of every control, paired with its engine ID.
    pub fn values(&self) -> [(ParamId, f32); 6] {
        [
            (ParamId::DelayL, self.delay_l.value()),
            (ParamId::DelayR, self.delay_r.value()),
            (ParamId::FeedbackL, self.feedback_l.value()),
            (ParamId::FeedbackR, self.feedback_r.value()),
            (ParamId::DryWet, self.dry_wet.value()),
            (ParamId::Volume, self.volume.value()),
        ]
    }
}
