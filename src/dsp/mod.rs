//! # DSP (Digital Signal Processing) Building Blocks
//!
//! - **`delay_line`**: a ring buffer with a read head trailing the write
//!   head, read back with cubic Lagrange interpolation.
//! - **`smoother`**: one-pole smoothing for control values, so knob moves
//!   don't click.
//! - **`mix`**: the equal-power dry/wet law and dB-to-gain conversion.
//! - **`engine`**: the ping-pong delay itself, tying the three together.

pub mod delay_line;
pub mod engine;
pub mod mix;
pub mod smoother;
