//! # Delay Line (Ring Buffer with a Latency Offset)
//!
//! A delay line stores audio samples and lets you read them back after a
//! specified time delay. The ping-pong engine keeps four of them: one for
//! each channel's raw input and one for each channel's cross signal.
//!
//! ## Two Heads, Fixed Distance Apart
//!
//! Picture a circular tape loop with a write head and a read head. Both
//! heads move forward by exactly one slot per sample, so the gap between
//! them never changes. The write head starts `latency` slots ahead of the
//! read head (8 by default):
//!
//! ```text
//!              read_pos              write_pos
//!                 │◄──── latency ────►│
//! ... [ ][ ][ ][ ][R][ ][ ][ ][ ][ ][ ][W][ ][ ] ...
//!        ◄── older                newer ──►
//! ```
//!
//! A delay of `d` samples is measured backwards from the *read* head, not
//! the write head. A sample written now therefore comes out after
//! `latency + d` samples. The gap guarantees that all four interpolation
//! taps, including the two *newer* than the read position, have already
//! been written.
//!
//! ## Cubic Lagrange Interpolation
//!
//! For a fractional delay `d + f` we take four neighbouring slots around
//! `idx = read_pos - d` and fit the unique cubic through them:
//!
//! ```text
//!  tap:    s[-1]      s[0]       s[+1]      s[+2]
//!  slot:   idx - 1    idx        idx + 1    idx + 2
//!           older ◄──────────────────────► newer
//!
//!  out = f(f-1)(f-2)/(-6) * s[-1]
//!      + (f-1)(f+1)(f-2)/2 * s[0]
//!      + f(f+1)(f-2)/(-2)  * s[+1]
//!      + f(f+1)(f-1)/6     * s[+2]
//! ```
//!
//! At `f = 0` only the `s[0]` weight is non-zero (it equals 1), so integer
//! delays are exact. As `f` moves towards 1 the output slides towards
//! `s[+1]`, which is one sample *newer*: the sample comes out
//! `latency + d - f` samples after it was written. The newest tap sits two
//! slots ahead of the read head, so the latency has to be at least 3.
//! Compared to the linear interpolation of a simple delay, the cubic keeps
//! much more of the high end when the delay time is moving.

use std::num::NonZeroUsize;

/// How far ahead of the read position the newest tap sits, plus the
/// write slot itself. The initial latency must be at least this large.
pub const INTERPOLATION_LOOKAHEAD: usize = 3;

/// Evaluate the 4-point Lagrange kernel at fraction `frac`.
///
/// `taps` are consecutive slots, oldest first: `[s[-1], s[0], s[+1], s[+2]]`.
#[inline]
pub fn lagrange4(frac: f32, taps: [f32; 4]) -> f32 {
    let f = frac;
    let [before, at, after, after2] = taps;

    f * (f - 1.0) * (f - 2.0) / -6.0 * before
        + (f - 1.0) * (f + 1.0) * (f - 2.0) / 2.0 * at
        + f * (f + 1.0) * (f - 2.0) / -2.0 * after
        + f * (f + 1.0) * (f - 1.0) / 6.0 * after2
}

/// A ring buffer with separate read and write heads.
///
/// The buffer is allocated once in `PingPongEngine::configure()` and never
/// resized, so no allocation happens on the audio thread.
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// The circular buffer storing audio samples. Starts silent.
    buffer: Vec<f32>,

    /// Where the next incoming sample will be stored.
    write_pos: usize,

    /// The reference point delays are measured from. Always trails
    /// `write_pos` by exactly `latency` slots.
    read_pos: usize,

    /// Initial (and permanent) distance between the two heads.
    latency: usize,

    /// Cached buffer length.
    buffer_len: usize,
}

impl DelayLine {
    /// Create a silent delay line holding `capacity` samples, with the
    /// write head `latency` samples ahead of the read head.
    pub fn new(capacity: NonZeroUsize, latency: usize) -> Self {
        let buffer_len = capacity.get();
        debug_assert!(
            latency + INTERPOLATION_LOOKAHEAD < buffer_len,
            "latency {latency} does not fit in a delay line of {buffer_len} samples"
        );

        Self {
            buffer: vec![0.0; buffer_len],
            write_pos: latency % buffer_len,
            read_pos: 0,
            latency,
            buffer_len,
        }
    }

    /// Store a sample at the write head.
    ///
    /// Like the reads, this leaves both heads where they are. Call
    /// [`advance()`](Self::advance) once all reads and writes for the
    /// current sample are done.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Read `delay_samples` behind the read head with cubic interpolation.
    ///
    /// The caller keeps `delay_samples` within
    /// `0..=`[`max_delay_samples()`](Self::max_delay_samples). Longer (or
    /// negative) delays do not panic; they wrap around the ring and land on
    /// the wrong samples.
    #[inline]
    pub fn read_fractional(&self, delay_samples: f32) -> f32 {
        let whole = delay_samples.floor();
        let frac = delay_samples - whole;

        // `as` saturates (and maps NaN to 0), `rem_euclid` folds the result
        // back onto the ring, so every input lands on a valid slot.
        let len = self.buffer_len;
        let delay_int = (whole as i64).rem_euclid(len as i64) as usize;

        let at = (self.read_pos + len - delay_int) % len;
        let before = (at + len - 1) % len;
        let after = (at + 1) % len;
        let after2 = (at + 2) % len;

        lagrange4(
            frac,
            [
                self.buffer[before],
                self.buffer[at],
                self.buffer[after],
                self.buffer[after2],
            ],
        )
    }

    /// Move both heads forward by one sample, wrapping at the end.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.buffer_len;
        self.read_pos = (self.read_pos + 1) % self.buffer_len;
    }

    /// Silence the buffer and put both heads back at their initial offset.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.read_pos = 0;
        self.write_pos = self.latency % self.buffer_len;
    }

    pub fn capacity(&self) -> usize {
        self.buffer_len
    }

    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Longest delay whose four taps are all real history. The oldest tap
    /// sits `latency + delay + 1` slots behind the write head.
    pub fn max_delay_samples(&self) -> usize {
        self.buffer_len - self.latency - 2
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
