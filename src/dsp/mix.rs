//! # Dry/Wet Mix and Output Level
//!
//! ## Equal-Power Crossfade
//!
//! A linear crossfade (`dry * (1 - mix) + wet * mix`) dips by about 3 dB
//! in the middle, because two uncorrelated signals at half amplitude carry
//! only half the power. Square-root gains keep the summed power constant:
//!
//! ```text
//! g_dry = sqrt(0.5 * (1 - m))
//! g_wet = sqrt(0.5 * (1 + m))      g_dry² + g_wet² = 1
//! ```
//!
//! where `m` is the control mapped onto `[-1, 1]`: 0 is fully dry, 1 is
//! fully wet.
//!
//! ```text
//! control:  0.0 ─────── 0.5 ─────── 0.995 ─────── 1.0
//! m:        -1           0          +0.99         +1 (snap)
//!           full dry     -3 dB each               full wet
//! ```
//!
//! Anything mapping above 0.99 snaps to exactly +1 so the top of the
//! control travel is truly 100% wet instead of leaving a -46 dB trace of
//! dry signal. The lower end is only limited at -1.

/// Mapped values above this snap to fully wet.
pub const WET_SNAP_THRESHOLD: f32 = 0.99;

/// Map the dry/wet control from `[0, 1]` onto `[-1, 1]`, with `0 → -1`
/// and `1 → +1`, then apply the asymmetric clamp.
#[inline]
pub fn map_dry_wet(dry_wet: f32) -> f32 {
    let mapped = 2.0 * dry_wet - 1.0;

    if mapped < -1.0 {
        -1.0
    } else if mapped > WET_SNAP_THRESHOLD {
        1.0
    } else {
        mapped
    }
}

/// Gains applied to the two signal paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixGains {
    pub dry: f32,
    pub wet: f32,
}

impl MixGains {
    /// Equal-power gains for a (smoothed) dry/wet control value.
    #[inline]
    pub fn from_dry_wet(dry_wet: f32) -> Self {
        let mapped = map_dry_wet(dry_wet);
        Self {
            dry: (0.5 * (1.0 - mapped)).sqrt(),
            wet: (0.5 * (1.0 + mapped)).sqrt(),
        }
    }

    #[inline]
    pub fn apply(&self, dry: f32, wet: f32) -> f32 {
        wet * self.wet + dry * self.dry
    }
}

/// Decibels to linear amplitude: `10^(db / 20)`.
///
/// - `0 dB` → ×1
/// - `+20 dB` → ×10
/// - `-20 dB` → ×0.1
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_endpoints() {
        assert_eq!(map_dry_wet(0.0), -1.0);
        assert_eq!(map_dry_wet(1.0), 1.0);
        assert!(map_dry_wet(0.5).abs() < 1e-6);
    }

    #[test]
    fn test_mapping_clamps() {
        // Below the bottom of the range nothing snaps, it just limits.
        assert_eq!(map_dry_wet(-2.0), -1.0);
        // Just inside 0.99 stays put, just past it snaps to +1.
        assert!((map_dry_wet(0.994) - 0.988).abs() < 1e-5);
        assert_eq!(map_dry_wet(0.996), 1.0);
        assert_eq!(map_dry_wet(1.5), 1.0);
    }

    #[test]
    fn test_full_wet_and_full_dry() {
        let wet = MixGains::from_dry_wet(1.0);
        assert_eq!(wet.wet, 1.0);
        assert_eq!(wet.dry, 0.0);

        let dry = MixGains::from_dry_wet(0.0);
        assert_eq!(dry.wet, 0.0);
        assert_eq!(dry.dry, 1.0);
    }

    /// The 0.99 snap makes the last bit of travel exactly fully wet.
    #[test]
    fn test_snap_is_exactly_wet() {
        let gains = MixGains::from_dry_wet(0.997);
        assert_eq!(gains.dry, 0.0);
        assert_eq!(gains.wet, 1.0);
    }

    #[test]
    fn test_equal_power() {
        for i in 0..=20 {
            let control = i as f32 / 20.0;
            let gains = MixGains::from_dry_wet(control);
            let power = gains.dry * gains.dry + gains.wet * gains.wet;
            assert!((power - 1.0).abs() < 1e-5, "power {power} at control {control}");
        }

        let half = MixGains::from_dry_wet(0.5);
        assert!((half.dry - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((half.wet - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_apply() {
        let gains = MixGains { dry: 0.25, wet: 0.5 };
        assert!((gains.apply(1.0, 2.0) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(20.0) - 10.0).abs() < 1e-4);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_gain(6.0) - 1.9953).abs() < 1e-3);
    }
}
