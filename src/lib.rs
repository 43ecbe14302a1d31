//! Jiggle Sim - secondary-motion simulation for animated characters
//!
//! Core modules:
//! - `sim`: Fixed-tick motion integrator, configuration records, gear overlay
//! - `cache`: Concurrent entity-keyed configuration registry
//! - `settings`: Host-environment defaults for new records
//! - `error`: Error types surfaced at module seams

pub mod cache;
pub mod error;
pub mod settings;
pub mod sim;

pub use cache::{EntityCache, EntityView, PlayerConfigSource, PlayerRegistry, SharedConfig};
pub use error::{CacheError, EntityError, SettingsError};
pub use settings::Settings;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (20 Hz host tick)
    pub const SIM_DT: f32 = 1.0 / 20.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the driver will accumulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Bust sizes at or above this render as female
    pub const FEMALE_THRESHOLD: f32 = 0.02;

    /// Largest per-tick kinematic impulse the integrator accepts (blocks/tick)
    pub const MAX_IMPULSE: f32 = 4.0;
    /// Impulse to target displacement scale
    pub const IMPULSE_GAIN: f32 = 2.5;
    /// Displacement clamp, in model half-pixels (renderer divides by 32)
    pub const MAX_DISPLACEMENT: f32 = 4.0;
    /// Bounce rotation clamp (degrees)
    pub const MAX_ROTATION_DEG: f32 = 15.0;
    /// Rotation per unit of lateral displacement (degrees)
    pub const LATERAL_ROTATION_GAIN: f32 = 3.0;
    /// Rotation per unit of vertical displacement change (degrees)
    pub const VERTICAL_ROTATION_GAIN: f32 = 6.0;

    /// Restoring force per unit of displacement error
    pub const SPRING_STIFFNESS: f32 = 0.18;
    /// Velocity damping at bounce multiplier 0
    pub const BASE_DAMPING: f32 = 0.7;
    /// Damping under fully rigid armor
    pub const RIGID_DAMPING: f32 = 0.9;
    /// Upper clamp for bounce and floppy multipliers
    pub const MAX_MULTIPLIER: f32 = 3.0;
    /// Error and velocity below which the oscillator snaps to its target
    pub const REST_EPSILON: f32 = 1e-4;

    /// Fraction of the remaining size difference closed per tick
    pub const SIZE_EASE: f32 = 1.0 / 3.0;
    /// Size difference below which the animated size snaps to target
    pub const SIZE_EPSILON: f32 = 1e-3;

    /// Breathing cycle speed (radians per tick)
    pub const BREATH_RATE: f32 = 0.09;
    /// Breathing half-amplitude (degrees)
    pub const BREATH_AMPLITUDE: f32 = 0.45;
}

/// Linear interpolation that is exact at both ends
///
/// `lerp(a, b, 0.0) == a` and `lerp(a, b, 1.0) == b` bit for bit; between the
/// ends the result is monotonic in `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        (a + (b - a) * t).max(lo).min(hi)
    }
}

/// Replace NaN/infinite host inputs with a fallback
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Round to two decimals, then to one (matches the host's offset slider steps)
#[inline]
pub fn round_offset(value: f32) -> f32 {
    ((value * 100.0).round() / 100.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_exact_endpoints() {
        let (a, b) = (0.1_f32, 0.7_f32);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_eq!(lerp(a, b, -3.0), a);
        assert_eq!(lerp(a, b, 9.0), b);
        assert!((lerp(a, b, 0.5) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or(f32::NAN, 0.0), 0.0);
        assert_eq!(finite_or(f32::INFINITY, 1.0), 1.0);
        assert_eq!(finite_or(-2.5, 0.0), -2.5);
    }

    #[test]
    fn test_round_offset() {
        assert_eq!(round_offset(0.0), 0.0);
        assert!((round_offset(0.32) - 0.3).abs() < 1e-6);
        assert!((round_offset(-0.96) - -1.0).abs() < 1e-6);
    }
}
