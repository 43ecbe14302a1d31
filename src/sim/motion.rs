//! Damped-oscillator motion state
//!
//! One instance per side. `advance` runs once per fixed tick; `sample` reads an
//! interpolated view for any render phase without mutating anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{finite_or, lerp};

/// Which side of the body a motion state drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Per-tick physical inputs for one motion state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInput {
    /// Vertical position change since last tick (negative while descending)
    pub vertical_impulse: f32,
    /// Sideways motion signal (strafe speed or body yaw change)
    pub lateral_impulse: f32,
    /// Chest item resistance (0 = unimpeded, 1 = rigid)
    pub resistance: f32,
    pub bounce_multiplier: f32,
    pub floppy_multiplier: f32,
    pub physics_enabled: bool,
    pub breathing: bool,
    /// Host tick counter, drives the breathing cycle
    pub tick_count: u64,
    /// Size the animated size eases toward
    pub target_size: f32,
}

impl Default for MotionInput {
    fn default() -> Self {
        Self {
            vertical_impulse: 0.0,
            lateral_impulse: 0.0,
            resistance: 0.0,
            bounce_multiplier: 1.0,
            floppy_multiplier: 1.0,
            physics_enabled: true,
            breathing: false,
            tick_count: 0,
            target_size: 0.0,
        }
    }
}

/// Interpolated output for one side
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSample {
    /// Displacement (x = lateral, y = vertical)
    pub position: Vec2,
    /// Bounce rotation (degrees)
    pub rotation: f32,
    /// Breathing tilt (degrees)
    pub breathing: f32,
    /// Animated size
    pub size: f32,
}

impl MotionSample {
    /// Component-wise interpolation, exact at 0 and 1
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: Vec2::new(
                lerp(self.position.x, other.position.x, t),
                lerp(self.position.y, other.position.y, t),
            ),
            rotation: lerp(self.rotation, other.rotation, t),
            breathing: lerp(self.breathing, other.breathing, t),
            size: lerp(self.size, other.size, t),
        }
    }
}

/// Oscillator state for one side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionState {
    pub side: Side,
    current: MotionSample,
    /// Snapshot of `current` from the previous completed tick
    previous: MotionSample,
    velocity: Vec2,
}

impl MotionState {
    pub fn new(side: Side, initial_size: f32) -> Self {
        let rest = MotionSample {
            size: finite_or(initial_size, 0.0).clamp(0.0, 1.0),
            ..Default::default()
        };
        Self {
            side,
            current: rest,
            previous: rest,
            velocity: Vec2::ZERO,
        }
    }

    /// State as of the last completed tick
    pub fn current(&self) -> MotionSample {
        self.current
    }

    /// State as of the tick before that
    pub fn previous(&self) -> MotionSample {
        self.previous
    }

    /// True when displacement and velocity are exactly zero
    pub fn is_at_rest(&self) -> bool {
        self.current.position == Vec2::ZERO && self.velocity == Vec2::ZERO && self.current.rotation == 0.0
    }

    /// Advance one fixed tick
    pub fn advance(&mut self, input: &MotionInput) {
        self.previous = self.current;

        // Non-finite resistance is treated as rigid armor
        let resistance = finite_or(input.resistance, 1.0).clamp(0.0, 1.0);
        let bounce = finite_or(input.bounce_multiplier, 0.0).clamp(0.0, MAX_MULTIPLIER);
        let floppy = finite_or(input.floppy_multiplier, 0.0).clamp(0.0, MAX_MULTIPLIER);
        let forcing = if input.physics_enabled { 1.0 - resistance } else { 0.0 };

        let impulse = Vec2::new(
            finite_or(input.lateral_impulse, 0.0).clamp(-MAX_IMPULSE, MAX_IMPULSE),
            -finite_or(input.vertical_impulse, 0.0).clamp(-MAX_IMPULSE, MAX_IMPULSE),
        );
        let target = (impulse * IMPULSE_GAIN * floppy * forcing)
            .clamp(Vec2::splat(-MAX_DISPLACEMENT), Vec2::splat(MAX_DISPLACEMENT));

        let free_damping = BASE_DAMPING / (1.0 + bounce);
        let damping = free_damping + (RIGID_DAMPING - free_damping) * resistance;

        let last_y = self.current.position.y;
        let mut position = self.current.position;
        self.velocity += (target - position) * SPRING_STIFFNESS - self.velocity * damping;
        position += self.velocity;

        if position.x.abs() > MAX_DISPLACEMENT {
            position.x = MAX_DISPLACEMENT.copysign(position.x);
            self.velocity.x = 0.0;
        }
        if position.y.abs() > MAX_DISPLACEMENT {
            position.y = MAX_DISPLACEMENT.copysign(position.y);
            self.velocity.y = 0.0;
        }
        if (position - target).abs().max_element() < REST_EPSILON
            && self.velocity.abs().max_element() < REST_EPSILON
        {
            position = target;
            self.velocity = Vec2::ZERO;
        }
        self.current.position = position;

        let rotation = position.x * LATERAL_ROTATION_GAIN + (position.y - last_y) * VERTICAL_ROTATION_GAIN;
        self.current.rotation = rotation.clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);

        self.current.breathing = if input.breathing {
            breathing_angle(input.tick_count)
        } else {
            0.0
        };

        let target_size = finite_or(input.target_size, 0.0).clamp(0.0, 1.0);
        let size = self.current.size + (target_size - self.current.size) * SIZE_EASE;
        self.current.size = if (target_size - size).abs() < SIZE_EPSILON {
            target_size
        } else {
            size
        };
    }

    /// Interpolated state at `phase` ∈ [0, 1] between the last two ticks
    pub fn sample(&self, phase: f32) -> MotionSample {
        let phase = finite_or(phase, 1.0).clamp(0.0, 1.0);
        self.previous.lerp(&self.current, phase)
    }
}

/// Breathing tilt for a given host tick (degrees, 0 - 0.9)
#[inline]
pub fn breathing_angle(tick_count: u64) -> f32 {
    // Wrap to keep the f32 phase precise on long-running hosts
    let cycle = std::f64::consts::TAU / BREATH_RATE as f64;
    let t = (tick_count as f64 % cycle) as f32;
    -(t * BREATH_RATE).cos() * BREATH_AMPLITUDE + BREATH_AMPLITUDE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling(impulse: f32) -> MotionInput {
        MotionInput {
            vertical_impulse: impulse,
            bounce_multiplier: 1.0,
            floppy_multiplier: 1.0,
            target_size: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_state_is_at_rest() {
        let state = MotionState::new(Side::Left, 0.5);
        assert!(state.is_at_rest());
        assert_eq!(state.sample(0.3).size, 0.5);
    }

    #[test]
    fn test_descending_raises_displacement() {
        let mut state = MotionState::new(Side::Left, 0.5);
        state.advance(&falling(-0.5));
        assert!(state.current().position.y > 0.0);
        assert_eq!(state.previous().position.y, 0.0);
    }

    #[test]
    fn test_previous_is_last_tick() {
        let mut state = MotionState::new(Side::Left, 0.5);
        state.advance(&falling(-0.5));
        let after_first = state.current();
        state.advance(&falling(-0.5));
        assert_eq!(state.previous(), after_first);
    }

    #[test]
    fn test_sample_endpoints_exact() {
        let mut state = MotionState::new(Side::Right, 0.5);
        for _ in 0..3 {
            state.advance(&falling(-0.7));
        }
        assert_eq!(state.sample(0.0), state.previous());
        assert_eq!(state.sample(1.0), state.current());
        assert_eq!(state.sample(f32::NAN), state.current());
    }

    #[test]
    fn test_sample_is_pure() {
        let mut state = MotionState::new(Side::Left, 0.5);
        state.advance(&falling(-1.0));
        let a = state.sample(0.25);
        let _ = state.sample(0.9);
        assert_eq!(state.sample(0.25), a);
    }

    #[test]
    fn test_extreme_impulse_is_clamped() {
        let mut state = MotionState::new(Side::Left, 0.5);
        for impulse in [1e9, -1e9, f32::INFINITY, f32::NAN, -3.0, 1e30] {
            state.advance(&MotionInput {
                lateral_impulse: impulse,
                ..falling(impulse)
            });
            let cur = state.current();
            assert!(cur.position.x.abs() <= MAX_DISPLACEMENT);
            assert!(cur.position.y.abs() <= MAX_DISPLACEMENT);
            assert!(cur.rotation.abs() <= MAX_ROTATION_DEG);
            assert!(cur.position.is_finite());
        }
    }

    #[test]
    fn test_full_resistance_settles_to_rest() {
        let mut state = MotionState::new(Side::Left, 0.5);
        for _ in 0..10 {
            state.advance(&falling(-4.0));
        }
        assert!(!state.is_at_rest());

        let rigid = MotionInput {
            resistance: 1.0,
            ..falling(-4.0)
        };
        let mut ticks = 0;
        while !state.is_at_rest() {
            state.advance(&rigid);
            ticks += 1;
            assert!(ticks < 200, "did not settle");
        }
        // Stays there regardless of continued input
        for _ in 0..20 {
            state.advance(&rigid);
            assert!(state.is_at_rest());
        }
    }

    #[test]
    fn test_physics_disabled_converges_to_rest() {
        let mut state = MotionState::new(Side::Left, 0.5);
        state.advance(&falling(-2.0));
        let off = MotionInput {
            physics_enabled: false,
            ..falling(-2.0)
        };
        for _ in 0..200 {
            state.advance(&off);
        }
        assert!(state.is_at_rest());
    }

    #[test]
    fn test_lateral_sway_same_on_both_sides() {
        let input = MotionInput {
            lateral_impulse: 0.4,
            ..falling(0.0)
        };
        let mut left = MotionState::new(Side::Left, 0.5);
        let mut right = MotionState::new(Side::Right, 0.5);
        for _ in 0..3 {
            left.advance(&input);
            right.advance(&input);
        }
        assert!(left.current().position.x > 0.0);
        assert!(left.current().rotation > 0.0);
        assert_eq!(left.current(), right.current());
    }

    #[test]
    fn test_breathing_channel() {
        let mut state = MotionState::new(Side::Left, 0.5);
        state.advance(&MotionInput {
            breathing: true,
            tick_count: 35,
            ..falling(0.0)
        });
        let angle = state.current().breathing;
        assert!(angle > 0.0 && angle <= 2.0 * BREATH_AMPLITUDE);

        state.advance(&falling(0.0));
        assert_eq!(state.current().breathing, 0.0);
        assert_eq!(breathing_angle(0), 0.0);
    }

    #[test]
    fn test_size_eases_toward_target() {
        let mut state = MotionState::new(Side::Left, 0.0);
        state.advance(&falling(0.0));
        let first = state.current().size;
        assert!(first > 0.0 && first < 0.5);
        for _ in 0..40 {
            state.advance(&falling(0.0));
        }
        assert_eq!(state.current().size, 0.5);
    }
}
