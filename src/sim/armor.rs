//! Chest item capabilities consumed from the equipment collaborator

use serde::{Deserialize, Serialize};

/// How a worn chest item interacts with the effect
pub trait GenderArmor {
    /// The item occupies the chest area
    fn covers_breasts(&self) -> bool;
    /// The item hides the effect regardless of player preference
    fn always_hides_breasts(&self) -> bool;
    /// Motion resistance, 0 (unimpeded) to 1 (rigid)
    fn physics_resistance(&self) -> f32;
}

/// Plain-data armor capabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub covers_breasts: bool,
    pub always_hides_breasts: bool,
    pub physics_resistance: f32,
}

impl ArmorStats {
    /// An empty chest slot
    pub const EMPTY: ArmorStats = ArmorStats {
        covers_breasts: false,
        always_hides_breasts: false,
        physics_resistance: 0.0,
    };

    /// Typical worn chestplate with the given resistance
    pub fn chestplate(physics_resistance: f32) -> Self {
        Self {
            covers_breasts: true,
            always_hides_breasts: false,
            physics_resistance,
        }
    }
}

impl Default for ArmorStats {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl GenderArmor for ArmorStats {
    fn covers_breasts(&self) -> bool {
        self.covers_breasts
    }

    fn always_hides_breasts(&self) -> bool {
        self.always_hides_breasts
    }

    fn physics_resistance(&self) -> f32 {
        self.physics_resistance
    }
}

/// Resistance the integrator should see for this armor
pub fn effective_resistance(armor: &impl GenderArmor, override_armor_physics: bool) -> f32 {
    if override_armor_physics {
        0.0
    } else {
        crate::finite_or(armor.physics_resistance(), 1.0).clamp(0.0, 1.0)
    }
}
