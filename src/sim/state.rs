//! Per-entity configuration records
//!
//! A record owns its two motion states and the last gear blob applied to it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gear::CustomData;
use super::motion::{MotionInput, MotionState, Side};
use crate::consts::{FEMALE_THRESHOLD, MAX_MULTIPLIER};
use crate::finite_or;
use crate::settings::Settings;

/// Rendered gender, always derived from bust size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[inline]
    pub fn from_bust_size(bust_size: f32) -> Self {
        if bust_size >= FEMALE_THRESHOLD {
            Gender::Female
        } else {
            Gender::Male
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Breast geometry settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Breasts {
    /// Model offsets in pixels, each axis within [-1, 1]
    offsets: Vec3,
    /// 0.0 - 1.0
    cleavage: f32,
    /// Render both sides as one mirrored body
    pub uniboob: bool,
}

impl Breasts {
    pub fn offsets(&self) -> Vec3 {
        self.offsets
    }

    pub fn cleavage(&self) -> f32 {
        self.cleavage
    }

    pub fn update_offsets(&mut self, offsets: Vec3) {
        let sanitized = Vec3::new(
            finite_or(offsets.x, 0.0),
            finite_or(offsets.y, 0.0),
            finite_or(offsets.z, 0.0),
        );
        self.offsets = sanitized.clamp(Vec3::splat(-1.0), Vec3::ONE);
    }

    pub fn update_cleavage(&mut self, cleavage: f32) {
        self.cleavage = finite_or(cleavage, 0.0).clamp(0.0, 1.0);
    }
}

/// Whether a record belongs to a player (settings come from the player's own
/// config) or to a plain entity (settings come from worn gear)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Entity,
    Player,
}

/// Configuration record for one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    id: Uuid,
    pub kind: RecordKind,
    bust_size: f32,
    pub physics: bool,
    bounce_multiplier: f32,
    floppy_multiplier: f32,
    show_in_armor: bool,
    armor_physics_override: bool,
    pub breathing: bool,
    /// Only meaningful for non-players; players report their own jacket layer
    pub jacket_layer: bool,
    pub breasts: Breasts,
    left: MotionState,
    right: MotionState,
    /// Blob the current overlay was parsed from
    #[serde(skip)]
    pub(crate) applied_gear: Option<CustomData>,
}

impl EntityConfig {
    /// New entity record seeded from host defaults
    pub fn new(id: Uuid, settings: &Settings) -> Self {
        let mut config = Self {
            id,
            kind: RecordKind::Entity,
            bust_size: 0.0,
            physics: settings.physics,
            bounce_multiplier: 0.0,
            floppy_multiplier: 0.0,
            show_in_armor: settings.show_in_armor,
            armor_physics_override: settings.armor_physics_override,
            breathing: settings.breathing,
            jacket_layer: true,
            breasts: Breasts::default(),
            left: MotionState::new(Side::Left, 0.0),
            right: MotionState::new(Side::Right, 0.0),
            applied_gear: None,
        };
        config.set_bust_size(settings.bust_size);
        config.set_bounce_multiplier(settings.bounce_multiplier);
        config.set_floppy_multiplier(settings.floppy_multiplier);
        config.left = MotionState::new(Side::Left, config.bust_size);
        config.right = MotionState::new(Side::Right, config.bust_size);
        config
    }

    /// New player record; players honour the armor settings
    pub fn new_player(id: Uuid, settings: &Settings) -> Self {
        let mut config = Self::new(id, settings);
        config.kind = RecordKind::Player;
        config
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_player(&self) -> bool {
        self.kind == RecordKind::Player
    }

    pub fn gender(&self) -> Gender {
        Gender::from_bust_size(self.bust_size)
    }

    pub fn bust_size(&self) -> f32 {
        self.bust_size
    }

    /// Set bust size; gender follows
    pub fn set_bust_size(&mut self, bust_size: f32) {
        self.bust_size = finite_or(bust_size, 0.0).clamp(0.0, 1.0);
    }

    /// Force male rendering
    pub fn force_male(&mut self) {
        self.bust_size = 0.0;
    }

    pub fn bounce_multiplier(&self) -> f32 {
        self.bounce_multiplier
    }

    pub fn set_bounce_multiplier(&mut self, value: f32) {
        self.bounce_multiplier = finite_or(value, 0.0).clamp(0.0, MAX_MULTIPLIER);
    }

    pub fn floppy_multiplier(&self) -> f32 {
        self.floppy_multiplier
    }

    pub fn set_floppy_multiplier(&mut self, value: f32) {
        self.floppy_multiplier = finite_or(value, 0.0).clamp(0.0, MAX_MULTIPLIER);
    }

    /// Non-players are always shown under armor
    pub fn show_in_armor(&self) -> bool {
        !self.is_player() || self.show_in_armor
    }

    pub fn set_show_in_armor(&mut self, show: bool) {
        self.show_in_armor = show;
    }

    /// Non-players never override armor resistance
    pub fn armor_physics_override(&self) -> bool {
        self.is_player() && self.armor_physics_override
    }

    pub fn set_armor_physics_override(&mut self, value: bool) {
        self.armor_physics_override = value;
    }

    pub fn left(&self) -> &MotionState {
        &self.left
    }

    pub fn right(&self) -> &MotionState {
        &self.right
    }

    /// Advance both sides one tick. `base` carries the host inputs; the
    /// record's own multipliers, physics flag and bust size are filled in.
    pub fn tick_physics(&mut self, base: &MotionInput) {
        let input = MotionInput {
            bounce_multiplier: self.bounce_multiplier,
            floppy_multiplier: self.floppy_multiplier,
            physics_enabled: self.physics,
            target_size: self.bust_size,
            ..*base
        };
        self.left.advance(&input);
        self.right.advance(&input);
    }
}

impl std::fmt::Display for EntityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityConfig(id={}, gender={})", self.id, self.gender().as_str())
    }
}
