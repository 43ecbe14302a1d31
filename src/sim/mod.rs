//! Fixed-tick simulation module
//!
//! Per-entity state and the logic that advances it:
//! - One `advance` per fixed tick, any number of `sample` calls between ticks
//! - Previous-tick snapshots only, never older
//! - No rendering or host-platform dependencies

pub mod armor;
pub mod gear;
pub mod motion;
pub mod state;
pub mod tick;

pub use armor::{ArmorStats, GenderArmor, effective_resistance};
pub use gear::{ChestItem, CustomData, GEAR_DATA_KEY, GearOffsets, GearPayload, apply_gear};
pub use motion::{MotionInput, MotionSample, MotionState, Side, breathing_angle};
pub use state::{Breasts, EntityConfig, Gender, RecordKind};
pub use tick::{EntityTick, PhysicsDriver, RenderParams, TickOutcome, TickReport, sample_entity, tick_entity};
