//! Fixed timestep driver
//!
//! Ticks every visible entity once per simulation step and produces the
//! render-facing parameters for any phase between steps.

use std::sync::{Arc, MutexGuard};

use glam::Vec3;
use uuid::Uuid;

use super::armor::{ArmorStats, GenderArmor, effective_resistance};
use super::gear::{ChestItem, apply_gear};
use super::motion::{MotionInput, MotionSample};
use super::state::EntityConfig;
use crate::cache::{EntityCache, EntityView, SharedConfig};
use crate::consts::*;
use crate::error::EntityError;
use crate::round_offset;
use crate::settings::Settings;

/// Host snapshot of one entity for a single tick
#[derive(Debug, Clone, Default)]
pub struct EntityTick {
    pub id: Uuid,
    pub is_player: bool,
    pub is_juvenile: bool,
    /// Vertical position change since last tick (negative while descending)
    pub vertical_impulse: f32,
    /// Sideways motion signal (strafe speed or body yaw change)
    pub lateral_impulse: f32,
    /// Eyes are under liquid
    pub submerged: bool,
    /// Can breathe while submerged (effect or bubble column)
    pub water_breathing: bool,
    /// Host tick counter for the entity
    pub tick_count: u64,
    pub chest: ChestItem,
    pub armor: ArmorStats,
}

impl EntityView for EntityTick {
    fn id(&self) -> Uuid {
        self.id
    }

    fn is_player(&self) -> bool {
        self.is_player
    }

    fn is_juvenile(&self) -> bool {
        self.is_juvenile
    }
}

/// Result of ticking one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    /// No record this tick (juvenile, unknown player, transient conflict)
    Skipped,
}

fn lock(config: &SharedConfig, id: Uuid) -> Result<MutexGuard<'_, EntityConfig>, EntityError> {
    config.lock().map_err(|_| EntityError::Poisoned(id))
}

/// Tick one entity: fetch its record, apply gear (non-players), advance physics.
///
/// Transient lookup conflicts skip the entity; other lookup failures are
/// returned so the batch can report them.
pub fn tick_entity(cache: &EntityCache, entity: &EntityTick) -> Result<TickOutcome, EntityError> {
    let shared = match cache.get_or_create(entity) {
        Ok(Some(shared)) => shared,
        Ok(None) => return Ok(TickOutcome::Skipped),
        Err(e) if e.is_transient() => {
            log::debug!("Skipping {} this tick: {}", entity.id, e);
            return Ok(TickOutcome::Skipped);
        }
        Err(e) => return Err(e.into()),
    };
    let mut config = lock(&shared, entity.id)?;

    if !entity.is_player {
        apply_gear(&mut config, &entity.chest);
    }

    let resistance = effective_resistance(&entity.armor, config.armor_physics_override());
    let breathing = config.breathing
        && resistance <= 0.5
        && (!entity.submerged || entity.water_breathing);

    config.tick_physics(&MotionInput {
        vertical_impulse: entity.vertical_impulse,
        lateral_impulse: entity.lateral_impulse,
        resistance,
        breathing,
        tick_count: entity.tick_count,
        ..Default::default()
    });
    Ok(TickOutcome::Advanced)
}

/// Everything a renderer needs for one entity this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub left: MotionSample,
    pub right: MotionSample,
    /// Right side mirrors the left; draw as one body
    pub uniboob: bool,
    /// Apply bounce translation/rotation
    pub bounce_enabled: bool,
    /// Shaped size driving the downward shift and bend
    pub breast_size: f32,
    /// Depth offset (model units); smaller chests sit further back
    pub z_offset: f32,
    /// Downward bend per side, as a fraction of the full bend angle (0 - 1)
    pub left_bend: f32,
    pub right_bend: f32,
    /// Offsets in pixels, rounded to slider steps (y and z negated for model space)
    pub offsets: Vec3,
    /// Outward angle for the left side (degrees); the right uses its negation
    pub outward_angle: f32,
    pub chest_covered: bool,
    pub jacket_layer: bool,
}

/// Interpolated render parameters at `phase`, or `None` when nothing is drawn
pub fn sample_entity(config: &EntityConfig, armor: &impl GenderArmor, phase: f32) -> Option<RenderParams> {
    let covered = armor.covers_breasts();
    if armor.always_hides_breasts() || (!config.show_in_armor() && covered) {
        return None;
    }

    let left = config.left().sample(phase);
    let size = left.size;
    let shown = if size > 0.7 { size } else { (size * 1.5).min(0.7) };
    if shown < FEMALE_THRESHOLD {
        return None;
    }

    let right = if config.breasts.uniboob {
        left
    } else {
        config.right().sample(phase)
    };

    let resistance = effective_resistance(armor, config.armor_physics_override());
    let bounce_enabled = config.physics && (!covered || resistance < 1.0);
    let breast_size = size + (size - 0.7).abs();
    let offsets = config.breasts.offsets();
    Some(RenderParams {
        left,
        right,
        uniboob: config.breasts.uniboob,
        bounce_enabled,
        breast_size,
        z_offset: 0.0625 - size * 0.0625,
        left_bend: bend(breast_size, left.position.y, bounce_enabled),
        right_bend: bend(breast_size, right.position.y, bounce_enabled),
        offsets: Vec3::new(
            round_offset(offsets.x),
            -round_offset(offsets.y),
            -round_offset(offsets.z),
        ),
        outward_angle: ((config.breasts.cleavage() * 100.0).round() / 100.0 * 100.0).min(10.0),
        chest_covered: covered,
        jacket_layer: config.jacket_layer,
    })
}

/// Bend follows vertical displacement while bouncing, never more than 0.2
/// past the resting bend and never past full
fn bend(breast_size: f32, vertical: f32, bounce_enabled: bool) -> f32 {
    let bend = if bounce_enabled {
        breast_size - vertical / 12.0
    } else {
        breast_size
    };
    bend.min(breast_size + 0.2).min(1.0)
}

/// Per-batch summary
#[derive(Debug, Default)]
pub struct TickReport {
    pub advanced: usize,
    pub skipped: usize,
    pub failures: Vec<(Uuid, EntityError)>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns the cache and drives it at a fixed rate
pub struct PhysicsDriver {
    cache: Arc<EntityCache>,
    accumulator: f32,
    ticks: u64,
}

impl PhysicsDriver {
    pub fn new(cache: Arc<EntityCache>) -> Self {
        Self {
            cache,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self::new(Arc::new(EntityCache::with_defaults(settings)))
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    /// Completed simulation ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick a batch of entities. One entity failing never stops the others.
    pub fn tick_all(&mut self, entities: &[EntityTick]) -> TickReport {
        let mut report = TickReport::default();
        for entity in entities {
            match tick_entity(&self.cache, entity) {
                Ok(TickOutcome::Advanced) => report.advanced += 1,
                Ok(TickOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    log::error!("Failed to tick entity {}: {}", entity.id, e);
                    report.failures.push((entity.id, e));
                }
            }
        }
        self.ticks += 1;
        report
    }

    /// Accumulate frame time and run the due ticks. `entities` is called once
    /// per tick so the host can supply fresh snapshots.
    pub fn update<F>(&mut self, frame_dt: f32, mut entities: F) -> Vec<TickReport>
    where
        F: FnMut(u64) -> Vec<EntityTick>,
    {
        self.accumulator += crate::finite_or(frame_dt, 0.0).clamp(0.0, MAX_FRAME_DT);

        let mut reports = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let batch = entities(self.ticks);
            reports.push(self.tick_all(&batch));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            // Too far behind; drop the backlog rather than spiral
            self.accumulator %= SIM_DT;
        }
        reports
    }

    /// Fraction of a tick elapsed since the last completed one
    pub fn render_phase(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    /// Render parameters for an entity at the current phase
    pub fn sample(&self, entity: &impl EntityView, armor: &impl GenderArmor) -> Result<Option<RenderParams>, EntityError> {
        let Some(shared) = self.cache.lookup(entity) else {
            return Ok(None);
        };
        let config = lock(&shared, entity.id())?;
        Ok(sample_entity(&config, armor, self.render_phase()))
    }
}
