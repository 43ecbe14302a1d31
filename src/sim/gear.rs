//! Gear-data overlay
//!
//! Non-player entities have no settings of their own. Instead they take their
//! appearance from a small payload stamped into the custom data of the chest
//! item they wear.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::EntityConfig;

/// Key of the payload inside an item's custom data object
pub const GEAR_DATA_KEY: &str = "breast_data";

/// Opaque custom data attached to an item, compared by value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomData(pub Value);

impl CustomData {
    pub fn empty() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self(serde_json::from_str(json)?))
    }

    /// Extract the gear payload, if present and well-formed
    pub fn payload(&self) -> Option<GearPayload> {
        let raw = self.0.get(GEAR_DATA_KEY)?;
        match GearPayload::deserialize(raw) {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::debug!("Ignoring malformed gear payload: {}", e);
                None
            }
        }
    }
}

/// The chest-slot item as seen by the overlay
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChestItem {
    /// Stack size; 0 means the slot is empty
    pub count: u32,
    pub custom_data: Option<CustomData>,
}

impl ChestItem {
    pub const EMPTY: ChestItem = ChestItem {
        count: 0,
        custom_data: None,
    };

    pub fn with_data(custom_data: CustomData) -> Self {
        Self {
            count: 1,
            custom_data: Some(custom_data),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Per-axis geometry offsets on the wire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GearOffsets {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<GearOffsets> for Vec3 {
    fn from(o: GearOffsets) -> Self {
        Vec3::new(o.x, o.y, o.z)
    }
}

impl From<Vec3> for GearOffsets {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

fn default_jacket() -> bool {
    true
}

/// Appearance payload carried by gear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearPayload {
    pub breast_size: f32,
    #[serde(default)]
    pub cleavage: f32,
    #[serde(default)]
    pub offsets: GearOffsets,
    #[serde(default = "default_jacket")]
    pub jacket: bool,
}

impl GearPayload {
    /// Capture a record's appearance so it can be stamped onto gear
    pub fn from_config(config: &EntityConfig) -> Self {
        Self {
            breast_size: config.bust_size(),
            cleavage: config.breasts.cleavage(),
            offsets: config.breasts.offsets().into(),
            jacket: config.jacket_layer,
        }
    }

    /// Write this payload into custom data, keeping unrelated keys
    pub fn write_to(&self, data: &mut CustomData) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(self)?;
        match &mut data.0 {
            Value::Object(map) => {
                map.insert(GEAR_DATA_KEY.to_string(), value);
            }
            other => {
                let mut map = serde_json::Map::new();
                map.insert(GEAR_DATA_KEY.to_string(), value);
                *other = Value::Object(map);
            }
        }
        Ok(())
    }

    /// Remove any payload from custom data
    pub fn clear_from(data: &mut CustomData) {
        if let Value::Object(map) = &mut data.0 {
            map.remove(GEAR_DATA_KEY);
        }
    }
}

/// Overlay the chest item's gear data onto a record. Run once per tick before
/// physics or config are read.
pub fn apply_gear(config: &mut EntityConfig, item: &ChestItem) {
    let data = match &item.custom_data {
        Some(data) if !item.is_empty() => data,
        _ => {
            config.applied_gear = None;
            config.force_male();
            return;
        }
    };

    if config.applied_gear.as_ref() == Some(data) {
        // Unchanged since the last tick
        return;
    }

    let Some(payload) = data.payload() else {
        config.applied_gear = None;
        config.force_male();
        return;
    };

    // Gear-sourced appearance is static
    config.physics = false;
    config.set_bust_size(payload.breast_size);
    config.breasts.update_cleavage(payload.cleavage);
    config.breasts.update_offsets(payload.offsets.into());
    config.jacket_layer = payload.jacket;
    config.applied_gear = Some(data.clone());
    log::trace!("Applied gear overlay to {}", config);
}
