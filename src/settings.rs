//! Host settings and defaults
//!
//! New configuration records are seeded from these values. Persisted as JSON
//! by the host; this module only reads it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_MULTIPLIER;
use crate::error::SettingsError;

/// Host-environment defaults for configuration records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Appearance ===
    /// Bust size (0.0 - 1.0)
    pub bust_size: f32,
    /// Render while a chest item is worn
    pub show_in_armor: bool,

    // === Physics ===
    pub physics: bool,
    /// Bounce multiplier (0.0 - 3.0)
    pub bounce_multiplier: f32,
    /// Floppy multiplier (0.0 - 3.0)
    pub floppy_multiplier: f32,
    /// Ignore chest item resistance
    pub armor_physics_override: bool,
    /// Idle breathing animation
    pub breathing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bust_size: 0.6,
            show_in_armor: true,

            physics: true,
            bounce_multiplier: 0.34,
            floppy_multiplier: 0.75,
            armor_physics_override: false,
            breathing: true,
        }
    }
}

impl Settings {
    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        self.bust_size = crate::finite_or(self.bust_size, 0.0).clamp(0.0, 1.0);
        self.bounce_multiplier = crate::finite_or(self.bounce_multiplier, 0.0).clamp(0.0, MAX_MULTIPLIER);
        self.floppy_multiplier = crate::finite_or(self.floppy_multiplier, 0.0).clamp(0.0, MAX_MULTIPLIER);
        self
    }

    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.physics);
        assert!(settings.breathing);
        assert!(!settings.armor_physics_override);
        assert!((settings.bust_size - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_json_partial_and_clamped() {
        let settings = Settings::from_json(r#"{ "bust_size": 4.0, "floppy_multiplier": -1.0 }"#).unwrap();
        assert_eq!(settings.bust_size, 1.0);
        assert_eq!(settings.floppy_multiplier, 0.0);
        assert!((settings.bounce_multiplier - 0.34).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(Settings::from_json("not json"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip_keeps_physics_tuning() {
        let settings = Settings {
            physics: false,
            bounce_multiplier: 1.0,
            ..Settings::default()
        };
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert!(!back.physics);
        assert_eq!(back.bounce_multiplier, 1.0);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/jiggle-sim/settings.json");
        assert!((settings.bounce_multiplier - 0.34).abs() < f32::EPSILON);
        assert!(matches!(
            Settings::load("/nonexistent/jiggle-sim/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }
}
