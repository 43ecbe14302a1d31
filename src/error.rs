//! Error types
//!
//! Nothing here is fatal: every failure degrades to "this entity renders with
//! defaults this tick".

use uuid::Uuid;

/// Failure to produce a configuration record for an entity
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing entity collection was mid-update; retry next tick
    #[error("entity {0} lookup conflicted with a concurrent update")]
    Busy(Uuid),

    #[error("player settings unavailable for {0}")]
    PlayerUnavailable(Uuid),
}

impl CacheError {
    /// Transient errors are expected to clear on a later call
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::Busy(_))
    }
}

/// Failure while ticking a single entity
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("configuration lookup failed: {0}")]
    Cache(#[from] CacheError),

    /// A previous pass panicked while holding the record
    #[error("configuration record for {0} is poisoned")]
    Poisoned(Uuid),
}

/// Failure loading host settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
