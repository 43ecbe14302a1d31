//! Entity configuration cache
//!
//! Maps entity identity to its configuration record. Records are created on
//! first sight and live until the host calls [`EntityCache::remove`].

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::CacheError;
use crate::settings::Settings;
use crate::sim::state::EntityConfig;

/// A record shared between the cache and per-entity tick/render passes
pub type SharedConfig = Arc<Mutex<EntityConfig>>;

/// Identity and classification of a host entity
pub trait EntityView {
    fn id(&self) -> Uuid;
    /// Player-like actors have their own settings source
    fn is_player(&self) -> bool;
    /// Reduced-scale skeletons are excluded from the effect
    fn is_juvenile(&self) -> bool;
}

/// External per-player settings store
pub trait PlayerConfigSource: Send + Sync {
    fn player_config(&self, id: Uuid) -> Result<Option<SharedConfig>, CacheError>;
}

/// In-memory player settings store
#[derive(Default)]
pub struct PlayerRegistry {
    players: DashMap<Uuid, SharedConfig>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a player's record
    pub fn insert(&self, config: EntityConfig) -> SharedConfig {
        let id = config.id();
        let shared = Arc::new(Mutex::new(config));
        self.players.insert(id, shared.clone());
        shared
    }

    pub fn remove(&self, id: Uuid) -> Option<SharedConfig> {
        self.players.remove(&id).map(|(_, config)| config)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerConfigSource for PlayerRegistry {
    fn player_config(&self, id: Uuid) -> Result<Option<SharedConfig>, CacheError> {
        Ok(self.players.get(&id).map(|entry| entry.value().clone()))
    }
}

/// Concurrent registry of non-player configuration records
pub struct EntityCache {
    entities: DashMap<Uuid, SharedConfig>,
    players: Arc<dyn PlayerConfigSource>,
    defaults: Settings,
}

impl EntityCache {
    pub fn new(defaults: Settings, players: Arc<dyn PlayerConfigSource>) -> Self {
        Self {
            entities: DashMap::new(),
            players,
            defaults: defaults.sanitized(),
        }
    }

    /// Cache with an empty player registry
    pub fn with_defaults(defaults: Settings) -> Self {
        Self::new(defaults, Arc::new(PlayerRegistry::new()))
    }

    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    /// Fetch the entity's record, creating it on first sight.
    ///
    /// Players are delegated to the player source and juveniles get `None`;
    /// neither touches the local map. Concurrent calls for the same new id
    /// all observe the one record that won the insert.
    pub fn get_or_create(&self, entity: &impl EntityView) -> Result<Option<SharedConfig>, CacheError> {
        let id = entity.id();
        if entity.is_player() {
            return self.players.player_config(id);
        }
        if entity.is_juvenile() {
            return Ok(None);
        }

        let entry = self.entities.entry(id).or_insert_with(|| {
            log::debug!("Creating configuration record for {}", id);
            Arc::new(Mutex::new(EntityConfig::new(id, &self.defaults)))
        });
        Ok(Some(entry.value().clone()))
    }

    /// Like [`get_or_create`](Self::get_or_create), but failures mean "no
    /// record this call"
    pub fn lookup(&self, entity: &impl EntityView) -> Option<SharedConfig> {
        match self.get_or_create(entity) {
            Ok(config) => config,
            Err(e) if e.is_transient() => {
                log::debug!("Retrying lookup next tick: {}", e);
                None
            }
            Err(e) => {
                log::warn!("No configuration available: {}", e);
                None
            }
        }
    }

    /// Existing record without creating one
    pub fn get(&self, id: Uuid) -> Option<SharedConfig> {
        self.entities.get(&id).map(|entry| entry.value().clone())
    }

    /// Drop the record for an entity the host has unloaded
    pub fn remove(&self, id: Uuid) -> Option<SharedConfig> {
        let removed = self.entities.remove(&id).map(|(_, config)| config);
        if removed.is_some() {
            log::debug!("Removed configuration record for {}", id);
        }
        removed
    }

    /// Drop every record (world unload)
    pub fn clear(&self) {
        log::debug!("Clearing {} configuration records", self.entities.len());
        self.entities.clear();
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::RecordKind;

    struct Mob {
        id: Uuid,
        player: bool,
        juvenile: bool,
    }

    impl EntityView for Mob {
        fn id(&self) -> Uuid {
            self.id
        }
        fn is_player(&self) -> bool {
            self.player
        }
        fn is_juvenile(&self) -> bool {
            self.juvenile
        }
    }

    fn mob(n: u128) -> Mob {
        Mob {
            id: Uuid::from_u128(n),
            player: false,
            juvenile: false,
        }
    }

    struct BusyPlayers;

    impl PlayerConfigSource for BusyPlayers {
        fn player_config(&self, id: Uuid) -> Result<Option<SharedConfig>, CacheError> {
            Err(CacheError::Busy(id))
        }
    }

    #[test]
    fn test_creates_once_per_id() {
        let cache = EntityCache::with_defaults(Settings::default());
        let a = cache.get_or_create(&mob(1)).unwrap().unwrap();
        let b = cache.get_or_create(&mob(1)).unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        cache.get_or_create(&mob(2)).unwrap().unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_juvenile_excluded() {
        let cache = EntityCache::with_defaults(Settings::default());
        let baby = Mob {
            juvenile: true,
            ..mob(3)
        };
        assert!(cache.get_or_create(&baby).unwrap().is_none());
        assert!(cache.is_empty());
        assert!(!cache.contains(baby.id));
    }

    #[test]
    fn test_player_delegated() {
        let registry = Arc::new(PlayerRegistry::new());
        let player_id = Uuid::from_u128(4);
        let registered = registry.insert(EntityConfig::new_player(player_id, &Settings::default()));
        let cache = EntityCache::new(Settings::default(), registry.clone());

        let player = Mob {
            player: true,
            ..mob(4)
        };
        let found = cache.get_or_create(&player).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &registered));
        assert_eq!(found.lock().unwrap().kind, RecordKind::Player);
        assert!(cache.is_empty());

        let unknown = Mob {
            player: true,
            ..mob(5)
        };
        assert!(cache.get_or_create(&unknown).unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_transient_failure_is_no_record() {
        let cache = EntityCache::new(Settings::default(), Arc::new(BusyPlayers));
        let player = Mob {
            player: true,
            ..mob(6)
        };
        assert!(matches!(cache.get_or_create(&player), Err(CacheError::Busy(_))));
        assert!(cache.lookup(&player).is_none());
        // Non-players are unaffected
        assert!(cache.lookup(&mob(7)).is_some());
    }

    struct OfflinePlayers;

    impl PlayerConfigSource for OfflinePlayers {
        fn player_config(&self, id: Uuid) -> Result<Option<SharedConfig>, CacheError> {
            Err(CacheError::PlayerUnavailable(id))
        }
    }

    #[test]
    fn test_unavailable_player_is_no_record() {
        let cache = EntityCache::new(Settings::default(), Arc::new(OfflinePlayers));
        let player = Mob {
            player: true,
            ..mob(8)
        };
        let err = cache.get_or_create(&player).err().unwrap();
        assert!(!err.is_transient());
        assert!(cache.lookup(&player).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = EntityCache::with_defaults(Settings::default());
        cache.get_or_create(&mob(1)).unwrap();
        cache.get_or_create(&mob(2)).unwrap();
        assert!(cache.remove(Uuid::from_u128(1)).is_some());
        assert!(cache.remove(Uuid::from_u128(1)).is_none());
        assert!(cache.get(Uuid::from_u128(1)).is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_removed_entity_gets_fresh_record() {
        let cache = EntityCache::with_defaults(Settings::default());
        let first = cache.get_or_create(&mob(9)).unwrap().unwrap();
        first.lock().unwrap().set_bust_size(0.0);
        cache.remove(Uuid::from_u128(9));
        let second = cache.get_or_create(&mob(9)).unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!((second.lock().unwrap().bust_size() - 0.6).abs() < f32::EPSILON);
    }
}
