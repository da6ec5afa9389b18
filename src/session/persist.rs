//! Persistence collaborator
//!
//! The engine saves opportunistically and must run correctly with no
//! store at all; failures are logged by the caller and never corrupt
//! the in-memory simulation.

use crate::core::error::{MagnateError, Result};
use crate::core::types::{CompanyId, Money, Tick};
use crate::world::snapshot::WorldSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Final statistics recorded once when a game ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResults {
    pub winner: Option<CompanyId>,
    pub reason: String,
    pub final_tick: Tick,
    /// (company, capital at the end), richest first
    pub standings: Vec<(CompanyId, Money)>,
}

/// One recorded action, for replay/audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub actor: CompanyId,
    pub action: String,
    pub payload: serde_json::Value,
    pub tick: Tick,
}

pub trait GameStore: Send + Sync {
    fn save_snapshot(&self, room: &str, snapshot: &WorldSnapshot) -> Result<()>;
    fn load_latest_snapshot(&self, room: &str) -> Result<Option<WorldSnapshot>>;
    fn record_action(&self, room: &str, record: ActionRecord) -> Result<()>;
    fn complete_game(&self, room: &str, results: &GameResults) -> Result<()>;
}

/// In-memory store: the default when no database is wired in
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    snapshots: HashMap<String, String>,
    actions: HashMap<String, Vec<ActionRecord>>,
    results: HashMap<String, GameResults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions_for(&self, room: &str) -> Vec<ActionRecord> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .actions
            .get(room)
            .cloned()
            .unwrap_or_default()
    }

    pub fn results_for(&self, room: &str) -> Option<GameResults> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .results
            .get(room)
            .cloned()
    }
}

impl GameStore for MemoryStore {
    fn save_snapshot(&self, room: &str, snapshot: &WorldSnapshot) -> Result<()> {
        let payload = serde_json::to_string(snapshot)?;
        self.inner
            .lock()
            .map_err(|_| MagnateError::PersistenceError("store lock poisoned".into()))?
            .snapshots
            .insert(room.to_string(), payload);
        Ok(())
    }

    fn load_latest_snapshot(&self, room: &str) -> Result<Option<WorldSnapshot>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| MagnateError::PersistenceError("store lock poisoned".into()))?;
        match guard.snapshots.get(room) {
            Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
            None => Ok(None),
        }
    }

    fn record_action(&self, room: &str, record: ActionRecord) -> Result<()> {
        self.inner
            .lock()
            .map_err(|_| MagnateError::PersistenceError("store lock poisoned".into()))?
            .actions
            .entry(room.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    fn complete_game(&self, room: &str, results: &GameResults) -> Result<()> {
        self.inner
            .lock()
            .map_err(|_| MagnateError::PersistenceError("store lock poisoned".into()))?
            .results
            .insert(room.to_string(), results.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::world::company::OrgType;
    use crate::world::snapshot::CompanySeed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_world() -> WorldSnapshot {
        let seeds = vec![CompanySeed {
            name: "Meridian Holdings".into(),
            is_player: true,
            org: OrgType::Centralized,
        }];
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        WorldSnapshot::generate(&EngineConfig::default(), &seeds, &mut rng)
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = MemoryStore::new();
        let world = sample_world();
        store.save_snapshot("room-1", &world).unwrap();

        let loaded = store.load_latest_snapshot("room-1").unwrap().unwrap();
        assert_eq!(loaded.companies.len(), world.companies.len());
        assert_eq!(loaded.companies[0].name, "Meridian Holdings");
        assert_eq!(loaded.buildings.len(), world.buildings.len());
    }

    #[test]
    fn test_missing_room_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load_latest_snapshot("nowhere").unwrap().is_none());
    }

    #[test]
    fn test_actions_and_results() {
        let store = MemoryStore::new();
        let actor = CompanyId::new();
        store
            .record_action(
                "room-1",
                ActionRecord {
                    actor,
                    action: "purchase".into(),
                    payload: serde_json::json!({"building": "Harbor Office Tower"}),
                    tick: 12,
                },
            )
            .unwrap();
        assert_eq!(store.actions_for("room-1").len(), 1);

        store
            .complete_game(
                "room-1",
                &GameResults {
                    winner: Some(actor),
                    reason: "eliminated all competitors".into(),
                    final_tick: 500,
                    standings: vec![(actor, 2_000_000)],
                },
            )
            .unwrap();
        assert!(store.results_for("room-1").is_some());
    }
}
