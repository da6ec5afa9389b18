//! Room setup: roster and configuration consumed at initialization
//!
//! Supplied by the hosting layer (lobby, matchmaking); the engine treats
//! it as read-only input when the clock is constructed.

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::world::company::OrgType;
use crate::world::snapshot::CompanySeed;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names handed to generated AI rivals, in order
const AI_NAMES: [&str; 6] = [
    "Kestrel Group",
    "Northbridge Capital",
    "Volt Industries",
    "Orme Logistics",
    "Saxum Mining",
    "Harbor & Sons",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSetup {
    pub room_id: String,
    pub companies: Vec<CompanySeed>,
    pub config: EngineConfig,
}

impl RoomSetup {
    /// A quick single-player room: one player company plus the
    /// configured number of AI rivals
    pub fn single_player(player_name: impl Into<String>, config: EngineConfig) -> Self {
        let mut companies = vec![CompanySeed {
            name: player_name.into(),
            is_player: true,
            org: OrgType::Centralized,
        }];
        for i in 0..config.ai_count as usize {
            companies.push(CompanySeed {
                name: AI_NAMES[i % AI_NAMES.len()].to_string(),
                is_player: false,
                org: if i % 2 == 0 {
                    OrgType::Decentralized
                } else {
                    OrgType::Centralized
                },
            });
        }
        Self {
            room_id: format!("room-{}", config.seed),
            companies,
            config,
        }
    }

    /// Load a full room description from a TOML scenario file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let setup: Self = toml::from_str(&content).map_err(|e| {
            crate::core::error::MagnateError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        setup.config.validate()?;
        Ok(setup)
    }

    pub fn player_seed(&self) -> Option<&CompanySeed> {
        self.companies.iter().find(|c| c.is_player)
    }

    pub fn ai_seeds(&self) -> impl Iterator<Item = &CompanySeed> {
        self.companies.iter().filter(|c| !c.is_player)
    }
}
