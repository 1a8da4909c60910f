//! Spawned NPCs of a zone, as far as loot loading is concerned.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A spawned non-player entity that may reference a loot table
pub trait NpcEntity {
    /// `0` means the NPC has no loot table
    fn loottable_id(&self) -> u32;
}

/// Enumerates the NPCs currently spawned in a zone
pub trait EntityDirectory {
    fn npcs(&self) -> Vec<&dyn NpcEntity>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnedNpc {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub loottable_id: u32,
}

impl NpcEntity for SpawnedNpc {
    fn loottable_id(&self) -> u32 {
        self.loottable_id
    }
}

/// A fixed list of spawned NPCs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnList {
    pub npcs: Vec<SpawnedNpc>,
}

impl SpawnList {
    pub fn new(npcs: Vec<SpawnedNpc>) -> Self {
        Self { npcs }
    }

    /// Read a JSON array of spawned NPCs
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read spawn list: {:?}", path))?;
        let list: SpawnList = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse spawn list: {:?}", path))?;
        Ok(list)
    }
}

impl EntityDirectory for SpawnList {
    fn npcs(&self) -> Vec<&dyn NpcEntity> {
        self.npcs.iter().map(|n| n as &dyn NpcEntity).collect()
    }
}
