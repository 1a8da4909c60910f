//! Row types for the loot hierarchy
//!
//! LootTable -> LootTableEntry -> LootDrop -> LootDropEntry. Ids are unsigned,
//! expansions are signed with `-1` meaning "unbounded".

use serde::{Deserialize, Serialize};

use crate::content_filter::{ContentFiltered, ContentFlags};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTable {
    pub id: u32,
    pub name: String,
    pub mincash: u32,
    pub maxcash: u32,
    pub avgcoin: u32,
    pub done: i8,
    pub min_expansion: i8,
    pub max_expansion: i8,
    pub content_flags: Option<String>,
    pub content_flags_disabled: Option<String>,
}

impl Default for LootTable {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            mincash: 0,
            maxcash: 0,
            avgcoin: 0,
            done: 0,
            min_expansion: -1,
            max_expansion: -1,
            content_flags: None,
            content_flags_disabled: None,
        }
    }
}

/// Links a loot table to one of its lootdrops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTableEntry {
    pub loottable_id: u32,
    pub lootdrop_id: u32,
    pub multiplier: u8,
    pub droplimit: u8,
    pub mindrop: u8,
    pub probability: f64,
}

impl LootTableEntry {
    pub fn key(&self) -> (u32, u32) {
        (self.loottable_id, self.lootdrop_id)
    }
}

impl Default for LootTableEntry {
    fn default() -> Self {
        Self {
            loottable_id: 0,
            lootdrop_id: 0,
            multiplier: 1,
            droplimit: 0,
            mindrop: 0,
            probability: 100.0,
        }
    }
}

/// `LootDrop::default()` doubles as the "no lootdrop" value (id 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootDrop {
    pub id: u32,
    pub name: String,
    pub min_expansion: i8,
    pub max_expansion: i8,
    pub content_flags: Option<String>,
    pub content_flags_disabled: Option<String>,
}

impl LootDrop {
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

impl Default for LootDrop {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            min_expansion: -1,
            max_expansion: -1,
            content_flags: None,
            content_flags_disabled: None,
        }
    }
}

/// A single item that a lootdrop can produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootDropEntry {
    pub lootdrop_id: u32,
    pub item_id: u32,
    pub item_charges: u16,
    pub equip_item: u8,
    pub chance: f64,
    pub disabled_chance: f64,
    pub trivial_min_level: u16,
    pub trivial_max_level: u16,
    pub multiplier: u8,
    pub npc_min_level: u16,
    pub npc_max_level: u16,
    pub min_expansion: i8,
    pub max_expansion: i8,
    pub content_flags: Option<String>,
    pub content_flags_disabled: Option<String>,
}

impl LootDropEntry {
    pub fn key(&self) -> (u32, u32) {
        (self.lootdrop_id, self.item_id)
    }
}

impl Default for LootDropEntry {
    fn default() -> Self {
        Self {
            lootdrop_id: 0,
            item_id: 0,
            item_charges: 1,
            equip_item: 0,
            chance: 1.0,
            disabled_chance: 0.0,
            trivial_min_level: 0,
            trivial_max_level: 0,
            multiplier: 1,
            npc_min_level: 0,
            npc_max_level: 0,
            min_expansion: -1,
            max_expansion: -1,
            content_flags: None,
            content_flags_disabled: None,
        }
    }
}

/// Item catalog row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

macro_rules! content_filtered {
    ($($row:ty),+) => {
        $(
            impl ContentFiltered for $row {
                fn content_flags(&self) -> ContentFlags<'_> {
                    ContentFlags {
                        min_expansion: self.min_expansion,
                        max_expansion: self.max_expansion,
                        content_flags: self.content_flags.as_deref(),
                        content_flags_disabled: self.content_flags_disabled.as_deref(),
                    }
                }
            }
        )+
    };
}

content_filtered!(LootTable, LootDrop, LootDropEntry);

/// A full loot data set, as imported into a backing store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootData {
    pub loottables: Vec<LootTable>,
    pub loottable_entries: Vec<LootTableEntry>,
    pub lootdrops: Vec<LootDrop>,
    pub lootdrop_entries: Vec<LootDropEntry>,
    pub items: Vec<Item>,
}

impl LootData {
    pub fn row_count(&self) -> usize {
        self.loottables.len()
            + self.loottable_entries.len()
            + self.lootdrops.len()
            + self.lootdrop_entries.len()
            + self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unbounded() {
        let drop = LootDrop::default();
        assert!(drop.is_empty());
        assert_eq!(drop.content_flags().min_expansion, -1);
        assert_eq!(drop.content_flags().max_expansion, -1);
    }

    #[test]
    fn test_loot_data_from_partial_json() {
        let json = r#"{
            "loottables": [{"id": 5, "name": "orc_pawn"}],
            "loottable_entries": [{"loottable_id": 5, "lootdrop_id": 10}],
            "lootdrop_entries": [{"lootdrop_id": 10, "item_id": 1, "content_flags": "peq_halloween"}]
        }"#;
        let data: LootData = serde_json::from_str(json).unwrap();

        assert_eq!(data.loottables[0].max_expansion, -1);
        assert_eq!(data.loottable_entries[0].probability, 100.0);
        assert!(data.lootdrops.is_empty());
        assert_eq!(
            data.lootdrop_entries[0].content_flags().content_flags,
            Some("peq_halloween")
        );
        assert_eq!(data.row_count(), 3);
    }
}
