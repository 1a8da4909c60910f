//! Backing store access for the loot hierarchy
//!
//! Every fetch is an "id is a member of set S" query. Implementations must
//! return no rows for an empty set without touching the store.

pub mod memory;
mod schema_gen;
pub mod sqlite;

pub use memory::*;
pub use sqlite::*;

use std::collections::BTreeSet;

use crate::error::RepositoryResult;
use crate::schema::{LootDrop, LootDropEntry, LootTable, LootTableEntry};

/// Batched id-set fetches for the four loot row kinds
pub trait LootRepository {
    /// Loot tables whose `id` is in `ids`
    fn fetch_loottables(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<LootTable>>;

    /// Entries whose `loottable_id` is in `loottable_ids`
    fn fetch_loottable_entries(
        &self,
        loottable_ids: &BTreeSet<u32>,
    ) -> RepositoryResult<Vec<LootTableEntry>>;

    /// Lootdrops whose `id` is in `ids`
    fn fetch_lootdrops(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<LootDrop>>;

    /// Entries whose `lootdrop_id` is in `lootdrop_ids`
    fn fetch_lootdrop_entries(
        &self,
        lootdrop_ids: &BTreeSet<u32>,
    ) -> RepositoryResult<Vec<LootDropEntry>>;
}

/// Item name lookup, used only for diagnostics
pub trait ItemCatalog {
    fn item_name(&self, item_id: u32) -> Option<String>;
}

/// The record kind a fetch was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    LootTable,
    LootTableEntry,
    LootDrop,
    LootDropEntry,
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKind::LootTable => write!(f, "loottable"),
            RowKind::LootTableEntry => write!(f, "loottable_entries"),
            RowKind::LootDrop => write!(f, "lootdrop"),
            RowKind::LootDropEntry => write!(f, "lootdrop_entries"),
        }
    }
}
