//! Per-zone loot cache
//!
//! Holds the loot hierarchy LootTable -> LootTableEntry -> LootDrop ->
//! LootDropEntry for the tables a zone has asked for. Loading is incremental:
//! only table ids that are not cached yet are fetched, and everything fetched
//! is merged without ever replacing a cached row. The cache only grows until
//! it is cleared as a whole.
//!
//! Content filtering happens on read. Rows keep their expansion and flag
//! metadata, so changing the policy through [`LootCache::content_filter_mut`]
//! takes effect on the next lookup.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use tracing::{debug, info, warn};

use crate::content_filter::{ContentFilter, ContentFiltered};
use crate::directory::EntityDirectory;
use crate::error::RepositoryResult;
use crate::repository::{ItemCatalog, LootRepository, RowKind};
use crate::schema::{LootDrop, LootDropEntry, LootTable, LootTableEntry};

/// Loot table id meaning "no loot table"
pub const NO_LOOTTABLE: u32 = 0;

/// Rows in insertion order with a unique key index
#[derive(Debug)]
struct KeyedRows<K, T> {
    rows: Vec<T>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, T> KeyedRows<K, T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append `row` unless `key` is already present
    fn insert(&mut self, key: K, row: T) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.rows.len());
        self.rows.push(row);
        true
    }

    fn get(&self, key: &K) -> Option<&T> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
    }
}

pub struct LootCache<R, F> {
    repository: R,
    content_filter: F,
    loottables: KeyedRows<u32, LootTable>,
    loottable_entries: KeyedRows<(u32, u32), LootTableEntry>,
    lootdrops: KeyedRows<u32, LootDrop>,
    lootdrop_entries: KeyedRows<(u32, u32), LootDropEntry>,
}

impl<R, F> LootCache<R, F>
where
    R: LootRepository + ItemCatalog,
    F: ContentFilter,
{
    pub fn new(repository: R, content_filter: F) -> Self {
        Self {
            repository,
            content_filter,
            loottables: KeyedRows::new(),
            loottable_entries: KeyedRows::new(),
            lootdrops: KeyedRows::new(),
            lootdrop_entries: KeyedRows::new(),
        }
    }

    /// Load the given loot tables and everything below them, skipping tables
    /// that are already cached
    pub fn load_loot_tables<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let mut missing = BTreeSet::new();
        for id in ids {
            if self.loottables.contains(&id) {
                debug!(loottable_id = id, "loottable already loaded");
            } else {
                missing.insert(id);
            }
        }

        if missing.is_empty() {
            debug!("no loottables to load");
            return;
        }

        let loottables = fetch_or_empty(
            RowKind::LootTable,
            self.repository.fetch_loottables(&missing),
        );
        let loottable_entries = fetch_or_empty(
            RowKind::LootTableEntry,
            self.repository.fetch_loottable_entries(&missing),
        );

        let lootdrop_ids: BTreeSet<u32> =
            loottable_entries.iter().map(|e| e.lootdrop_id).collect();

        let (lootdrops, lootdrop_entries) = if lootdrop_ids.is_empty() {
            info!(loottables = ?missing, "no lootdrops to load for loottables");
            (Vec::new(), Vec::new())
        } else {
            let lootdrops = fetch_or_empty(
                RowKind::LootDrop,
                self.repository.fetch_lootdrops(&lootdrop_ids),
            );
            let lootdrop_entries = fetch_or_empty(
                RowKind::LootDropEntry,
                self.repository.fetch_lootdrop_entries(&lootdrop_ids),
            );
            (lootdrops, lootdrop_entries)
        };

        self.merge(loottables, loottable_entries, lootdrops, lootdrop_entries);
    }

    /// Load a single loot table; `0` is ignored
    pub fn load_loot_table(&mut self, id: u32) {
        if id == NO_LOOTTABLE {
            return;
        }

        self.load_loot_tables([id]);
    }

    /// Drop every cached row
    pub fn clear_loot_tables(&mut self) {
        self.loottables.clear();
        self.loottable_entries.clear();
        self.lootdrops.clear();
        self.lootdrop_entries.clear();
    }

    /// Rebuild the cache from the loot tables referenced by spawned NPCs
    pub fn reload_loot_tables<D>(&mut self, directory: &D)
    where
        D: EntityDirectory + ?Sized,
    {
        self.clear_loot_tables();

        let ids: BTreeSet<u32> = directory
            .npcs()
            .iter()
            .map(|npc| npc.loottable_id())
            .filter(|&id| id != NO_LOOTTABLE)
            .collect();

        debug!(loottables = ids.len(), "reloading loottables");
        self.load_loot_tables(ids);
    }

    /// A cached loot table, if it passes content filtering
    pub fn get_loot_table(&self, id: u32) -> Option<&LootTable> {
        let table = self.loottables.get(&id)?;
        if !self.content_filter.passes(&table.content_flags()) {
            debug!(loottable_id = id, "loot table does not pass content filtering");
            return None;
        }
        Some(table)
    }

    /// Entries of a loot table in load order; entries carry no filter metadata
    pub fn get_loot_table_entries(&self, id: u32) -> Vec<&LootTableEntry> {
        self.loottable_entries
            .iter()
            .filter(|e| e.loottable_id == id)
            .collect()
    }

    /// A cached lootdrop, or `LootDrop::default()` when it is missing or
    /// filtered out
    pub fn get_lootdrop(&self, id: u32) -> LootDrop {
        match self.lootdrops.get(&id) {
            Some(lootdrop) if self.content_filter.passes(&lootdrop.content_flags()) => {
                lootdrop.clone()
            }
            Some(_) => {
                debug!(lootdrop_id = id, "lootdrop does not pass content filtering");
                LootDrop::default()
            }
            None => LootDrop::default(),
        }
    }

    /// Entries of a lootdrop in load order that pass content filtering
    pub fn get_lootdrop_entries(&self, id: u32) -> Vec<&LootDropEntry> {
        self.lootdrop_entries
            .iter()
            .filter(|e| e.lootdrop_id == id)
            .filter(|e| {
                let passes = self.content_filter.passes(&e.content_flags());
                if !passes {
                    debug!(
                        lootdrop_id = id,
                        item_id = e.item_id,
                        item_name = %self
                            .repository
                            .item_name(e.item_id)
                            .unwrap_or_else(|| "Unknown".to_string()),
                        "lootdrop item does not pass content filtering"
                    );
                }
                passes
            })
            .collect()
    }

    pub fn is_loaded(&self, id: u32) -> bool {
        self.loottables.contains(&id)
    }

    pub fn loot_table_count(&self) -> usize {
        self.loottables.len()
    }

    pub fn loot_table_entry_count(&self) -> usize {
        self.loottable_entries.len()
    }

    pub fn lootdrop_count(&self) -> usize {
        self.lootdrops.len()
    }

    pub fn lootdrop_entry_count(&self) -> usize {
        self.lootdrop_entries.len()
    }

    /// Ids of every cached loot table in load order, unfiltered
    pub fn loot_table_ids(&self) -> Vec<u32> {
        self.loottables.iter().map(|t| t.id).collect()
    }

    pub fn content_filter(&self) -> &F {
        &self.content_filter
    }

    pub fn content_filter_mut(&mut self) -> &mut F {
        &mut self.content_filter
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Merge one fetched batch. Tables already cached are skipped along with
    /// everything reached through them; every other row is added only if its
    /// key is new, since drops are shared between tables.
    fn merge(
        &mut self,
        loottables: Vec<LootTable>,
        loottable_entries: Vec<LootTableEntry>,
        lootdrops: Vec<LootDrop>,
        lootdrop_entries: Vec<LootDropEntry>,
    ) {
        let entries_by_table = group_by(loottable_entries, |e| e.loottable_id);
        let entries_by_drop = group_by(lootdrop_entries, |e| e.lootdrop_id);
        let mut drops_by_id: HashMap<u32, LootDrop> = HashMap::new();
        for lootdrop in lootdrops {
            drops_by_id.entry(lootdrop.id).or_insert(lootdrop);
        }

        let before = self.loottables.len();

        for table in loottables {
            let table_id = table.id;
            if !self.loottables.insert(table_id, table) {
                continue;
            }

            for entry in entries_by_table.get(&table_id).into_iter().flatten() {
                self.loottable_entries.insert(entry.key(), entry.clone());

                let Some(lootdrop) = drops_by_id.get(&entry.lootdrop_id) else {
                    continue;
                };
                self.lootdrops.insert(lootdrop.id, lootdrop.clone());

                for drop_entry in entries_by_drop.get(&lootdrop.id).into_iter().flatten() {
                    self.lootdrop_entries
                        .insert(drop_entry.key(), drop_entry.clone());
                }
            }
        }

        debug!(
            loaded = self.loottables.len() - before,
            loottables = self.loottables.len(),
            loottable_entries = self.loottable_entries.len(),
            lootdrops = self.lootdrops.len(),
            lootdrop_entries = self.lootdrop_entries.len(),
            "loottables merged"
        );
    }
}

/// A failed fetch is treated the same as one that found no rows
fn fetch_or_empty<T>(kind: RowKind, result: RepositoryResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(%kind, error = %e, "fetch failed, continuing without rows");
        Vec::new()
    })
}

fn group_by<T, K>(rows: Vec<T>, key: K) -> HashMap<u32, Vec<T>>
where
    K: Fn(&T) -> u32,
{
    let mut groups: HashMap<u32, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}
