//! In-memory loot repository that records every fetch it serves.
//!
//! Used by tests and fixtures to observe exactly which id sets the cache asks
//! for, without a database.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};

use super::{ItemCatalog, LootRepository, RowKind};
use crate::error::{RepositoryError, RepositoryResult};
use crate::schema::{LootData, LootDrop, LootDropEntry, LootTable, LootTableEntry};

/// A fetch served by [`InMemoryRepository`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    pub kind: RowKind,
    pub ids: BTreeSet<u32>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    data: LootData,
    item_names: HashMap<u32, String>,
    fetches: RefCell<Vec<FetchRecord>>,
    failing: Cell<Option<RowKind>>,
}

impl InMemoryRepository {
    pub fn new(data: LootData) -> Self {
        let item_names = data
            .items
            .iter()
            .map(|item| (item.id, item.name.clone()))
            .collect();

        Self {
            data,
            item_names,
            fetches: RefCell::new(Vec::new()),
            failing: Cell::new(None),
        }
    }

    pub fn data(&self) -> &LootData {
        &self.data
    }

    /// Replace the stored rows, as if the backing store changed underneath
    pub fn set_data(&mut self, data: LootData) {
        *self = Self {
            fetches: RefCell::new(self.fetches.take()),
            failing: Cell::new(self.failing.get()),
            ..Self::new(data)
        };
    }

    /// Every fetch served so far, oldest first
    pub fn fetches(&self) -> Vec<FetchRecord> {
        self.fetches.borrow().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    pub fn clear_fetches(&self) {
        self.fetches.borrow_mut().clear();
    }

    /// Make fetches of `kind` fail until cleared with `None`
    pub fn fail_fetches_of(&self, kind: Option<RowKind>) {
        self.failing.set(kind);
    }

    fn serve<T, K>(
        &self,
        kind: RowKind,
        ids: &BTreeSet<u32>,
        rows: &[T],
        key: K,
    ) -> RepositoryResult<Vec<T>>
    where
        T: Clone,
        K: Fn(&T) -> u32,
    {
        self.fetches.borrow_mut().push(FetchRecord {
            kind,
            ids: ids.clone(),
        });

        if self.failing.get() == Some(kind) {
            return Err(RepositoryError::Unavailable(kind.to_string()));
        }

        Ok(rows
            .iter()
            .filter(|row| ids.contains(&key(*row)))
            .cloned()
            .collect())
    }
}

impl LootRepository for InMemoryRepository {
    fn fetch_loottables(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<LootTable>> {
        self.serve(RowKind::LootTable, ids, &self.data.loottables, |t| t.id)
    }

    fn fetch_loottable_entries(
        &self,
        loottable_ids: &BTreeSet<u32>,
    ) -> RepositoryResult<Vec<LootTableEntry>> {
        self.serve(
            RowKind::LootTableEntry,
            loottable_ids,
            &self.data.loottable_entries,
            |e| e.loottable_id,
        )
    }

    fn fetch_lootdrops(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<LootDrop>> {
        self.serve(RowKind::LootDrop, ids, &self.data.lootdrops, |d| d.id)
    }

    fn fetch_lootdrop_entries(
        &self,
        lootdrop_ids: &BTreeSet<u32>,
    ) -> RepositoryResult<Vec<LootDropEntry>> {
        self.serve(
            RowKind::LootDropEntry,
            lootdrop_ids,
            &self.data.lootdrop_entries,
            |e| e.lootdrop_id,
        )
    }
}

impl ItemCatalog for InMemoryRepository {
    fn item_name(&self, item_id: u32) -> Option<String> {
        self.item_names.get(&item_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Item;

    fn data() -> LootData {
        LootData {
            loottables: vec![
                LootTable {
                    id: 1,
                    ..Default::default()
                },
                LootTable {
                    id: 2,
                    ..Default::default()
                },
            ],
            items: vec![Item {
                id: 7,
                name: "Rusty Dagger".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_fetch_filters_and_records() {
        let repo = InMemoryRepository::new(data());
        let ids: BTreeSet<u32> = [2, 3].into_iter().collect();

        let tables = repo.fetch_loottables(&ids).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, 2);
        assert_eq!(
            repo.fetches(),
            vec![FetchRecord {
                kind: RowKind::LootTable,
                ids
            }]
        );
    }

    #[test]
    fn test_failing_fetch_is_still_recorded() {
        let repo = InMemoryRepository::new(data());
        repo.fail_fetches_of(Some(RowKind::LootTable));

        assert!(repo.fetch_loottables(&[1].into_iter().collect()).is_err());
        assert_eq!(repo.fetch_count(), 1);

        repo.fail_fetches_of(None);
        assert!(repo.fetch_loottables(&[1].into_iter().collect()).is_ok());
    }

    #[test]
    fn test_set_data_keeps_fetch_log() {
        let mut repo = InMemoryRepository::new(data());
        repo.fetch_lootdrops(&[1].into_iter().collect()).unwrap();
        repo.set_data(LootData::default());

        assert_eq!(repo.fetch_count(), 1);
        assert!(repo.data().loottables.is_empty());
        assert_eq!(repo.item_name(7), None);
    }

    #[test]
    fn test_item_name() {
        let repo = InMemoryRepository::new(data());
        assert_eq!(repo.item_name(7).as_deref(), Some("Rusty Dagger"));
    }
}
