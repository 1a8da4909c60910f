//! SQLite-backed loot repository.

use rusqlite::{params, params_from_iter, CachedStatement, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert, generate_select_in};
use super::{ItemCatalog, LootRepository};
use crate::error::{RepositoryError, RepositoryResult};
use crate::schema::{
    Item, LootData, LootDrop, LootDropEntry, LootTable, LootTableEntry, TableSchema, ALL_TABLES,
    ITEMS, LOOTDROP, LOOTDROP_ENTRIES, LOOTTABLE, LOOTTABLE_ENTRIES,
};

/// Upper bound on bound parameters per `IN (...)` query
const MAX_IN_PARAMS: usize = 900;

/// Mapping between a row type and its table
trait SqlRow: Sized {
    fn schema() -> &'static TableSchema;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize>;
}

impl SqlRow for LootTable {
    fn schema() -> &'static TableSchema {
        &LOOTTABLE
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            mincash: row.get("mincash")?,
            maxcash: row.get("maxcash")?,
            avgcoin: row.get("avgcoin")?,
            done: row.get("done")?,
            min_expansion: row.get("min_expansion")?,
            max_expansion: row.get("max_expansion")?,
            content_flags: row.get("content_flags")?,
            content_flags_disabled: row.get("content_flags_disabled")?,
        })
    }

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.name,
            self.mincash,
            self.maxcash,
            self.avgcoin,
            self.done,
            self.min_expansion,
            self.max_expansion,
            self.content_flags,
            self.content_flags_disabled,
        ])
    }
}

impl SqlRow for LootTableEntry {
    fn schema() -> &'static TableSchema {
        &LOOTTABLE_ENTRIES
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            loottable_id: row.get("loottable_id")?,
            lootdrop_id: row.get("lootdrop_id")?,
            multiplier: row.get("multiplier")?,
            droplimit: row.get("droplimit")?,
            mindrop: row.get("mindrop")?,
            probability: row.get("probability")?,
        })
    }

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.loottable_id,
            self.lootdrop_id,
            self.multiplier,
            self.droplimit,
            self.mindrop,
            self.probability,
        ])
    }
}

impl SqlRow for LootDrop {
    fn schema() -> &'static TableSchema {
        &LOOTDROP
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            min_expansion: row.get("min_expansion")?,
            max_expansion: row.get("max_expansion")?,
            content_flags: row.get("content_flags")?,
            content_flags_disabled: row.get("content_flags_disabled")?,
        })
    }

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.name,
            self.min_expansion,
            self.max_expansion,
            self.content_flags,
            self.content_flags_disabled,
        ])
    }
}

impl SqlRow for LootDropEntry {
    fn schema() -> &'static TableSchema {
        &LOOTDROP_ENTRIES
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            lootdrop_id: row.get("lootdrop_id")?,
            item_id: row.get("item_id")?,
            item_charges: row.get("item_charges")?,
            equip_item: row.get("equip_item")?,
            chance: row.get("chance")?,
            disabled_chance: row.get("disabled_chance")?,
            trivial_min_level: row.get("trivial_min_level")?,
            trivial_max_level: row.get("trivial_max_level")?,
            multiplier: row.get("multiplier")?,
            npc_min_level: row.get("npc_min_level")?,
            npc_max_level: row.get("npc_max_level")?,
            min_expansion: row.get("min_expansion")?,
            max_expansion: row.get("max_expansion")?,
            content_flags: row.get("content_flags")?,
            content_flags_disabled: row.get("content_flags_disabled")?,
        })
    }

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.lootdrop_id,
            self.item_id,
            self.item_charges,
            self.equip_item,
            self.chance,
            self.disabled_chance,
            self.trivial_min_level,
            self.trivial_max_level,
            self.multiplier,
            self.npc_min_level,
            self.npc_max_level,
            self.min_expansion,
            self.max_expansion,
            self.content_flags,
            self.content_flags_disabled,
        ])
    }
}

impl SqlRow for Item {
    fn schema() -> &'static TableSchema {
        &ITEMS
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.name])
    }
}

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) a loot database at the given path
    pub fn open(db_path: &Path) -> RepositoryResult<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| RepositoryError::Open(format!("{}: {}", db_path.display(), e)))?;
        debug!(path = ?db_path, "loot database opened");
        Ok(Self { conn })
    }

    /// Create an ephemeral in-memory database (for testing)
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| RepositoryError::Open(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create all loot tables and their indexes if they don't exist yet
    pub fn create_tables(&self) -> RepositoryResult<()> {
        for schema in ALL_TABLES {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .map_err(|e| RepositoryError::Schema(format!("{}: {}", schema.name, e)))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .map_err(|e| RepositoryError::Schema(format!("{}: {}", schema.name, e)))?;
            }
        }

        debug!(tables = ALL_TABLES.len(), "loot schema ready");
        Ok(())
    }

    /// Insert a full data set in a single transaction. Rows whose key already
    /// exists are left untouched. Returns the number of rows inserted.
    pub fn import(&mut self, data: &LootData) -> RepositoryResult<u64> {
        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;

        count += insert_rows(&tx, &data.loottables)?;
        count += insert_rows(&tx, &data.loottable_entries)?;
        count += insert_rows(&tx, &data.lootdrops)?;
        count += insert_rows(&tx, &data.lootdrop_entries)?;
        count += insert_rows(&tx, &data.items)?;

        tx.commit()?;
        debug!(rows = count, "loot data imported");

        Ok(count)
    }

    /// Fetch rows whose fetch key is in `ids`, chunked to stay under the
    /// SQLite parameter limit
    fn fetch_in<T: SqlRow>(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<T>> {
        let schema = T::schema();
        let query_err = |source: rusqlite::Error| RepositoryError::Query {
            table: schema.name,
            source,
        };

        let ids: Vec<u32> = ids.iter().copied().collect();
        let mut rows = Vec::new();

        for chunk in ids.chunks(MAX_IN_PARAMS) {
            let sql = generate_select_in(schema, chunk.len());
            let mut stmt = self.conn.prepare_cached(&sql).map_err(query_err)?;
            let mapped = stmt
                .query_map(params_from_iter(chunk.iter()), |row| T::from_row(row))
                .map_err(query_err)?;

            for row in mapped {
                rows.push(row.map_err(query_err)?);
            }
        }

        debug!(table = schema.name, ids = ids.len(), rows = rows.len(), "fetched rows");
        Ok(rows)
    }
}

fn insert_rows<T: SqlRow>(tx: &rusqlite::Transaction<'_>, rows: &[T]) -> RepositoryResult<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let schema = T::schema();
    let write_err = |source: rusqlite::Error| RepositoryError::Write {
        table: schema.name,
        source,
    };

    let mut stmt = tx.prepare_cached(&generate_insert(schema)).map_err(write_err)?;
    let mut count: u64 = 0;
    for row in rows {
        count += row.insert(&mut stmt).map_err(write_err)? as u64;
    }

    Ok(count)
}

impl LootRepository for SqliteRepository {
    fn fetch_loottables(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<LootTable>> {
        self.fetch_in(ids)
    }

    fn fetch_loottable_entries(
        &self,
        loottable_ids: &BTreeSet<u32>,
    ) -> RepositoryResult<Vec<LootTableEntry>> {
        self.fetch_in(loottable_ids)
    }

    fn fetch_lootdrops(&self, ids: &BTreeSet<u32>) -> RepositoryResult<Vec<LootDrop>> {
        self.fetch_in(ids)
    }

    fn fetch_lootdrop_entries(
        &self,
        lootdrop_ids: &BTreeSet<u32>,
    ) -> RepositoryResult<Vec<LootDropEntry>> {
        self.fetch_in(lootdrop_ids)
    }
}

impl ItemCatalog for SqliteRepository {
    fn item_name(&self, item_id: u32) -> Option<String> {
        let result = self
            .conn
            .query_row("SELECT name FROM items WHERE id = ?1", [item_id], |row| {
                row.get::<_, String>(0)
            })
            .optional();

        match result {
            Ok(name) => name,
            Err(e) => {
                debug!(item_id, error = %e, "item name lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> SqliteRepository {
        let mut repo = SqliteRepository::open_in_memory().unwrap();
        repo.create_tables().unwrap();

        let data = LootData {
            loottables: vec![LootTable {
                id: 5,
                name: "orc_pawn".into(),
                content_flags: Some("peq_halloween".into()),
                ..Default::default()
            }],
            loottable_entries: vec![LootTableEntry {
                loottable_id: 5,
                lootdrop_id: 10,
                probability: 35.5,
                ..Default::default()
            }],
            lootdrops: vec![LootDrop {
                id: 10,
                name: "orc_pawn_drop".into(),
                ..Default::default()
            }],
            lootdrop_entries: vec![
                LootDropEntry {
                    lootdrop_id: 10,
                    item_id: 13073,
                    chance: 12.5,
                    ..Default::default()
                },
                LootDropEntry {
                    lootdrop_id: 10,
                    item_id: 13074,
                    ..Default::default()
                },
            ],
            items: vec![Item {
                id: 13073,
                name: "Bone Chips".into(),
            }],
        };
        assert_eq!(repo.import(&data).unwrap(), 6);
        repo
    }

    fn ids(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_fetch_round_trip_preserves_fields() {
        let repo = repository();

        let tables = repo.fetch_loottables(&ids(&[5, 6])).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "orc_pawn");
        assert_eq!(tables[0].min_expansion, -1);
        assert_eq!(tables[0].content_flags.as_deref(), Some("peq_halloween"));

        let entries = repo.fetch_loottable_entries(&ids(&[5])).unwrap();
        assert_eq!(entries[0].probability, 35.5);

        let drop_entries = repo.fetch_lootdrop_entries(&ids(&[10])).unwrap();
        let items: Vec<u32> = drop_entries.iter().map(|e| e.item_id).collect();
        assert_eq!(items, vec![13073, 13074]);
        assert_eq!(drop_entries[0].chance, 12.5);
    }

    #[test]
    fn test_empty_id_set_returns_no_rows() {
        let repo = repository();
        assert!(repo.fetch_lootdrops(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_import_ignores_existing_keys() {
        let mut repo = repository();
        let again = LootData {
            lootdrops: vec![LootDrop {
                id: 10,
                name: "renamed".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(repo.import(&again).unwrap(), 0);
        let drops = repo.fetch_lootdrops(&ids(&[10])).unwrap();
        assert_eq!(drops[0].name, "orc_pawn_drop");
    }

    #[test]
    fn test_large_id_sets_are_chunked() {
        let repo = repository();
        let many: BTreeSet<u32> = (1..=2500).collect();
        let tables = repo.fetch_loottables(&many).unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn test_item_name() {
        let repo = repository();
        assert_eq!(repo.item_name(13073).as_deref(), Some("Bone Chips"));
        assert_eq!(repo.item_name(1), None);
    }

    #[test]
    fn test_query_without_schema_is_an_error() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let err = repo.fetch_loottables(&ids(&[1])).unwrap_err();
        assert!(matches!(err, RepositoryError::Query { table: "loottable", .. }));
        assert_eq!(repo.item_name(1), None);
    }
}
