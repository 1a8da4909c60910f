//! Table schema definitions for the loot hierarchy

use super::types::*;

// =============================================================================
// Loot hierarchy
// =============================================================================

pub static LOOTTABLE: TableSchema = TableSchema {
    name: "loottable",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).with_default("''"),
        Column::required("mincash", ColumnType::Integer).with_default("0"),
        Column::required("maxcash", ColumnType::Integer).with_default("0"),
        Column::required("avgcoin", ColumnType::Integer).with_default("0"),
        Column::required("done", ColumnType::Integer).with_default("0"),
        Column::required("min_expansion", ColumnType::Integer).with_default("-1"),
        Column::required("max_expansion", ColumnType::Integer).with_default("-1"),
        Column::new("content_flags", ColumnType::Text),
        Column::new("content_flags_disabled", ColumnType::Text),
    ],
    primary_key: &["id"],
    fetch_key: "id",
    indexes: &[],
};

pub static LOOTTABLE_ENTRIES: TableSchema = TableSchema {
    name: "loottable_entries",
    columns: &[
        Column::required("loottable_id", ColumnType::Integer),
        Column::required("lootdrop_id", ColumnType::Integer),
        Column::required("multiplier", ColumnType::Integer).with_default("1"),
        Column::required("droplimit", ColumnType::Integer).with_default("0"),
        Column::required("mindrop", ColumnType::Integer).with_default("0"),
        Column::required("probability", ColumnType::Real).with_default("100"),
    ],
    primary_key: &["loottable_id", "lootdrop_id"],
    fetch_key: "loottable_id",
    indexes: &[Index::on(&["lootdrop_id"])],
};

pub static LOOTDROP: TableSchema = TableSchema {
    name: "lootdrop",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).with_default("''"),
        Column::required("min_expansion", ColumnType::Integer).with_default("-1"),
        Column::required("max_expansion", ColumnType::Integer).with_default("-1"),
        Column::new("content_flags", ColumnType::Text),
        Column::new("content_flags_disabled", ColumnType::Text),
    ],
    primary_key: &["id"],
    fetch_key: "id",
    indexes: &[],
};

pub static LOOTDROP_ENTRIES: TableSchema = TableSchema {
    name: "lootdrop_entries",
    columns: &[
        Column::required("lootdrop_id", ColumnType::Integer),
        Column::required("item_id", ColumnType::Integer),
        Column::required("item_charges", ColumnType::Integer).with_default("1"),
        Column::required("equip_item", ColumnType::Integer).with_default("0"),
        Column::required("chance", ColumnType::Real).with_default("1"),
        Column::required("disabled_chance", ColumnType::Real).with_default("0"),
        Column::required("trivial_min_level", ColumnType::Integer).with_default("0"),
        Column::required("trivial_max_level", ColumnType::Integer).with_default("0"),
        Column::required("multiplier", ColumnType::Integer).with_default("1"),
        Column::required("npc_min_level", ColumnType::Integer).with_default("0"),
        Column::required("npc_max_level", ColumnType::Integer).with_default("0"),
        Column::required("min_expansion", ColumnType::Integer).with_default("-1"),
        Column::required("max_expansion", ColumnType::Integer).with_default("-1"),
        Column::new("content_flags", ColumnType::Text),
        Column::new("content_flags_disabled", ColumnType::Text),
    ],
    primary_key: &["lootdrop_id", "item_id"],
    fetch_key: "lootdrop_id",
    indexes: &[Index::on(&["item_id"])],
};

// =============================================================================
// Item catalog (names only, used for diagnostics)
// =============================================================================

pub static ITEMS: TableSchema = TableSchema {
    name: "items",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).with_default("''"),
    ],
    primary_key: &["id"],
    fetch_key: "id",
    indexes: &[Index::on(&["name"])],
};

/// All table schemas, parents first
pub static ALL_TABLES: &[&TableSchema] = &[
    &LOOTTABLE,
    &LOOTTABLE_ENTRIES,
    &LOOTDROP,
    &LOOTDROP_ENTRIES,
    &ITEMS,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
