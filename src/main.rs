use anyhow::{Context, Result};
use std::fs;
use tracing_subscriber::EnvFilter;
use zone_loot::{
    cli::{Cli, Commands, FilterArgs},
    config::Config,
    content_filter::ContentService,
    directory::SpawnList,
    repository::SqliteRepository,
    schema::{table_names, LootData},
    LootCache,
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { db } => {
            let repo = SqliteRepository::open(&db)?;
            repo.create_tables()?;
            println!("Created loot schema in {:?}", db);
        }

        Commands::Import { db, input } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read: {:?}", input))?;
            let data: LootData = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse loot data in {:?}", input))?;

            let mut repo = SqliteRepository::open(&db)?;
            repo.create_tables()?;
            let inserted = repo.import(&data).context("Failed to import loot data")?;

            println!(
                "Imported {} of {} rows into {:?}",
                inserted,
                data.row_count(),
                db
            );
        }

        Commands::Show { ids, filter } => {
            let mut cache = open_cache(filter)?;
            cache.load_loot_tables(ids.iter().copied());

            for id in ids {
                print_loot_table(&cache, id);
            }
        }

        Commands::Reload { spawns, filter } => {
            let spawn_list = SpawnList::from_file(&spawns)?;
            let mut cache = open_cache(filter)?;
            cache.reload_loot_tables(&spawn_list);

            println!(
                "Reloaded for {} NPCs: {} loottables, {} entries, {} lootdrops, {} lootdrop entries",
                spawn_list.npcs.len(),
                cache.loot_table_count(),
                cache.loot_table_entry_count(),
                cache.lootdrop_count(),
                cache.lootdrop_entry_count()
            );
            for id in cache.loot_table_ids() {
                let visible = if cache.get_loot_table(id).is_some() {
                    ""
                } else {
                    " (filtered)"
                };
                println!("  loottable {}{}", id, visible);
            }
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

type ZoneLootCache = LootCache<SqliteRepository, ContentService>;

fn open_cache(filter: FilterArgs) -> Result<ZoneLootCache> {
    let mut config = Config::load(filter.config.as_deref())?;
    config.apply_overrides(filter.db, filter.expansion, filter.flag);

    let db_path = config.database_path()?;
    if !db_path.exists() {
        anyhow::bail!("Loot database not found: {:?}", db_path);
    }
    let repo = SqliteRepository::open(&db_path)?;

    Ok(LootCache::new(repo, config.content_service()))
}

fn print_loot_table(cache: &ZoneLootCache, id: u32) {
    let Some(table) = cache.get_loot_table(id) else {
        println!("loottable {}: not found or filtered", id);
        return;
    };

    println!(
        "loottable {} {:?} (cash {}-{})",
        table.id, table.name, table.mincash, table.maxcash
    );

    for entry in cache.get_loot_table_entries(id) {
        let lootdrop = cache.get_lootdrop(entry.lootdrop_id);
        if lootdrop.is_empty() {
            println!("  lootdrop {}: not found or filtered", entry.lootdrop_id);
            continue;
        }

        println!(
            "  lootdrop {} {:?} x{} (probability {}%, mindrop {}, droplimit {})",
            lootdrop.id,
            lootdrop.name,
            entry.multiplier,
            entry.probability,
            entry.mindrop,
            entry.droplimit
        );

        for item in cache.get_lootdrop_entries(lootdrop.id) {
            println!(
                "    item {} chance {}% charges {}",
                item.item_id, item.chance, item.item_charges
            );
        }
    }
}
