use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zone-loot")]
#[command(version, about = "Load and inspect zone loot tables")]
pub struct Cli {
    /// Log loot detail (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that read loot through the cache
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Loot database path (overrides config)
    #[arg(short, long)]
    pub db: Option<PathBuf>,

    /// Config file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Current expansion, -1 disables expansion checks
    #[arg(short, long, allow_negative_numbers = true)]
    pub expansion: Option<i8>,

    /// Enable content flags (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub flag: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the loot schema in a database
    Init {
        /// SQLite database path
        db: PathBuf,
    },

    /// Import loot rows from a JSON document
    Import {
        /// SQLite database path
        db: PathBuf,

        /// JSON file with loottables, loottable_entries, lootdrops, lootdrop_entries and items
        input: PathBuf,
    },

    /// Load loot tables and print what currently passes content filtering
    Show {
        /// Loot table ids
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<u32>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Reload loot tables for a list of spawned NPCs
    Reload {
        /// JSON array of spawned NPCs
        spawns: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List all schema table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from([
            "zone-loot", "show", "5,6", "7", "--expansion", "-1", "--flag", "a,b",
        ])
        .unwrap();

        match cli.command {
            Commands::Show { ids, filter } => {
                assert_eq!(ids, vec![5, 6, 7]);
                assert_eq!(filter.expansion, Some(-1));
                assert_eq!(filter.flag, vec!["a", "b"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
