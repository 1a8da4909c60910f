pub mod cache;
pub mod cli;
pub mod config;
pub mod content_filter;
pub mod directory;
pub mod error;
pub mod repository;
pub mod schema;

pub use cache::{LootCache, NO_LOOTTABLE};
pub use cli::{Cli, Commands};
pub use content_filter::{ContentFilter, ContentService};
pub use directory::{EntityDirectory, NpcEntity, SpawnList};
pub use error::{RepositoryError, RepositoryResult};
pub use repository::{InMemoryRepository, ItemCatalog, LootRepository, SqliteRepository};
