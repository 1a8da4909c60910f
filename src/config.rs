use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content_filter::ContentService;

const CONFIG_FILE: &str = "config.json";
const DEFAULT_DATABASE: &str = "loot.db";

/// Settings shared by the CLI commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Loot database path; defaults to the app data directory
    pub database: Option<PathBuf>,
    /// Current expansion, `-1` to skip expansion checks
    pub expansion: i8,
    /// Enabled content flags
    pub content_flags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            expansion: -1,
            content_flags: Vec::new(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Command line values win over file values
    pub fn apply_overrides(
        &mut self,
        database: Option<PathBuf>,
        expansion: Option<i8>,
        flags: Vec<String>,
    ) {
        if database.is_some() {
            self.database = database;
        }
        if let Some(expansion) = expansion {
            self.expansion = expansion;
        }
        for flag in flags {
            if !self.content_flags.contains(&flag) {
                self.content_flags.push(flag);
            }
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => {
                let dirs = project_dirs().context("Could not determine data directory")?;
                fs::create_dir_all(dirs.data_dir())
                    .context("Failed to create data directory")?;
                Ok(dirs.data_dir().join(DEFAULT_DATABASE))
            }
        }
    }

    pub fn content_service(&self) -> ContentService {
        ContentService::with_flags(self.expansion, self.content_flags.iter().cloned())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "zone-loot")
}
