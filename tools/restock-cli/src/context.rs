//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use edge_core::RequestId;
use edge_observability::{LogFormat, LogLevel, StructuredLogger};
use turbo_db::Db;
use turbo_sync::SqliteStore;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["restock.toml", ".restock.toml", "restock.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path.to_string_lossy())?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };
        config.apply_env(|name| std::env::var(name).ok());

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Open the configured database and bring its schema up to date.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let path = self.resolve_path(&self.config.database.path);
        self.output
            .debug(&format!("Opening database {}", path.display()));
        let db = Db::open(&path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let store = SqliteStore::new(db);
        store.migrate().context("Failed to apply schema")?;
        Ok(store)
    }

    /// Logger for one command invocation.
    pub fn logger(&self) -> StructuredLogger {
        StructuredLogger::new(RequestId::generate())
            .with_workload("restock-cli")
            .with_min_level(LogLevel::Debug)
            .with_format(LogFormat::Human)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("restock-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("a").join("b")).unwrap();
        dir
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = scratch_dir("walk");
        std::fs::write(dir.join("restock.toml"), "").unwrap();
        let found = find_config(&dir.join("a").join("b")).unwrap();
        assert_eq!(found, dir.join("restock.toml"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let dir = scratch_dir("nearest");
        std::fs::write(dir.join("restock.toml"), "").unwrap();
        std::fs::write(dir.join("a").join(".restock.toml"), "").unwrap();
        let found = find_config(&dir.join("a").join("b")).unwrap();
        assert_eq!(found, dir.join("a").join(".restock.toml"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
