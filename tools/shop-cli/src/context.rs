//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shop_cache::{Cache, FileStore};
use shop_commerce::catalog::{load_catalog, CatalogItem, JsonFileCatalog};
use shop_commerce::session::ShopSession;
use shop_commerce::CatalogId;

use crate::config::{ShopConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: ShopConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// The config file in use, if one was found.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (ShopConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (ShopConfig::load(&path)?, Some(path)),
                None => (ShopConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
        })
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Resolve a configured path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    /// Directory holding the persisted cart, favorites and profile.
    pub fn store_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.store.dir)
    }

    /// The catalog file.
    pub fn catalog_path(&self) -> PathBuf {
        self.resolve_path(&self.config.catalog.path)
    }

    /// Typed cache over the directory store.
    pub async fn open_cache(&self) -> Result<Cache> {
        let dir = self.store_dir();
        let store = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open store at {}", dir.display()))?;
        Ok(Cache::new(Arc::new(store)).with_timeout(self.config.store_timeout()))
    }

    /// Open a session against the configured store.
    pub async fn open_session(&self) -> Result<ShopSession> {
        let cache = self.open_cache().await?;
        let currency = self.config.currency()?;
        let resolver = self.config.discount_table()?;
        self.output
            .debug(&format!("Store: {}", self.store_dir().display()));
        Ok(ShopSession::open(cache, currency, Arc::new(resolver)).await)
    }

    /// Fetch the catalog. An unreadable catalog is an empty one.
    pub async fn catalog(&self) -> Vec<CatalogItem> {
        let path = self.catalog_path();
        let spinner = self.output.spinner("Loading catalog...");
        let items = load_catalog(&JsonFileCatalog::new(&path)).await;
        spinner.finish_and_clear();
        if items.is_empty() {
            self.output
                .warn(&format!("Catalog at {} is empty or unavailable", path.display()));
        }
        items
    }

    /// Look up one catalog item by id.
    pub async fn catalog_item(&self, id: &str) -> Result<CatalogItem> {
        let id = CatalogId::new(id);
        self.catalog()
            .await
            .into_iter()
            .find(|item| item.id == id)
            .with_context(|| format!("No catalog item with id {}", id))
    }
}

/// Find a config file in the directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
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

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".shop.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(dir.path().join(".shop.toml")));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("shop.toml");
        std::fs::write(&config_path, "[store]\ndir = \"state\"\n").unwrap();

        let ctx = Context::load(config_path.to_str(), Output::new(false, true)).unwrap();
        assert_eq!(ctx.store_dir(), dir.path().join("state"));
        assert_eq!(ctx.catalog_path(), dir.path().join("catalog.json"));
    }
}
