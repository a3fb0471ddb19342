//! CLI configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use shop_commerce::cart::{DiscountTable, DEFAULT_CODE, DEFAULT_CODE_AMOUNT};
use shop_commerce::Currency;

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// `shop.toml` contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Local store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Currency and discount codes.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Catalog source settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShopConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// The configured currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.pricing.currency)
            .ok_or_else(|| anyhow!("Unknown currency code: {}", self.pricing.currency))
    }

    /// Discount codes in the configured currency.
    pub fn discount_table(&self) -> Result<DiscountTable> {
        let currency = self.currency()?;
        if let Some((code, amount)) = self.pricing.discounts.iter().find(|(_, amount)| **amount < 0) {
            bail!("Discount {} has a negative amount: {}", code, amount);
        }
        Ok(DiscountTable::from_minor_units(
            currency,
            self.pricing
                .discounts
                .iter()
                .map(|(code, amount)| (code.clone(), *amount)),
        ))
    }

    /// Bound on each store operation.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }

    /// Problems that would stop a session from opening, and softer warnings.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = self.currency() {
            errors.push(e.to_string());
        }
        for (code, amount) in &self.pricing.discounts {
            if *amount < 0 {
                errors.push(format!("pricing.discounts.{} must not be negative", code));
            }
            if code.trim() != code || code.is_empty() {
                warnings.push(format!("discount code '{}' has surrounding whitespace", code));
            }
        }
        if self.store.timeout_ms == 0 {
            errors.push("store.timeout_ms must be greater than 0".to_string());
        } else if self.store.timeout_ms > 10_000 {
            warnings.push(format!(
                "store.timeout_ms is {}ms; slow stores will stall every command",
                self.store.timeout_ms
            ));
        }
        if self.store.dir.as_os_str().is_empty() {
            errors.push("store.dir must not be empty".to_string());
        }

        (errors, warnings)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Where cart and favorites are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory, relative to the config file's directory.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    /// Per-operation timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".shop")
}

fn default_timeout_ms() -> u64 {
    500
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO code of the shop currency (default: VND).
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Discount code to amount off, in minor units.
    #[serde(default = "default_discounts")]
    pub discounts: BTreeMap<String, i64>,
}

fn default_currency() -> String {
    Currency::default().code().to_string()
}

fn default_discounts() -> BTreeMap<String, i64> {
    BTreeMap::from([(DEFAULT_CODE.to_string(), DEFAULT_CODE_AMOUNT)])
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            discounts: default_discounts(),
        }
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file holding the catalog array.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.json")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// A commented starter `shop.toml`.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront CLI configuration

[store]
dir = ".shop"
timeout_ms = 500

[pricing]
currency = "VND"

[pricing.discounts]
{code} = {amount}

[catalog]
path = "catalog.json"

[logging]
level = "info"
format = "compact"
"#,
        code = DEFAULT_CODE,
        amount = DEFAULT_CODE_AMOUNT
    )
}
