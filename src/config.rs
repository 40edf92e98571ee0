use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::{deserialize_duration, serialize_duration};
use crate::loader::WorkbookLayout;
use crate::valuation::DEFAULT_TOP_HOLDINGS;

const DEFAULT_CONFIG_FILE: &str = "networth.toml";

fn default_workbook() -> PathBuf {
    PathBuf::from("patrimoine.xlsx")
}

/// Default quote request timeout (10 seconds).
fn default_quote_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_quote_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Symbol written after amounts (e.g. "€").
    pub currency_symbol: String,

    /// Decimal places shown for amounts. Calculations are not rounded.
    pub decimals: u32,

    /// Number of equity lines in the top holdings table.
    pub top_holdings: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            decimals: 0,
            top_holdings: DEFAULT_TOP_HOLDINGS,
        }
    }
}

/// Live quote provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    /// Base URL of the Yahoo Finance API.
    #[serde(default = "default_quote_base_url")]
    pub base_url: String,

    /// Upper bound on the single quote request.
    #[serde(
        default = "default_quote_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_base_url(),
            timeout: default_quote_timeout(),
        }
    }
}

/// Extra symbol mappings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Exact code → provider symbol mappings, checked before the built-in
    /// rules.
    pub overrides: BTreeMap<String, String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the workbook. If relative, resolved from the config file location.
    #[serde(default = "default_workbook")]
    pub workbook: PathBuf,

    /// Sheet names and labels used to read the workbook.
    pub layout: WorkbookLayout,

    /// Quote provider settings.
    pub quotes: QuotesConfig,

    /// Symbol translation settings.
    pub symbols: SymbolsConfig,

    /// Display/output formatting settings.
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: default_workbook(),
            layout: WorkbookLayout::default(),
            quotes: QuotesConfig::default(),
            symbols: SymbolsConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the workbook path.
    ///
    /// A relative `workbook` is resolved against `config_dir`.
    pub fn resolve_workbook(&self, config_dir: &Path) -> PathBuf {
        if self.workbook.is_absolute() {
            self.workbook.clone()
        } else {
            config_dir.join(&self.workbook)
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// The resolved workbook path.
    pub workbook_path: PathBuf,

    pub layout: WorkbookLayout,

    pub quotes: QuotesConfig,

    pub symbols: SymbolsConfig,

    pub display: DisplayConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./networth.toml` if it exists in current directory
/// 2. `~/.local/share/networth/networth.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("networth").join(DEFAULT_CONFIG_FILE);
    }

    local_config
}

impl ResolvedConfig {
    fn from_config(config: Config, config_dir: &Path) -> Self {
        Self {
            workbook_path: config.resolve_workbook(config_dir),
            layout: config.layout,
            quotes: config.quotes,
            symbols: config.symbols,
            display: config.display,
        }
    }

    /// Load and resolve config from a file path.
    ///
    /// The workbook path is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        Ok(Self::from_config(config, config_dir))
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Without a file, the workbook is looked up next to where the config
    /// file would be.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Ok(Self::from_config(Config::default(), config_dir))
    }
}
