use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ZETTEL_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub zettelkasten: ZettelkastenConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

/// Note storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ZettelkastenConfig {
    /// Directory containing the notes (`<id>.<extension>` files).
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ZettelkastenConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
            log_level: default_log_level(),
        }
    }
}

/// PageRank configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Number of notes reported by the importance ranking.
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            top: default_top(),
        }
    }
}

/// Map of content configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringConfig {
    /// Communities smaller than this are left out of the content map.
    #[serde(default = "default_min_size")]
    pub min_size: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "md".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_damping() -> f64 {
    0.85
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    100
}

fn default_top() -> usize {
    10
}

fn default_min_size() -> usize {
    2
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in ZETTEL_CONFIG environment variable (must exist)
    /// 2. ./zettel.toml in current directory (defaults when absent)
    pub fn load() -> Result<Self> {
        // Optional .env file
        let _ = dotenv::dotenv();

        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let local = Path::new("zettel.toml");
                if local.is_file() {
                    Self::from_file(local)?
                } else {
                    log::debug!("No zettel.toml found, using defaults");
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a specific config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.zettelkasten.directory = expand_home(&config.zettelkasten.directory);
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.ranking.damping > 0.0 && self.ranking.damping < 1.0) {
            anyhow::bail!("ranking.damping must be between 0.0 and 1.0 (exclusive)");
        }

        if self.ranking.top == 0 {
            anyhow::bail!("ranking.top must be greater than 0");
        }

        if self.ranking.max_iterations == 0 {
            anyhow::bail!("ranking.max_iterations must be greater than 0");
        }

        if self.clustering.min_size == 0 {
            anyhow::bail!("clustering.min_size must be greater than 0");
        }

        if self.zettelkasten.extension.trim().is_empty() {
            anyhow::bail!("zettelkasten.extension must not be empty");
        }

        Ok(())
    }

    /// Get the notes directory
    pub fn directory(&self) -> &Path {
        &self.zettelkasten.directory
    }
}
