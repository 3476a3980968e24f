use std::path::{Path, PathBuf};

use clap::Args;
use engine::DEFAULT_ROWS_PER_PAGE;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/pourtrack.toml";
const ENV_PREFIX: &str = "POURTRACK_CLI";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub base_url: String,
    pub token: String,
    /// Where `receipt` writes its files.
    pub receipt_dir: PathBuf,
    /// Receipt logo (PNG or JPEG for PDF receipts); the brand text is used
    /// when unset or unusable.
    pub brand: Option<PathBuf>,
    pub rows_per_page: usize,
    pub level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            token: String::new(),
            receipt_dir: PathBuf::from("."),
            brand: None,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            level: "warn".to_string(),
        }
    }
}

/// Command-line overrides, applied after the file and the environment.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override the receipt output directory.
    #[arg(long, global = true)]
    pub receipt_dir: Option<PathBuf>,
    /// Override the receipt logo.
    #[arg(long, global = true)]
    pub brand: Option<PathBuf>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,
}

/// The bearer token is only read from the file or `POURTRACK_CLI_TOKEN`,
/// never from the command line.
pub fn load(overrides: Overrides) -> Result<CliConfig> {
    let config_path = overrides
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut settings = from_file(&config_path)?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(receipt_dir) = overrides.receipt_dir {
        settings.receipt_dir = receipt_dir;
    }
    if let Some(brand) = overrides.brand {
        settings.brand = Some(brand);
    }
    if let Some(level) = overrides.level {
        settings.level = level;
    }

    Ok(settings)
}

fn from_file(path: &Path) -> Result<CliConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}
