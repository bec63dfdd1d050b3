//! Service configuration
//!
//! Settings resolve per field in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`DRIP_MM_*`)
//! 3. TOML config file (`drip/mm.toml` under the platform config dir,
//!    path overridable via `--config` / `DRIP_MM_CONFIG`)
//! 4. Compiled default (fallback)

use clap::Parser;
use drip_common::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments for drip-mm
#[derive(Parser, Debug, Default)]
#[command(name = "drip-mm", about = "Drip Mix & Match matching service")]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bind port
    #[arg(long)]
    pub port: Option<u16>,

    /// Base URL of the wardrobe catalog service
    #[arg(long)]
    pub catalog_url: Option<String>,

    /// Base URL of the compatibility scoring service
    #[arg(long)]
    pub scoring_url: Option<String>,
}

/// Optional fields as they appear in the TOML config file.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    host: Option<String>,
    port: Option<u16>,
    catalog_base_url: Option<String>,
    scoring_base_url: Option<String>,
    scoring_timeout_secs: Option<u64>,
    scoring_rate_limit: Option<u32>,
}

/// Resolved drip-mm configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchServiceConfig {
    pub host: String,
    pub port: u16,
    /// Catalog service base URL (garment listing, image serving)
    pub catalog_base_url: String,
    /// Scoring service base URL (pairwise compatibility)
    pub scoring_base_url: String,
    /// Per-call scoring timeout; a timeout counts as a scoring failure
    pub scoring_timeout_secs: u64,
    /// Client-side cap on scoring requests per second
    pub scoring_rate_limit: u32,
}

impl Default for MatchServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5741,
            catalog_base_url: "http://127.0.0.1:8000".to_string(),
            scoring_base_url: "http://127.0.0.1:8000".to_string(),
            scoring_timeout_secs: 10,
            scoring_rate_limit: 8,
        }
    }
}

impl MatchServiceConfig {
    /// Resolve configuration from all sources in priority order.
    ///
    /// A config file that exists but fails to parse is a startup error,
    /// not a silent fallback to defaults.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let mut config = Self::default();

        let file_path = args
            .config
            .clone()
            .or_else(|| std::env::var("DRIP_MM_CONFIG").ok().map(PathBuf::from))
            .or_else(|| drip_common::config::resolve_config_file("mm"));

        if let Some(path) = file_path {
            if path.exists() {
                let raw = std::fs::read_to_string(&path)?;
                let file: ConfigFile = toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                config.apply_file(file);
            }
        }

        config.apply_env()?;
        config.apply_args(args);
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(url) = file.catalog_base_url {
            self.catalog_base_url = url;
        }
        if let Some(url) = file.scoring_base_url {
            self.scoring_base_url = url;
        }
        if let Some(secs) = file.scoring_timeout_secs {
            self.scoring_timeout_secs = secs;
        }
        if let Some(limit) = file.scoring_rate_limit {
            self.scoring_rate_limit = limit;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("DRIP_MM_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("DRIP_MM_PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid DRIP_MM_PORT: {port}")))?;
        }
        if let Ok(url) = std::env::var("DRIP_MM_CATALOG_URL") {
            self.catalog_base_url = url;
        }
        if let Ok(url) = std::env::var("DRIP_MM_SCORING_URL") {
            self.scoring_base_url = url;
        }
        if let Ok(secs) = std::env::var("DRIP_MM_SCORING_TIMEOUT_SECS") {
            self.scoring_timeout_secs = secs.parse().map_err(|_| {
                Error::Config(format!("invalid DRIP_MM_SCORING_TIMEOUT_SECS: {secs}"))
            })?;
        }
        if let Ok(limit) = std::env::var("DRIP_MM_SCORING_RATE_LIMIT") {
            self.scoring_rate_limit = limit.parse().map_err(|_| {
                Error::Config(format!("invalid DRIP_MM_SCORING_RATE_LIMIT: {limit}"))
            })?;
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(url) = &args.catalog_url {
            self.catalog_base_url = url.clone();
        }
        if let Some(url) = &args.scoring_url {
            self.scoring_base_url = url.clone();
        }
    }
}
