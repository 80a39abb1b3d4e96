//! Optional RON configuration layered over the engine defaults.
//!
//! Lookup order: `--config <file>` (must exist), then `./armory.ron` (used
//! when present), then built-in defaults. Command-line flags win over both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use armory_engine::{parse_site_base, DataFiles, EngineConfig, FetchError};
use engine_logging::engine_info;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "armory.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub site: Option<String>,
    pub weapon_dir: Option<String>,
    pub guild_dir: Option<String>,
    /// Empty string disables the `v=` parameter.
    pub cache_buster: Option<String>,
    pub generic_data: Option<String>,
    pub faction_data: Option<String>,
    pub max_concurrent: Option<usize>,
    pub batch_delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub backoff_multiplier: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid site {site:?}: {source}")]
    Site {
        site: String,
        #[source]
        source: FetchError,
    },
}

/// Reads `explicit`, or the default file from `dir` if one exists.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<ConfigFile, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = dir.join(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                return Ok(ConfigFile::default());
            }
            fallback
        }
    };
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let file = ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    engine_info!("Loaded configuration from {:?}", path);
    Ok(file)
}

/// Engine settings: defaults, then `file`, then `site_override`.
pub fn engine_config(file: &ConfigFile, site_override: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let site = site_override
        .or(file.site.as_deref())
        .unwrap_or(".")
        .to_string();
    let base = parse_site_base(&site).map_err(|source| ConfigError::Site {
        site: site.clone(),
        source,
    })?;

    let mut config = EngineConfig::for_site(base);
    let mut layout = config.layout.clone();
    if let Some(dir) = &file.weapon_dir {
        layout = layout.with_weapon_dir(dir.clone());
    }
    if let Some(dir) = &file.guild_dir {
        layout = layout.with_guild_dir(dir.clone());
    }
    if let Some(version) = &file.cache_buster {
        layout = layout.with_cache_buster(Some(version.clone()));
    }
    config.layout = layout;

    let defaults = DataFiles::default();
    config.data_files = DataFiles {
        generic: file.generic_data.clone().unwrap_or(defaults.generic),
        faction: file.faction_data.clone().unwrap_or(defaults.faction),
    };

    let throttle = &mut config.throttle;
    if let Some(max) = file.max_concurrent {
        throttle.max_concurrent = max;
    }
    if let Some(ms) = file.batch_delay_ms {
        throttle.batch_delay = Duration::from_millis(ms);
    }

    let retry = &mut config.retry;
    if let Some(max) = file.max_retries {
        retry.max_retries = max;
    }
    if let Some(ms) = file.initial_delay_ms {
        retry.initial_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = file.max_delay_ms {
        retry.max_delay = Duration::from_millis(ms);
    }
    if let Some(multiplier) = file.backoff_multiplier {
        retry.backoff_multiplier = multiplier;
    }

    if let Some(secs) = file.request_timeout_secs {
        config.image_fetch.request_timeout = Duration::from_secs(secs);
        config.data_fetch.request_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}
