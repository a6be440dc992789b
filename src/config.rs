//! Application-level configuration loading: catalog location, win-count bounds and playback.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::playback::{EmbedKind, MAX_VOLUME};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "HITSTER_BACK_CONFIG_PATH";

const DEFAULT_CATALOG_DIR: &str = "songs";
const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 5000;
const DEFAULT_WIN_COUNT: u32 = 10;
const DEFAULT_MIN_WIN_COUNT: u32 = 5;
const DEFAULT_MAX_WIN_COUNT: u32 = 20;
const DEFAULT_VOLUME: u8 = 80;
const DEFAULT_PREVIEW_LENGTH_SECS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Directory holding `songs-<tier>.json` files.
    pub catalog_dir: PathBuf,
    /// Base URL serving the tier files, used by the `http-catalog` feature.
    pub catalog_url: Option<String>,
    /// Deadline applied to a catalog fetch when a match starts.
    pub catalog_timeout: Duration,
    pub default_win_count: u32,
    pub min_win_count: u32,
    pub max_win_count: u32,
    pub default_volume: u8,
    pub preview_length_secs: u32,
    pub playback: EmbedKind,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        catalog_dir = %app_config.catalog_dir.display(),
                        playback = %app_config.playback,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; omitted keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Check a requested win count against the configured bounds.
    pub fn win_count_in_range(&self, win_count: u32) -> bool {
        (self.min_win_count..=self.max_win_count).contains(&win_count)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    catalog_dir: Option<PathBuf>,
    catalog_url: Option<String>,
    catalog_timeout_ms: Option<u64>,
    default_win_count: Option<u32>,
    min_win_count: Option<u32>,
    max_win_count: Option<u32>,
    default_volume: Option<u8>,
    preview_length_secs: Option<u32>,
    playback: Option<EmbedKind>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let min_win_count = value.min_win_count.unwrap_or(DEFAULT_MIN_WIN_COUNT).max(1);
        let max_win_count = value
            .max_win_count
            .unwrap_or(DEFAULT_MAX_WIN_COUNT)
            .max(min_win_count);
        let default_win_count = value
            .default_win_count
            .unwrap_or(DEFAULT_WIN_COUNT)
            .clamp(min_win_count, max_win_count);

        Self {
            catalog_dir: value
                .catalog_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_DIR)),
            catalog_url: value.catalog_url.filter(|url| !url.trim().is_empty()),
            catalog_timeout: Duration::from_millis(
                value
                    .catalog_timeout_ms
                    .unwrap_or(DEFAULT_CATALOG_TIMEOUT_MS),
            ),
            default_win_count,
            min_win_count,
            max_win_count,
            default_volume: value.default_volume.unwrap_or(DEFAULT_VOLUME).min(MAX_VOLUME),
            preview_length_secs: value
                .preview_length_secs
                .unwrap_or(DEFAULT_PREVIEW_LENGTH_SECS),
            playback: value.playback.unwrap_or(EmbedKind::SearchEmbed),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
