use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// User configuration, read from a JSON file.
/// If the structure changes, add a new version to [`ConfigFile`] so that files written for
/// older versions keep loading.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// The initial selection covers the first `1 / initial_window_divisor` of the trace.
    pub initial_window_divisor: i64,
    /// How many regions the summary lists.
    pub summary_top_regions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_window_divisor: 1,
            summary_top_regions: 5,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum ConfigFile {
    V1(Config),
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        match file {
            ConfigFile::V1(config) => config,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        log::info!("Reading config from {}", path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config_file: ConfigFile = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config_file.into())
    }

    /// Load the config from the platform config directory, or use the defaults if there is none.
    pub fn load_default() -> Result<Config> {
        let Some(path) = default_config_path() else {
            log::warn!("No config directory available, using default config");
            return Ok(Config::default());
        };
        if !path.try_exists()? {
            log::info!("Config file {} not found, using default config", path.display());
            return Ok(Config::default());
        }
        Config::load(&path)
    }

    /// Divisor for the initial window, never below 1.
    pub fn window_divisor(&self) -> i64 {
        self.initial_window_divisor.max(1)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "tracewin", "tracewin")
        .map(|dirs| dirs.config_dir().join("config.json"))
}
