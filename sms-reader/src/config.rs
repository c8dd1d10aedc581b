use config::{Config, ConfigError, File};
use extractors::DisplayFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"
[database]
# path = "/path/to/sms-reader.sqlite"

[display]
date_format = "%-m/%-d/%Y"
time_format = "%-I:%M:%S %p"
# "local", "utc" or a fixed offset such as "+05:30"
timezone = "local"

[scan]
days_back = 30
# max_count = 500
"#;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub display: Option<DisplayFormat>,
    pub scan: Option<ScanConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    pub max_count: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            max_count: None,
        }
    }
}

fn default_days_back() -> u32 {
    30
}

impl AppConfig {
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    /// Read the config at `config_path`, writing the default file first if
    /// there is none.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
            tracing::info!("Wrote default config to {:?}", config_path);
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .build()?;

        let config: AppConfig = builder.try_deserialize()?;

        config
            .display_format()
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(config)
    }

    pub fn display_format(&self) -> DisplayFormat {
        self.display.clone().unwrap_or_default()
    }

    pub fn scan(&self) -> ScanConfig {
        self.scan.clone().unwrap_or_default()
    }

    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.database.as_ref().and_then(|db| db.path.as_ref()) {
            return Ok(PathBuf::from(path));
        }

        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;
        Ok(data_dir.join("sms-reader").join("db.sqlite"))
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("sms-reader").join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}
