use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub server: ServerConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub data_csv: PathBuf,
    /// When true, a load failure logs a warning and substitutes the built-in
    /// fallback dataset instead of aborting startup.
    pub fallback_on_error: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            data_csv: PathBuf::from("data/datos_guajira.csv"),
            fallback_on_error: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 10000,
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum rows shown in the data table. `0` in the TOML disables the
    /// cap and shows every row.
    #[serde(deserialize_with = "deserialize_row_cap")]
    pub table_row_cap: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            table_row_cap: Some(20),
        }
    }
}

fn deserialize_row_cap<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let cap = usize::deserialize(deserializer)?;
    Ok(if cap == 0 { None } else { Some(cap) })
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Missing config file is not an error; the defaults cover a checkout run
    /// straight from the repository root.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("Config file {:?} not found, using defaults", path);
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring unparseable PORT value: {}", port),
            }
        }
    }
}
