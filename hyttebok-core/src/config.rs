//! Global hyttebok configuration.

use std::path::PathBuf;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{HyttebokError, HyttebokResult};
use crate::identity::Identity;

static DEFAULT_DATA_PATH: &str = "~/.hyttebok";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn is_default_data_path(p: &PathBuf) -> bool {
    *p == default_data_path()
}

/// Global configuration at ~/.config/hyttebok/config.toml
///
/// The profile doubles as the identity collaborator: whoever is named
/// here owns the bookings created from this machine.
#[derive(Serialize, Deserialize, Clone)]
pub struct HyttebokConfig {
    #[serde(default = "default_data_path", skip_serializing_if = "is_default_data_path")]
    pub data_dir: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Identity>,
}

impl HyttebokConfig {
    pub fn config_path() -> HyttebokResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HyttebokError::Config("Could not determine config directory".into()))?
            .join("hyttebok");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> HyttebokResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let config: HyttebokConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .build()
            .map_err(|e| HyttebokError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HyttebokError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Where the durable booking data lives, with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Save the current config to ~/.config/hyttebok/config.toml
    pub fn save(&self) -> HyttebokResult<()> {
        let config_path = Self::config_path()?;

        let content =
            toml::to_string_pretty(self).map_err(|e| HyttebokError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| HyttebokError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &std::path::Path) -> HyttebokResult<()> {
        let contents = format!(
            "\
# hyttebok configuration

# Where the shared booking data lives:
# data_dir = \"{}\"

# Who you are on the shared calendar (run `hyttebok init` to fill this in):
# [profile]
# id = \"...\"
# display_name = \"Kari\"
# color = \"#f59e0b\"
",
            DEFAULT_DATA_PATH
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HyttebokError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| HyttebokError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
