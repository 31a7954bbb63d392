//! Runtime configuration loaded from a JSON file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::codec::HexDecodeMode;
use crate::path_ops::DEFAULT_COPY_BUFFER;

/// Runtime settings, loaded from a JSON file. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Overrides the `HOME` constant
    pub home_dir: Option<PathBuf>,
    /// Overrides the `TEMP` constant
    pub temp_dir: Option<PathBuf>,
    /// Where the device identifier is persisted
    pub device_id_path: Option<PathBuf>,
    /// Overrides the `MODEL` constant
    pub model: Option<String>,
    pub copy_buffer_size: usize,
    pub hex_decode: HexDecodeMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_dir: None,
            temp_dir: None,
            device_id_path: None,
            model: None,
            copy_buffer_size: DEFAULT_COPY_BUFFER,
            hex_decode: HexDecodeMode::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open config file at {}", path.display()))?;
        let config: Config = serde_json::from_reader(file)
            .with_context(|| format!("failed to parse config file at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.copy_buffer_size == 0 {
            bail!("copy_buffer_size must be greater than zero");
        }
        Ok(())
    }

    pub fn home_dir(&self) -> Result<PathBuf> {
        match &self.home_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir().context("cannot determine home directory"),
        }
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn device_id_path(&self) -> Result<PathBuf> {
        match &self.device_id_path {
            Some(path) => Ok(path.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("litefs").join("device_id.json"))
                .context("cannot determine config directory for the device id"),
        }
    }
}
