//! Process-wide constants handed to the host at startup.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::device_id;

const DMI_PRODUCT_NAME: &str = "/sys/devices/virtual/dmi/id/product_name";

/// Values surfaced to the host once at startup.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub struct HostConstants {
    pub home: PathBuf,
    pub temp: PathBuf,
    pub uuid: String,
    pub model: String,
}

impl HostConstants {
    pub fn load(config: &Config) -> Result<Self> {
        Ok(Self {
            home: config.home_dir()?,
            temp: config.temp_dir(),
            uuid: device_id::device_id(&config.device_id_path()?)?.to_string(),
            model: config.model.clone().unwrap_or_else(device_model),
        })
    }
}

/// Hardware product name when the platform exposes one, else `<os>-<arch>`.
pub fn device_model() -> String {
    fs::read_to_string(DMI_PRODUCT_NAME)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH))
}
