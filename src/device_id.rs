//! Stable per-installation identifier.
//!
//! The identifier is read from the store file when present. Otherwise it is
//! derived from the platform machine id (name-based, MD5) or generated at
//! random, then written to the store so later runs see the same value.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

const MACHINE_ID_PATHS: &[&str] = &["/etc/machine-id", "/var/lib/dbus/machine-id"];

static DEVICE_ID: OnceCell<String> = OnceCell::new();

#[derive(Serialize, Deserialize, Debug)]
struct StoredDeviceId {
    device_id: String,
}

/// Process-wide identifier, resolved against `store` on first use.
///
/// Later calls return the cached value and ignore `store`.
pub fn device_id(store: &Path) -> Result<&'static str> {
    DEVICE_ID
        .get_or_try_init(|| resolve(store, platform_id().as_deref()))
        .map(String::as_str)
}

/// Read the identifier from `store`, or compute one from `platform_id` and persist it.
pub fn resolve(store: &Path, platform_id: Option<&str>) -> Result<String> {
    if let Some(id) = load(store)? {
        return Ok(id);
    }
    let id = derive(platform_id).to_string();
    save(store, &id)?;
    debug!(path = %store.display(), "persisted new device id");
    Ok(id)
}

/// Name-based (version 3) UUID of the platform id, or a random one without it.
pub fn derive(platform_id: Option<&str>) -> Uuid {
    match platform_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => uuid::Builder::from_md5_bytes(md5::compute(id.as_bytes()).0).into_uuid(),
        None => Uuid::new_v4(),
    }
}

fn platform_id() -> Option<String> {
    MACHINE_ID_PATHS.iter().find_map(|path| {
        fs::read_to_string(path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn load(store: &Path) -> Result<Option<String>> {
    let file = match File::open(store) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to open device id at {}", store.display()))
        }
    };
    match serde_json::from_reader::<_, StoredDeviceId>(file) {
        Ok(stored) if !stored.device_id.is_empty() => Ok(Some(stored.device_id)),
        Ok(_) => Ok(None),
        Err(err) => {
            warn!(path = %store.display(), %err, "ignoring unreadable device id store");
            Ok(None)
        }
    }
}

fn save(store: &Path, id: &str) -> Result<()> {
    if let Some(parent) = store.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = File::create(store)
        .with_context(|| format!("failed to create device id at {}", store.display()))?;
    let stored = StoredDeviceId {
        device_id: id.to_string(),
    };
    serde_json::to_writer_pretty(file, &stored)
        .with_context(|| format!("failed to write device id at {}", store.display()))?;
    Ok(())
}
