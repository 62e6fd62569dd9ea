//! Settings persistence.
//!
//! Settings live in one pretty-printed JSON file under the platform's
//! local config directory. Saves go through a temp file and rename so a
//! crash mid-write never leaves a truncated settings file behind.

use super::Settings;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "panelmon";
const FILE_NAME: &str = "settings.json";

/// Default settings path: `<config_local>/panelmon/settings.json`.
pub fn default_path() -> Result<PathBuf> {
    let base = dirs::config_local_dir()
        .ok_or_else(|| Error::Configuration("no local config directory".to_string()))?;
    Ok(base.join(APP_DIR).join(FILE_NAME))
}

/// Load and normalize settings. A missing file yields the normalized
/// defaults; a present but unreadable or malformed file is an error.
pub fn load(path: &Path) -> Result<Settings> {
    let mut settings = if path.exists() {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)?
    } else {
        log::info!("no settings file at {}, using defaults", path.display());
        Settings::default()
    };
    settings.normalize();
    Ok(settings)
}

/// Write settings as pretty JSON, creating the parent directory on
/// demand. The write is atomic at the filesystem level.
pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    log::debug!("settings saved to {}", path.display());
    Ok(())
}
