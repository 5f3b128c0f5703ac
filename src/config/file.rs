//! TOML configuration file loading
//!
//! Supports `~/.config/voicemaps/config.toml` as a persistent config source.
//! Every field is optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VoicemapsConfigFile {
    /// Speech capture and feedback
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Place lookup
    #[serde(default)]
    pub lookup: LookupFileConfig,

    /// HTTP server
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Voice configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable spoken feedback
    pub enabled: Option<bool>,

    /// Recognition and synthesis language tag (e.g. "en-US")
    pub lang: Option<String>,

    /// Speech rate multiplier
    pub rate: Option<f32>,

    /// Speech pitch
    pub pitch: Option<f32>,

    /// Speech volume, 0 to 1
    pub volume: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupFileConfig {
    /// Location searched when a command names none
    pub location: Option<String>,

    /// Simulated lookup latency in milliseconds
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Web UI directory served as fallback
    pub static_dir: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VoicemapsConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> VoicemapsConfigFile {
    config_file_path().map_or_else(VoicemapsConfigFile::default, |path| load_from(&path))
}

/// Load a config file from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> VoicemapsConfigFile {
    if !path.exists() {
        return VoicemapsConfigFile::default();
    }

    match read_config_file(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            VoicemapsConfigFile::default()
        }
    }
}

/// Read and parse a config file
///
/// # Errors
///
/// Returns error if the file can't be read or isn't valid TOML
pub fn read_config_file(path: &Path) -> Result<VoicemapsConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `~/.config/voicemaps/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voicemaps").join("config.toml"))
}
