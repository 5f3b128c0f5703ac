//! Configuration management for `VoiceMaps`

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::places::{DEFAULT_LOOKUP_DELAY, DEFAULT_LOCATION};
use crate::voice::{DEFAULT_LANG, VoiceParams};
use crate::{Error, Result};

use file::VoicemapsConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 18800;

/// `VoiceMaps` configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Speech capture and feedback
    pub voice: VoiceConfig,

    /// Place lookup
    pub lookup: LookupConfig,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,
}

/// Voice configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Speak replies aloud
    pub enabled: bool,

    /// Language tag for recognition and synthesis
    pub lang: String,

    /// Synthesis parameters, always within range
    pub params: VoiceParams,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lang: DEFAULT_LANG.to_string(),
            params: VoiceParams::default(),
        }
    }
}

/// Place lookup configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Location searched when a command names none
    pub default_location: String,

    /// Simulated lookup latency
    pub delay: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION.to_string(),
            delay: DEFAULT_LOOKUP_DELAY,
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_sources(VoicemapsConfigFile::default(), |_| None)
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    #[must_use]
    pub fn load() -> Self {
        Self::from_sources(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// Unparsable numbers are ignored and synthesis parameters are clamped
    /// (non-finite values fall back to defaults), so this never fails.
    pub fn from_sources(fc: VoicemapsConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| env(key).and_then(|s| s.trim().parse::<f32>().ok());
        let defaults = VoiceParams::default();

        let disable_voice = env("VOICEMAPS_DISABLE_VOICE").is_some_and(|v| is_truthy(&v));
        if disable_voice {
            tracing::info!("voice feedback disabled via VOICEMAPS_DISABLE_VOICE");
        }

        let voice = VoiceConfig {
            enabled: !disable_voice && fc.voice.enabled.unwrap_or(true),
            lang: env("VOICEMAPS_LANG")
                .filter(|s| !s.trim().is_empty())
                .or(fc.voice.lang)
                .unwrap_or_else(|| DEFAULT_LANG.to_string()),
            params: VoiceParams {
                rate: number("VOICEMAPS_TTS_RATE")
                    .or(fc.voice.rate)
                    .unwrap_or(defaults.rate),
                pitch: number("VOICEMAPS_TTS_PITCH")
                    .or(fc.voice.pitch)
                    .unwrap_or(defaults.pitch),
                volume: number("VOICEMAPS_TTS_VOLUME")
                    .or(fc.voice.volume)
                    .unwrap_or(defaults.volume),
            }
            .clamped(),
        };

        let lookup = LookupConfig {
            default_location: env("VOICEMAPS_LOCATION")
                .filter(|s| !s.trim().is_empty())
                .or(fc.lookup.location)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            delay: env("VOICEMAPS_LOOKUP_DELAY_MS")
                .and_then(|s| s.trim().parse().ok())
                .or(fc.lookup.delay_ms)
                .map_or(DEFAULT_LOOKUP_DELAY, Duration::from_millis),
        };

        let api_server = ApiServerConfig {
            port: env("VOICEMAPS_PORT")
                .and_then(|s| s.trim().parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: env("VOICEMAPS_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        Self {
            voice,
            lookup,
            api_server,
        }
    }

    /// Check settings that can only be verified against the host
    ///
    /// # Errors
    ///
    /// Returns error if the static directory is configured but missing
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.api_server.static_dir
            && !dir.is_dir()
        {
            return Err(Error::Config(format!(
                "static directory {} does not exist",
                dir.display()
            )));
        }
        Ok(())
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.voice.enabled);
        assert_eq!(config.voice.lang, "en-US");
        assert_eq!(config.voice.params, VoiceParams::default());
        assert_eq!(config.lookup.default_location, "San Francisco, CA");
        assert_eq!(config.lookup.delay, Duration::from_millis(1500));
        assert_eq!(config.api_server.port, DEFAULT_PORT);
        assert!(config.api_server.static_dir.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let fc: VoicemapsConfigFile = toml::from_str(
            "[server]\nport = 9000\n[lookup]\nlocation = \"Austin, TX\"\n",
        )
        .unwrap();
        let config = Config::from_sources(fc, env(&[("VOICEMAPS_PORT", "9100")]));

        assert_eq!(config.api_server.port, 9100);
        assert_eq!(config.lookup.default_location, "Austin, TX");
    }

    #[test]
    fn test_unparsable_numbers_are_ignored() {
        let config = Config::from_sources(
            VoicemapsConfigFile::default(),
            env(&[
                ("VOICEMAPS_PORT", "not-a-port"),
                ("VOICEMAPS_LOOKUP_DELAY_MS", "-5"),
                ("VOICEMAPS_TTS_RATE", "fast"),
            ]),
        );

        assert_eq!(config.api_server.port, DEFAULT_PORT);
        assert_eq!(config.lookup.delay, DEFAULT_LOOKUP_DELAY);
        assert!((config.voice.params.rate - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tts_params_are_clamped() {
        let config = Config::from_sources(
            VoicemapsConfigFile::default(),
            env(&[("VOICEMAPS_TTS_VOLUME", "3"), ("VOICEMAPS_TTS_PITCH", "-1")]),
        );

        assert!((config.voice.params.volume - 1.0).abs() < f32::EPSILON);
        assert!(config.voice.params.pitch.abs() < f32::EPSILON);
    }

    #[test]
    fn test_nan_tts_params_fall_back_to_defaults() {
        let config = Config::from_sources(
            VoicemapsConfigFile::default(),
            env(&[("VOICEMAPS_TTS_RATE", "NaN"), ("VOICEMAPS_TTS_PITCH", "inf")]),
        );
        assert_eq!(config.voice.params, VoiceParams::default());

        let fc: VoicemapsConfigFile =
            toml::from_str("[voice]\nrate = nan\nvolume = -inf\npitch = 1.5\n").unwrap();
        let config = Config::from_sources(fc, env(&[]));

        assert!((config.voice.params.rate - 0.9).abs() < f32::EPSILON);
        assert!((config.voice.params.volume - 0.8).abs() < f32::EPSILON);
        assert!((config.voice.params.pitch - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disable_voice() {
        let config = Config::from_sources(
            VoicemapsConfigFile::default(),
            env(&[("VOICEMAPS_DISABLE_VOICE", "true")]),
        );
        assert!(!config.voice.enabled);
    }

    #[test]
    fn test_validate_missing_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.api_server.static_dir = Some(dir.path().join("missing"));
        let err = tokio_test::assert_err!(config.validate());
        assert!(matches!(err, Error::Config(_)));

        config.api_server.static_dir = Some(dir.path().to_path_buf());
        tokio_test::assert_ok!(config.validate());
    }
}
