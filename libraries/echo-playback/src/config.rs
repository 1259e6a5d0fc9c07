//! Playback configuration
//!
//! Layered like the rest of the app's settings: built-in defaults, then an
//! optional TOML file, then `ECHO_`-prefixed environment variables
//! (`ECHO_VOLUME=60`, `ECHO_VOLUME_CURVE=logarithmic`).

use crate::error::{PlaybackError, Result};
use crate::volume::VolumeCurve;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0-100, default: 80)
    pub volume: u8,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial repeat flag (default: false)
    pub repeat: bool,

    /// Level-to-gain mapping (default: linear)
    pub volume_curve: VolumeCurve,

    /// Step for relative seeks from keyboard/media keys (default: 10s)
    pub seek_step_secs: f64,

    /// Fixed seed for shuffle picks; random when unset
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 80,
            shuffle: false,
            repeat: false,
            volume_curve: VolumeCurve::Linear,
            seek_step_secs: 10.0,
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ECHO")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let loaded: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        Ok(loaded.validate())
    }

    /// Clamp out-of-range values
    pub fn validate(mut self) -> Self {
        if self.volume > 100 {
            tracing::warn!("Configured volume {} above 100, clamping", self.volume);
            self.volume = 100;
        }

        if !self.seek_step_secs.is_finite() || self.seek_step_secs <= 0.0 {
            tracing::warn!(
                "Invalid seek step {}, using default",
                self.seek_step_secs
            );
            self.seek_step_secs = Self::default().seek_step_secs;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 80);
        assert!(!config.shuffle);
        assert!(!config.repeat);
        assert_eq!(config.volume_curve, VolumeCurve::Linear);
        assert_eq!(config.seek_step_secs, 10.0);
        assert!(config.shuffle_seed.is_none());
    }

    #[test]
    fn validate_clamps_volume() {
        let config = PlaybackConfig {
            volume: 180,
            ..PlaybackConfig::default()
        }
        .validate();
        assert_eq!(config.volume, 100);
    }

    #[test]
    fn validate_replaces_bad_seek_step() {
        let config = PlaybackConfig {
            seek_step_secs: -1.0,
            ..PlaybackConfig::default()
        }
        .validate();
        assert_eq!(config.seek_step_secs, 10.0);

        let config = PlaybackConfig {
            seek_step_secs: f64::NAN,
            ..PlaybackConfig::default()
        }
        .validate();
        assert_eq!(config.seek_step_secs, 10.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PlaybackConfig = toml::from_str("volume = 40\nrepeat = true").unwrap();
        assert_eq!(config.volume, 40);
        assert!(config.repeat);
        assert!(!config.shuffle);
        assert_eq!(config.seek_step_secs, 10.0);
    }
}
