//! matraca configuration management.

use crate::tts::edge::DEFAULT_ENDPOINT;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Hard ceiling on total input length, in characters.
pub const MAX_INPUT_CHARS: usize = 120_000;

// Default prosody controls (linear UI ranges, see AudioSettings::new).
const DEFAULT_RATE: f32 = 1.0;
const DEFAULT_VOLUME: f32 = 100.0;
const DEFAULT_PITCH: f32 = 0.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatracaConfig {
    /// Speech service synthesis endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Subscription key, if the endpoint requires one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default voice: a catalog label or a raw service voice id.
    #[serde(default)]
    pub voice: Option<String>,

    /// Speaking rate multiplier (0.25-4.0).
    #[serde(default = "default_rate")]
    pub rate: f32,

    /// Volume percentage (20-200).
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Pitch shift in Hz (-20 to +20).
    #[serde(default = "default_pitch")]
    pub pitch: f32,

    /// Per-chunk character ceiling for text splitting.
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_rate() -> f32 {
    DEFAULT_RATE
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_pitch() -> f32 {
    DEFAULT_PITCH
}

fn default_chunk_chars() -> usize {
    crate::text::DEFAULT_CHUNK_CHARS
}

impl Default for MatracaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            voice: None,
            rate: default_rate(),
            volume: default_volume(),
            pitch: default_pitch(),
            chunk_chars: default_chunk_chars(),
        }
    }
}

impl MatracaConfig {
    /// Get the config file path: ~/.config/matraca/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("matraca")
            .join("config.toml"))
    }

    /// Load config from file, returning defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: MatracaConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
