use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Run-time configuration, read from a TOML file. Everything has a default
/// so the binary also runs without one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the store profile lives on disk.
    pub profile: PathBuf,
    pub translation: TranslationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("craftora.json"),
            translation: TranslationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub libre_url: String,
    pub google_url: String,
    /// Per-provider timeout; on expiry the next provider in the chain is tried.
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            libre_url: "https://libretranslate.de/translate".to_string(),
            google_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_secs: 8,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}
