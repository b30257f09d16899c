//! Persisted user settings for the CLI shell.
//!
//! Stored as TOML in the platform config directory. The evaluation core
//! never reads these; the shell resolves them into explicit arguments per
//! call.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculator::Mode;

/// Interface language for the shell's labels.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn parse(name: &str) -> Option<Language> {
        match name.trim().to_lowercase().as_str() {
            "de" | "german" | "deutsch" => Some(Language::De),
            "en" | "english" => Some(Language::En),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: Language,
    /// Mode the shell starts in.
    pub mode: Mode,
    /// Whether the shell lets the classifier override the current mode.
    pub auto_detect: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            language: Language::De,
            mode: Mode::Basic,
            auto_detect: true,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file
    /// is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|err| {
                warn!("ignoring malformed settings {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Default settings location in the platform config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("synocalc").join("settings.toml"))
}
