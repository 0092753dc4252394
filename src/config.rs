//! Layered configuration: built-in defaults, an optional TOML config
//! file, then environment overrides. CLI flags are merged on top by the
//! caller (see `cli::Args::merged_settings`).

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::DraftError;
use crate::prompt::{Genre, Language, WritingMode};

pub const ENV_API_URL: &str = "DRAFTPILOT_API_URL";
pub const ENV_MODEL: &str = "DRAFTPILOT_MODEL";
pub const DEFAULT_CONFIG_FILE: &str = "draftpilot.toml";

pub const DEFAULT_API_URL: &str = "https://minatoz997-backend66.hf.space";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub target_words: usize,
    pub interval_secs: u64,
    pub language: Language,
    pub genre: Genre,
    pub mode: WritingMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1500,
            temperature: 0.7,
            target_words: 2000,
            interval_secs: 5,
            language: Language::English,
            genre: Genre::Fantasy,
            mode: WritingMode::Story,
        }
    }
}

impl Settings {
    /// Resolve settings from `path` (or `draftpilot.toml` in the current
    /// directory when no path is given), then apply environment
    /// overrides. A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, DraftError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Settings::default()
                }
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, DraftError> {
        let raw = std::fs::read_to_string(path).map_err(|e| DraftError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let settings = toml::from_str(&raw).map_err(|e| DraftError::Config {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!(path = %path.display(), "config file loaded");
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(model) = std::env::var(ENV_MODEL) {
            if !model.is_empty() {
                self.model = model;
            }
        }
    }
}
