//! Component configuration file handling
//!
//! Components read their copy text and matching behavior from a
//! `tesserae.toml` file. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```toml
//! [combobox]
//! placeholder = "Search authors..."
//! no_matches_text = "No matches"
//! match_keys = false
//!
//! [search_mode]
//! default = "semantic"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::search_mode::SearchMode;

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration for the component library
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CnConfig {
    #[serde(default)]
    pub combobox: ComboboxSettings,
    #[serde(default)]
    pub search_mode: SearchModeSettings,
}

/// Combobox copy and matching settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ComboboxSettings {
    /// Shown while the field has nothing to display
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Text of the non-interactive row shown when nothing matches
    #[serde(default = "default_no_matches_text")]
    pub no_matches_text: String,
    /// Also match the filter against option keys
    #[serde(default)]
    pub match_keys: bool,
}

fn default_no_matches_text() -> String {
    "No matches".to_string()
}

impl Default for ComboboxSettings {
    fn default() -> Self {
        Self {
            placeholder: None,
            no_matches_text: default_no_matches_text(),
            match_keys: false,
        }
    }
}

/// Search-mode toggle settings
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchModeSettings {
    #[serde(default)]
    pub default: SearchMode,
}

impl CnConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
