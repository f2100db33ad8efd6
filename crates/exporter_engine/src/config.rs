use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use exporter_core::{StylePolicy, DEFAULT_INDENT_UNIT};
use serde::{Deserialize, Serialize};

use crate::profile::SourceProfile;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Exporter settings as read from a RON file. Omitted fields keep their
/// defaults, so an empty `()` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub style: StylePolicy,
    pub profile: SourceProfile,
    pub indent_unit: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            style: StylePolicy::default(),
            profile: SourceProfile::default(),
            indent_unit: DEFAULT_INDENT_UNIT.to_string(),
        }
    }
}

impl ExporterConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}
