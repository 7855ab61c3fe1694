//! Fragment loading
//!
//! One `job.toml` holds a `[job]` table of scalar settings and a `[config]`
//! table of named lists. Every key is optional; an empty file is a valid
//! fragment. The historical `schedular` spelling is accepted for both the
//! scheduler command and the directive list.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name probed at every directory level for configuration
pub const FRAGMENT_FILE_NAME: &str = "job.toml";

/// Errors for fragment loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read fragment {path}: {source}")]
    Unreadable {
        /// The offending fragment file
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse fragment {path}: {source}")]
    Malformed {
        /// The offending fragment file
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raw `[job]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobTable {
    #[serde(default, alias = "schedular")]
    pub scheduler: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
}

/// Raw `[config]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigTable {
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default, alias = "schedular")]
    pub directives: Vec<String>,
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub setup: Vec<String>,
    #[serde(default)]
    pub submit: Vec<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Parsed contents of one fragment file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FragmentData {
    #[serde(default)]
    pub job: JobTable,
    #[serde(default)]
    pub config: ConfigTable,
}

/// One loaded fragment plus its origin
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Absolute path of the fragment file
    pub path: PathBuf,
    /// Directory containing the fragment; the anchor for its relative paths
    pub dir: PathBuf,
    /// SHA-256 hex digest of the raw file bytes
    pub digest: String,
    /// Parsed tables
    pub data: FragmentData,
}

impl Fragment {
    /// Read and parse one fragment file, recording its digest.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let digest = hex::encode(Sha256::digest(&bytes));
        let text = String::from_utf8(bytes).map_err(|err| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })?;
        let data: FragmentData =
            toml::from_str(&text).map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        let dir = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("/"),
        };
        Ok(Self {
            path: path.to_path_buf(),
            dir,
            digest,
            data,
        })
    }

    /// Construct a fragment from already-parsed data, for merge tests and
    /// other in-memory callers. The digest is computed over `text`.
    pub fn from_parts(path: PathBuf, text: &str, data: FragmentData) -> Self {
        let digest = hex::encode(Sha256::digest(text.as_bytes()));
        let dir = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("/"),
        };
        Self {
            path,
            dir,
            digest,
            data,
        }
    }

    /// Anchor a file reference declared by this fragment: relative entries
    /// resolve against the fragment's own directory, absolute entries pass
    /// through unchanged.
    pub fn resolve_path(&self, entry: &str) -> PathBuf {
        let candidate = Path::new(entry);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.dir.join(candidate)
        }
    }
}
