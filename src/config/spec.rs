//! Resolved job specification
//!
//! The value produced by the fragment merge: everything synthesis and
//! dispatch need to know about one job directory, with all file references
//! already absolute.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default name for the generated input file (and the fixed name probed for
/// input fragments at every directory level).
pub const DEFAULT_INPUT_NAME: &str = "job.input";

/// Scalar job settings, last writer wins across fragments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Scheduler submission command (e.g. `sbatch`); `bash` is used when unset
    pub scheduler: Option<String>,
    /// Output name for the concatenated input file
    pub input: Option<String>,
}

impl JobSettings {
    /// Name of the generated input file in the working directory.
    pub fn input_file_name(&self) -> &str {
        self.input.as_deref().unwrap_or(DEFAULT_INPUT_NAME)
    }
}

/// Accumulated configuration lists, in fragment-discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLists {
    /// Shell commands emitted at the end of job.sh
    pub commands: Vec<String>,
    /// Scheduler directive lines, opaque text, never path-resolved
    pub directives: Vec<String>,
    /// Files sourced by job.sh
    pub source: Vec<PathBuf>,
    /// Helper scripts, resolved and carried for reference from commands
    pub scripts: Vec<PathBuf>,
    /// Scripts inlined into job.setup
    pub setup: Vec<PathBuf>,
    /// Staging scripts inlined into job.submit
    pub submit: Vec<PathBuf>,
    /// Mandatory payload of job.submit
    pub target: Option<PathBuf>,
}

/// Provenance record for one contributing fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentOrigin {
    /// Absolute path of the fragment file
    pub path: PathBuf,
    /// SHA-256 hex digest of the fragment's raw bytes
    pub digest: String,
}

/// The merge result for one working directory.
///
/// All path lists hold absolute paths, anchored at the fragment that
/// declared them. Merging the same fragment sequence twice yields equal
/// values, so the type carries no timestamps or other per-run state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Top of the configuration tree
    pub base_dir: PathBuf,
    /// The job directory artifacts are written into
    pub work_dir: PathBuf,
    /// Scalar settings
    pub job: JobSettings,
    /// Accumulated lists
    pub config: ConfigLists,
    /// Contributing fragments in discovery order
    pub fragments: Vec<FragmentOrigin>,
}

impl JobSpec {
    /// An empty spec for the given directories; the fold's starting point.
    pub fn new(base_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            base_dir,
            work_dir,
            job: JobSettings::default(),
            config: ConfigLists::default(),
            fragments: Vec::new(),
        }
    }

    /// Absolute path the concatenated input file is written to.
    pub fn input_file_path(&self) -> PathBuf {
        self.work_dir.join(self.job.input_file_name())
    }

    /// Whether dispatch goes through job.submit (a configured target or
    /// staging scripts) rather than job.sh.
    pub fn uses_submit_pattern(&self) -> bool {
        self.config.target.is_some() || !self.config.submit.is_empty()
    }
}
