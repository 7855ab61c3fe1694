//! Pipeline orchestration
//!
//! Command-level flows over the engine modules:
//! - setup: resolve, synthesize job.setup, run it with bash
//! - submit: resolve, synthesize the input file and the dispatch script,
//!   hand the script to the scheduler (bash when none is configured)
//! - clean: remove the generated artifacts
//! - inspect: resolve only, for dry-run visibility
//!
//! Every operation re-walks the tree and re-reads every fragment; nothing
//! is cached between invocations. Artifact writes are whole-file
//! overwrites, so concurrent invocations against the same working
//! directory race destructively and are not supported.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{self, ConfigError, JobSpec, FRAGMENT_FILE_NAME};
use crate::launch::{LaunchError, Launcher, ShellLauncher};
use crate::synth::{self, SynthError, BATCH_SCRIPT_NAME, SETUP_SCRIPT_NAME, SUBMIT_SCRIPT_NAME};
use crate::tree::{self, PathError};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("synthesis error: {0}")]
    Synth(#[from] SynthError),

    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Command failed: {command} (exit code {code})")]
    ScriptFailed {
        /// The dispatched command line
        command: String,
        /// The child's exit code
        code: i32,
    },

    #[error("Command terminated by signal: {command}")]
    ScriptKilled {
        /// The dispatched command line
        command: String,
    },
}

impl PipelineError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Path(_) => 10,
            PipelineError::Config(_) => 20,
            PipelineError::Synth(err) => match err {
                SynthError::TargetNotConfigured | SynthError::MissingTarget(_) => 30,
                SynthError::UnreadableSource { .. } | SynthError::WriteFailed { .. } => 40,
                SynthError::Path(_) => 10,
            },
            PipelineError::Io(_) => 40,
            PipelineError::Launch(_) => 50,
            PipelineError::ScriptFailed { code, .. } if *code > 0 => *code,
            PipelineError::ScriptFailed { .. } => 60,
            PipelineError::ScriptKilled { .. } => 60,
            PipelineError::Serialization(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Top of the configuration tree
    pub base_dir: PathBuf,

    /// Verbose progress on stderr
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            verbose: false,
        }
    }
}

/// Pipeline execution context
pub struct Pipeline {
    config: PipelineConfig,
    launcher: Box<dyn Launcher>,
}

impl Pipeline {
    /// Create a pipeline that executes for real
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            launcher: Box::new(ShellLauncher),
        }
    }

    /// Create a pipeline with an injected launcher, for tests
    pub fn with_launcher(config: PipelineConfig, launcher: Box<dyn Launcher>) -> Self {
        Self { config, launcher }
    }

    /// Resolve the configuration for one working directory and run its
    /// setup script.
    pub fn setup(&self, work_dir: &Path) -> PipelineResult<()> {
        let spec = self.resolve(work_dir)?;
        let script = synth::write_setup_script(&spec)?;
        if self.config.verbose {
            eprintln!("Wrote {}", script.display());
        }
        self.dispatch("bash", SETUP_SCRIPT_NAME, &spec)
    }

    /// Synthesize the input file and the dispatch script, then hand the
    /// script to the scheduler.
    ///
    /// A configured target or staging scripts select job.submit; otherwise
    /// job.sh is dispatched. Without a scheduler the script runs locally
    /// under bash.
    pub fn submit(&self, work_dir: &Path) -> PipelineResult<()> {
        let spec = self.resolve(work_dir)?;
        let input = synth::write_input_file(&spec)?;
        if self.config.verbose {
            eprintln!("Wrote {}", input.display());
        }

        let script_name = if spec.uses_submit_pattern() {
            let script = synth::write_submit_script(&spec)?;
            if self.config.verbose {
                eprintln!("Wrote {}", script.display());
            }
            SUBMIT_SCRIPT_NAME
        } else {
            let script = synth::write_batch_script(&spec)?;
            if self.config.verbose {
                eprintln!("Wrote {}", script.display());
            }
            BATCH_SCRIPT_NAME
        };

        let program = spec
            .job
            .scheduler
            .clone()
            .unwrap_or_else(|| "bash".to_string());
        self.dispatch(&program, script_name, &spec)
    }

    /// Remove the generated artifacts for one working directory, returning
    /// the paths that were removed.
    pub fn clean(&self, work_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        let spec = self.resolve(work_dir)?;
        let candidates = [
            spec.work_dir.join(SETUP_SCRIPT_NAME),
            spec.input_file_path(),
            spec.work_dir.join(BATCH_SCRIPT_NAME),
            spec.work_dir.join(SUBMIT_SCRIPT_NAME),
        ];
        let mut removed = Vec::new();
        for artifact in candidates {
            if artifact.is_file() {
                fs::remove_file(&artifact)?;
                if self.config.verbose {
                    eprintln!("Removed {}", artifact.display());
                }
                removed.push(artifact);
            }
        }
        Ok(removed)
    }

    /// Resolve and return the spec without writing or executing anything.
    pub fn inspect(&self, work_dir: &Path) -> PipelineResult<JobSpec> {
        self.resolve(work_dir)
    }

    fn resolve(&self, work_dir: &Path) -> PipelineResult<JobSpec> {
        let base_dir = tree::canonicalize_dir(&self.config.base_dir)?;
        let work_dir = tree::canonicalize_dir(work_dir)?;
        let fragment_paths = tree::find_files(&base_dir, &work_dir, FRAGMENT_FILE_NAME)?;
        if self.config.verbose {
            eprintln!(
                "Discovered {} fragment(s) between {} and {}",
                fragment_paths.len(),
                base_dir.display(),
                work_dir.display()
            );
        }
        let spec = config::merge(&base_dir, &work_dir, &fragment_paths)?;
        Ok(spec)
    }

    fn dispatch(&self, program: &str, script_name: &str, spec: &JobSpec) -> PipelineResult<()> {
        if self.config.verbose {
            eprintln!("Dispatching: {} {}", program, script_name);
        }
        let outcome = self
            .launcher
            .launch(program, &[script_name], &spec.work_dir)?;
        if outcome.success {
            Ok(())
        } else {
            match outcome.code {
                Some(code) => Err(PipelineError::ScriptFailed {
                    command: outcome.command,
                    code,
                }),
                None => Err(PipelineError::ScriptKilled {
                    command: outcome.command,
                }),
            }
        }
    }
}
