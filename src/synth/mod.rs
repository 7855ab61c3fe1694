//! Artifact synthesis
//!
//! Renders the generated files (job.setup, the input file, job.sh,
//! job.submit) from a resolved spec. Every writer builds the complete
//! artifact in memory, reading any referenced files first, then writes it
//! with one truncating overwrite; a failed render leaves no partial
//! artifact behind. Rendering the same spec twice produces identical bytes.
//!
//! Inlined scripts keep their relative-path semantics through the
//! `JobNodeDir` convention: each referenced file is preceded by a `cd` to
//! its own directory, and `JobWorkDir` names the job directory for scripts
//! that need to come back.

use crate::config::{JobSpec, DEFAULT_INPUT_NAME};
use crate::tree::{self, PathError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the generated setup script
pub const SETUP_SCRIPT_NAME: &str = "job.setup";
/// Name of the generated batch script
pub const BATCH_SCRIPT_NAME: &str = "job.sh";
/// Name of the generated submit script
pub const SUBMIT_SCRIPT_NAME: &str = "job.submit";

const SHELL_HEADER: &str = "#!/bin/bash\n";

/// Errors for artifact synthesis
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("No target file configured for job.submit")]
    TargetNotConfigured,

    #[error("Target file does not exist: {0}")]
    MissingTarget(PathBuf),

    #[error("Cannot read {path}: {source}")]
    UnreadableSource {
        /// The referenced file that could not be read
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    WriteFailed {
        /// The artifact that could not be written
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Render and write job.setup: the working-directory assignment followed by
/// a cd-then-inline block for every setup script. Returns the written path.
pub fn write_setup_script(spec: &JobSpec) -> Result<PathBuf, SynthError> {
    let mut out = String::from(SHELL_HEADER);
    push_work_dir(&mut out, spec);
    for file in &spec.config.setup {
        push_node_block(&mut out, file)?;
    }
    write_artifact(spec.work_dir.join(SETUP_SCRIPT_NAME), &out)
}

/// Concatenate the input fragments found along the tree into the configured
/// input file, a newline after each fragment, in discovery order.
///
/// The output path itself is never treated as a fragment, so with the
/// default name the working directory's previous output is not folded back
/// in. Zero fragments still produce the (empty) file.
pub fn write_input_file(spec: &JobSpec) -> Result<PathBuf, SynthError> {
    let output = spec.input_file_path();
    let fragments = tree::find_files(&spec.base_dir, &spec.work_dir, DEFAULT_INPUT_NAME)?;
    let mut out = String::new();
    for fragment in fragments.iter().filter(|found| **found != output) {
        out.push_str(&read_file(fragment)?);
        out.push('\n');
    }
    write_artifact(output, &out)
}

/// Render and write job.sh: directive block, source lines, then commands,
/// each section in fixed order regardless of declaration order.
pub fn write_batch_script(spec: &JobSpec) -> Result<PathBuf, SynthError> {
    let mut out = String::from(SHELL_HEADER);
    for directive in &spec.config.directives {
        out.push_str(directive);
        out.push('\n');
    }
    out.push('\n');
    for file in &spec.config.source {
        out.push_str("source ");
        out.push_str(&file.display().to_string());
        out.push('\n');
    }
    out.push('\n');
    for command in &spec.config.commands {
        out.push_str(command);
        out.push('\n');
    }
    write_artifact(spec.work_dir.join(BATCH_SCRIPT_NAME), &out)
}

/// Render and write job.submit: the directive block, then the setup pattern
/// over the staging scripts and the mandatory target file.
///
/// Both target checks run before any rendering, so a missing or
/// unconfigured target writes nothing.
pub fn write_submit_script(spec: &JobSpec) -> Result<PathBuf, SynthError> {
    let target = spec
        .config
        .target
        .as_ref()
        .ok_or(SynthError::TargetNotConfigured)?;
    if !target.is_file() {
        return Err(SynthError::MissingTarget(target.clone()));
    }

    let mut out = String::from(SHELL_HEADER);
    out.push('\n');
    for directive in &spec.config.directives {
        out.push_str(directive);
        out.push('\n');
    }
    push_work_dir(&mut out, spec);
    for file in &spec.config.submit {
        push_node_block(&mut out, file)?;
    }
    push_node_block(&mut out, target)?;
    write_artifact(spec.work_dir.join(SUBMIT_SCRIPT_NAME), &out)
}

fn push_work_dir(out: &mut String, spec: &JobSpec) {
    out.push('\n');
    out.push_str("JobWorkDir=\"");
    out.push_str(&spec.work_dir.display().to_string());
    out.push_str("\"\n");
}

fn push_node_block(out: &mut String, file: &Path) -> Result<(), SynthError> {
    let contents = read_file(file)?;
    let dir = match file.parent() {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("/"),
    };
    out.push('\n');
    out.push_str("JobNodeDir=\"");
    out.push_str(&dir.display().to_string());
    out.push_str("\"\ncd $JobNodeDir\n\n");
    out.push_str(&contents);
    Ok(())
}

fn read_file(path: &Path) -> Result<String, SynthError> {
    fs::read_to_string(path).map_err(|source| SynthError::UnreadableSource {
        path: path.to_path_buf(),
        source,
    })
}

fn write_artifact(path: PathBuf, contents: &str) -> Result<PathBuf, SynthError> {
    fs::write(&path, contents).map_err(|source| SynthError::WriteFailed {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
