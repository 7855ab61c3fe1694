//! Process launcher
//!
//! Abstracts script execution and scheduler dispatch for testability:
//! - Launcher trait: one-shot command execution in a working directory
//! - ShellLauncher: real std::process::Command execution for production
//! - RecordingLauncher: call-recording double for pipeline tests
//!
//! The dispatched command's output streams straight to the user; nothing is
//! captured or parsed, only the exit status comes back.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Outcome of one launched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// The rendered command line, for messages
    pub command: String,
    /// Exit code, when the child exited normally
    pub code: Option<i32>,
    /// Whether the child reported success
    pub success: bool,
}

/// Launcher errors
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Cannot launch {command}: {source}")]
    Spawn {
        /// The command line that failed to start
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Launcher trait for executing generated scripts
pub trait Launcher {
    /// Run `program` with `args` in `cwd` and report its exit status.
    /// A non-zero exit is a normal outcome, not an error; only a failure to
    /// start the process is.
    fn launch(&self, program: &str, args: &[&str], cwd: &Path)
        -> Result<LaunchOutcome, LaunchError>;
}

fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Real launcher backed by std::process::Command, stdio inherited
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn launch(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> Result<LaunchOutcome, LaunchError> {
        let command = render_command(program, args);
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .map_err(|source| LaunchError::Spawn {
                command: command.clone(),
                source,
            })?;
        Ok(LaunchOutcome {
            command,
            code: status.code(),
            success: status.success(),
        })
    }
}

/// One recorded launch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// Call-recording launcher for tests.
///
/// Every call is stored and answered with the next queued exit code; calls
/// beyond the queue succeed with code 0. Clones share the call log and the
/// code queue, so a test can keep one handle while the pipeline owns
/// another.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    calls: Arc<Mutex<Vec<LaunchCall>>>,
    exit_codes: Arc<Mutex<VecDeque<i32>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an exit code for an upcoming call.
    pub fn push_exit_code(&self, code: i32) {
        self.exit_codes.lock().unwrap().push_back(code);
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<LaunchCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> Result<LaunchOutcome, LaunchError> {
        self.calls.lock().unwrap().push(LaunchCall {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            cwd: cwd.to_path_buf(),
        });
        let code = self.exit_codes.lock().unwrap().pop_front().unwrap_or(0);
        Ok(LaunchOutcome {
            command: render_command(program, args),
            code: Some(code),
            success: code == 0,
        })
    }
}
