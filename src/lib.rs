//! jobtree - tree-scoped job configuration and batch script synthesis
//!
//! Resolves hierarchical job configuration spread as `job.toml` fragments
//! along the directory path between a base directory and a working
//! directory, then synthesizes the shell artifacts (job.setup, the input
//! file, job.sh, job.submit) used to run the job on a batch scheduler.

pub mod config;
pub mod launch;
pub mod pipeline;
pub mod synth;
pub mod tree;

pub use config::{ConfigError, Fragment, JobSpec};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
