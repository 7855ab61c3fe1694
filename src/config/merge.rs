//! Ordered fragment merge
//!
//! Folds fragments in discovery order (base directory first, working
//! directory last) into one resolved [`JobSpec`]. `[job]` scalars follow
//! last-writer-wins, so deeper directories override their ancestors;
//! `[config]` lists append. File references are anchored at the declaring
//! fragment's directory before accumulation, so a later fragment never
//! re-anchors an earlier one.

use crate::config::fragment::{ConfigError, Fragment};
use crate::config::spec::{FragmentOrigin, JobSpec};
use std::path::{Path, PathBuf};

/// Load every fragment, then fold them into a resolved spec.
///
/// Loading is all-or-nothing: the first read or parse failure aborts the
/// merge, so a partially merged spec is never observable.
pub fn merge(
    base_dir: &Path,
    work_dir: &Path,
    fragment_paths: &[PathBuf],
) -> Result<JobSpec, ConfigError> {
    let mut fragments = Vec::with_capacity(fragment_paths.len());
    for path in fragment_paths {
        fragments.push(Fragment::load(path)?);
    }
    Ok(merge_fragments(base_dir, work_dir, &fragments))
}

/// Fold pre-loaded fragments, in the order given, into a resolved spec.
///
/// Starts from an empty accumulator every time, so repeated folds of the
/// same sequence yield equal specs.
pub fn merge_fragments(base_dir: &Path, work_dir: &Path, fragments: &[Fragment]) -> JobSpec {
    let mut spec = JobSpec::new(base_dir.to_path_buf(), work_dir.to_path_buf());
    for fragment in fragments {
        apply(&mut spec, fragment);
    }
    spec
}

fn apply(spec: &mut JobSpec, fragment: &Fragment) {
    let job = &fragment.data.job;
    if let Some(scheduler) = &job.scheduler {
        spec.job.scheduler = Some(scheduler.clone());
    }
    if let Some(input) = &job.input {
        spec.job.input = Some(input.clone());
    }

    let config = &fragment.data.config;
    spec.config.commands.extend(config.commands.iter().cloned());
    spec.config
        .directives
        .extend(config.directives.iter().cloned());
    for entry in &config.source {
        spec.config.source.push(fragment.resolve_path(entry));
    }
    for entry in &config.scripts {
        spec.config.scripts.push(fragment.resolve_path(entry));
    }
    for entry in &config.setup {
        spec.config.setup.push(fragment.resolve_path(entry));
    }
    for entry in &config.submit {
        spec.config.submit.push(fragment.resolve_path(entry));
    }
    if let Some(target) = &config.target {
        spec.config.target = Some(fragment.resolve_path(target));
    }

    spec.fragments.push(FragmentOrigin {
        path: fragment.path.clone(),
        digest: fragment.digest.clone(),
    });
}
