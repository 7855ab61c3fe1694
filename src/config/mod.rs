//! Hierarchical job configuration
//!
//! Fragments (`job.toml`) found along the base-to-working-directory path are
//! loaded and folded, top-down, into a single resolved [`JobSpec`]:
//! 1. `[job]` scalars: last writer wins (deeper overrides shallower)
//! 2. `[config]` lists: appended in discovery order
//! 3. File references: anchored at the declaring fragment's directory

mod fragment;
mod merge;
mod spec;

pub use fragment::{ConfigError, ConfigTable, Fragment, FragmentData, JobTable, FRAGMENT_FILE_NAME};
pub use merge::{merge, merge_fragments};
pub use spec::{ConfigLists, FragmentOrigin, JobSettings, JobSpec, DEFAULT_INPUT_NAME};
