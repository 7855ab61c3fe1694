//! Artifact synthesis integration tests
//!
//! Resolves real trees and checks the generated files byte for byte:
//! job.setup and job.submit node blocks, job.sh section order, input
//! concatenation, and reproducible regeneration.

use jobtree::config::{self, FRAGMENT_FILE_NAME};
use jobtree::synth;
use jobtree::tree;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn two_level_tree() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let base = temp.path().canonicalize().unwrap();
    let work = base.join("run");
    fs::create_dir_all(&work).unwrap();
    (temp, base, work)
}

fn write_fragment(dir: &Path, content: &str) {
    fs::write(dir.join(FRAGMENT_FILE_NAME), content).unwrap();
}

fn resolve(base: &Path, work: &Path) -> jobtree::JobSpec {
    let paths = tree::find_files(base, work, FRAGMENT_FILE_NAME).unwrap();
    config::merge(base, work, &paths).unwrap()
}

// =============================================================================
// Artifact Content
// =============================================================================

#[test]
fn test_setup_script_inlines_files_in_discovery_order() {
    let (_temp, base, work) = two_level_tree();
    write_fragment(&base, "[config]\nsetup = [\"install.sh\"]\n");
    write_fragment(&work, "[config]\nsetup = [\"prep.sh\"]\n");
    fs::write(base.join("install.sh"), "make install\n").unwrap();
    fs::write(work.join("prep.sh"), "ln -s ../data .\n").unwrap();

    let spec = resolve(&base, &work);
    let path = synth::write_setup_script(&spec).unwrap();

    let expected = format!(
        "#!/bin/bash\n\
         \n\
         JobWorkDir=\"{work}\"\n\
         \n\
         JobNodeDir=\"{base}\"\ncd $JobNodeDir\n\n\
         make install\n\
         \n\
         JobNodeDir=\"{work}\"\ncd $JobNodeDir\n\n\
         ln -s ../data .\n",
        base = base.display(),
        work = work.display(),
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn test_batch_script_sections_from_resolved_tree() {
    let (_temp, base, work) = two_level_tree();
    write_fragment(
        &base,
        r##"
[config]
directives = ["#SBATCH -p shared"]
source = ["site_env.sh"]
"##,
    );
    write_fragment(
        &work,
        r##"
[config]
directives = ["#SBATCH -N 4"]
commands = ["./sim run.par", "echo done"]
"##,
    );

    let spec = resolve(&base, &work);
    let path = synth::write_batch_script(&spec).unwrap();

    let expected = format!(
        "#!/bin/bash\n\
         #SBATCH -p shared\n\
         #SBATCH -N 4\n\
         \n\
         source {}\n\
         \n\
         ./sim run.par\n\
         echo done\n",
        base.join("site_env.sh").display(),
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn test_batch_script_does_not_read_sourced_files() {
    // Sourced files are referenced by path only; they may not exist yet at
    // synthesis time.
    let (_temp, base, work) = two_level_tree();
    write_fragment(&base, "[config]\nsource = [\"not_yet_written.sh\"]\n");

    let spec = resolve(&base, &work);
    let path = synth::write_batch_script(&spec).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("source "));
    assert!(content.contains("not_yet_written.sh"));
}

#[test]
fn test_input_concatenates_along_tree() {
    let (_temp, base, work) = two_level_tree();
    fs::write(base.join("job.input"), "rho = 1.0\n").unwrap();
    write_fragment(&work, "[job]\ninput = \"run.par\"\n");
    fs::write(work.join("job.input"), "nsteps = 100\n").unwrap();

    let spec = resolve(&base, &work);
    let path = synth::write_input_file(&spec).unwrap();
    assert_eq!(path, work.join("run.par"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "rho = 1.0\n\nnsteps = 100\n\n"
    );
}

#[test]
fn test_submit_script_full_layout() {
    let (_temp, base, work) = two_level_tree();
    write_fragment(
        &base,
        "[job]\nscheduler = \"sbatch\"\n[config]\ndirectives = [\"#SBATCH -N 1\"]\n",
    );
    write_fragment(
        &work,
        "[config]\nsubmit = [\"stage.sh\"]\ntarget = \"sim.exe\"\n",
    );
    fs::write(work.join("stage.sh"), "cp -r $JobWorkDir/data .\n").unwrap();
    fs::write(work.join("sim.exe"), "#!/bin/sh\nexec ./real_sim\n").unwrap();

    let spec = resolve(&base, &work);
    let path = synth::write_submit_script(&spec).unwrap();

    let expected = format!(
        "#!/bin/bash\n\
         \n\
         #SBATCH -N 1\n\
         \n\
         JobWorkDir=\"{work}\"\n\
         \n\
         JobNodeDir=\"{work}\"\ncd $JobNodeDir\n\n\
         cp -r $JobWorkDir/data .\n\
         \n\
         JobNodeDir=\"{work}\"\ncd $JobNodeDir\n\n\
         #!/bin/sh\nexec ./real_sim\n",
        work = work.display(),
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn test_missing_target_leaves_no_artifact() {
    let (_temp, base, work) = two_level_tree();
    write_fragment(&base, "[config]\ntarget = \"sim.exe\"\n");
    // base/sim.exe never written.

    let spec = resolve(&base, &work);
    let err = synth::write_submit_script(&spec).unwrap_err();
    assert!(matches!(err, synth::SynthError::MissingTarget(_)));
    assert!(!work.join("job.submit").exists());
}

// =============================================================================
// Reproducibility
// =============================================================================

#[test]
fn test_full_regeneration_is_byte_identical() {
    let (_temp, base, work) = two_level_tree();
    write_fragment(
        &base,
        r##"
[job]
scheduler = "sbatch"

[config]
directives = ["#SBATCH -p shared"]
source = ["env.sh"]
setup = ["install.sh"]
commands = ["./sim"]
"##,
    );
    fs::write(base.join("install.sh"), "make install\n").unwrap();
    fs::write(base.join("job.input"), "rho = 1.0\n").unwrap();

    let spec = resolve(&base, &work);
    let setup = synth::write_setup_script(&spec).unwrap();
    let input = synth::write_input_file(&spec).unwrap();
    let batch = synth::write_batch_script(&spec).unwrap();
    let snapshot = (
        fs::read(&setup).unwrap(),
        fs::read(&input).unwrap(),
        fs::read(&batch).unwrap(),
    );

    // Resolve and synthesize again from scratch.
    let spec = resolve(&base, &work);
    synth::write_setup_script(&spec).unwrap();
    synth::write_input_file(&spec).unwrap();
    synth::write_batch_script(&spec).unwrap();

    assert_eq!(fs::read(&setup).unwrap(), snapshot.0);
    assert_eq!(fs::read(&input).unwrap(), snapshot.1);
    assert_eq!(fs::read(&batch).unwrap(), snapshot.2);
}

#[test]
fn test_artifacts_are_overwritten_not_appended() {
    let (_temp, base, work) = two_level_tree();
    write_fragment(&base, "[config]\ncommands = [\"ls\"]\n");

    let spec = resolve(&base, &work);
    fs::write(work.join("job.sh"), "stale content that must disappear\n").unwrap();
    let path = synth::write_batch_script(&spec).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("stale"));
    assert!(content.ends_with("ls\n"));
}
