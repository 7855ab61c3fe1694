//! jobtree CLI
//!
//! Entry point for the `jobtree` command-line tool.

use clap::{Parser, Subcommand};
use jobtree::{JobSpec, Pipeline, PipelineConfig};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "jobtree")]
#[command(about = "Tree-scoped job configuration and batch script synthesis", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate job.setup and run it in each working directory
    Setup {
        /// Working directories to set up
        #[arg(default_value = ".")]
        workdirs: Vec<PathBuf>,

        /// Base directory bounding the configuration tree (default: current directory)
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,

        /// Verbose progress on stderr
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Generate the input file and dispatch script, then hand it to the scheduler
    Submit {
        /// Working directories to submit
        #[arg(default_value = ".")]
        workdirs: Vec<PathBuf>,

        /// Base directory bounding the configuration tree (default: current directory)
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,

        /// Verbose progress on stderr
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Remove generated artifacts from each working directory
    Clean {
        /// Working directories to clean
        #[arg(default_value = ".")]
        workdirs: Vec<PathBuf>,

        /// Base directory bounding the configuration tree (default: current directory)
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,

        /// Verbose progress on stderr
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Print the resolved configuration without writing anything
    Inspect {
        /// Working directory to inspect
        #[arg(default_value = ".")]
        workdir: PathBuf,

        /// Base directory bounding the configuration tree (default: current directory)
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Setup {
            workdirs,
            base_dir,
            verbose,
        } => {
            run_setup(workdirs, base_dir, verbose);
        }
        Commands::Submit {
            workdirs,
            base_dir,
            verbose,
        } => {
            run_submit(workdirs, base_dir, verbose);
        }
        Commands::Clean {
            workdirs,
            base_dir,
            verbose,
        } => {
            run_clean(workdirs, base_dir, verbose);
        }
        Commands::Inspect {
            workdir,
            base_dir,
            json,
        } => {
            run_inspect(workdir, base_dir, json);
        }
    }
}

fn make_pipeline(base_dir: Option<PathBuf>, verbose: bool) -> Pipeline {
    let mut config = PipelineConfig::default();
    if let Some(base_dir) = base_dir {
        config.base_dir = base_dir;
    }
    config.verbose = verbose;
    Pipeline::new(config)
}

fn run_setup(workdirs: Vec<PathBuf>, base_dir: Option<PathBuf>, verbose: bool) {
    let pipeline = make_pipeline(base_dir, verbose);
    for workdir in &workdirs {
        if let Err(e) = pipeline.setup(workdir) {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_submit(workdirs: Vec<PathBuf>, base_dir: Option<PathBuf>, verbose: bool) {
    let pipeline = make_pipeline(base_dir, verbose);
    for workdir in &workdirs {
        if let Err(e) = pipeline.submit(workdir) {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_clean(workdirs: Vec<PathBuf>, base_dir: Option<PathBuf>, verbose: bool) {
    let pipeline = make_pipeline(base_dir, verbose);
    for workdir in &workdirs {
        match pipeline.clean(workdir) {
            Ok(removed) => {
                for path in removed {
                    println!("Removed: {}", path.display());
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(e.exit_code());
            }
        }
    }
}

fn run_inspect(workdir: PathBuf, base_dir: Option<PathBuf>, json: bool) {
    let pipeline = make_pipeline(base_dir, false);
    let spec = match pipeline.inspect(&workdir) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    if json {
        match serde_json::to_string_pretty(&spec) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_spec(&spec);
    }
}

fn print_spec(spec: &JobSpec) {
    println!("Job configuration for {}", spec.work_dir.display());
    println!();
    println!("  Base directory: {}", spec.base_dir.display());
    match spec.job.scheduler {
        Some(ref scheduler) => println!("  Scheduler: {}", scheduler),
        None => println!("  Scheduler: none (runs locally under bash)"),
    }
    println!("  Input file: {}", spec.input_file_path().display());
    let dispatch = if spec.uses_submit_pattern() {
        "job.submit"
    } else {
        "job.sh"
    };
    println!("  Dispatch script: {}", dispatch);

    if !spec.config.directives.is_empty() {
        println!("  Directives:");
        for directive in &spec.config.directives {
            println!("    {}", directive);
        }
    }
    if !spec.config.source.is_empty() {
        println!("  Source files:");
        for path in &spec.config.source {
            println!("    {}", path.display());
        }
    }
    if !spec.config.scripts.is_empty() {
        println!("  Scripts:");
        for path in &spec.config.scripts {
            println!("    {}", path.display());
        }
    }
    if !spec.config.setup.is_empty() {
        println!("  Setup files:");
        for path in &spec.config.setup {
            println!("    {}", path.display());
        }
    }
    if !spec.config.submit.is_empty() {
        println!("  Submit files:");
        for path in &spec.config.submit {
            println!("    {}", path.display());
        }
    }
    if let Some(ref target) = spec.config.target {
        println!("  Target: {}", target.display());
    }
    if !spec.config.commands.is_empty() {
        println!("  Commands:");
        for command in &spec.config.commands {
            println!("    {}", command);
        }
    }

    println!();
    if spec.fragments.is_empty() {
        println!("  No fragments found.");
    } else {
        println!("  Fragments ({} total):", spec.fragments.len());
        for origin in &spec.fragments {
            println!("    {}", origin.path.display());
            println!("      sha256: {}", origin.digest);
        }
    }
}
