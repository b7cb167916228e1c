use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

/// Repositories created by `sample-tree`; the excluded and too-deep ones must not show up.
const SAMPLE_REPOS: &[&str] = &[
    "ivuorinen/a",
    "test/a",
    "teamA/app",
    "teamB/app",
    "web/node_modules/left-pad",
    "deep/one/two/three/repo",
];

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest for the launcher crate
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
        /// Package to test
        #[arg(long, default_value = "tsm")]
        package: String,
    },
    /// Create a throwaway directory of git repositories plus a config pointing at it
    SampleTree {
        /// Target directory (created if missing)
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest {
            profile,
            release,
            package,
        } => run_nextest(profile, release, &package)?,
        Commands::SampleTree { dir } => sample_tree(&dir)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool, package: &str) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run").arg("-p").arg(package);
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn sample_tree(dir: &Path) -> Result<()> {
    let code = dir.join("Code");
    for repo in SAMPLE_REPOS {
        let marker = code.join(repo).join(".git");
        fs::create_dir_all(&marker)
            .with_context(|| format!("failed to create {}", marker.display()))?;
    }

    let config = dir.join("config.yaml");
    fs::write(
        &config,
        format!(
            "scan_paths:\n  - {}\nbookmarks:\n  - {}\nmax_depth: 3\n",
            code.display(),
            dir.display()
        ),
    )
    .with_context(|| format!("failed to write {}", config.display()))?;

    for entry in WalkDir::new(&code).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() && entry.file_name() == ".git" {
            println!("repo  {}", entry.path().parent().unwrap_or(&code).display());
        }
    }
    println!("try: cargo run -p tsm -- --config {} --print", config.display());
    Ok(())
}
