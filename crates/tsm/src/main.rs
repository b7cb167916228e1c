use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use tsm::app::candidates::{Discovery, write_listing};
use tsm::app::selection::Outcome;
use tsm::domain::errors::DomainError;
use tsm::infra::config::{Config, default_config_path, write_default_config};
use tsm::infra::tmux::{SystemExecutor, Tmux, inside_tmux};
use tsm::ui::app::UiApp;

/// Upper bound for discovery and for each captured tmux query.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Parser)]
#[command(author, version, about = "Fuzzy-pick a tmux session, project or bookmark", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print candidates as `kind<TAB>name<TAB>path` and exit
    #[arg(long)]
    print: bool,
    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();
    tsm::init(cli.verbose);

    if cli.init_config {
        let path = default_config_path()
            .ok_or_else(|| anyhow!("unable to determine the config directory"))?;
        write_default_config(&path)?;
        println!("Wrote default config → {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref()).context("config error")?;
    let tmux = Tmux::new(SystemExecutor::new().with_timeout(DISCOVERY_TIMEOUT));
    let candidates = Discovery::new(&config)
        .with_deadline(started + DISCOVERY_TIMEOUT)
        .gather(&tmux)
        .context("failed to discover candidates")?;

    if cli.print {
        write_listing(io::stdout().lock(), &candidates).context("failed to print candidates")?;
        return Ok(());
    }

    if candidates.is_empty() {
        eprintln!("tsm: {}", DomainError::NoCandidates);
        return Ok(());
    }

    match UiApp::new().select(&candidates)? {
        Outcome::Cancelled => Ok(()),
        Outcome::Confirmed(candidate) => {
            tracing::info!(name = candidate.name(), kind = %candidate.kind(), "opening candidate");
            tmux.open(&candidate, inside_tmux())
                .with_context(|| format!("failed to open session {}", candidate.name()))
        }
    }
}
