use std::collections::BTreeSet;
use std::fs;

use anyhow::Result;
use parking_lot::Mutex;
use tempfile::TempDir;

use tsm::app::candidates::Discovery;
use tsm::app::selection::{Key, Outcome, ScriptedKeys, Selector};
use tsm::domain::model::{Candidate, CandidateKind};
use tsm::infra::config::{Config, default_exclude_dirs};
use tsm::infra::tmux::{CommandError, CommandExecutor, Tmux};

/// In-memory tmux server recording each invocation.
struct FakeTmux {
    sessions: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTmux {
    fn with_sessions(names: &[&str]) -> Self {
        Self {
            sessions: Mutex::new(names.iter().map(|name| name.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl CommandExecutor for FakeTmux {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        self.calls.lock().push(format!("{program} {}", args[0]));
        Ok(())
    }

    fn capture(&self, program: &str, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        self.calls.lock().push(format!("{program} {}", args[0]));
        let mut sessions = self.sessions.lock();
        match args {
            ["list-sessions", ..] => {
                let listing: String = sessions.iter().map(|name| format!("{name}\n")).collect();
                Ok(listing.into_bytes())
            }
            ["has-session", "-t", name] if sessions.contains(*name) => Ok(Vec::new()),
            ["new-session", "-ds", name, "-c", _] => {
                sessions.insert((*name).to_string());
                Ok(Vec::new())
            }
            _ => Err(CommandError::Failed {
                program: program.to_string(),
                code: Some(1),
                stderr: String::new(),
            }),
        }
    }
}

fn workspace() -> Result<(TempDir, Config)> {
    let dir = TempDir::new()?;
    for rel in ["ivuorinen/a", "test/a", "vendor/lib"] {
        fs::create_dir_all(dir.path().join(rel).join(".git"))?;
    }
    let mut config = Config::default().with_max_depth(3);
    config.scan_paths = vec![dir.path().display().to_string()];
    config.exclude_dirs = default_exclude_dirs();
    Ok((dir, config))
}

#[test]
fn discover_select_and_open_repository() -> Result<()> {
    let (dir, config) = workspace()?;
    let fake = FakeTmux::with_sessions(&["main"]);
    let tmux = Tmux::new(&fake);

    let candidates = Discovery::new(&config).gather(&tmux)?;
    let kinds: Vec<_> = candidates.iter().map(Candidate::kind).collect();
    assert_eq!(
        kinds,
        vec![
            CandidateKind::Session,
            CandidateKind::Repository,
            CandidateKind::Repository
        ]
    );
    assert_eq!(fake.take_calls(), vec!["tmux list-sessions"]);

    let mut keys = ScriptedKeys::typing("ivuorinen").then(Key::Confirm);
    let outcome = Selector::new(&candidates).run(&mut keys, |_, _| Ok(()))?;
    let Outcome::Confirmed(chosen) = outcome else {
        panic!("expected a confirmed candidate");
    };
    assert_eq!(chosen.name(), "ivuorinen_a");
    assert_eq!(chosen.path(), Some(dir.path().join("ivuorinen/a").as_path()));

    tmux.open(&chosen, false)?;
    assert_eq!(
        fake.take_calls(),
        vec!["tmux has-session", "tmux new-session", "tmux attach"]
    );

    tmux.open(&chosen, true)?;
    assert_eq!(
        fake.take_calls(),
        vec!["tmux has-session", "tmux switch-client"]
    );
    Ok(())
}

#[test]
fn existing_session_is_switched_to_directly() -> Result<()> {
    let (_dir, config) = workspace()?;
    let fake = FakeTmux::with_sessions(&["build", "main"]);
    let tmux = Tmux::new(&fake);
    let candidates = Discovery::new(&config).gather(&tmux)?;
    fake.take_calls();

    let mut keys = ScriptedKeys::typing("build").then(Key::Confirm);
    let outcome = Selector::new(&candidates).run(&mut keys, |_, _| Ok(()))?;
    assert_eq!(outcome, Outcome::Confirmed(Candidate::session("build")));

    if let Outcome::Confirmed(chosen) = outcome {
        tmux.open(&chosen, true)?;
    }
    assert_eq!(fake.take_calls(), vec!["tmux switch-client"]);
    Ok(())
}

#[test]
fn cancelling_issues_no_tmux_commands() -> Result<()> {
    let (_dir, config) = workspace()?;
    let fake = FakeTmux::with_sessions(&[]);
    let tmux = Tmux::new(&fake);
    let candidates = Discovery::new(&config).gather(&tmux)?;
    fake.take_calls();

    let mut keys = ScriptedKeys::typing("test").then(Key::Down).then(Key::Cancel);
    let outcome = Selector::new(&candidates).run(&mut keys, |_, _| Ok(()))?;
    assert_eq!(outcome, Outcome::Cancelled);
    assert!(fake.take_calls().is_empty());
    Ok(())
}
