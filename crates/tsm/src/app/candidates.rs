//! Candidate assembly from live sessions, scanned repositories and bookmarks.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use crate::app::scan::{ScanConfig, Scanner};
use crate::domain::model::Candidate;
use crate::infra::config::Config;
use crate::infra::paths::expand_path;
use crate::infra::tmux::{CommandExecutor, Tmux};

/// Merge the three sources in order: sessions, repositories, bookmarks.
///
/// Duplicates are dropped keeping the first occurrence; sessions are unique by name and
/// directories by `(kind, name, path)`.
pub fn assemble(
    sessions: Vec<String>,
    repos: Vec<PathBuf>,
    bookmarks: Vec<PathBuf>,
) -> Vec<Candidate> {
    let all = sessions
        .into_iter()
        .map(Candidate::session)
        .chain(repos.into_iter().map(Candidate::repository))
        .chain(bookmarks.into_iter().map(Candidate::bookmark));

    let mut seen = HashSet::new();
    all.filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

/// Gathers every candidate the launcher can offer.
#[derive(Debug, Clone)]
pub struct Discovery<'a> {
    config: &'a Config,
    deadline: Option<Instant>,
}

impl<'a> Discovery<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            deadline: None,
        }
    }

    /// Bound the repository scan by `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn gather<E: CommandExecutor>(&self, tmux: &Tmux<E>) -> Result<Vec<Candidate>> {
        let sessions = tmux.list_sessions();

        let mut scanner = Scanner::new();
        if let Some(deadline) = self.deadline {
            scanner = scanner.with_deadline(deadline);
        }
        let repos = scanner.scan(&ScanConfig::from_config(self.config))?;

        let bookmarks = self
            .config
            .bookmarks
            .iter()
            .filter_map(|raw| {
                let expanded = expand_path(raw);
                if expanded.is_none() {
                    tracing::debug!(path = %raw, "skipping unresolvable bookmark");
                }
                expanded
            })
            .collect();

        let candidates = assemble(sessions, repos, bookmarks);
        tracing::info!(count = candidates.len(), "candidates assembled");
        Ok(candidates)
    }
}

/// Print one `<kind>\t<name>\t<path>` line per candidate.
pub fn write_listing<W: Write>(mut out: W, candidates: &[Candidate]) -> io::Result<()> {
    for candidate in candidates {
        let path = candidate
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{}\t{}\t{}",
            candidate.kind().tag(),
            candidate.name(),
            path
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::domain::model::CandidateKind;
    use crate::infra::tmux::CommandError;

    struct NoTmux;

    impl CommandExecutor for NoTmux {
        fn run(&self, program: &str, _args: &[&str]) -> Result<(), CommandError> {
            Err(CommandError::Failed {
                program: program.to_owned(),
                code: Some(1),
                stderr: String::new(),
            })
        }

        fn capture(&self, program: &str, _args: &[&str]) -> Result<Vec<u8>, CommandError> {
            Err(CommandError::Failed {
                program: program.to_owned(),
                code: Some(1),
                stderr: "no server running".into(),
            })
        }
    }

    #[test]
    fn assemble_keeps_sources_in_order_and_drops_duplicates() {
        let candidates = assemble(
            vec!["main".into(), "main".into()],
            vec!["/Code/a/app".into(), "/Code/a/app".into()],
            vec!["/Code/a/app".into(), "/home/me".into()],
        );

        let summary: Vec<_> = candidates
            .iter()
            .map(|c| (c.kind(), c.name().to_owned()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (CandidateKind::Session, "main".to_owned()),
                (CandidateKind::Repository, "a_app".to_owned()),
                (CandidateKind::Bookmark, "a_app".to_owned()),
                (CandidateKind::Bookmark, "home_me".to_owned()),
            ]
        );
    }

    #[test]
    fn listing_uses_tab_separated_fields() -> io::Result<()> {
        let candidates = vec![
            Candidate::session("main"),
            Candidate::repository("/Code/ivuorinen/a"),
            Candidate::bookmark("/home/me"),
        ];
        let mut out = Vec::new();
        write_listing(&mut out, &candidates)?;
        assert_eq!(
            String::from_utf8_lossy(&out),
            "S\tmain\t\nG\tivuorinen_a\t/Code/ivuorinen/a\nB\thome_me\t/home/me\n"
        );
        Ok(())
    }

    #[test]
    fn gather_combines_scan_and_bookmarks() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let code = temp.path().join("Code");
        fs::create_dir_all(code.join("team/app/.git"))?;
        let notes = temp.path().join("notes");
        fs::create_dir_all(&notes)?;

        let mut config = Config::default().with_max_depth(3);
        config.scan_paths = vec![code.display().to_string()];
        config.bookmarks = vec![notes.display().to_string()];

        let tmux = Tmux::new(NoTmux);
        let candidates = Discovery::new(&config)
            .with_deadline(Instant::now() + std::time::Duration::from_secs(10))
            .gather(&tmux)?;

        assert_eq!(
            candidates,
            vec![
                Candidate::repository(code.join("team/app")),
                Candidate::bookmark(notes),
            ]
        );
        Ok(())
    }
}
