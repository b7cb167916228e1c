//! Domain models for launcher candidates.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::naming::derive_name;

/// Origin of a candidate, rendered as a one-letter tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CandidateKind {
    Session,
    Repository,
    Bookmark,
}

impl CandidateKind {
    pub fn tag(self) -> &'static str {
        match self {
            CandidateKind::Session => "S",
            CandidateKind::Repository => "G",
            CandidateKind::Bookmark => "B",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One selectable entry in the launcher list.
///
/// Equality and hashing cover the variant, the name and (when present) the path, so a
/// `HashSet<Candidate>` keeps sessions unique by name and directories unique by
/// `(kind, name, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Candidate {
    Session { name: String },
    Repository { name: String, path: PathBuf },
    Bookmark { name: String, path: PathBuf },
}

impl Candidate {
    pub fn session(name: impl Into<String>) -> Self {
        Candidate::Session { name: name.into() }
    }

    /// Repository candidate named after its directory.
    pub fn repository(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Candidate::Repository {
            name: derive_name(&path),
            path,
        }
    }

    /// Bookmark candidate named after its directory.
    pub fn bookmark(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Candidate::Bookmark {
            name: derive_name(&path),
            path,
        }
    }

    pub fn kind(&self) -> CandidateKind {
        match self {
            Candidate::Session { .. } => CandidateKind::Session,
            Candidate::Repository { .. } => CandidateKind::Repository,
            Candidate::Bookmark { .. } => CandidateKind::Bookmark,
        }
    }

    /// Session identifier used for display and for addressing tmux.
    pub fn name(&self) -> &str {
        match self {
            Candidate::Session { name }
            | Candidate::Repository { name, .. }
            | Candidate::Bookmark { name, .. } => name,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Candidate::Session { .. } => None,
            Candidate::Repository { path, .. } | Candidate::Bookmark { path, .. } => Some(path),
        }
    }

    /// Text matched by the fuzzy ranker: the name, followed by the path when there is one.
    pub fn search_text(&self) -> Cow<'_, str> {
        match self.path() {
            None => Cow::Borrowed(self.name()),
            Some(path) => Cow::Owned(format!("{} {}", self.name(), path.display())),
        }
    }
}

/// A candidate scored against one specific query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCandidate<'a> {
    pub candidate: &'a Candidate,
    pub score: u32,
}
