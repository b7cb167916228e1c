//! Concurrent discovery of git repositories under the configured roots.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::infra::config::Config;
use crate::infra::paths::expand_path;

/// Directory marking the root of a repository.
pub const REPO_MARKER: &str = ".git";
const CHANNEL_CAPACITY: usize = 256;

/// Inputs for a single scan.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Absolute roots, each walked by its own worker.
    pub roots: Vec<PathBuf>,
    /// Base names (or glob patterns over base names) whose subtrees are pruned.
    pub exclude: Vec<String>,
    /// Deepest directory visited below a root (root = 0); `0` disables the limit.
    pub max_depth: usize,
}

impl ScanConfig {
    /// Expand the configured roots, skipping those that cannot be resolved.
    pub fn from_config(config: &Config) -> Self {
        let roots = config
            .scan_paths
            .iter()
            .filter_map(|raw| {
                let expanded = expand_path(raw);
                if expanded.is_none() {
                    tracing::debug!(path = %raw, "skipping unresolvable scan root");
                }
                expanded
            })
            .collect();

        Self {
            roots,
            exclude: config.exclude_dirs.clone(),
            max_depth: config.max_depth(),
        }
    }
}

/// Walks every root on its own thread and funnels discoveries into one collector.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    deadline: Option<Instant>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop collecting at `deadline` and return whatever was found so far.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Discover repositories, returning deduplicated paths in lexicographic order.
    pub fn scan(&self, cfg: &ScanConfig) -> Result<Vec<PathBuf>> {
        let excluded = Arc::new(build_exclusions(&cfg.exclude)?);
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);

        for (idx, root) in cfg.roots.iter().enumerate() {
            let worker = RootWalker {
                root: root.clone(),
                max_depth: cfg.max_depth,
                excluded: Arc::clone(&excluded),
                stop: Arc::clone(&stop),
            };
            let tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("tsm-scan-{idx}"))
                .spawn(move || worker.walk(&tx));
            if let Err(err) = spawned {
                tracing::warn!(root = %root.display(), error = %err, "failed to start scan worker");
            }
        }
        // Workers hold the remaining senders; the channel closes when the last one finishes.
        drop(tx);

        let repos = collect(&rx, self.deadline);
        stop.store(true, Ordering::Relaxed);
        tracing::info!(roots = cfg.roots.len(), repos = repos.len(), "scan finished");
        Ok(repos)
    }
}

struct RootWalker {
    root: PathBuf,
    max_depth: usize,
    excluded: Arc<GlobSet>,
    stop: Arc<AtomicBool>,
}

impl RootWalker {
    fn walk(&self, tx: &SyncSender<PathBuf>) {
        let mut walker = WalkDir::new(&self.root).follow_links(false);
        if self.max_depth > 0 {
            walker = walker.max_depth(self.max_depth);
        }

        let mut entries = walker.into_iter();
        while let Some(next) = entries.next() {
            if self.stop.load(Ordering::Relaxed) {
                return;
            }
            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(root = %self.root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }

            // Entries at the depth limit are never descended into, and walkdir does not track
            // them as the current directory.
            let can_descend = self.max_depth == 0 || entry.depth() < self.max_depth;
            let name = entry.file_name().to_string_lossy();
            if name == REPO_MARKER || self.excluded.is_match(&*name) {
                if can_descend {
                    entries.skip_current_dir();
                }
                continue;
            }

            if can_descend && entry.path().join(REPO_MARKER).is_dir() {
                if tx.send(entry.path().to_path_buf()).is_err() {
                    // Collector is gone (deadline passed).
                    return;
                }
                entries.skip_current_dir();
            }
        }
    }
}

fn build_exclusions(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            continue;
        }
        match Glob::new(trimmed) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => {
                tracing::warn!(pattern = %trimmed, error = %err, "ignoring invalid exclude pattern");
            }
        }
    }
    builder.build().context("failed to build exclusion matcher")
}

fn collect(rx: &Receiver<PathBuf>, deadline: Option<Instant>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut repos = Vec::new();

    loop {
        let received = match deadline {
            None => rx.recv().ok(),
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(path) => Some(path),
                    Err(RecvTimeoutError::Timeout) => {
                        tracing::warn!(found = repos.len(), "scan deadline reached, using partial results");
                        None
                    }
                    Err(RecvTimeoutError::Disconnected) => None,
                }
            }
        };
        let Some(path) = received else { break };
        if seen.insert(path.clone()) {
            repos.push(path);
        }
    }

    repos.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    repos
}
