//! Deterministic session identifiers derived from directory paths.

use std::path::Path;

/// Identifier used when sanitizing leaves nothing behind.
pub const FALLBACK_NAME: &str = "session";

/// Reduce `raw` to the `[A-Za-z0-9._-]` alphabet.
///
/// Every run of other characters collapses into a single `-`, and leading or trailing dashes
/// are dropped. An empty result becomes [`FALLBACK_NAME`].
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Build `<parent>_<base>` for a directory, e.g. `/home/u/Code/ivuorinen/a` becomes
/// `ivuorinen_a`.
///
/// The parent segment is left out when the directory sits directly below the filesystem
/// root, or when the path has no named parent at all (`a`, `./a`).
pub fn derive_name(path: &Path) -> String {
    let base = sanitize(&lossy_name(path));
    match path.parent().filter(|parent| parent.file_name().is_some()) {
        Some(parent) => format!("{}_{}", sanitize(&lossy_name(parent)), base),
        None => base,
    }
}

fn lossy_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
