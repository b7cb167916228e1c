//! Expansion of user-supplied paths (`$VAR`, `${VAR}`, `~`).

use std::env;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("environment reference pattern is valid")
});

/// Replace `$VAR` and `${VAR}` references. Unset variables expand to the empty string.
fn expand_env_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_REFERENCE
        .replace_all(raw, |caps: &Captures<'_>| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|name| lookup(name.as_str()))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Expand and absolutise a configured path.
///
/// Returns `None` when the path needs a home directory that cannot be resolved, or when it
/// cannot be made absolute.
pub fn expand_path(raw: &str) -> Option<PathBuf> {
    let home = dirs_next::home_dir();
    expand_path_in(raw, home.as_deref(), |name| env::var(name).ok())
}

fn expand_path_in(
    raw: &str,
    home: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    let expanded = expand_env_with(raw.trim(), lookup);
    if expanded.is_empty() {
        return None;
    }

    let path = if expanded == "~" {
        home?.to_path_buf()
    } else if let Some(rest) = expanded.strip_prefix("~/") {
        home?.join(rest)
    } else {
        PathBuf::from(expanded)
    };

    std::path::absolute(path).ok().map(|path| normalize(&path))
}

/// Drop `.` and resolve `..` without touching the filesystem. `..` never climbs above the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/tester".into()),
            "CODE" => Some("/srv/code".into()),
            _ => None,
        }
    }

    #[test]
    fn expands_both_reference_forms() {
        assert_eq!(expand_env_with("$HOME/Code", vars), "/home/tester/Code");
        assert_eq!(expand_env_with("${CODE}/x", vars), "/srv/code/x");
        assert_eq!(expand_env_with("$MISSING/x", vars), "/x");
        assert_eq!(expand_env_with("no refs", vars), "no refs");
    }

    #[test]
    fn expands_home_shorthand() {
        let home = Path::new("/home/tester");
        assert_eq!(
            expand_path_in("~/Code", Some(home), vars),
            Some(PathBuf::from("/home/tester/Code"))
        );
        assert_eq!(
            expand_path_in("~", Some(home), vars),
            Some(PathBuf::from("/home/tester"))
        );
    }

    #[test]
    fn skips_home_paths_without_home() {
        assert_eq!(expand_path_in("~/Code", None, vars), None);
        assert_eq!(expand_path_in("   ", None, vars), None);
    }

    #[test]
    fn relative_paths_become_absolute() {
        let expanded = expand_path_in("some/dir", None, vars).expect("absolute path");
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("some/dir"));
    }

    #[test]
    fn parent_and_current_components_are_resolved() {
        let cases = [
            ("/home/u/work/..", "/home/u"),
            ("/a/./b/../c", "/a/c"),
            ("/srv/code/x/..", "/srv/code"),
            ("/..", "/"),
            ("${CODE}/../code/.", "/srv/code"),
        ];
        for (raw, want) in cases {
            assert_eq!(
                expand_path_in(raw, None, vars),
                Some(PathBuf::from(want)),
                "expand_path_in({raw})"
            );
        }
    }

    #[test]
    fn resolved_parent_gives_the_expected_session_name() {
        let path = expand_path_in("/home/u/work/..", None, vars).expect("absolute path");
        assert_eq!(crate::domain::naming::derive_name(&path), "home_u");
    }
}
