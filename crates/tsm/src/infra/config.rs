//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Bundled configuration written by `--init-config`.
pub const DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.yaml");

const CONFIG_DIR_NAME: &str = "tsm";
const CONFIG_FILE_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config.toml"];
const DEFAULT_MAX_DEPTH: usize = 3;
const DEFAULT_SCAN_PATH: &str = "~/Code";

/// Launcher configuration layered from defaults, a config file and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    /// Roots scanned for git repositories. May contain `$VAR` and `~`.
    #[serde(default)]
    pub scan_paths: Vec<String>,
    /// Directories always offered as candidates.
    #[serde(default)]
    pub bookmarks: Vec<String>,
    /// Directory base names (or glob patterns) pruned during scanning.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    max_depth: Option<usize>,
}

/// Common build, vendor and cache directories across ecosystems.
pub fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        "node_modules",
        "vendor",
        "dist",
        "build",
        "target",
        "out",
        "bin",
        ".cache",
        ".next",
        ".nuxt",
        ".pnpm-store",
        ".yarn",
        ".yarn/cache",
        ".venv",
        ".direnv",
        "deps",
        "_build",
        ".terraform",
        ".terragrunt-cache",
        ".m2",
        ".gradle",
        "Pods",
        "Carthage",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Environment overrides for scan settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    scan_paths: Option<Vec<String>>,
    max_depth: Option<usize>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        let scan_paths = env::var_os("TSM_SCAN_PATHS").map(|value| {
            env::split_paths(&value)
                .map(|path| path.to_string_lossy().into_owned())
                .filter(|path| !path.is_empty())
                .collect()
        });
        let max_depth = env::var("TSM_MAX_DEPTH")
            .ok()
            .and_then(|raw| match raw.trim().parse() {
                Ok(depth) => Some(depth),
                Err(err) => {
                    tracing::warn!(value = %raw, error = %err, "ignoring invalid TSM_MAX_DEPTH");
                    None
                }
            });
        Self {
            scan_paths,
            max_depth,
        }
    }

    #[cfg(test)]
    fn for_tests(scan_paths: &[&str], max_depth: usize) -> Self {
        Self {
            scan_paths: Some(scan_paths.iter().map(|p| (*p).to_owned()).collect()),
            max_depth: Some(max_depth),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from the default location when `explicit`
    /// is `None`. A missing default file is not an error; a missing explicit file is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let file = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => find_default_config(),
        };
        Self::load_with_layers(file, env)
    }

    fn load_with_layers(file: Option<PathBuf>, env_overrides: EnvOverrides) -> Result<Self> {
        let mut config = Config::default();
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading config");
            config = config.merge(Self::from_file(&path)?);
        }
        Ok(apply_env_overrides(config, env_overrides).with_fallbacks())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed = if is_toml {
            Self::from_toml_str(&data)
        } else {
            Self::from_yaml_str(&data)
        };
        parsed.with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).context("failed to parse YAML config")
    }

    fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse TOML config")
    }

    fn merge(self, other: Self) -> Self {
        Self {
            scan_paths: prefer_non_empty(self.scan_paths, other.scan_paths),
            bookmarks: prefer_non_empty(self.bookmarks, other.bookmarks),
            exclude_dirs: prefer_non_empty(self.exclude_dirs, other.exclude_dirs),
            max_depth: other.max_depth.or(self.max_depth),
        }
    }

    fn with_fallbacks(mut self) -> Self {
        if self.exclude_dirs.is_empty() {
            self.exclude_dirs = default_exclude_dirs();
        }
        if self.scan_paths.is_empty() {
            self.scan_paths = vec![DEFAULT_SCAN_PATH.to_owned()];
        }
        self
    }

    /// Maximum traversal depth below each root; `0` means unlimited.
    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

fn prefer_non_empty(base: Vec<String>, overlay: Vec<String>) -> Vec<String> {
    if overlay.is_empty() { base } else { overlay }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(paths) = env.scan_paths.filter(|paths| !paths.is_empty()) {
        config.scan_paths = paths;
    }
    if let Some(depth) = env.max_depth {
        config.max_depth = Some(depth);
    }
    config
}

fn config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs_next::home_dir().map(|home| home.join(".config")))
}

/// `$XDG_CONFIG_HOME/tsm/config.yaml`, falling back to `~/.config/tsm/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    config_home().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAMES[0]))
}

fn find_default_config() -> Option<PathBuf> {
    let dir = config_home()?.join(CONFIG_DIR_NAME);
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Write the bundled default configuration to `path`, refusing to overwrite.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("config already exists at {}", path.display());
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}
