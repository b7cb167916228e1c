//! Infrastructure adapters for config, paths, logging and tmux.

pub mod config;
pub mod logging;
pub mod paths;
pub mod tmux;
