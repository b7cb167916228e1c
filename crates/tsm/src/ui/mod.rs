//! Terminal front-end for the selection loop.

pub mod app;
pub mod components;
pub mod keys;
pub mod prompt;
