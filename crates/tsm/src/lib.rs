pub mod app;
pub mod domain;
pub mod infra;
pub mod ui;

/// Install the stderr log subscriber at the given `-v` level.
pub fn init(verbosity: u8) {
    infra::logging::init(verbosity);
}
