//! Widgets composing the selection screen.

pub mod candidate_list;
pub mod preview;
