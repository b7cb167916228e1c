//! Application layer: discovery, ranking and the selection loop.

pub mod candidates;
pub mod rank;
pub mod scan;
pub mod selection;
