//! Core domain types shared by the scanner, ranking engine and selection loop.

pub mod errors;
pub mod model;
pub mod naming;
