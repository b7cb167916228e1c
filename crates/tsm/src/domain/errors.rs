//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no candidates")]
    NoCandidates,
    #[error("invalid selection")]
    InvalidSelection,
}
