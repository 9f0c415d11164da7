//! Engine error type.

use nutrirule_loader::LoadError;
use nutrirule_types::{AssignmentError, ValidationError};
use thiserror::Error;

/// Errors surfaced by the engine facade.
///
/// Merging and scoring never fail; errors come from resolving a user's
/// conditions against a store or from validating raw input.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Rule lookup or loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Raw input failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A condition assignment change was rejected.
    #[error("Invalid assignment: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
