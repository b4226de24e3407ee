//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Board mutations fail with the first four variants and never leave a
/// partially applied change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    /// A required field was empty or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The capacity-limited tier already holds an item
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Referenced item, tier, user or comment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Reorder index outside the tier's bounds
    #[error("Index out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Caller is not signed in or does not own the record
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Document or object store failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Message shown to the user in a blocking notice
    pub fn notice(&self) -> String {
        match self {
            DomainError::InvalidInput(msg) => msg.clone(),
            DomainError::CapacityExceeded(msg) => msg.clone(),
            DomainError::NotFound(msg) => format!("Could not find {}.", msg),
            DomainError::IndexOutOfRange { .. } => "That position is not available.".to_string(),
            DomainError::Forbidden(msg) => msg.clone(),
            DomainError::Storage(_) => "Failed to reach storage. Please try again.".to_string(),
            DomainError::Internal(_) => "Something went wrong.".to_string(),
        }
    }

    /// True for errors raised by board mutation rules (as opposed to I/O)
    pub fn is_board_rule(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidInput(_)
                | DomainError::CapacityExceeded(_)
                | DomainError::NotFound(_)
                | DomainError::IndexOutOfRange { .. }
        )
    }
}
