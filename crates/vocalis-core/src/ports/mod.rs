//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod settings_repository;

use thiserror::Error;

pub use settings_repository::SettingsRepository;

/// Domain-specific errors for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error (filesystem, keychain, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Core error type for service operations.
///
/// Adapters should map this to their own error types (CLI exit codes,
/// user-facing notifications).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Data directory could not be resolved.
    #[error(transparent)]
    Path(#[from] crate::paths::PathError),
}
