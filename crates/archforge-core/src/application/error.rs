//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// No emitter registered for a format that passed compatibility checks.
    #[error("No emitter registered for format '{format}'")]
    EmitterNotRegistered { format: String },

    /// An emitter failed while assembling its files.
    #[error("Emitting {format} failed: {reason}")]
    EmitFailed { format: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Shared state lock poisoned.
    #[error("Filesystem state lock poisoned")]
    LockPoisoned,

    /// Export target already contains a generated file.
    #[error("Output already exists at {path}")]
    OutputExists { path: PathBuf },

    /// Architecture file does not exist.
    #[error("Architecture file not found: {path}")]
    ArchitectureNotFound { path: PathBuf },

    /// Architecture file could not be parsed.
    #[error("Invalid architecture file {path}: {reason}")]
    InvalidArchitecture { path: PathBuf, reason: String },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmitterNotRegistered { format } => vec![
                format!("The '{}' emitter is not wired into this build", format),
                "This is likely a configuration error".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Choose a different output directory with --out".into(),
            ],
            Self::ArchitectureNotFound { path } => vec![
                format!("No file at: {}", path.display()),
                "Pass the path of a .json, .yaml or .toml architecture file".into(),
            ],
            Self::InvalidArchitecture { .. } => vec![
                "Architectures need a name and a list of components".into(),
                "Each component needs a name and a type such as compute or database".into(),
            ],
            Self::LockPoisoned => vec!["Try again in a moment".into()],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmitterNotRegistered { .. } => ErrorCategory::Configuration,
            Self::OutputExists { .. } | Self::InvalidArchitecture { .. } => {
                ErrorCategory::Validation
            }
            Self::ArchitectureNotFound { .. } => ErrorCategory::NotFound,
            Self::EmitFailed { .. }
            | Self::FilesystemError { .. }
            | Self::LockPoisoned
            | Self::RollbackFailed { .. } => ErrorCategory::Internal,
        }
    }
}
