// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports can be kept after the call returns)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("unknown cloud provider: {0}")]
    UnknownProvider(String),

    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("unknown service type: {0}")]
    UnknownServiceType(String),

    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Duplicate output file: {filename}")]
    DuplicateOutput { filename: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    // ========================================================================
    // Compatibility Errors (409-level equivalent)
    // ========================================================================
    #[error("format '{format}' does not support provider '{provider}': requires {required}")]
    UnsupportedCombination {
        format: String,
        provider: String,
        required: String,
    },

    #[error("identifier '{identifier}' produced twice in {document}")]
    IdentifierCollision {
        identifier: String,
        document: String,
    },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownProvider(p) => vec![
                format!("'{}' is not a supported provider", p),
                "Supported providers: aws, azure, gcp".into(),
            ],
            Self::UnknownFormat(f) => vec![
                format!("'{}' is not a supported format", f),
                "Supported formats: terraform, cloudformation, arm, kubernetes, docker-compose"
                    .into(),
                "Try: archforge formats".into(),
            ],
            Self::UnknownEnvironment(_) => vec!["Supported environments: dev, staging, prod".into()],
            Self::UnsupportedCombination {
                format, required, ..
            } => vec![
                format!("{} output can only target: {}", format, required),
                "Pick a compatible provider with --provider".into(),
                "Or choose a multi-cloud format such as terraform".into(),
            ],
            Self::InvalidConfig(msg) => vec![
                "Check the generator configuration".into(),
                format!("Details: {}", msg),
            ],
            Self::IdentifierCollision { .. } => vec![
                "Two resources ended up with the same identifier".into(),
                "Rename one of the components and try again".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownProvider(_)
            | Self::UnknownFormat(_)
            | Self::UnknownEnvironment(_)
            | Self::UnknownServiceType(_)
            | Self::InvalidConfig(_)
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
            Self::UnsupportedCombination { .. } => ErrorCategory::Compatibility,
            _ => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
