//! Application layer for Archforge.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GeneratorService, CatalogService, ExportService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! format knowledge itself. Syntax lives behind the `Emitter` port.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{CatalogService, ExportService, FormatInfo, GeneratorService};

// Re-export port traits (for adapter implementation)
pub use ports::{Clock, EmitContext, Emitter, Filesystem};

pub use error::ApplicationError;
