// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Archforge.
//!
//! This module contains pure business logic with no I/O. Emitting concrete
//! syntax is handled by adapters behind the `Emitter` port defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable inputs**: Architectures and configs are only ever borrowed
//!
// Public API - what the world sees
pub mod capabilities;
pub mod entities;
pub mod error;
pub mod identifiers;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    architecture::{Architecture, ArchitectureComponent, ProviderBinding},
    common::{Permissions, RelativePath},
    config::{GeneratorConfig, GeneratorConfigBuilder},
    output::{Degradation, DegradationReason, FallbackPolicy, Generation, Output},
};

pub use error::{DomainError, ErrorCategory};

pub use identifiers::{IdentifierRules, NameTable, sanitize, sanitize_digested};

pub use value_objects::{CloudProvider, Environment, IacFormat, ServiceType, SyntaxLanguage};

pub use validation::DomainValidator;
