//! Archforge Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Archforge
//! infrastructure-as-code generator, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          archforge-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (GeneratorService, CatalogService,     │
//! │   ExportService)                        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Driven: Emitter, Clock, Filesystem)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    archforge-adapters (Infrastructure)  │
//! │ (TerraformEmitter, ..., LocalFilesystem)│
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Architecture, GeneratorConfig, Output) │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use archforge_core::{
//!     application::GeneratorService,
//!     domain::{Architecture, CloudProvider, GeneratorConfig, IacFormat},
//! };
//!
//! // 1. Describe the request
//! let config = GeneratorConfig::builder()
//!     .format(IacFormat::Terraform)
//!     .provider(CloudProvider::Aws)
//!     .project_name("shop")
//!     .build()
//!     .unwrap();
//!
//! // 2. Use application service (with injected adapters)
//! let service = GeneratorService::new(emitters, clock);
//! let files = service.generate(&architecture, &config).unwrap();
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CatalogService, ExportService, FormatInfo, GeneratorService,
        ports::{Clock, EmitContext, Emitter, Filesystem},
    };
    pub use crate::domain::{
        Architecture, ArchitectureComponent, CloudProvider, Degradation, Environment,
        FallbackPolicy, GeneratorConfig, GeneratorConfigBuilder, Generation, IacFormat, Output,
        ProviderBinding, ServiceType, SyntaxLanguage,
    };
    pub use crate::error::{ArchforgeError, ArchforgeResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
