//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate terraform" or "export to a directory".

pub mod catalog_service;
pub mod export_service;
pub mod generator_service;

pub use catalog_service::{CatalogService, FormatInfo};
pub use export_service::ExportService;
pub use generator_service::GeneratorService;
