pub mod architecture;
pub mod common;
pub mod config;
pub mod output;

pub use crate::domain::DomainError;
pub use architecture::{Architecture, ArchitectureComponent, ProviderBinding};
pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use output::{Degradation, DegradationReason, FallbackPolicy, Generation, Output};
