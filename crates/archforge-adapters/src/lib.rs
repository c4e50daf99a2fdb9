//! Infrastructure adapters for Archforge.
//!
//! This crate implements the ports defined in `archforge-core::application::ports`:
//! one emitter per output format backed by the resource mapping registry, the
//! syntax serializers they share, clocks and filesystems. It also reads
//! architecture files.

use std::sync::Arc;

use archforge_core::application::ports::Emitter;

pub mod architecture_loader;
pub mod clock;
pub mod emitters;
pub mod filesystem;
pub mod registry;
pub mod syntax;

// Re-export commonly used adapters
pub use architecture_loader::{ArchitectureSyntax, load_architecture, parse_architecture};
pub use clock::{FixedClock, SystemClock};
pub use emitters::{
    ArmEmitter, CloudFormationEmitter, ComposeEmitter, KubernetesEmitter, TerraformEmitter,
};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use registry::ResourceRegistry;

/// One emitter per supported format, all sharing `registry`.
pub fn default_emitters(registry: Arc<ResourceRegistry>) -> Vec<Box<dyn Emitter>> {
    vec![
        Box::new(TerraformEmitter::new(Arc::clone(&registry))),
        Box::new(CloudFormationEmitter::new(Arc::clone(&registry))),
        Box::new(ArmEmitter::new(Arc::clone(&registry))),
        Box::new(KubernetesEmitter::new(Arc::clone(&registry))),
        Box::new(ComposeEmitter::new(registry)),
    ]
}
