//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `archforge-adapters` crate provides implementations.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::{Architecture, FallbackPolicy, GeneratorConfig, Generation, IacFormat};
use crate::error::ArchforgeResult;

/// Inputs shared by every emitter for one request.
#[derive(Debug, Clone)]
pub struct EmitContext {
    pub config: GeneratorConfig,
    /// Timestamp written into generated headers.
    pub generated_at: DateTime<Utc>,
}

impl EmitContext {
    pub fn new(config: GeneratorConfig, generated_at: DateTime<Utc>) -> Self {
        Self {
            config,
            generated_at,
        }
    }

    /// RFC 3339 timestamp with second precision.
    pub fn timestamp(&self) -> String {
        self.generated_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}

/// Port for one target format's file-set assembly.
///
/// Implemented by:
/// - `archforge_adapters::emitters::TerraformEmitter`
/// - `archforge_adapters::emitters::CloudFormationEmitter`
/// - `archforge_adapters::emitters::ArmEmitter`
/// - `archforge_adapters::emitters::KubernetesEmitter`
/// - `archforge_adapters::emitters::ComposeEmitter`
///
/// Emitters only borrow their inputs and keep no state between calls.
#[cfg_attr(test, mockall::automock)]
pub trait Emitter: Send + Sync {
    /// The format this emitter produces.
    fn format(&self) -> IacFormat;

    /// What happens to components without a mapping.
    fn fallback_policy(&self) -> FallbackPolicy;

    /// Assemble the complete file set for `architecture`.
    ///
    /// Only called after the facade has validated the format/provider pair.
    fn emit(&self, architecture: &Architecture, ctx: &EmitContext) -> ArchforgeResult<Generation>;
}

/// Port for the generation timestamp.
///
/// Implemented by:
/// - `archforge_adapters::clock::SystemClock` (production)
/// - `archforge_adapters::clock::FixedClock` (tests, reproducible builds)
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Port for filesystem operations used when exporting outputs.
///
/// Implemented by:
/// - `archforge_adapters::filesystem::LocalFilesystem` (production)
/// - `archforge_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ArchforgeResult<()>;

    /// Write content to a file.
    fn write_file(&self, path: &Path, content: &str) -> ArchforgeResult<()>;

    /// Set file permissions.
    fn set_permissions(&self, path: &Path, executable: bool) -> ArchforgeResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> ArchforgeResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> ArchforgeResult<()>;
}
