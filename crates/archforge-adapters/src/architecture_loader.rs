//! Reads an [`Architecture`] from a file.
//!
//! The syntax is picked from the extension: `.json`, `.yaml`/`.yml` or
//! `.toml`.
//!
//! ```yaml
//! name: web-shop
//! variant: cost-optimized
//! components:
//!   - name: api
//!     type: compute
//!     bindings:
//!       aws: { service: EC2, sku: t3.small, monthly_cost: 15.2 }
//!   - name: orders db
//!     type: database
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use archforge_core::application::ApplicationError;
use archforge_core::domain::Architecture;
use archforge_core::error::ArchforgeResult;

/// Syntax of an architecture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchitectureSyntax {
    Json,
    Yaml,
    Toml,
}

impl ArchitectureSyntax {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[instrument(fields(path = %path.display()))]
pub fn load_architecture(path: &Path) -> ArchforgeResult<Architecture> {
    if !path.exists() {
        return Err(ApplicationError::ArchitectureNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let syntax = ArchitectureSyntax::from_path(path).ok_or_else(|| invalid(
        path,
        "unsupported extension (expected .json, .yaml, .yml or .toml)",
    ))?;

    let text = fs::read_to_string(path).map_err(|e| ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let architecture = parse_architecture(&text, syntax).map_err(|reason| invalid(path, reason))?;
    debug!(
        name = %architecture.name,
        components = architecture.component_count(),
        "Loaded architecture"
    );
    Ok(architecture)
}

/// Parse `text` in `syntax`; the error is a human-readable reason.
pub fn parse_architecture(text: &str, syntax: ArchitectureSyntax) -> Result<Architecture, String> {
    let architecture: Architecture = match syntax {
        ArchitectureSyntax::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
        ArchitectureSyntax::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string())?,
        ArchitectureSyntax::Toml => toml::from_str(text).map_err(|e| e.to_string())?,
    };

    if architecture.name.trim().is_empty() {
        return Err("architecture name cannot be empty".into());
    }
    if let Some(i) = architecture
        .components
        .iter()
        .position(|c| c.name.trim().is_empty())
    {
        return Err(format!("component #{} has an empty name", i + 1));
    }
    Ok(architecture)
}

fn invalid(path: &Path, reason: impl Into<String>) -> ApplicationError {
    ApplicationError::InvalidArchitecture {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}
