//! Output format capability registry.
//!
//! Each format is described exactly once by its [`FormatDef`]: which
//! providers it can target, how it is presented, and which syntax its
//! primary file uses. Compatibility checks and the catalog queries exposed
//! to callers are all table lookups over [`FORMAT_REGISTRY`].
//!
//! # Adding a New Format
//!
//! 1. Add a variant to `IacFormat` in `value_objects.rs`
//! 2. Add one [`FormatDef`] entry to [`FORMAT_REGISTRY`]
//! 3. Implement an emitter for it in the adapters

use crate::domain::error::DomainError;
use crate::domain::value_objects::{CloudProvider, IacFormat, SyntaxLanguage};

/// Describes everything the domain needs to know about one output format.
#[derive(Debug, Clone, Copy)]
pub struct FormatDef {
    /// The format this entry describes.
    pub format: IacFormat,

    /// Human-readable name shown in listings.
    pub display_name: &'static str,

    /// Extension of the primary file, without the dot.
    pub file_extension: &'static str,

    /// Syntax of the primary file.
    pub language: SyntaxLanguage,

    /// Providers this format can target.
    ///
    /// The facade rejects any provider not in this list before an emitter runs.
    pub compatible_providers: &'static [CloudProvider],

    /// One-line description for listings.
    pub description: &'static str,
}

impl FormatDef {
    pub fn supports(&self, provider: CloudProvider) -> bool {
        self.compatible_providers.contains(&provider)
    }

    /// Comma-separated provider list, e.g. `"aws, azure, gcp"`.
    pub fn providers_label(&self) -> String {
        self.compatible_providers
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Single source of truth for format capabilities.
pub static FORMAT_REGISTRY: &[FormatDef] = &[
    FormatDef {
        format: IacFormat::Terraform,
        display_name: "Terraform",
        file_extension: "tf",
        language: SyntaxLanguage::Hcl,
        compatible_providers: &[CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp],
        description: "Multi-cloud declarative configuration with variables and example values",
    },
    FormatDef {
        format: IacFormat::CloudFormation,
        display_name: "AWS CloudFormation",
        file_extension: "json",
        language: SyntaxLanguage::Json,
        compatible_providers: &[CloudProvider::Aws],
        description: "AWS stack template with parameters and exported outputs",
    },
    FormatDef {
        format: IacFormat::Arm,
        display_name: "Azure Resource Manager",
        file_extension: "json",
        language: SyntaxLanguage::Json,
        compatible_providers: &[CloudProvider::Azure],
        description: "Azure deployment template, parameters file and deploy script",
    },
    FormatDef {
        format: IacFormat::Kubernetes,
        display_name: "Kubernetes",
        file_extension: "yaml",
        language: SyntaxLanguage::Yaml,
        compatible_providers: &[CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp],
        description: "Namespaced manifests with a kustomization overlay",
    },
    FormatDef {
        format: IacFormat::DockerCompose,
        display_name: "Docker Compose",
        file_extension: "yml",
        language: SyntaxLanguage::Yaml,
        compatible_providers: &[CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp],
        description: "Local multi-container runtime with dev overrides",
    },
];

// ── Registry lookup API ───────────────────────────────────────────────────────

/// Find the capability definition for a format.
///
/// Returns `None` only if the format is not registered, a programming
/// error caught by `every_format_is_registered`.
pub fn find_format(format: IacFormat) -> Option<&'static FormatDef> {
    FORMAT_REGISTRY.iter().find(|def| def.format == format)
}

/// All formats, in registry order.
pub fn supported_formats() -> &'static [FormatDef] {
    FORMAT_REGISTRY
}

/// Formats that can target `provider`.
pub fn formats_for_provider(provider: CloudProvider) -> Vec<&'static FormatDef> {
    FORMAT_REGISTRY
        .iter()
        .filter(|def| def.supports(provider))
        .collect()
}

/// Check that `format` accepts `provider`.
///
/// This is the single place an `UnsupportedCombination` is produced.
pub fn validate_compatibility(
    format: IacFormat,
    provider: CloudProvider,
) -> Result<(), DomainError> {
    let def = find_format(format).ok_or_else(|| DomainError::UnknownFormat(format.to_string()))?;

    if def.supports(provider) {
        Ok(())
    } else {
        Err(DomainError::UnsupportedCombination {
            format: def.display_name.to_string(),
            provider: provider.to_string(),
            required: def.providers_label(),
        })
    }
}

/// File extension of a format's primary file.
pub fn file_extension(format: IacFormat) -> &'static str {
    find_format(format).map_or("txt", |def| def.file_extension)
}

/// Display name of a format.
pub fn display_name(format: IacFormat) -> &'static str {
    find_format(format).map_or("Unknown", |def| def.display_name)
}

/// Syntax-highlighting language of a format's primary file.
pub fn primary_language(format: IacFormat) -> SyntaxLanguage {
    find_format(format).map_or(SyntaxLanguage::Yaml, |def| def.language)
}
