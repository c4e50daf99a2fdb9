//! Catalog Service - read-only queries over the format capability table.

use serde::Serialize;

use crate::domain::{CloudProvider, IacFormat, SyntaxLanguage, capabilities};

/// Information about a format for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub language: SyntaxLanguage,
    pub providers: Vec<CloudProvider>,
    pub description: String,
}

impl From<&capabilities::FormatDef> for FormatInfo {
    fn from(def: &capabilities::FormatDef) -> Self {
        Self {
            id: def.format.as_str().to_string(),
            name: def.display_name.to_string(),
            extension: def.file_extension.to_string(),
            language: def.language,
            providers: def.compatible_providers.to_vec(),
            description: def.description.to_string(),
        }
    }
}

/// Catalog queries.
///
/// Pure table lookups; safe to call from anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogService;

impl CatalogService {
    pub fn new() -> Self {
        Self
    }

    /// All five formats in canonical order.
    pub fn supported_formats(&self) -> Vec<IacFormat> {
        capabilities::supported_formats()
            .iter()
            .map(|def| def.format)
            .collect()
    }

    /// Every format with its display metadata.
    pub fn list_formats(&self) -> Vec<FormatInfo> {
        capabilities::supported_formats()
            .iter()
            .map(FormatInfo::from)
            .collect()
    }

    /// Formats that can target `provider`.
    pub fn formats_for_provider(&self, provider: CloudProvider) -> Vec<FormatInfo> {
        capabilities::formats_for_provider(provider)
            .into_iter()
            .map(FormatInfo::from)
            .collect()
    }

    pub fn describe(&self, format: IacFormat) -> Option<FormatInfo> {
        capabilities::find_format(format).map(FormatInfo::from)
    }

    pub fn file_extension(&self, format: IacFormat) -> &'static str {
        capabilities::file_extension(format)
    }

    pub fn display_name(&self, format: IacFormat) -> &'static str {
        capabilities::display_name(format)
    }

    pub fn language(&self, format: IacFormat) -> SyntaxLanguage {
        capabilities::primary_language(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_five_formats_in_order() {
        let catalog = CatalogService::new();
        assert_eq!(catalog.supported_formats(), IacFormat::ALL.to_vec());
        assert_eq!(catalog.list_formats()[4].id, "docker-compose");
    }

    #[test]
    fn extensions_and_names() {
        let catalog = CatalogService::new();
        assert_eq!(catalog.file_extension(IacFormat::Terraform), "tf");
        assert_eq!(catalog.file_extension(IacFormat::DockerCompose), "yml");
        assert_eq!(catalog.display_name(IacFormat::Arm), "Azure Resource Manager");
        assert_eq!(catalog.language(IacFormat::CloudFormation), SyntaxLanguage::Json);
        assert_eq!(catalog.language(IacFormat::Terraform), SyntaxLanguage::Hcl);
    }

    #[test]
    fn provider_filter_excludes_single_cloud_formats() {
        let catalog = CatalogService::new();
        let gcp: Vec<_> = catalog
            .formats_for_provider(CloudProvider::Gcp)
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(gcp, vec!["terraform", "kubernetes", "docker-compose"]);

        let aws = catalog.formats_for_provider(CloudProvider::Aws);
        assert!(aws.iter().any(|f| f.id == "cloudformation"));
        assert!(!aws.iter().any(|f| f.id == "arm"));
    }
}
