//! One generation request.
//!
//! Built per call with [`GeneratorConfig::builder`]; the builder fills in the
//! provider's default region and the `dev` environment when they are omitted.

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    identifiers::{IdentifierRules, sanitize},
    value_objects::{CloudProvider, Environment, IacFormat},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    format: IacFormat,
    provider: CloudProvider,
    region: String,
    project_name: String,
    environment: Environment,
}

impl GeneratorConfig {
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::default()
    }

    pub const fn format(&self) -> IacFormat {
        self.format
    }
    pub const fn provider(&self) -> CloudProvider {
        self.provider
    }
    pub fn region(&self) -> &str {
        &self.region
    }
    pub fn project_name(&self) -> &str {
        &self.project_name
    }
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Kebab-case naming root for namespaces, buckets and networks.
    pub fn name_root(&self) -> String {
        sanitize(&self.project_name, &IdentifierRules::KUBERNETES)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.project_name.trim().is_empty() {
            return Err(DomainError::InvalidConfig("project name cannot be empty".into()));
        }
        if self.region.trim().is_empty() {
            return Err(DomainError::InvalidConfig("region cannot be empty".into()));
        }
        if self.region.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidConfig(format!(
                "region '{}' contains whitespace",
                self.region
            )));
        }
        Ok(())
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Default, Clone)]
pub struct GeneratorConfigBuilder {
    format: Option<IacFormat>,
    provider: Option<CloudProvider>,
    region: Option<String>,
    project_name: Option<String>,
    environment: Option<Environment>,
}

impl GeneratorConfigBuilder {
    pub fn format(mut self, format: IacFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn provider(mut self, provider: CloudProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn build(self) -> Result<GeneratorConfig, DomainError> {
        let format = self
            .format
            .ok_or(DomainError::MissingRequiredField { field: "format" })?;
        let provider = self
            .provider
            .ok_or(DomainError::MissingRequiredField { field: "provider" })?;
        let project_name = self
            .project_name
            .ok_or(DomainError::MissingRequiredField {
                field: "project_name",
            })?;

        let config = GeneratorConfig {
            format,
            provider,
            region: self
                .region
                .unwrap_or_else(|| provider.default_region().to_string()),
            project_name,
            environment: self.environment.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
