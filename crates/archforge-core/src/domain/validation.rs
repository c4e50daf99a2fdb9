use crate::domain::{
    capabilities,
    entities::{GeneratorConfig, Generation},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across call sites.
pub struct DomainValidator;

impl DomainValidator {
    /// Field checks plus the format/provider compatibility table.
    pub fn validate_config(config: &GeneratorConfig) -> Result<(), DomainError> {
        config.validate()?;
        capabilities::validate_compatibility(config.format(), config.provider())
    }

    pub fn validate_generation(generation: &Generation) -> Result<(), DomainError> {
        generation.validate()
    }
}
