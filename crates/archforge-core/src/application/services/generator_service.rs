//! Generator Service - the one entry point for producing IaC.
//!
//! This service coordinates the generation workflow:
//! 1. Validate the request and the format/provider pair
//! 2. Dispatch to the emitter registered for the format
//! 3. Check the emitted file set before returning it
//!
//! It holds no syntax knowledge; every format lives behind the `Emitter` port.

use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Clock, EmitContext, Emitter},
    },
    domain::{Architecture, DomainValidator as validator, GeneratorConfig, Generation, IacFormat, Output},
    error::{ArchforgeError, ArchforgeResult},
};

/// Facade over the registered emitters.
///
/// Stateless between calls: concurrent `generate` calls share nothing
/// mutable.
pub struct GeneratorService {
    emitters: HashMap<IacFormat, Box<dyn Emitter>>,
    clock: Box<dyn Clock>,
}

impl GeneratorService {
    /// Create a generator with the given emitters and clock.
    ///
    /// A later emitter for the same format replaces an earlier one.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use archforge_core::application::{GeneratorService, ports::*};
    ///
    /// let service = GeneratorService::new(
    ///     emitters, // Vec<Box<dyn Emitter>>
    ///     clock,    // Box<dyn Clock>
    /// );
    /// ```
    pub fn new(emitters: Vec<Box<dyn Emitter>>, clock: Box<dyn Clock>) -> Self {
        let emitters = emitters
            .into_iter()
            .map(|emitter| (emitter.format(), emitter))
            .collect();
        Self { emitters, clock }
    }

    /// Generate the file set for `config`.
    ///
    /// Degraded components never fail the call; use
    /// [`generate_with_report`](Self::generate_with_report) to inspect them.
    pub fn generate(
        &self,
        architecture: &Architecture,
        config: &GeneratorConfig,
    ) -> ArchforgeResult<Vec<Output>> {
        Ok(self.generate_with_report(architecture, config)?.outputs)
    }

    /// Generate the file set together with its degradation report.
    #[instrument(
        skip_all,
        fields(
            architecture = %architecture.name,
            format = %config.format(),
            provider = %config.provider()
        )
    )]
    pub fn generate_with_report(
        &self,
        architecture: &Architecture,
        config: &GeneratorConfig,
    ) -> ArchforgeResult<Generation> {
        info!(
            components = architecture.component_count(),
            "Generating {} for {}",
            config.format(),
            config.provider()
        );

        // 1. Validate request (compatibility is checked before any emitter runs)
        validator::validate_config(config)?;

        // 2. Resolve emitter
        let emitter = self.emitters.get(&config.format()).ok_or_else(|| {
            ApplicationError::EmitterNotRegistered {
                format: config.format().to_string(),
            }
        })?;
        debug!(policy = ?emitter.fallback_policy(), "Emitter resolved");

        // 3. Emit
        let ctx = EmitContext::new(config.clone(), self.clock.now());
        let generation = emitter.emit(architecture, &ctx).map_err(|e| match e {
            ArchforgeError::Internal { message } => ApplicationError::EmitFailed {
                format: config.format().to_string(),
                reason: message,
            }
            .into(),
            other => other,
        })?;

        // 4. Check the result
        validator::validate_generation(&generation)?;

        for degradation in &generation.degradations {
            warn!(
                component = %degradation.component,
                service_type = %degradation.service_type,
                "{}",
                degradation.describe()
            );
        }

        info!(
            files = generation.outputs.len(),
            degraded = generation.degradations.len(),
            "Generation completed"
        );
        Ok(generation)
    }

    /// Formats that have an emitter wired in.
    pub fn registered_formats(&self) -> Vec<IacFormat> {
        IacFormat::ALL
            .into_iter()
            .filter(|f| self.emitters.contains_key(f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        application::ports::output::{MockClock, MockEmitter},
        domain::{
            ArchitectureComponent, CloudProvider, Degradation, DegradationReason, DomainError,
            FallbackPolicy, ServiceType, SyntaxLanguage,
        },
        error::ErrorCategory,
    };

    fn fixed_clock() -> Box<dyn Clock> {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        Box::new(clock)
    }

    fn config(format: IacFormat, provider: CloudProvider) -> GeneratorConfig {
        GeneratorConfig::builder()
            .format(format)
            .provider(provider)
            .project_name("shop")
            .build()
            .unwrap()
    }

    fn arch() -> Architecture {
        Architecture::new("shop").with_component(ArchitectureComponent::new("api", ServiceType::Compute))
    }

    #[test]
    fn dispatches_to_registered_emitter() {
        let mut emitter = MockEmitter::new();
        emitter.expect_format().return_const(IacFormat::Terraform);
        emitter
            .expect_fallback_policy()
            .return_const(FallbackPolicy::Placeholder);
        emitter.expect_emit().times(1).returning(|_, ctx| {
            let mut generation = Generation::new();
            generation.push(Output::new(
                "main.tf",
                format!("# {}", ctx.timestamp()),
                SyntaxLanguage::Hcl,
            )?);
            Ok(generation)
        });

        let service = GeneratorService::new(vec![Box::new(emitter)], fixed_clock());
        let outputs = service
            .generate(&arch(), &config(IacFormat::Terraform, CloudProvider::Aws))
            .unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].content, "# 2024-01-01T00:00:00Z");
    }

    #[test]
    fn incompatible_pair_never_reaches_emitter() {
        let mut emitter = MockEmitter::new();
        emitter.expect_format().return_const(IacFormat::Arm);
        emitter.expect_emit().never();

        let service = GeneratorService::new(vec![Box::new(emitter)], fixed_clock());
        let err = service
            .generate(&arch(), &config(IacFormat::Arm, CloudProvider::Aws))
            .unwrap_err();

        assert!(matches!(
            err,
            ArchforgeError::Domain(DomainError::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn missing_emitter_is_reported() {
        let service = GeneratorService::new(Vec::new(), fixed_clock());
        let err = service
            .generate(&arch(), &config(IacFormat::Kubernetes, CloudProvider::Gcp))
            .unwrap_err();

        assert!(matches!(
            err,
            ArchforgeError::Application(ApplicationError::EmitterNotRegistered { .. })
        ));
    }

    #[test]
    fn empty_generation_is_rejected() {
        let mut emitter = MockEmitter::new();
        emitter.expect_format().return_const(IacFormat::DockerCompose);
        emitter
            .expect_fallback_policy()
            .return_const(FallbackPolicy::Placeholder);
        emitter.expect_emit().returning(|_, _| Ok(Generation::new()));

        let service = GeneratorService::new(vec![Box::new(emitter)], fixed_clock());
        let result = service.generate(&arch(), &config(IacFormat::DockerCompose, CloudProvider::Aws));

        assert!(result.is_err());
    }

    #[test]
    fn internal_emitter_failure_names_the_format() {
        let mut emitter = MockEmitter::new();
        emitter.expect_format().return_const(IacFormat::CloudFormation);
        emitter
            .expect_fallback_policy()
            .return_const(FallbackPolicy::Placeholder);
        emitter.expect_emit().returning(|_, _| {
            Err(ArchforgeError::Internal {
                message: "serializing JSON: recursion limit".into(),
            })
        });

        let service = GeneratorService::new(vec![Box::new(emitter)], fixed_clock());
        let err = service
            .generate(&arch(), &config(IacFormat::CloudFormation, CloudProvider::Aws))
            .unwrap_err();

        assert!(matches!(
            err,
            ArchforgeError::Application(ApplicationError::EmitFailed { ref format, .. })
                if format == "cloudformation"
        ));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn degradations_are_reported_not_fatal() {
        let mut emitter = MockEmitter::new();
        emitter.expect_format().return_const(IacFormat::Kubernetes);
        emitter.expect_fallback_policy().return_const(FallbackPolicy::Omit);
        emitter.expect_emit().returning(|_, _| {
            let mut generation = Generation::new();
            generation.push(Output::new("k8s/namespace.yaml", "kind: Namespace", SyntaxLanguage::Yaml)?);
            generation.degrade(Degradation {
                component: "edge".into(),
                service_type: ServiceType::Cdn,
                reason: DegradationReason::Unmapped,
                handled_by: FallbackPolicy::Omit,
            });
            Ok(generation)
        });

        let service = GeneratorService::new(vec![Box::new(emitter)], fixed_clock());
        let generation = service
            .generate_with_report(&arch(), &config(IacFormat::Kubernetes, CloudProvider::Azure))
            .unwrap();

        assert!(!generation.is_complete());
        assert_eq!(generation.degradations[0].component, "edge");
    }

    #[test]
    fn lists_registered_formats_in_canonical_order() {
        let mut compose = MockEmitter::new();
        compose.expect_format().return_const(IacFormat::DockerCompose);
        let mut terraform = MockEmitter::new();
        terraform.expect_format().return_const(IacFormat::Terraform);

        let service = GeneratorService::new(vec![Box::new(compose), Box::new(terraform)], fixed_clock());
        assert_eq!(
            service.registered_formats(),
            vec![IacFormat::Terraform, IacFormat::DockerCompose]
        );
    }
}
