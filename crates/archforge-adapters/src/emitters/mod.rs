//! One emitter per output format.
//!
//! Every emitter follows the same walk: allocate identifiers for all
//! components up front, look each component up in the shared
//! [`ResourceRegistry`], then assemble the format's files from the resulting
//! fragments. Components without a mapping (or, for cloud formats, without a
//! binding) are degraded according to the emitter's [`FallbackPolicy`].

use tracing::debug;

use archforge_core::domain::{
    ArchitectureComponent, Architecture, Degradation, DegradationReason, FallbackPolicy,
    GeneratorConfig, IacFormat, IdentifierRules, NameTable, ServiceType,
};

use crate::registry::{
    Fragment, FragmentContext, FragmentFn, Requirement, ResourceRegistry, Sibling,
};

mod arm;
mod cloudformation;
mod compose;
mod kubernetes;
mod terraform;

pub use arm::ArmEmitter;
pub use cloudformation::CloudFormationEmitter;
pub use compose::ComposeEmitter;
pub use kubernetes::KubernetesEmitter;
pub use terraform::TerraformEmitter;

/// Per-format knobs for [`walk`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkOptions {
    pub format: IacFormat,
    pub rules: IdentifierRules,
    /// Identifiers taken by the format's fixed resources.
    pub reserved: &'static [&'static str],
    /// Suffixes of the extra document keys a mapping derives from its id.
    pub derived: fn(ServiceType) -> &'static [&'static str],
    /// Cloud formats degrade components with no binding for the provider.
    pub requires_binding: bool,
    pub policy: FallbackPolicy,
}

/// What happened to one component.
#[derive(Debug)]
pub(crate) enum Outcome {
    Mapped(Vec<Fragment>),
    Degraded(DegradationReason),
}

#[derive(Debug)]
pub(crate) struct Step<'a> {
    pub component: &'a ArchitectureComponent,
    pub id: String,
    pub outcome: Outcome,
}

/// Result of walking an architecture for one format.
#[derive(Debug)]
pub(crate) struct Walk<'a> {
    pub steps: Vec<Step<'a>>,
    /// Deduplicated by name, first declaration wins.
    pub requirements: Vec<Requirement>,
    pub degradations: Vec<Degradation>,
}

impl Walk<'_> {
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.steps.iter().flat_map(|step| match &step.outcome {
            Outcome::Mapped(fragments) => fragments.as_slice(),
            Outcome::Degraded(_) => &[],
        })
    }

    pub fn degraded(&self) -> impl Iterator<Item = (&Step<'_>, DegradationReason)> {
        self.steps.iter().filter_map(|step| match step.outcome {
            Outcome::Degraded(reason) => Some((step, reason)),
            Outcome::Mapped(_) => None,
        })
    }

    pub fn has_secrets(&self) -> bool {
        self.requirements.iter().any(Requirement::is_secret)
    }
}

/// For formats whose fragments key everything by the component id.
pub(crate) fn no_derived_keys(_: ServiceType) -> &'static [&'static str] {
    &[]
}

pub(crate) fn walk<'a>(
    registry: &ResourceRegistry,
    architecture: &'a Architecture,
    config: &GeneratorConfig,
    options: WalkOptions,
) -> Walk<'a> {
    let provider = config.provider();

    let mut names = NameTable::new(options.rules);
    for reserved in options.reserved {
        names.reserve(*reserved);
    }

    // Every component's fate is settled before any fragment is built, so
    // fragments only ever reference siblings that end up in the document.
    let plans: Vec<(&ArchitectureComponent, String, Result<FragmentFn, DegradationReason>)> =
        architecture
            .components
            .iter()
            .map(|component| {
                let id = names.allocate_with(
                    &component.name,
                    (options.derived)(component.service_type),
                );
                let plan = match (
                    registry.lookup(component.service_type, provider, options.format),
                    component.binding(provider),
                ) {
                    (None, _) => Err(DegradationReason::Unmapped),
                    (Some(_), None) if options.requires_binding => {
                        Err(DegradationReason::MissingBinding)
                    }
                    (Some(generator), _) => Ok(generator),
                };
                (component, id, plan)
            })
            .collect();

    let siblings: Vec<Sibling> = plans
        .iter()
        .filter(|(_, _, plan)| plan.is_ok())
        .map(|(component, id, _)| Sibling {
            name: component.name.clone(),
            service_type: component.service_type,
            id: id.clone(),
        })
        .collect();

    let mut walk = Walk {
        steps: Vec::with_capacity(plans.len()),
        requirements: Vec::new(),
        degradations: Vec::new(),
    };

    for (component, id, plan) in plans {
        let outcome = match plan {
            Err(reason) => {
                debug!(component = %component.name, ?reason, "Degraded component");
                walk.degradations.push(Degradation {
                    component: component.name.clone(),
                    service_type: component.service_type,
                    reason,
                    handled_by: options.policy,
                });
                Outcome::Degraded(reason)
            }
            Ok(generator) => {
                let set = generator(&FragmentContext {
                    component,
                    binding: component.binding(provider),
                    config,
                    id: &id,
                    siblings: &siblings,
                });
                debug!(
                    component = %component.name,
                    id = %id,
                    fragments = set.len(),
                    "Mapped component"
                );
                for requirement in set.requirements {
                    if !walk.requirements.iter().any(|r| r.name == requirement.name) {
                        walk.requirements.push(requirement);
                    }
                }
                Outcome::Mapped(set.fragments)
            }
        };

        walk.steps.push(Step {
            component,
            id,
            outcome,
        });
    }

    walk
}

/// Comment lines standing in for a degraded component.
pub(crate) fn placeholder_lines(
    step: &Step<'_>,
    reason: DegradationReason,
    config: &GeneratorConfig,
) -> Vec<String> {
    let component = step.component;
    let provider = config.provider();
    let mut lines = match reason {
        DegradationReason::Unmapped => vec![format!(
            "TODO: \"{}\" ({}) has no {} mapping for {}.",
            component.name,
            component.service_type,
            config.format(),
            provider
        )],
        DegradationReason::MissingBinding => vec![format!(
            "TODO: \"{}\" ({}) has no {} binding in the architecture.",
            component.name, component.service_type, provider
        )],
    };
    if let Some(binding) = component.binding(provider) {
        lines.push(format!(
            "  Intended service: {}, SKU: {}",
            binding.service, binding.sku
        ));
    }
    lines.push("  Define it by hand before deploying.".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use archforge_core::domain::{CloudProvider, ProviderBinding, ServiceType};

    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig::builder()
            .format(IacFormat::Terraform)
            .provider(CloudProvider::Aws)
            .project_name("shop")
            .build()
            .unwrap()
    }

    fn options(requires_binding: bool) -> WalkOptions {
        WalkOptions {
            format: IacFormat::Terraform,
            rules: IdentifierRules::TERRAFORM,
            reserved: &["main"],
            derived: no_derived_keys,
            requires_binding,
            policy: FallbackPolicy::Placeholder,
        }
    }

    fn bound(name: &str, service_type: ServiceType) -> ArchitectureComponent {
        ArchitectureComponent::new(name, service_type).with_binding(
            CloudProvider::Aws,
            ProviderBinding::new("EC2", "t3.small", 15.0),
        )
    }

    #[test]
    fn duplicate_names_get_stable_suffixes() {
        let architecture = Architecture::new("a")
            .with_component(bound("api", ServiceType::Compute))
            .with_component(bound("API", ServiceType::Compute))
            .with_component(bound("main", ServiceType::Compute));
        let registry = ResourceRegistry::builtin();

        let walk = walk(&registry, &architecture, &config(), options(true));
        let ids: Vec<_> = walk.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["api", "api_2", "main_2"]);
    }

    #[test]
    fn missing_binding_degrades_cloud_formats_only() {
        let architecture = Architecture::new("a")
            .with_component(ArchitectureComponent::new("api", ServiceType::Compute));
        let registry = ResourceRegistry::builtin();

        let strict = walk(&registry, &architecture, &config(), options(true));
        assert_eq!(
            strict.degradations[0].reason,
            DegradationReason::MissingBinding
        );

        let lenient = walk(&registry, &architecture, &config(), options(false));
        assert!(lenient.degradations.is_empty());
        assert_eq!(lenient.fragments().count(), 1);
    }

    #[test]
    fn requirements_are_declared_once() {
        let architecture = Architecture::new("a")
            .with_component(bound("orders", ServiceType::Database))
            .with_component(bound("users", ServiceType::Database));
        let registry = ResourceRegistry::builtin();

        let walk = walk(&registry, &architecture, &config(), options(true));
        let names: Vec<_> = walk.requirements.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["db_username", "db_password"]);
        assert!(walk.has_secrets());
    }

    #[test]
    fn placeholder_names_intended_service() {
        let architecture =
            Architecture::new("a").with_component(bound("metrics", ServiceType::Monitoring));
        let registry = ResourceRegistry::builtin();

        let walk = walk(&registry, &architecture, &config(), options(true));
        let (step, reason) = walk.degraded().next().unwrap();
        let lines = placeholder_lines(step, reason, &config());
        assert!(lines[0].contains("\"metrics\""));
        assert!(lines[1].contains("EC2"));
        assert!(lines[1].contains("t3.small"));
    }
}
