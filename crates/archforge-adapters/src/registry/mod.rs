//! Resource mapping registry.
//!
//! Maps `(service type, provider, format)` to a pure [`FragmentFn`] that
//! turns one component into structured fragments. The registry is built
//! once, is immutable afterwards, and is shared between emitters through an
//! `Arc`. A missing entry is a normal outcome: the emitter applies its
//! fallback policy.
//!
//! # Adding a Mapping
//!
//! 1. Write a `fn(&FragmentContext) -> FragmentSet` in the format's module
//! 2. Add a row to that module's `MAPPINGS` table

use std::collections::HashMap;

use serde_json::Value;

use archforge_core::domain::{
    ArchitectureComponent, CloudProvider, Environment, GeneratorConfig, IacFormat,
    ProviderBinding, ServiceType,
};

use crate::syntax::hcl::Block;

pub mod arm;
pub mod cloudformation;
pub mod compose;
pub mod kubernetes;
pub mod terraform;

/// Produces the fragments for one component.
pub type FragmentFn = fn(&FragmentContext<'_>) -> FragmentSet;

/// Registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingKey {
    pub service_type: ServiceType,
    pub provider: CloudProvider,
    pub format: IacFormat,
}

/// Another component of the same architecture, as seen by a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sibling {
    pub name: String,
    pub service_type: ServiceType,
    /// Identifier allocated for it in the current document.
    pub id: String,
}

/// Everything a fragment generator may read.
#[derive(Debug, Clone, Copy)]
pub struct FragmentContext<'a> {
    pub component: &'a ArchitectureComponent,
    /// The component's binding for the configured provider, if any.
    pub binding: Option<&'a ProviderBinding>,
    pub config: &'a GeneratorConfig,
    /// Identifier allocated for this component in the current document.
    pub id: &'a str,
    /// Mapped components in declaration order, this one included.
    pub siblings: &'a [Sibling],
}

impl<'a> FragmentContext<'a> {
    /// The binding's SKU, or `default` when there is none.
    pub fn sku_or(&self, default: &'a str) -> &'a str {
        self.binding.map_or(default, |b| b.sku.as_str())
    }

    pub fn environment(&self) -> Environment {
        self.config.environment()
    }

    /// Siblings of `service_type`, excluding this component.
    pub fn siblings_of(&self, service_type: ServiceType) -> impl Iterator<Item = &'a Sibling> {
        let id = self.id;
        self.siblings
            .iter()
            .filter(move |s| s.service_type == service_type && s.id != id)
    }

    /// First sibling of `service_type`, excluding this component.
    pub fn first_sibling(&self, service_type: ServiceType) -> Option<&'a Sibling> {
        self.siblings_of(service_type).next()
    }
}

/// One generated unit in a specific syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A Terraform `resource` or `data` block.
    Hcl(Block),
    /// A keyed JSON resource (CloudFormation logical ID or ARM symbolic name).
    Resource { key: String, body: Value },
    /// One Kubernetes manifest.
    Manifest(Value),
    /// One Compose service plus the named volumes it owns.
    Service {
        name: String,
        body: Value,
        volumes: Vec<String>,
    },
}

/// How a requirement is typed in the target syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Text,
    Secret,
    /// A list of strings; the example is comma-separated.
    List,
}

/// A variable or parameter the fragments reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub description: String,
    pub kind: RequirementKind,
    /// Default value written into the declaration.
    pub default: Option<String>,
    /// Value for example or parameters files.
    pub example: String,
}

impl Requirement {
    pub fn text(name: &str, description: &str, example: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: RequirementKind::Text,
            default: None,
            example: example.to_string(),
        }
    }

    /// A credential. The example value is a visibly non-production placeholder.
    pub fn secret(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: RequirementKind::Secret,
            default: None,
            example: PLACEHOLDER_SECRET.to_string(),
        }
    }

    pub fn list(name: &str, description: &str, example: &str) -> Self {
        Self {
            kind: RequirementKind::List,
            ..Self::text(name, description, example)
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_secret(&self) -> bool {
        self.kind == RequirementKind::Secret
    }

    /// Items of a list example, trimmed and without empty entries.
    pub fn example_items(&self) -> impl Iterator<Item = &str> {
        self.example.split(',').map(str::trim).filter(|item| !item.is_empty())
    }
}

/// Example value for every generated secret.
pub const PLACEHOLDER_SECRET: &str = "CHANGE_ME_not_for_production";

/// Fragments plus the declarations they need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentSet {
    pub fragments: Vec<Fragment>,
    pub requirements: Vec<Requirement>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragment(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn hcl(self, block: Block) -> Self {
        self.fragment(Fragment::Hcl(block))
    }

    pub fn resource(self, key: impl Into<String>, body: Value) -> Self {
        self.fragment(Fragment::Resource {
            key: key.into(),
            body,
        })
    }

    pub fn manifest(self, manifest: Value) -> Self {
        self.fragment(Fragment::Manifest(manifest))
    }

    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn requires_opt(self, requirement: Option<Requirement>) -> Self {
        match requirement {
            Some(requirement) => self.requires(requirement),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One row of a format's static mapping table.
pub type MappingRow = (ServiceType, CloudProvider, FragmentFn);

/// Immutable lookup table from [`MappingKey`] to [`FragmentFn`].
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: HashMap<MappingKey, FragmentFn>,
}

impl ResourceRegistry {
    /// An empty registry; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every built-in mapping.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.extend(IacFormat::Terraform, terraform::MAPPINGS);
        registry.extend(IacFormat::CloudFormation, cloudformation::MAPPINGS);
        registry.extend(IacFormat::Arm, arm::MAPPINGS);
        registry.extend(IacFormat::Kubernetes, &kubernetes::mappings());
        registry.extend(IacFormat::DockerCompose, &compose::mappings());
        registry
    }

    /// Add or replace one mapping.
    pub fn register(
        &mut self,
        service_type: ServiceType,
        provider: CloudProvider,
        format: IacFormat,
        generator: FragmentFn,
    ) -> &mut Self {
        self.entries.insert(
            MappingKey {
                service_type,
                provider,
                format,
            },
            generator,
        );
        self
    }

    fn extend(&mut self, format: IacFormat, rows: &[MappingRow]) {
        for &(service_type, provider, generator) in rows {
            self.register(service_type, provider, format, generator);
        }
    }

    pub fn lookup(
        &self,
        service_type: ServiceType,
        provider: CloudProvider,
        format: IacFormat,
    ) -> Option<FragmentFn> {
        self.entries
            .get(&MappingKey {
                service_type,
                provider,
                format,
            })
            .copied()
    }

    /// Service types mapped for a (format, provider) pair, sorted.
    pub fn coverage(&self, format: IacFormat, provider: CloudProvider) -> Vec<ServiceType> {
        let mut covered: Vec<_> = self
            .entries
            .keys()
            .filter(|k| k.format == format && k.provider == provider)
            .map(|k| k.service_type)
            .collect();
        covered.sort();
        covered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rows for a provider-neutral format: the same generator for every provider.
pub(crate) fn for_all_providers(rows: &[(ServiceType, FragmentFn)]) -> Vec<MappingRow> {
    rows.iter()
        .flat_map(|&(service_type, generator)| {
            CloudProvider::ALL
                .into_iter()
                .map(move |provider| (service_type, provider, generator))
        })
        .collect()
}
