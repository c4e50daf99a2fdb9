//! The provider-agnostic architecture model.
//!
//! Produced upstream (chat or wizard pipeline) and read-only to the
//! generator. Components keep their declaration order; every emitter walks
//! them in that order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CloudProvider, ServiceType};

/// One proposed system design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    pub name: String,

    /// Variant tag, e.g. `cost-optimized` or `high-availability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub components: Vec<ArchitectureComponent>,

    /// Total monthly cost per provider, as quoted upstream.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub total_cost: BTreeMap<CloudProvider, f64>,
}

impl Architecture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variant: None,
            description: None,
            components: Vec::new(),
            total_cost: BTreeMap::new(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_component(mut self, component: ArchitectureComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components_of(&self, service_type: ServiceType) -> impl Iterator<Item = &ArchitectureComponent> {
        self.components
            .iter()
            .filter(move |c| c.service_type == service_type)
    }

    pub fn has_service(&self, service_type: ServiceType) -> bool {
        self.components_of(service_type).next().is_some()
    }

    /// Quoted total for `provider`, falling back to the sum of bindings.
    pub fn monthly_cost(&self, provider: CloudProvider) -> f64 {
        self.total_cost.get(&provider).copied().unwrap_or_else(|| {
            self.components
                .iter()
                .filter_map(|c| c.binding(provider))
                .map(|b| b.monthly_cost)
                .sum()
        })
    }
}

/// One logical infrastructure element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureComponent {
    pub name: String,

    #[serde(rename = "type")]
    pub service_type: ServiceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Concrete service per provider. A missing entry is tolerated by every
    /// emitter and reported as a degradation.
    #[serde(default)]
    pub bindings: BTreeMap<CloudProvider, ProviderBinding>,
}

impl ArchitectureComponent {
    pub fn new(name: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            name: name.into(),
            service_type,
            description: None,
            bindings: BTreeMap::new(),
        }
    }

    pub fn with_binding(mut self, provider: CloudProvider, binding: ProviderBinding) -> Self {
        self.bindings.insert(provider, binding);
        self
    }

    pub fn binding(&self, provider: CloudProvider) -> Option<&ProviderBinding> {
        self.bindings.get(&provider)
    }
}

/// A provider's concrete offering for a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderBinding {
    /// Provider service name, e.g. `EC2` or `Azure Cache for Redis`.
    pub service: String,
    pub sku: String,
    #[serde(default)]
    pub monthly_cost: f64,
}

impl ProviderBinding {
    pub fn new(service: impl Into<String>, sku: impl Into<String>, monthly_cost: f64) -> Self {
        Self {
            service: service.into(),
            sku: sku.into(),
            monthly_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Architecture {
        Architecture::new("shop")
            .with_component(
                ArchitectureComponent::new("api", ServiceType::Compute)
                    .with_binding(CloudProvider::Aws, ProviderBinding::new("EC2", "t3.medium", 30.0)),
            )
            .with_component(
                ArchitectureComponent::new("db", ServiceType::Database).with_binding(
                    CloudProvider::Aws,
                    ProviderBinding::new("RDS", "db.t3.micro", 15.5),
                ),
            )
    }

    #[test]
    fn monthly_cost_sums_bindings_without_quote() {
        assert_eq!(sample().monthly_cost(CloudProvider::Aws), 45.5);
        assert_eq!(sample().monthly_cost(CloudProvider::Gcp), 0.0);
    }

    #[test]
    fn quoted_total_wins() {
        let mut arch = sample();
        arch.total_cost.insert(CloudProvider::Aws, 99.0);
        assert_eq!(arch.monthly_cost(CloudProvider::Aws), 99.0);
    }

    #[test]
    fn deserializes_from_json() {
        let raw = r#"{
            "name": "blog",
            "variant": "minimal",
            "components": [
                {"name": "web", "type": "compute",
                 "bindings": {"gcp": {"service": "Compute Engine", "sku": "e2-small", "monthly_cost": 12.0}}},
                {"name": "edge", "type": "load_balancer"}
            ]
        }"#;
        let arch: Architecture = serde_json::from_str(raw).unwrap();
        assert_eq!(arch.component_count(), 2);
        assert_eq!(arch.components[1].service_type, ServiceType::LoadBalancer);
        assert_eq!(
            arch.components[0].binding(CloudProvider::Gcp).map(|b| b.sku.as_str()),
            Some("e2-small")
        );
        assert!(arch.components[1].binding(CloudProvider::Gcp).is_none());
    }

    #[test]
    fn filters_by_service_type() {
        let arch = sample();
        assert!(arch.has_service(ServiceType::Database));
        assert!(!arch.has_service(ServiceType::Cache));
    }
}
