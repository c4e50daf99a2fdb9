//! Shared fixtures for the adapter integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use archforge_adapters::{FixedClock, ResourceRegistry, default_emitters};
use archforge_core::application::GeneratorService;
use archforge_core::domain::{
    Architecture, ArchitectureComponent, CloudProvider, Environment, GeneratorConfig, IacFormat,
    Output, ProviderBinding, ServiceType,
};
use serde::Deserialize;

pub const TIMESTAMP: &str = "2026-01-15T12:00:00Z";

pub fn service() -> GeneratorService {
    let registry = Arc::new(ResourceRegistry::builtin());
    let clock = FixedClock::parse(TIMESTAMP).unwrap();
    GeneratorService::new(default_emitters(registry), Box::new(clock))
}

pub fn config(format: IacFormat, provider: CloudProvider) -> GeneratorConfig {
    GeneratorConfig::builder()
        .format(format)
        .provider(provider)
        .project_name("webshop")
        .environment(Environment::Dev)
        .build()
        .unwrap()
}

/// A component bound on every provider.
pub fn component(name: &str, service_type: ServiceType) -> ArchitectureComponent {
    let (aws, azure, gcp) = match service_type {
        ServiceType::Compute => ("EC2", "Virtual Machines", "Compute Engine"),
        ServiceType::Database => ("RDS", "Azure Database for PostgreSQL", "Cloud SQL"),
        ServiceType::Cache => ("ElastiCache", "Azure Cache for Redis", "Memorystore"),
        ServiceType::Storage => ("S3", "Blob Storage", "Cloud Storage"),
        ServiceType::Queue => ("SQS", "Service Bus", "Pub/Sub"),
        ServiceType::Cdn => ("CloudFront", "Azure CDN", "Cloud CDN"),
        ServiceType::Networking => ("VPC", "Virtual Network", "VPC"),
        ServiceType::Monitoring => ("CloudWatch", "Azure Monitor", "Cloud Monitoring"),
        _ => ("Managed service", "Managed service", "Managed service"),
    };
    ArchitectureComponent::new(name, service_type)
        .with_binding(CloudProvider::Aws, ProviderBinding::new(aws, "standard", 20.0))
        .with_binding(CloudProvider::Azure, ProviderBinding::new(azure, "standard", 25.0))
        .with_binding(CloudProvider::Gcp, ProviderBinding::new(gcp, "standard", 18.0))
}

pub fn compute_and_database() -> Architecture {
    Architecture::new("starter")
        .with_component(component("api", ServiceType::Compute))
        .with_component(component("orders db", ServiceType::Database))
}

pub fn compute_database_cache() -> Architecture {
    compute_and_database().with_component(component("session cache", ServiceType::Cache))
}

/// One of every service type.
pub fn everything() -> Architecture {
    [
        ServiceType::Networking,
        ServiceType::Compute,
        ServiceType::Database,
        ServiceType::Cache,
        ServiceType::Storage,
        ServiceType::Queue,
        ServiceType::Cdn,
        ServiceType::LoadBalancer,
        ServiceType::Serverless,
        ServiceType::Search,
        ServiceType::Monitoring,
    ]
    .into_iter()
    .fold(Architecture::new("everything"), |arch, ty| {
        arch.with_component(component(&format!("{ty} unit"), ty))
    })
}

/// Every format/provider pair the capability table allows.
pub fn compatible_pairs() -> Vec<(IacFormat, CloudProvider)> {
    let mut pairs = Vec::new();
    for format in IacFormat::ALL {
        for provider in CloudProvider::ALL {
            if archforge_core::domain::capabilities::validate_compatibility(format, provider)
                .is_ok()
            {
                pairs.push((format, provider));
            }
        }
    }
    pairs
}

pub fn file<'a>(outputs: &'a [Output], name: &str) -> &'a str {
    outputs
        .iter()
        .find(|o| o.filename() == name)
        .map(|o| o.content.as_str())
        .unwrap_or_else(|| panic!("missing {name}"))
}

pub fn yaml_documents(text: &str) -> Vec<serde_yaml::Value> {
    serde_yaml::Deserializer::from_str(text)
        .map(serde_yaml::Value::deserialize)
        .collect::<Result<_, _>>()
        .unwrap()
}

/// `resource "` declarations in an HCL file.
pub fn resource_count(hcl: &str) -> usize {
    hcl.lines().filter(|l| l.starts_with("resource \"")).count()
}
