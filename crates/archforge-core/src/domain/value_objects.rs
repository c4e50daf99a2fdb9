//! Domain value objects: CloudProvider, IacFormat, Environment, ServiceType,
//! SyntaxLanguage.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! They hold NO compatibility logic. Which format accepts which provider
//! lives in `capabilities.rs`. This file's only job is to define the types,
//! their string representations, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. For a format: add a `FormatDef` in `capabilities.rs`
//! 4. For a service type: register fragment generators in the adapters

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── CloudProvider ────────────────────────────────────────────────────────────

/// A cloud provider an architecture component can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 3] = [Self::Aws, Self::Azure, Self::Gcp];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Aws => "Amazon Web Services",
            Self::Azure => "Microsoft Azure",
            Self::Gcp => "Google Cloud Platform",
        }
    }

    /// Region used when a request does not name one.
    pub const fn default_region(&self) -> &'static str {
        match self {
            Self::Aws => "us-east-1",
            Self::Azure => "eastus",
            Self::Gcp => "us-central1",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" | "amazon" => Ok(Self::Aws),
            "azure" | "az" => Ok(Self::Azure),
            "gcp" | "google" => Ok(Self::Gcp),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

// ── IacFormat ────────────────────────────────────────────────────────────────

/// A target infrastructure-as-code ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IacFormat {
    /// Multi-cloud declarative configuration.
    Terraform,
    /// AWS-only JSON template.
    #[serde(rename = "cloudformation")]
    CloudFormation,
    /// Azure-only JSON template.
    Arm,
    /// Container-orchestration manifests.
    Kubernetes,
    /// Local multi-container runtime.
    DockerCompose,
}

impl IacFormat {
    pub const ALL: [IacFormat; 5] = [
        Self::Terraform,
        Self::CloudFormation,
        Self::Arm,
        Self::Kubernetes,
        Self::DockerCompose,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::CloudFormation => "cloudformation",
            Self::Arm => "arm",
            Self::Kubernetes => "kubernetes",
            Self::DockerCompose => "docker-compose",
        }
    }
}

impl fmt::Display for IacFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IacFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terraform" | "tf" | "hcl" => Ok(Self::Terraform),
            "cloudformation" | "cfn" => Ok(Self::CloudFormation),
            "arm" | "bicep-json" => Ok(Self::Arm),
            "kubernetes" | "k8s" => Ok(Self::Kubernetes),
            "docker-compose" | "compose" | "docker" => Ok(Self::DockerCompose),
            other => Err(DomainError::UnknownFormat(other.to_string())),
        }
    }
}

// ── Environment ──────────────────────────────────────────────────────────────

/// Deployment stage threaded into tags, labels and default parameter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Dev, Self::Staging, Self::Prod];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    /// Baseline replica count for horizontally scaled workloads.
    pub const fn replicas(&self) -> u32 {
        match self {
            Self::Dev => 1,
            Self::Staging => 2,
            Self::Prod => 3,
        }
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(DomainError::UnknownEnvironment(other.to_string())),
        }
    }
}

// ── ServiceType ──────────────────────────────────────────────────────────────

/// The abstract role a component plays, independent of any provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Compute,
    Database,
    Cache,
    Storage,
    Queue,
    Cdn,
    Networking,
    Serverless,
    LoadBalancer,
    Search,
    Monitoring,
}

impl ServiceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Storage => "storage",
            Self::Queue => "queue",
            Self::Cdn => "cdn",
            Self::Networking => "networking",
            Self::Serverless => "serverless",
            Self::LoadBalancer => "load_balancer",
            Self::Search => "search",
            Self::Monitoring => "monitoring",
        }
    }

    /// Whether the service keeps data that must survive restarts.
    pub const fn is_stateful(&self) -> bool {
        matches!(
            self,
            Self::Database | Self::Cache | Self::Queue | Self::Storage
        )
    }

    /// Whether the service is built from user code rather than a stock image.
    pub const fn is_buildable(&self) -> bool {
        matches!(self, Self::Compute)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "compute" | "vm" | "server" => Ok(Self::Compute),
            "database" | "db" => Ok(Self::Database),
            "cache" => Ok(Self::Cache),
            "storage" | "object_storage" => Ok(Self::Storage),
            "queue" | "messaging" => Ok(Self::Queue),
            "cdn" => Ok(Self::Cdn),
            "networking" | "network" => Ok(Self::Networking),
            "serverless" | "function" => Ok(Self::Serverless),
            "load_balancer" | "loadbalancer" | "lb" => Ok(Self::LoadBalancer),
            "search" => Ok(Self::Search),
            "monitoring" => Ok(Self::Monitoring),
            other => Err(DomainError::UnknownServiceType(other.to_string())),
        }
    }
}

// ── SyntaxLanguage ───────────────────────────────────────────────────────────

/// Language tag attached to an emitted file for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxLanguage {
    Hcl,
    Json,
    Yaml,
    Shell,
    Dockerfile,
    Dotenv,
}

impl SyntaxLanguage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hcl => "hcl",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Shell => "bash",
            Self::Dockerfile => "dockerfile",
            Self::Dotenv => "dotenv",
        }
    }

    /// Whether files in this language must parse as structured data.
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json | Self::Yaml)
    }
}

impl fmt::Display for SyntaxLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
