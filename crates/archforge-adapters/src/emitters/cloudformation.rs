//! CloudFormation emitter (AWS only).
//!
//! One template tree is built and serialized twice: `cloudformation.json`
//! and a commented `cloudformation.yaml`. Components without a mapping are
//! listed under `Metadata` so the stack still deploys.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use archforge_core::application::ports::{EmitContext, Emitter};
use archforge_core::domain::identifiers::ensure_unique;
use archforge_core::domain::{
    Architecture, Environment, FallbackPolicy, Generation, IacFormat, IdentifierRules, Output,
    SyntaxLanguage,
};
use archforge_core::error::ArchforgeResult;

use super::{Walk, WalkOptions, walk};
use crate::registry::{Fragment, RequirementKind, ResourceRegistry};
use crate::syntax::{header_lines, json, yaml};

const OPTIONS: WalkOptions = WalkOptions {
    format: IacFormat::CloudFormation,
    rules: IdentifierRules::LOGICAL_ID,
    reserved: &[],
    derived: crate::registry::cloudformation::derived_keys,
    requires_binding: true,
    policy: FallbackPolicy::Placeholder,
};

/// SSM path of the current Ubuntu 22.04 AMI.
const UBUNTU_AMI_PARAMETER: &str =
    "/aws/service/canonical/ubuntu/server/22.04/stable/current/amd64/hvm/ebs-gp2/ami-id";

pub struct CloudFormationEmitter {
    registry: Arc<ResourceRegistry>,
}

impl CloudFormationEmitter {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Emitter for CloudFormationEmitter {
    fn format(&self) -> IacFormat {
        IacFormat::CloudFormation
    }

    fn fallback_policy(&self) -> FallbackPolicy {
        OPTIONS.policy
    }

    #[instrument(skip_all, fields(architecture = %architecture.name))]
    fn emit(&self, architecture: &Architecture, ctx: &EmitContext) -> ArchforgeResult<Generation> {
        let walk = walk(&self.registry, architecture, &ctx.config, OPTIONS);

        let resources: Vec<(&str, &Value)> = walk
            .fragments()
            .filter_map(|f| match f {
                Fragment::Resource { key, body } => Some((key.as_str(), body)),
                _ => None,
            })
            .collect();
        ensure_unique("cloudformation.json", resources.iter().map(|(key, _)| *key))?;

        let template = template(architecture, ctx, &walk, &resources);
        let header = header_lines(
            "CloudFormation template",
            ctx.config.project_name(),
            &ctx.timestamp(),
        );

        let mut generation = Generation::new();
        generation.push(Output::new(
            "cloudformation.json",
            json::to_pretty(&template)?,
            SyntaxLanguage::Json,
        )?);
        generation.push(Output::new(
            "cloudformation.yaml",
            yaml::with_header(&header, &yaml::to_yaml(&template)?),
            SyntaxLanguage::Yaml,
        )?);
        info!(
            resources = resources.len(),
            degraded = walk.degradations.len(),
            "CloudFormation emitted"
        );
        generation.degradations = walk.degradations;
        Ok(generation)
    }
}

fn template(
    architecture: &Architecture,
    ctx: &EmitContext,
    walk: &Walk<'_>,
    resources: &[(&str, &Value)],
) -> Value {
    let config = &ctx.config;
    let mut template = Map::new();
    template.insert("AWSTemplateFormatVersion".into(), json!("2010-09-09"));
    template.insert(
        "Description".into(),
        json!(format!(
            "{} ({}) generated by archforge at {}",
            config.project_name(),
            architecture.name,
            ctx.timestamp()
        )),
    );

    let mut metadata = json!({
        "Archforge": {
            "GeneratedAt": ctx.timestamp(),
            "Architecture": architecture.name,
            "Environment": config.environment().as_str(),
        }
    });
    if let Some(variant) = &architecture.variant {
        metadata["Archforge"]["Variant"] = json!(variant);
    }
    let placeholders: Vec<Value> = walk
        .degraded()
        .map(|(step, reason)| {
            let binding = step.component.binding(config.provider());
            json!({
                "Component": step.component.name,
                "ServiceType": step.component.service_type.as_str(),
                "Reason": reason,
                "IntendedService": binding.map(|b| b.service.as_str()),
                "Sku": binding.map(|b| b.sku.as_str()),
            })
        })
        .collect();
    if !placeholders.is_empty() {
        metadata["Archforge"]["Placeholders"] = Value::Array(placeholders);
    }
    template.insert("Metadata".into(), metadata);

    template.insert("Parameters".into(), parameters(walk, config.environment()));

    template.insert(
        "Resources".into(),
        json::object(resources.iter().map(|(key, body)| (*key, (*body).clone()))),
    );

    template.insert(
        "Outputs".into(),
        json::object(resources.iter().map(|(key, body)| {
            let description = body["Type"].as_str().unwrap_or("resource").to_string();
            (
                format!("{key}Id"),
                json!({
                    "Description": description,
                    "Value": { "Ref": key },
                    "Export": { "Name": { "Fn::Sub": format!("${{AWS::StackName}}-{key}") } }
                }),
            )
        })),
    );

    Value::Object(template)
}

fn parameters(walk: &Walk<'_>, environment: Environment) -> Value {
    let mut parameters = Map::new();
    parameters.insert(
        "Environment".into(),
        json!({
            "Type": "String",
            "Default": environment.as_str(),
            "AllowedValues": Environment::ALL.map(|e| e.as_str()),
            "Description": "Deployment environment"
        }),
    );
    parameters.insert(
        "LatestAmiId".into(),
        json!({
            "Type": "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>",
            "Default": UBUNTU_AMI_PARAMETER,
            "Description": "AMI for EC2 instances"
        }),
    );

    for requirement in &walk.requirements {
        let mut parameter = match requirement.kind {
            RequirementKind::Secret => json!({
                "Type": "String",
                "NoEcho": true,
                "MinLength": 8,
            }),
            RequirementKind::Text => json!({ "Type": "String" }),
            RequirementKind::List => json!({ "Type": "CommaDelimitedList" }),
        };
        if let Some(default) = &requirement.default {
            parameter["Default"] = json!(default);
        }
        parameter["Description"] = json!(requirement.description);
        parameters.insert(requirement.name.clone(), parameter);
    }

    Value::Object(parameters)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use archforge_core::domain::{
        ArchitectureComponent, CloudProvider, GeneratorConfig, ProviderBinding, ServiceType,
    };

    use super::*;

    fn ctx() -> EmitContext {
        let config = GeneratorConfig::builder()
            .format(IacFormat::CloudFormation)
            .provider(CloudProvider::Aws)
            .project_name("shop")
            .build()
            .unwrap();
        EmitContext::new(config, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
    }

    fn architecture() -> Architecture {
        let aws = |service: &str, sku: &str| ProviderBinding::new(service, sku, 10.0);
        Architecture::new("web")
            .with_component(
                ArchitectureComponent::new("api", ServiceType::Compute)
                    .with_binding(CloudProvider::Aws, aws("EC2", "t3.small")),
            )
            .with_component(
                ArchitectureComponent::new("orders db", ServiceType::Database)
                    .with_binding(CloudProvider::Aws, aws("RDS", "db.t3.micro")),
            )
            .with_component(
                ArchitectureComponent::new("search", ServiceType::Search)
                    .with_binding(CloudProvider::Aws, aws("OpenSearch", "t3.small.search")),
            )
    }

    fn emit() -> Generation {
        CloudFormationEmitter::new(Arc::new(ResourceRegistry::builtin()))
            .emit(&architecture(), &ctx())
            .unwrap()
    }

    #[test]
    fn outputs_export_with_stack_prefix() {
        let generation = emit();
        let template: Value =
            serde_json::from_str(&generation.file("cloudformation.json").unwrap().content).unwrap();

        assert_eq!(template["Resources"]["Api"]["Type"], "AWS::EC2::Instance");
        assert_eq!(
            template["Outputs"]["OrdersDbId"]["Export"]["Name"]["Fn::Sub"],
            "${AWS::StackName}-OrdersDb"
        );
        assert_eq!(template["Parameters"]["DBPassword"]["NoEcho"], true);
    }

    #[test]
    fn unmapped_component_is_recorded_in_metadata() {
        let generation = emit();
        let template: Value =
            serde_json::from_str(&generation.file("cloudformation.json").unwrap().content).unwrap();

        let placeholder = &template["Metadata"]["Archforge"]["Placeholders"][0];
        assert_eq!(placeholder["Component"], "search");
        assert_eq!(placeholder["IntendedService"], "OpenSearch");
        assert!(template["Resources"].get("Search").is_none());
        assert_eq!(generation.degradations.len(), 1);
    }

    #[test]
    fn yaml_matches_json_tree() {
        let generation = emit();
        let json: Value =
            serde_json::from_str(&generation.file("cloudformation.json").unwrap().content).unwrap();
        let yaml_text = &generation.file("cloudformation.yaml").unwrap().content;
        assert!(yaml_text.starts_with("# CloudFormation template for shop\n"));
        let yaml: Value = serde_yaml::from_str(yaml_text).unwrap();
        assert_eq!(json, yaml);
    }

    fn emit_components(components: Vec<ArchitectureComponent>) -> Generation {
        let architecture = components
            .into_iter()
            .fold(Architecture::new("web"), Architecture::with_component);
        CloudFormationEmitter::new(Arc::new(ResourceRegistry::builtin()))
            .emit(&architecture, &ctx())
            .unwrap()
    }

    fn bound(name: &str, service_type: ServiceType, service: &str) -> ArchitectureComponent {
        ArchitectureComponent::new(name, service_type).with_binding(
            CloudProvider::Aws,
            ProviderBinding::new(service, "t3.small", 10.0),
        )
    }

    #[test]
    fn subnet_key_of_a_vpc_is_not_handed_to_another_component() {
        let generation = emit_components(vec![
            bound("core net", ServiceType::Networking, "VPC"),
            bound("core net subnet", ServiceType::Compute, "EC2"),
        ]);
        let template: Value =
            serde_json::from_str(&generation.file("cloudformation.json").unwrap().content).unwrap();

        assert_eq!(template["Resources"]["CoreNet"]["Type"], "AWS::EC2::VPC");
        assert_eq!(template["Resources"]["CoreNetSubnet"]["Type"], "AWS::EC2::Subnet");
        assert_eq!(
            template["Resources"]["CoreNetSubnet2"]["Type"],
            "AWS::EC2::Instance"
        );
    }

    #[test]
    fn degraded_network_is_not_referenced() {
        let generation = emit_components(vec![
            ArchitectureComponent::new("core net", ServiceType::Networking),
            bound("api", ServiceType::Compute, "EC2"),
        ]);
        let content = &generation.file("cloudformation.json").unwrap().content;
        let template: Value = serde_json::from_str(content).unwrap();

        assert!(template["Resources"]["Api"]["Properties"].get("SubnetId").is_none());
        assert!(template["Resources"].get("CoreNet").is_none());
        assert!(!content.contains("CoreNetSubnet"));
        assert_eq!(generation.degradations.len(), 1);
    }
}
