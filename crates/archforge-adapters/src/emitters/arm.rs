//! Azure Resource Manager emitter (Azure only).
//!
//! Produces `azuredeploy.json`, `azuredeploy.parameters.json` and an
//! executable `deploy.sh` wrapping `az deployment group create`.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use archforge_core::application::ports::{EmitContext, Emitter};
use archforge_core::domain::identifiers::ensure_unique;
use archforge_core::domain::{
    Architecture, Environment, FallbackPolicy, GeneratorConfig, Generation, IacFormat,
    IdentifierRules, Output, SyntaxLanguage,
};
use archforge_core::error::ArchforgeResult;

use super::{Walk, WalkOptions, walk};
use crate::registry::{Fragment, PLACEHOLDER_SECRET, RequirementKind, ResourceRegistry};
use crate::syntax::{comment_block, header_lines, json};

const OPTIONS: WalkOptions = WalkOptions {
    format: IacFormat::Arm,
    rules: IdentifierRules::LOGICAL_ID,
    reserved: &[],
    derived: crate::registry::arm::derived_keys,
    requires_binding: true,
    policy: FallbackPolicy::Placeholder,
};

const TEMPLATE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";
const PARAMETERS_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#";

pub struct ArmEmitter {
    registry: Arc<ResourceRegistry>,
}

impl ArmEmitter {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Emitter for ArmEmitter {
    fn format(&self) -> IacFormat {
        IacFormat::Arm
    }

    fn fallback_policy(&self) -> FallbackPolicy {
        OPTIONS.policy
    }

    #[instrument(skip_all, fields(architecture = %architecture.name))]
    fn emit(&self, architecture: &Architecture, ctx: &EmitContext) -> ArchforgeResult<Generation> {
        let config = &ctx.config;
        let walk = walk(&self.registry, architecture, config, OPTIONS);

        let resources: Vec<(&str, &Value)> = walk
            .fragments()
            .filter_map(|f| match f {
                Fragment::Resource { key, body } => Some((key.as_str(), body)),
                _ => None,
            })
            .collect();
        ensure_unique("azuredeploy.json", resources.iter().map(|(key, _)| *key))?;

        let template = template(architecture, ctx, &walk, &resources);
        let parameters = parameters_file(&walk, config);

        let mut generation = Generation::new();
        generation.push(Output::new(
            "azuredeploy.json",
            json::to_pretty(&template)?,
            SyntaxLanguage::Json,
        )?);
        generation.push(Output::new(
            "azuredeploy.parameters.json",
            json::to_pretty(&parameters)?,
            SyntaxLanguage::Json,
        )?);
        generation.push(
            Output::new("deploy.sh", deploy_script(ctx), SyntaxLanguage::Shell)?.executable(),
        );
        info!(
            resources = resources.len(),
            degraded = walk.degradations.len(),
            "ARM template emitted"
        );
        generation.degradations = walk.degradations;
        Ok(generation)
    }
}

/// Fixed parameters every template declares, before the fragment requirements.
fn base_parameters(config: &GeneratorConfig) -> Vec<(&'static str, Value)> {
    vec![
        (
            "location",
            json!({
                "type": "string",
                "defaultValue": "[resourceGroup().location]",
                "metadata": { "description": "Location for all resources" }
            }),
        ),
        (
            "environment",
            json!({
                "type": "string",
                "defaultValue": config.environment().as_str(),
                "allowedValues": Environment::ALL.map(|e| e.as_str()),
                "metadata": { "description": "Deployment environment" }
            }),
        ),
        (
            "projectName",
            json!({
                "type": "string",
                "defaultValue": config.name_root(),
                "metadata": { "description": "Prefix for every resource name" }
            }),
        ),
        (
            "adminUsername",
            json!({
                "type": "string",
                "defaultValue": "azureuser",
                "metadata": { "description": "Administrator login for VMs and databases" }
            }),
        ),
        (
            "adminPassword",
            json!({
                "type": "securestring",
                "metadata": { "description": "Administrator password for VMs and databases" }
            }),
        ),
    ]
}

fn template(
    architecture: &Architecture,
    ctx: &EmitContext,
    walk: &Walk<'_>,
    resources: &[(&str, &Value)],
) -> Value {
    let config = &ctx.config;

    let placeholders: Vec<Value> = walk
        .degraded()
        .map(|(step, reason)| {
            let binding = step.component.binding(config.provider());
            json!({
                "component": step.component.name,
                "serviceType": step.component.service_type.as_str(),
                "reason": reason,
                "intendedService": binding.map(|b| b.service.as_str()),
                "sku": binding.map(|b| b.sku.as_str()),
            })
        })
        .collect();

    let mut parameters: Map<String, Value> = base_parameters(config)
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    for requirement in &walk.requirements {
        let ty = match requirement.kind {
            RequirementKind::Secret => "securestring",
            RequirementKind::Text => "string",
            RequirementKind::List => "array",
        };
        let mut parameter = json!({
            "type": ty,
            "metadata": { "description": requirement.description }
        });
        if let Some(default) = &requirement.default {
            parameter["defaultValue"] = json!(default);
        }
        parameters.entry(requirement.name.clone()).or_insert(parameter);
    }

    let outputs = json::object(resources.iter().filter_map(|(key, body)| {
        output_expression(body).map(|value| {
            (
                format!("{key}Id"),
                json!({ "type": "string", "value": value }),
            )
        })
    }));

    json!({
        "$schema": TEMPLATE_SCHEMA,
        "contentVersion": "1.0.0.0",
        "metadata": {
            "generator": {
                "name": "archforge",
                "version": archforge_core::VERSION,
            },
            "generatedAt": ctx.timestamp(),
            "project": config.project_name(),
            "architecture": architecture.name,
            "placeholders": placeholders,
        },
        "parameters": parameters,
        "variables": {
            "commonTags": {
                "project": "[parameters('projectName')]",
                "environment": "[parameters('environment')]",
                "managedBy": "archforge"
            }
        },
        "resources": resources.iter().map(|(_, body)| (*body).clone()).collect::<Vec<_>>(),
        "outputs": outputs,
    })
}

/// `[resourceId(...)]` for a top-level resource; child types are skipped.
fn output_expression(body: &Value) -> Option<String> {
    let resource_type = body["type"].as_str()?;
    let name = body["name"].as_str()?;
    if resource_type.matches('/').count() != 1 {
        return None;
    }
    let name = match name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        Some(expression) => expression.to_string(),
        None => format!("'{name}'"),
    };
    Some(format!("[resourceId('{resource_type}', {name})]"))
}

fn parameters_file(walk: &Walk<'_>, config: &GeneratorConfig) -> Value {
    let mut values = Map::new();
    values.insert("location".into(), json!({ "value": config.region() }));
    values.insert(
        "environment".into(),
        json!({ "value": config.environment().as_str() }),
    );
    values.insert("projectName".into(), json!({ "value": config.name_root() }));
    values.insert("adminUsername".into(), json!({ "value": "azureuser" }));
    values.insert("adminPassword".into(), json!({ "value": PLACEHOLDER_SECRET }));

    for requirement in &walk.requirements {
        let value = match requirement.kind {
            RequirementKind::List => json!(requirement.example_items().collect::<Vec<_>>()),
            RequirementKind::Text | RequirementKind::Secret => json!(requirement.example),
        };
        values
            .entry(requirement.name.clone())
            .or_insert(json!({ "value": value }));
    }

    json!({
        "$schema": PARAMETERS_SCHEMA,
        "contentVersion": "1.0.0.0",
        "parameters": values,
    })
}

fn deploy_script(ctx: &EmitContext) -> String {
    let config = &ctx.config;
    let root = config.name_root();
    let env = config.environment();
    let header = header_lines("ARM deployment script", config.project_name(), &ctx.timestamp());

    let mut script = String::from("#!/usr/bin/env bash\n");
    script.push_str(&comment_block(&header));
    script.push_str(&format!(
        r#"set -euo pipefail

cd "$(dirname "$0")"

RESOURCE_GROUP="${{RESOURCE_GROUP:-{root}-{env}-rg}}"
LOCATION="${{LOCATION:-{region}}}"
DEPLOYMENT_NAME="{root}-{env}-$(date +%Y%m%d%H%M%S)"

if grep -q "{placeholder}" azuredeploy.parameters.json; then
  echo "Replace the placeholder secrets in azuredeploy.parameters.json first." >&2
  exit 1
fi

az group create --name "$RESOURCE_GROUP" --location "$LOCATION" --output none

az deployment group create \
  --name "$DEPLOYMENT_NAME" \
  --resource-group "$RESOURCE_GROUP" \
  --template-file azuredeploy.json \
  --parameters @azuredeploy.parameters.json
"#,
        region = config.region(),
        placeholder = PLACEHOLDER_SECRET,
    ));
    script
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use archforge_core::domain::{
        ArchitectureComponent, CloudProvider, Permissions, ProviderBinding, ServiceType,
    };

    use super::*;

    fn ctx() -> EmitContext {
        let config = GeneratorConfig::builder()
            .format(IacFormat::Arm)
            .provider(CloudProvider::Azure)
            .project_name("shop")
            .environment(Environment::Prod)
            .build()
            .unwrap();
        EmitContext::new(config, Utc.with_ymd_and_hms(2026, 5, 6, 7, 8, 9).unwrap())
    }

    fn architecture() -> Architecture {
        let azure = |service: &str, sku: &str| ProviderBinding::new(service, sku, 50.0);
        Architecture::new("web")
            .with_component(
                ArchitectureComponent::new("vnet", ServiceType::Networking)
                    .with_binding(CloudProvider::Azure, azure("Virtual Network", "standard")),
            )
            .with_component(
                ArchitectureComponent::new("web", ServiceType::Compute)
                    .with_binding(CloudProvider::Azure, azure("Virtual Machines", "Standard_B2s")),
            )
            .with_component(
                ArchitectureComponent::new("jobs", ServiceType::Queue)
                    .with_binding(CloudProvider::Azure, azure("Service Bus", "Standard")),
            )
    }

    fn emit() -> Generation {
        ArmEmitter::new(Arc::new(ResourceRegistry::builtin()))
            .emit(&architecture(), &ctx())
            .unwrap()
    }

    #[test]
    fn deploy_script_is_executable() {
        let generation = emit();
        let script = generation.file("deploy.sh").unwrap();
        assert_eq!(script.permissions, Permissions::executable());
        assert!(script.content.starts_with("#!/usr/bin/env bash\n# ARM deployment script for shop\n"));
        assert!(script.content.contains("az deployment group create"));
        assert!(script.content.contains("RESOURCE_GROUP:-shop-prod-rg"));
    }

    #[test]
    fn admin_password_is_secure_string() {
        let generation = emit();
        let template: Value =
            serde_json::from_str(&generation.file("azuredeploy.json").unwrap().content).unwrap();
        assert_eq!(template["parameters"]["adminPassword"]["type"], "securestring");
        assert_eq!(template["metadata"]["generatedAt"], "2026-05-06T07:08:09Z");
        // With a network sibling the NIC needs no subnetId parameter.
        assert!(template["parameters"].get("subnetId").is_none());
    }

    #[test]
    fn outputs_skip_child_resources() {
        let generation = emit();
        let template: Value =
            serde_json::from_str(&generation.file("azuredeploy.json").unwrap().content).unwrap();
        let outputs = template["outputs"].as_object().unwrap();
        assert!(outputs.contains_key("WebId"));
        assert!(outputs.contains_key("JobsId"));
        assert!(!outputs.contains_key("JobsQueueId"));
        assert!(
            outputs["WebId"]["value"]
                .as_str()
                .unwrap()
                .starts_with("[resourceId('Microsoft.Compute/virtualMachines', concat(")
        );
    }

    #[test]
    fn parameters_file_uses_placeholder_secret() {
        let generation = emit();
        let parameters: Value = serde_json::from_str(
            &generation.file("azuredeploy.parameters.json").unwrap().content,
        )
        .unwrap();
        assert_eq!(parameters["parameters"]["adminPassword"]["value"], PLACEHOLDER_SECRET);
        assert_eq!(parameters["parameters"]["location"]["value"], "eastus");
    }

    #[test]
    fn nic_name_of_a_vm_is_not_handed_to_another_component() {
        let azure = |service: &str| ProviderBinding::new(service, "Standard_B2s", 50.0);
        let architecture = Architecture::new("web")
            .with_component(
                ArchitectureComponent::new("web", ServiceType::Compute)
                    .with_binding(CloudProvider::Azure, azure("Virtual Machines")),
            )
            .with_component(
                ArchitectureComponent::new("web nic", ServiceType::Database)
                    .with_binding(CloudProvider::Azure, azure("PostgreSQL")),
            );

        let generation = ArmEmitter::new(Arc::new(ResourceRegistry::builtin()))
            .emit(&architecture, &ctx())
            .unwrap();
        let template: Value =
            serde_json::from_str(&generation.file("azuredeploy.json").unwrap().content).unwrap();
        let outputs = template["outputs"].as_object().unwrap();
        assert!(outputs.contains_key("WebId"));
        assert!(outputs.contains_key("WebNicId"));
        assert!(
            outputs["WebNic2Id"]["value"]
                .as_str()
                .unwrap()
                .starts_with("[resourceId('Microsoft.DBforPostgreSQL/flexibleServers'")
        );
    }
}
