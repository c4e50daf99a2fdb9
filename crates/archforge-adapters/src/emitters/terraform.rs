//! Terraform emitter (AWS, Azure, GCP).
//!
//! Produces `main.tf`, `variables.tf`, `terraform.tfvars.example` and
//! `outputs.tf`. The provider preamble defines everything the fragments
//! reference implicitly (`local.common_tags`, the Azure resource group, the
//! Ubuntu AMI lookup); everything else is declared in `variables.tf`.

use std::sync::Arc;

use tracing::{info, instrument};

use archforge_core::application::ports::{EmitContext, Emitter};
use archforge_core::domain::identifiers::ensure_unique;
use archforge_core::domain::{
    Architecture, CloudProvider, FallbackPolicy, GeneratorConfig, Generation, IacFormat,
    IdentifierRules, Output, ServiceType, SyntaxLanguage,
};
use archforge_core::error::ArchforgeResult;

use super::{Outcome, Walk, WalkOptions, no_derived_keys, placeholder_lines, walk};
use crate::registry::{Fragment, RequirementKind, ResourceRegistry};
use crate::syntax::{comment_block, header_lines};
use crate::syntax::hcl::{Block, Expr, HclWriter, TopLevel};

const OPTIONS: WalkOptions = WalkOptions {
    format: IacFormat::Terraform,
    rules: IdentifierRules::TERRAFORM,
    // azurerm_resource_group.main
    reserved: &["main"],
    derived: no_derived_keys,
    requires_binding: true,
    policy: FallbackPolicy::Placeholder,
};

pub struct TerraformEmitter {
    registry: Arc<ResourceRegistry>,
}

impl TerraformEmitter {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Emitter for TerraformEmitter {
    fn format(&self) -> IacFormat {
        IacFormat::Terraform
    }

    fn fallback_policy(&self) -> FallbackPolicy {
        OPTIONS.policy
    }

    #[instrument(skip_all, fields(architecture = %architecture.name, provider = %ctx.config.provider()))]
    fn emit(&self, architecture: &Architecture, ctx: &EmitContext) -> ArchforgeResult<Generation> {
        let config = &ctx.config;
        let walk = walk(&self.registry, architecture, config, OPTIONS);
        let header = header_lines("Terraform configuration", config.project_name(), &ctx.timestamp());

        let blocks: Vec<&Block> = walk
            .fragments()
            .filter_map(|f| match f {
                Fragment::Hcl(block) => Some(block),
                _ => None,
            })
            .collect();
        let addresses: Vec<String> = blocks.iter().map(|b| b.address()).collect();
        ensure_unique("main.tf", addresses.iter().map(String::as_str))?;

        let mut generation = Generation::new();
        generation.push(Output::new(
            "main.tf",
            main_tf(&walk, config, &header),
            SyntaxLanguage::Hcl,
        )?);
        generation.push(Output::new(
            "variables.tf",
            variables_tf(&walk, config, &header),
            SyntaxLanguage::Hcl,
        )?);
        generation.push(Output::new(
            "terraform.tfvars.example",
            tfvars_example(&walk, config, &header),
            SyntaxLanguage::Hcl,
        )?);
        generation.push(Output::new(
            "outputs.tf",
            outputs_tf(&walk, &header),
            SyntaxLanguage::Hcl,
        )?);
        info!(
            resources = blocks.len(),
            files = generation.outputs.len(),
            degraded = walk.degradations.len(),
            "Terraform emitted"
        );
        generation.degradations = walk.degradations;
        Ok(generation)
    }
}

fn main_tf(walk: &Walk<'_>, config: &GeneratorConfig, header: &[String]) -> String {
    let mut items = vec![TopLevel::Comment(header.to_vec())];
    items.extend(preamble(walk, config.provider()).into_iter().map(TopLevel::Block));

    for step in &walk.steps {
        match &step.outcome {
            Outcome::Mapped(fragments) => {
                items.push(TopLevel::Comment(vec![format!(
                    "{} ({})",
                    step.component.name, step.component.service_type
                )]));
                items.extend(fragments.iter().filter_map(|f| match f {
                    Fragment::Hcl(block) => Some(TopLevel::Block(block.clone())),
                    _ => None,
                }));
            }
            Outcome::Degraded(reason) => {
                items.push(TopLevel::Comment(placeholder_lines(step, *reason, config)));
            }
        }
    }

    HclWriter::render(&items)
}

fn required_provider(provider: CloudProvider) -> (&'static str, &'static str, &'static str) {
    match provider {
        CloudProvider::Aws => ("aws", "hashicorp/aws", "~> 5.0"),
        CloudProvider::Azure => ("azurerm", "hashicorp/azurerm", "~> 3.0"),
        CloudProvider::Gcp => ("google", "hashicorp/google", "~> 5.0"),
    }
}

fn preamble(walk: &Walk<'_>, provider: CloudProvider) -> Vec<Block> {
    let (local_name, source, version) = required_provider(provider);
    let mut blocks = vec![
        Block::new("terraform")
            .attr("required_version", ">= 1.5.0")
            .block(Block::new("required_providers").attr(
                local_name,
                Expr::Object(vec![
                    ("source".into(), Expr::str(source)),
                    ("version".into(), Expr::str(version)),
                ]),
            )),
    ];

    let project = Expr::var("project_name");
    let environment = Expr::var("environment");
    let managed_by = Expr::str("archforge");

    match provider {
        CloudProvider::Aws => {
            blocks.push(
                Block::new("provider")
                    .label("aws")
                    .attr("region", Expr::var("region"))
                    .block(Block::new("default_tags").attr("tags", Expr::raw("local.common_tags"))),
            );
            blocks.push(common_locals(
                "common_tags",
                [("Project", project), ("Environment", environment), ("ManagedBy", managed_by)],
            ));
            if has_mapped(walk, ServiceType::Compute) {
                blocks.push(
                    Block::data("aws_ami", "ubuntu")
                        .attr("most_recent", true)
                        .attr("owners", Expr::list(["099720109477"]))
                        .block(
                            Block::new("filter").attr("name", "name").attr(
                                "values",
                                Expr::list(["ubuntu/images/hvm-ssd/ubuntu-jammy-22.04-amd64-server-*"]),
                            ),
                        ),
                );
            }
        }
        CloudProvider::Azure => {
            blocks.push(Block::new("provider").label("azurerm").block(Block::new("features")));
            blocks.push(common_locals(
                "common_tags",
                [("Project", project), ("Environment", environment), ("ManagedBy", managed_by)],
            ));
            blocks.push(
                Block::resource("azurerm_resource_group", "main")
                    .attr("name", Expr::template("${var.project_name}-${var.environment}-rg"))
                    .attr("location", Expr::var("region"))
                    .attr("tags", Expr::raw("local.common_tags")),
            );
        }
        CloudProvider::Gcp => {
            blocks.push(
                Block::new("provider")
                    .label("google")
                    .attr("project", Expr::var("gcp_project_id"))
                    .attr("region", Expr::var("region")),
            );
            blocks.push(common_locals(
                "common_labels",
                [("project", project), ("environment", environment), ("managed_by", managed_by)],
            ));
        }
    }

    blocks
}

fn common_locals<const N: usize>(name: &str, entries: [(&str, Expr); N]) -> Block {
    Block::new("locals").attr(
        name,
        Expr::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
    )
}

fn has_mapped(walk: &Walk<'_>, service_type: ServiceType) -> bool {
    walk.steps.iter().any(|s| {
        s.component.service_type == service_type && matches!(s.outcome, Outcome::Mapped(_))
    })
}

/// Built-in variables: `(name, description, default)`.
fn base_variables(config: &GeneratorConfig) -> Vec<(&'static str, &'static str, Option<String>)> {
    let mut vars = vec![
        ("project_name", "Prefix for every resource name", Some(config.name_root())),
        (
            "environment",
            "Deployment environment (dev, staging or prod)",
            Some(config.environment().to_string()),
        ),
        ("region", "Region resources are created in", Some(config.region().to_string())),
    ];
    if config.provider() == CloudProvider::Gcp {
        vars.push(("gcp_project_id", "GCP project resources are created in", None));
    }
    vars
}

fn variables_tf(walk: &Walk<'_>, config: &GeneratorConfig, header: &[String]) -> String {
    let mut items = vec![TopLevel::Comment(header.to_vec())];

    for (name, description, default) in base_variables(config) {
        let mut block = Block::new("variable")
            .label(name)
            .attr("description", description)
            .attr("type", Expr::raw("string"))
            .attr_opt("default", default.map(Expr::str));
        if name == "environment" {
            block = block.block(
                Block::new("validation")
                    .attr(
                        "condition",
                        Expr::raw("contains([\"dev\", \"staging\", \"prod\"], var.environment)"),
                    )
                    .attr("error_message", "environment must be dev, staging or prod."),
            );
        }
        items.push(TopLevel::Block(block));
    }

    for requirement in &walk.requirements {
        let ty = match requirement.kind {
            RequirementKind::List => "list(string)",
            RequirementKind::Text | RequirementKind::Secret => "string",
        };
        let mut block = Block::new("variable")
            .label(&requirement.name)
            .attr("description", requirement.description.as_str())
            .attr("type", Expr::raw(ty))
            .attr_opt("default", requirement.default.clone().map(Expr::Str));
        if requirement.is_secret() {
            block = block.attr("sensitive", true);
        }
        items.push(TopLevel::Block(block));
    }

    HclWriter::render(&items)
}

fn tfvars_example(walk: &Walk<'_>, config: &GeneratorConfig, header: &[String]) -> String {
    let mut assignments: Vec<(String, Expr)> = base_variables(config)
        .into_iter()
        .map(|(name, _, default)| {
            let value = default.unwrap_or_else(|| "my-gcp-project".to_string());
            (name.to_string(), Expr::Str(value))
        })
        .collect();

    for requirement in &walk.requirements {
        let value = match requirement.kind {
            RequirementKind::List => Expr::list(requirement.example_items()),
            RequirementKind::Text | RequirementKind::Secret => Expr::str(requirement.example.as_str()),
        };
        assignments.push((requirement.name.clone(), value));
    }

    let mut out = comment_block(header);
    out.push_str("# Copy to terraform.tfvars and replace every placeholder.\n\n");
    out.push_str(&HclWriter::render_assignments(&assignments));
    out
}

fn outputs_tf(walk: &Walk<'_>, header: &[String]) -> String {
    let mut items = vec![TopLevel::Comment(header.to_vec())];

    for step in &walk.steps {
        let Outcome::Mapped(fragments) = &step.outcome else {
            continue;
        };
        // The last resource of a component is its primary one (the VM after its NIC).
        let primary = fragments.iter().rev().find_map(|f| match f {
            Fragment::Hcl(block) if block.is_resource() => Some(block),
            _ => None,
        });
        if let Some(block) = primary {
            items.push(TopLevel::Block(
                Block::new("output")
                    .label(format!("{}_id", step.id))
                    .attr(
                        "description",
                        format!("ID of {} ({})", step.component.name, step.component.service_type),
                    )
                    .attr("value", Expr::raw(format!("{}.id", block.address()))),
            ));
        }
    }

    HclWriter::render(&items)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use archforge_core::domain::{ArchitectureComponent, ProviderBinding};

    use super::*;

    fn ctx(provider: CloudProvider) -> EmitContext {
        let config = GeneratorConfig::builder()
            .format(IacFormat::Terraform)
            .provider(provider)
            .project_name("Shop")
            .build()
            .unwrap();
        EmitContext::new(config, Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
    }

    fn emitter() -> TerraformEmitter {
        TerraformEmitter::new(Arc::new(ResourceRegistry::builtin()))
    }

    #[test]
    fn header_carries_project_and_timestamp() {
        let generation = emitter()
            .emit(&Architecture::new("empty"), &ctx(CloudProvider::Aws))
            .unwrap();
        let main = &generation.file("main.tf").unwrap().content;
        assert!(main.starts_with("# Terraform configuration for Shop\n"));
        assert!(main.contains("2026-01-02T03:04:05Z"));
        assert!(!main.contains("aws_ami"));
    }

    #[test]
    fn gcp_declares_project_variable() {
        let generation = emitter()
            .emit(&Architecture::new("empty"), &ctx(CloudProvider::Gcp))
            .unwrap();
        let vars = &generation.file("variables.tf").unwrap().content;
        assert!(vars.contains("variable \"gcp_project_id\""));
        let main = &generation.file("main.tf").unwrap().content;
        assert!(main.contains("project = var.gcp_project_id"));
    }

    #[test]
    fn azure_outputs_point_at_the_vm() {
        let architecture = Architecture::new("a").with_component(
            ArchitectureComponent::new("web", ServiceType::Compute).with_binding(
                CloudProvider::Azure,
                ProviderBinding::new("Virtual Machines", "Standard_B2s", 30.0),
            ),
        );
        let generation = emitter().emit(&architecture, &ctx(CloudProvider::Azure)).unwrap();
        let outputs = &generation.file("outputs.tf").unwrap().content;
        assert!(outputs.contains("azurerm_linux_virtual_machine.web.id"));
        let vars = &generation.file("variables.tf").unwrap().content;
        assert!(vars.contains("variable \"admin_password\""));
        assert!(vars.contains("sensitive   = true"));
    }

    #[test]
    fn list_requirement_example_is_a_list_of_ids() {
        let architecture = Architecture::new("a").with_component(
            ArchitectureComponent::new("edge", ServiceType::LoadBalancer)
                .with_binding(CloudProvider::Aws, ProviderBinding::new("ALB", "standard", 20.0)),
        );
        let generation = emitter().emit(&architecture, &ctx(CloudProvider::Aws)).unwrap();
        let tfvars = &generation.file("terraform.tfvars.example").unwrap().content;

        let line = tfvars
            .lines()
            .find(|line| line.starts_with("subnet_ids"))
            .unwrap();
        let (_, value) = line.split_once('=').unwrap();
        let items: Vec<&str> = value
            .trim()
            .strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .unwrap()
            .split(", ")
            .map(|item| item.trim_matches('"'))
            .collect();
        assert_eq!(
            items,
            vec!["subnet-00000000000000000", "subnet-11111111111111111"]
        );
    }

    #[test]
    fn line_break_in_a_name_stays_inside_the_comment() {
        let architecture = Architecture::new("a")
            .with_component(
                ArchitectureComponent::new("Web\nServer", ServiceType::Compute).with_binding(
                    CloudProvider::Aws,
                    ProviderBinding::new("EC2", "t3.small", 15.0),
                ),
            )
            .with_component(ArchitectureComponent::new("Metrics\nStack", ServiceType::Monitoring));
        let generation = emitter().emit(&architecture, &ctx(CloudProvider::Aws)).unwrap();
        let main = &generation.file("main.tf").unwrap().content;

        assert!(main.contains("# Web\n# Server (compute)\n"));
        assert!(main.contains("resource \"aws_instance\" \"web_server\""));
        assert!(
            main.lines()
                .all(|line| !line.starts_with("Server") && !line.starts_with("Stack")),
            "{main}"
        );
    }
}
