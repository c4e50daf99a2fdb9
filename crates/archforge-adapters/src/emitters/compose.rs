//! Docker Compose emitter.
//!
//! Produces `docker-compose.yml`, `.env.example`,
//! `docker-compose.override.yml` and, when something is buildable, a
//! `Dockerfile`. `depends_on` is filled in only after every service is known.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use archforge_core::application::ports::{EmitContext, Emitter};
use archforge_core::domain::identifiers::ensure_unique;
use archforge_core::domain::{
    Architecture, FallbackPolicy, GeneratorConfig, Generation, IacFormat, IdentifierRules, Output,
    ServiceType, SyntaxLanguage,
};
use archforge_core::error::ArchforgeResult;

use super::{Outcome, Walk, WalkOptions, no_derived_keys, placeholder_lines, walk};
use crate::registry::compose::FIRST_APP_PORT;
use crate::registry::{Fragment, ResourceRegistry};
use crate::syntax::{comment_block, header_lines, json, yaml};

const OPTIONS: WalkOptions = WalkOptions {
    format: IacFormat::DockerCompose,
    rules: IdentifierRules::COMPOSE,
    reserved: &[],
    derived: no_derived_keys,
    requires_binding: false,
    policy: FallbackPolicy::Placeholder,
};

/// A service as assembled from its fragment.
struct Service<'a> {
    name: &'a str,
    service_type: ServiceType,
    body: Value,
    volumes: &'a [String],
}

pub struct ComposeEmitter {
    registry: Arc<ResourceRegistry>,
}

impl ComposeEmitter {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Emitter for ComposeEmitter {
    fn format(&self) -> IacFormat {
        IacFormat::DockerCompose
    }

    fn fallback_policy(&self) -> FallbackPolicy {
        OPTIONS.policy
    }

    #[instrument(skip_all, fields(architecture = %architecture.name))]
    fn emit(&self, architecture: &Architecture, ctx: &EmitContext) -> ArchforgeResult<Generation> {
        let config = &ctx.config;
        let walk = walk(&self.registry, architecture, config, OPTIONS);
        let header = header_lines("Docker Compose stack", config.project_name(), &ctx.timestamp());

        let mut services = collect_services(&walk);
        ensure_unique("docker-compose.yml", services.iter().map(|s| s.name))?;
        link_dependencies(&mut services);

        let has_buildable = services.iter().any(|s| s.service_type.is_buildable());

        let mut generation = Generation::new();
        generation.push(Output::new(
            "docker-compose.yml",
            compose_file(&walk, &services, config, &header)?,
            SyntaxLanguage::Yaml,
        )?);
        generation.push(Output::new(
            ".env.example",
            env_example(&walk, config, &header),
            SyntaxLanguage::Dotenv,
        )?);
        generation.push(Output::new(
            "docker-compose.override.yml",
            override_file(&services, &header)?,
            SyntaxLanguage::Yaml,
        )?);
        if has_buildable {
            generation.push(Output::new(
                "Dockerfile",
                dockerfile(&header),
                SyntaxLanguage::Dockerfile,
            )?);
        }
        info!(
            services = services.len(),
            degraded = walk.degradations.len(),
            "Compose stack emitted"
        );
        generation.degradations = walk.degradations;
        Ok(generation)
    }
}

fn collect_services<'a>(walk: &'a Walk<'_>) -> Vec<Service<'a>> {
    walk.steps
        .iter()
        .filter_map(|step| match &step.outcome {
            Outcome::Mapped(fragments) => Some((step, fragments)),
            Outcome::Degraded(_) => None,
        })
        .flat_map(|(step, fragments)| {
            fragments.iter().filter_map(move |f| match f {
                Fragment::Service {
                    name,
                    body,
                    volumes,
                } => Some(Service {
                    name,
                    service_type: step.component.service_type,
                    body: body.clone(),
                    volumes,
                }),
                _ => None,
            })
        })
        .collect()
}

/// Buildable services wait for every non-buildable one.
fn link_dependencies(services: &mut [Service<'_>]) {
    let backing: Vec<String> = services
        .iter()
        .filter(|s| !s.service_type.is_buildable())
        .map(|s| s.name.to_string())
        .collect();
    if backing.is_empty() {
        return;
    }
    for service in services.iter_mut().filter(|s| s.service_type.is_buildable()) {
        service.body["depends_on"] = json!(backing);
    }
}

fn compose_file(
    walk: &Walk<'_>,
    services: &[Service<'_>],
    config: &GeneratorConfig,
    header: &[String],
) -> ArchforgeResult<String> {
    let network = config.name_root();

    let mut service_map = Map::new();
    let mut volume_map = Map::new();
    for service in services {
        service_map.insert(service.name.to_string(), service.body.clone());
        for volume in service.volumes {
            volume_map.insert(volume.clone(), json!({}));
        }
    }

    let mut document = Map::new();
    document.insert("name".into(), json!(&network));
    document.insert("services".into(), Value::Object(service_map));
    if !volume_map.is_empty() {
        document.insert("volumes".into(), Value::Object(volume_map));
    }
    document.insert(
        "networks".into(),
        json::object([(network, json!({ "driver": "bridge" }))]),
    );

    let mut text = yaml::with_header(header, &yaml::to_yaml(&Value::Object(document))?);

    let placeholders: Vec<String> = walk
        .degraded()
        .flat_map(|(step, reason)| placeholder_lines(step, reason, config))
        .collect();
    if !placeholders.is_empty() {
        text.push('\n');
        text.push_str(&comment_block(&placeholders));
    }
    Ok(text)
}

fn env_example(walk: &Walk<'_>, config: &GeneratorConfig, header: &[String]) -> String {
    let mut out = comment_block(header);
    out.push_str("# Copy to .env and replace every placeholder.\n\n");
    out.push_str(&format!("COMPOSE_PROJECT_NAME={}\n", config.name_root()));
    out.push_str(&format!("APP_ENV={}\n", config.environment()));

    for requirement in &walk.requirements {
        out.push_str(&format!("\n# {}\n", requirement.description));
        out.push_str(&format!("{}={}\n", requirement.name, requirement.example));
    }
    out
}

/// Host ports published for local development, by service type.
fn dev_ports(service_type: ServiceType) -> &'static [&'static str] {
    match service_type {
        ServiceType::Database => &["5432:5432"],
        ServiceType::Cache => &["6379:6379"],
        ServiceType::Queue => &["5672:5672", "15672:15672"],
        ServiceType::Storage => &["9000:9000", "9001:9001"],
        _ => &[],
    }
}

fn override_file(services: &[Service<'_>], header: &[String]) -> ArchforgeResult<String> {
    let mut overrides = Map::new();
    for service in services {
        let body = if service.service_type.is_buildable() {
            json!({
                "environment": { "APP_ENV": "dev", "LOG_LEVEL": "debug" },
                "volumes": ["./:/app"],
            })
        } else {
            let ports = dev_ports(service.service_type);
            if ports.is_empty() {
                continue;
            }
            json!({ "ports": ports })
        };
        overrides.insert(service.name.to_string(), body);
    }

    let document = json!({ "services": overrides });
    let mut lines = header.to_vec();
    lines.push("Local development overrides; merged automatically by `docker compose up`.".into());
    Ok(yaml::with_header(&lines, &yaml::to_yaml(&document)?))
}

fn dockerfile(header: &[String]) -> String {
    let mut out = comment_block(header);
    out.push_str(&format!(
        r#"# Shared build definition for every buildable service.
# Replace the build stage with your toolchain.

FROM alpine:3.20 AS build
WORKDIR /src
COPY . .
RUN echo "add build steps here"

FROM alpine:3.20
WORKDIR /app
COPY --from=build /src /app
ENV PORT={FIRST_APP_PORT}
EXPOSE {FIRST_APP_PORT}
USER nobody
CMD ["sh", "-c", "echo 'replace CMD with the application entrypoint' && sleep infinity"]
"#
    ));
    out
}
