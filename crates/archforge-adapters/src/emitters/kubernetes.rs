//! Kubernetes emitter.
//!
//! Layout under `k8s/`: the namespace, one file per mapped component,
//! combined `all-in-one` YAML and JSON `List` renderings, and a
//! `kustomization.yaml` listing the per-component files. The namespace is
//! always the first object. Unsupported components are omitted.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument};

use archforge_core::application::ports::{EmitContext, Emitter};
use archforge_core::domain::identifiers::ensure_unique;
use archforge_core::domain::{
    Architecture, FallbackPolicy, Generation, IacFormat, IdentifierRules, Output, SyntaxLanguage,
};
use archforge_core::error::ArchforgeResult;

use super::{Outcome, WalkOptions, no_derived_keys, walk};
use crate::registry::{Fragment, ResourceRegistry};
use crate::syntax::{header_lines, json, yaml};

const OPTIONS: WalkOptions = WalkOptions {
    format: IacFormat::Kubernetes,
    rules: IdentifierRules::KUBERNETES,
    // Fixed file names under k8s/
    reserved: &["namespace", "all-in-one", "kustomization"],
    derived: no_derived_keys,
    requires_binding: false,
    policy: FallbackPolicy::Omit,
};

pub struct KubernetesEmitter {
    registry: Arc<ResourceRegistry>,
}

impl KubernetesEmitter {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Emitter for KubernetesEmitter {
    fn format(&self) -> IacFormat {
        IacFormat::Kubernetes
    }

    fn fallback_policy(&self) -> FallbackPolicy {
        OPTIONS.policy
    }

    #[instrument(skip_all, fields(architecture = %architecture.name))]
    fn emit(&self, architecture: &Architecture, ctx: &EmitContext) -> ArchforgeResult<Generation> {
        let config = &ctx.config;
        let namespace = config.name_root();
        let walk = walk(&self.registry, architecture, config, OPTIONS);
        let header = header_lines("Kubernetes manifests", config.project_name(), &ctx.timestamp());

        let namespace_manifest = json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {
                "name": namespace,
                "labels": {
                    "app.kubernetes.io/part-of": namespace,
                    "app.kubernetes.io/managed-by": "archforge",
                    "environment": config.environment().as_str(),
                },
                "annotations": {
                    "archforge.io/generated-at": ctx.timestamp(),
                    "archforge.io/architecture": architecture.name,
                }
            }
        });

        let mut generation = Generation::new();
        generation.push(Output::new(
            "k8s/namespace.yaml",
            yaml::with_header(&header, &yaml::to_yaml(&namespace_manifest)?),
            SyntaxLanguage::Yaml,
        )?);

        let mut all = vec![namespace_manifest];
        let mut component_files = Vec::new();
        for step in &walk.steps {
            let Outcome::Mapped(fragments) = &step.outcome else {
                continue;
            };
            let manifests: Vec<Value> = fragments
                .iter()
                .filter_map(|f| match f {
                    Fragment::Manifest(manifest) => Some(manifest.clone()),
                    _ => None,
                })
                .collect();
            if manifests.is_empty() {
                continue;
            }

            let file = format!("{}.yaml", step.id);
            generation.push(Output::new(
                &format!("k8s/{file}"),
                yaml::with_header(&header, &yaml::to_multi_document(&manifests)?),
                SyntaxLanguage::Yaml,
            )?);
            component_files.push(file);
            all.extend(manifests);
        }

        let object_keys: Vec<String> = all
            .iter()
            .map(|m| {
                format!(
                    "{}/{}",
                    m["kind"].as_str().unwrap_or_default(),
                    m["metadata"]["name"].as_str().unwrap_or_default()
                )
            })
            .collect();
        ensure_unique("k8s/all-in-one.yaml", object_keys.iter().map(String::as_str))?;

        generation.push(Output::new(
            "k8s/all-in-one.yaml",
            yaml::with_header(&header, &yaml::to_multi_document(&all)?),
            SyntaxLanguage::Yaml,
        )?);

        let manifest_count = all.len();
        let list = json!({
            "apiVersion": "v1",
            "kind": "List",
            "metadata": {
                "annotations": { "archforge.io/generated-at": ctx.timestamp() }
            },
            "items": all,
        });
        generation.push(Output::new(
            "k8s/all-in-one.json",
            json::to_pretty(&list)?,
            SyntaxLanguage::Json,
        )?);

        let mut resources = vec!["namespace.yaml".to_string()];
        resources.extend(component_files);
        let kustomization = json!({
            "apiVersion": "kustomize.config.k8s.io/v1beta1",
            "kind": "Kustomization",
            "namespace": namespace,
            "resources": resources,
            "labels": [{
                "pairs": { "app.kubernetes.io/part-of": namespace },
                "includeSelectors": false
            }]
        });
        generation.push(Output::new(
            "k8s/kustomization.yaml",
            yaml::with_header(&header, &yaml::to_yaml(&kustomization)?),
            SyntaxLanguage::Yaml,
        )?);

        generation.degradations = walk.degradations;

        info!(manifests = manifest_count, "Kubernetes manifests emitted");
        Ok(generation)
    }
}
