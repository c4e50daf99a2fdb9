//! Kubernetes manifest fragments.
//!
//! Manifests do not depend on the cloud provider, so every generator is
//! registered for all providers. Within a component, dependencies come first
//! and the workload always precedes its Service.

use serde_json::{Value, json};

use archforge_core::domain::ServiceType;

use super::{FragmentContext, FragmentSet, MappingRow, PLACEHOLDER_SECRET, for_all_providers};

pub fn mappings() -> Vec<MappingRow> {
    for_all_providers(&[
        (ServiceType::Compute, compute),
        (ServiceType::Database, database),
        (ServiceType::Cache, cache),
        (ServiceType::Queue, queue),
        (ServiceType::Networking, networking),
    ])
}

/// Port every generated application container listens on.
pub const APP_PORT: u16 = 8080;

/// `app.kubernetes.io/*` labels shared by every object of a component.
pub fn labels(ctx: &FragmentContext<'_>) -> Value {
    json!({
        "app.kubernetes.io/name": ctx.id,
        "app.kubernetes.io/component": ctx.component.service_type.as_str(),
        "app.kubernetes.io/part-of": ctx.config.name_root(),
        "app.kubernetes.io/managed-by": "archforge",
        "environment": ctx.environment().as_str(),
    })
}

fn selector(ctx: &FragmentContext<'_>) -> Value {
    json!({ "app.kubernetes.io/name": ctx.id })
}

fn metadata(ctx: &FragmentContext<'_>, name: &str) -> Value {
    json!({
        "name": name,
        "namespace": ctx.config.name_root(),
        "labels": labels(ctx),
    })
}

fn service(ctx: &FragmentContext<'_>, ports: Value, headless: bool) -> Value {
    let mut spec = json!({ "selector": selector(ctx), "ports": ports });
    if headless {
        spec["clusterIP"] = json!("None");
    } else {
        spec["type"] = json!("ClusterIP");
    }
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": metadata(ctx, ctx.id),
        "spec": spec,
    })
}

fn port(name: &str, port: u16, target: u16) -> Value {
    json!({ "name": name, "port": port, "targetPort": target, "protocol": "TCP" })
}

/// Single-replica Deployment for an off-the-shelf image.
fn single_replica(ctx: &FragmentContext<'_>, image: &str, container_ports: Value) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": metadata(ctx, ctx.id),
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": selector(ctx) },
            "template": {
                "metadata": { "labels": labels(ctx) },
                "spec": {
                    "containers": [{
                        "name": ctx.id,
                        "image": image,
                        "ports": container_ports,
                        "resources": {
                            "requests": { "cpu": "100m", "memory": "128Mi" },
                            "limits": { "cpu": "500m", "memory": "512Mi" }
                        }
                    }]
                }
            }
        }
    })
}

fn compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    let replicas = ctx.environment().replicas();
    let image = format!("registry.example.com/{}/{}:latest", ctx.config.name_root(), ctx.id);

    let deployment = json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": metadata(ctx, ctx.id),
        "spec": {
            "replicas": replicas,
            "selector": { "matchLabels": selector(ctx) },
            "template": {
                "metadata": { "labels": labels(ctx) },
                "spec": {
                    "containers": [{
                        "name": ctx.id,
                        "image": image,
                        "ports": [{ "name": "http", "containerPort": APP_PORT }],
                        "env": [
                            { "name": "APP_ENV", "value": ctx.environment().as_str() },
                            { "name": "PORT", "value": APP_PORT.to_string() }
                        ],
                        "resources": {
                            "requests": { "cpu": "250m", "memory": "256Mi" },
                            "limits": { "cpu": "1", "memory": "1Gi" }
                        },
                        "readinessProbe": {
                            "httpGet": { "path": "/healthz", "port": "http" },
                            "initialDelaySeconds": 5,
                            "periodSeconds": 10
                        }
                    }]
                }
            }
        }
    });

    let hpa = json!({
        "apiVersion": "autoscaling/v2",
        "kind": "HorizontalPodAutoscaler",
        "metadata": metadata(ctx, ctx.id),
        "spec": {
            "scaleTargetRef": { "apiVersion": "apps/v1", "kind": "Deployment", "name": ctx.id },
            "minReplicas": replicas,
            "maxReplicas": replicas * 3 + 2,
            "metrics": [{
                "type": "Resource",
                "resource": {
                    "name": "cpu",
                    "target": { "type": "Utilization", "averageUtilization": 70 }
                }
            }]
        }
    });

    FragmentSet::new()
        .manifest(deployment)
        .manifest(service(ctx, json!([port("http", 80, APP_PORT)]), false))
        .manifest(hpa)
}

fn database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let secret_name = format!("{}-credentials", ctx.id);
    let claim_name = format!("{}-data", ctx.id);
    let storage = if ctx.environment().is_production() { "50Gi" } else { "10Gi" };

    let secret = json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": metadata(ctx, &secret_name),
        "type": "Opaque",
        "stringData": {
            "POSTGRES_USER": "dbadmin",
            "POSTGRES_PASSWORD": PLACEHOLDER_SECRET,
            "POSTGRES_DB": ctx.id.replace('-', "_"),
        }
    });

    let claim = json!({
        "apiVersion": "v1",
        "kind": "PersistentVolumeClaim",
        "metadata": metadata(ctx, &claim_name),
        "spec": {
            "accessModes": ["ReadWriteOnce"],
            "resources": { "requests": { "storage": storage } }
        }
    });

    let statefulset = json!({
        "apiVersion": "apps/v1",
        "kind": "StatefulSet",
        "metadata": metadata(ctx, ctx.id),
        "spec": {
            "serviceName": ctx.id,
            "replicas": 1,
            "selector": { "matchLabels": selector(ctx) },
            "template": {
                "metadata": { "labels": labels(ctx) },
                "spec": {
                    "containers": [{
                        "name": ctx.id,
                        "image": "postgres:16-alpine",
                        "ports": [{ "name": "postgres", "containerPort": 5432 }],
                        "envFrom": [{ "secretRef": { "name": secret_name } }],
                        "env": [{ "name": "PGDATA", "value": "/var/lib/postgresql/data/pgdata" }],
                        "volumeMounts": [{ "name": "data", "mountPath": "/var/lib/postgresql/data" }],
                        "resources": {
                            "requests": { "cpu": "250m", "memory": "512Mi" },
                            "limits": { "cpu": "1", "memory": "2Gi" }
                        }
                    }],
                    "volumes": [{
                        "name": "data",
                        "persistentVolumeClaim": { "claimName": claim_name }
                    }]
                }
            }
        }
    });

    FragmentSet::new()
        .manifest(secret)
        .manifest(claim)
        .manifest(statefulset)
        .manifest(service(ctx, json!([port("postgres", 5432, 5432)]), true))
}

fn cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .manifest(single_replica(
            ctx,
            "redis:7-alpine",
            json!([{ "name": "redis", "containerPort": 6379 }]),
        ))
        .manifest(service(ctx, json!([port("redis", 6379, 6379)]), false))
}

fn queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .manifest(single_replica(
            ctx,
            "rabbitmq:3-management-alpine",
            json!([
                { "name": "amqp", "containerPort": 5672 },
                { "name": "management", "containerPort": 15672 }
            ]),
        ))
        .manifest(service(
            ctx,
            json!([port("amqp", 5672, 5672), port("management", 15672, 15672)]),
            false,
        ))
}

fn networking(ctx: &FragmentContext<'_>) -> FragmentSet {
    let paths: Vec<Value> = ctx
        .siblings_of(ServiceType::Compute)
        .map(|svc| {
            json!({
                "path": format!("/{}", svc.id),
                "pathType": "Prefix",
                "backend": { "service": { "name": svc.id, "port": { "number": 80 } } }
            })
        })
        .collect();

    let mut spec = json!({ "ingressClassName": "nginx" });
    if !paths.is_empty() {
        spec["rules"] = json!([{
            "host": format!("{}.example.com", ctx.config.name_root()),
            "http": { "paths": paths }
        }]);
    }

    let ingress = json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": metadata(ctx, ctx.id),
        "spec": spec,
    });

    let policy = json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "NetworkPolicy",
        "metadata": metadata(ctx, ctx.id),
        "spec": {
            "podSelector": {
                "matchLabels": { "app.kubernetes.io/part-of": ctx.config.name_root() }
            },
            "policyTypes": ["Ingress"],
            "ingress": [{ "from": [{ "podSelector": {} }] }]
        }
    });

    FragmentSet::new().manifest(ingress).manifest(policy)
}
