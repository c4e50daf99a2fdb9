//! Docker Compose service fragments.
//!
//! Provider-neutral, like the Kubernetes fragments. Stateful services own one
//! named volume each; `depends_on` for buildable services is filled in by the
//! emitter once every service is known.

use serde_json::{Value, json};

use archforge_core::domain::ServiceType;

use super::{Fragment, FragmentContext, FragmentSet, MappingRow, Requirement, for_all_providers};

pub fn mappings() -> Vec<MappingRow> {
    for_all_providers(&[
        (ServiceType::Compute, compute),
        (ServiceType::Database, database),
        (ServiceType::Cache, cache),
        (ServiceType::Queue, queue),
        (ServiceType::Storage, storage),
        (ServiceType::LoadBalancer, load_balancer),
    ])
}

/// First host port handed to buildable services.
pub const FIRST_APP_PORT: u16 = 8080;

/// `<service>-data`
pub fn volume_name(service: &str) -> String {
    format!("{service}-data")
}

fn service(ctx: &FragmentContext<'_>, body: Value, volumes: Vec<String>) -> Fragment {
    Fragment::Service {
        name: ctx.id.to_string(),
        body,
        volumes,
    }
}

fn networks(ctx: &FragmentContext<'_>) -> Value {
    json!([ctx.config.name_root()])
}

/// Env var name prefix derived from the service name, e.g. `ORDERS_DB`.
fn env_prefix(ctx: &FragmentContext<'_>) -> String {
    ctx.id.replace('-', "_").to_ascii_uppercase()
}

fn compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    // Host ports follow declaration order among buildable services.
    let index = ctx
        .siblings
        .iter()
        .filter(|s| s.service_type.is_buildable())
        .position(|s| s.id == ctx.id)
        .unwrap_or(0);
    let host_port = FIRST_APP_PORT as usize + index;

    let body = json!({
        "build": { "context": ".", "dockerfile": "Dockerfile" },
        "image": format!("{}/{}:latest", ctx.config.name_root(), ctx.id),
        "restart": "unless-stopped",
        "env_file": [".env"],
        "environment": {
            "APP_ENV": ctx.environment().as_str(),
            "PORT": FIRST_APP_PORT.to_string(),
        },
        "ports": [format!("{host_port}:{FIRST_APP_PORT}")],
        "networks": networks(ctx),
    });

    FragmentSet::new().fragment(service(ctx, body, Vec::new()))
}

fn database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let prefix = env_prefix(ctx);
    let volume = volume_name(ctx.id);
    let user_var = format!("{prefix}_USER");
    let password_var = format!("{prefix}_PASSWORD");

    let body = json!({
        "image": "postgres:16-alpine",
        "restart": "unless-stopped",
        "environment": {
            "POSTGRES_USER": format!("${{{user_var}:-dbadmin}}"),
            "POSTGRES_PASSWORD": format!("${{{password_var}:?set {password_var} in .env}}"),
            "POSTGRES_DB": ctx.id.replace('-', "_"),
        },
        "volumes": [format!("{volume}:/var/lib/postgresql/data")],
        "healthcheck": {
            "test": ["CMD-SHELL", "pg_isready -U $${POSTGRES_USER}"],
            "interval": "10s",
            "timeout": "5s",
            "retries": 5
        },
        "networks": networks(ctx),
    });

    FragmentSet::new()
        .fragment(service(ctx, body, vec![volume]))
        .requires(Requirement::text(&user_var, "Database user", "dbadmin"))
        .requires(Requirement::secret(&password_var, "Database password"))
}

fn cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    let volume = volume_name(ctx.id);
    let body = json!({
        "image": "redis:7-alpine",
        "restart": "unless-stopped",
        "command": ["redis-server", "--appendonly", "yes"],
        "volumes": [format!("{volume}:/data")],
        "healthcheck": {
            "test": ["CMD", "redis-cli", "ping"],
            "interval": "10s",
            "timeout": "5s",
            "retries": 5
        },
        "networks": networks(ctx),
    });
    FragmentSet::new().fragment(service(ctx, body, vec![volume]))
}

fn queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    let prefix = env_prefix(ctx);
    let volume = volume_name(ctx.id);
    let user_var = format!("{prefix}_USER");
    let password_var = format!("{prefix}_PASSWORD");

    let body = json!({
        "image": "rabbitmq:3-management-alpine",
        "restart": "unless-stopped",
        "environment": {
            "RABBITMQ_DEFAULT_USER": format!("${{{user_var}:-guest}}"),
            "RABBITMQ_DEFAULT_PASS": format!("${{{password_var}:?set {password_var} in .env}}"),
        },
        "volumes": [format!("{volume}:/var/lib/rabbitmq")],
        "networks": networks(ctx),
    });

    FragmentSet::new()
        .fragment(service(ctx, body, vec![volume]))
        .requires(Requirement::text(&user_var, "Message broker user", "guest"))
        .requires(Requirement::secret(&password_var, "Message broker password"))
}

fn storage(ctx: &FragmentContext<'_>) -> FragmentSet {
    let prefix = env_prefix(ctx);
    let volume = volume_name(ctx.id);
    let user_var = format!("{prefix}_ROOT_USER");
    let password_var = format!("{prefix}_ROOT_PASSWORD");

    let body = json!({
        "image": "minio/minio:latest",
        "restart": "unless-stopped",
        "command": ["server", "/data", "--console-address", ":9001"],
        "environment": {
            "MINIO_ROOT_USER": format!("${{{user_var}:-minioadmin}}"),
            "MINIO_ROOT_PASSWORD": format!("${{{password_var}:?set {password_var} in .env}}"),
        },
        "volumes": [format!("{volume}:/data")],
        "networks": networks(ctx),
    });

    FragmentSet::new()
        .fragment(service(ctx, body, vec![volume]))
        .requires(Requirement::text(&user_var, "Object storage root user", "minioadmin"))
        .requires(Requirement::secret(&password_var, "Object storage root password"))
}

fn load_balancer(ctx: &FragmentContext<'_>) -> FragmentSet {
    let body = json!({
        "image": "nginx:1.27-alpine",
        "restart": "unless-stopped",
        "ports": ["80:80"],
        "networks": networks(ctx),
    });
    FragmentSet::new().fragment(service(ctx, body, Vec::new()))
}

#[cfg(test)]
mod tests {
    use archforge_core::domain::{
        ArchitectureComponent, CloudProvider, Environment, GeneratorConfig, IacFormat,
    };

    use super::*;
    use crate::registry::Sibling;

    fn config() -> GeneratorConfig {
        GeneratorConfig::builder()
            .format(IacFormat::DockerCompose)
            .provider(CloudProvider::Aws)
            .project_name("shop")
            .environment(Environment::Dev)
            .build()
            .unwrap()
    }

    #[test]
    fn second_compute_service_gets_next_port() {
        let component = ArchitectureComponent::new("worker", ServiceType::Compute);
        let config = config();
        let siblings = vec![
            Sibling {
                name: "api".into(),
                service_type: ServiceType::Compute,
                id: "api".into(),
            },
            Sibling {
                name: "worker".into(),
                service_type: ServiceType::Compute,
                id: "worker".into(),
            },
        ];
        let ctx = FragmentContext {
            component: &component,
            binding: None,
            config: &config,
            id: "worker",
            siblings: &siblings,
        };

        let set = compute(&ctx);
        let Fragment::Service { body, volumes, .. } = &set.fragments[0] else {
            panic!("expected a service");
        };
        assert_eq!(body["ports"][0], "8081:8080");
        assert!(volumes.is_empty());
    }

    #[test]
    fn database_owns_one_volume_and_needs_a_password() {
        let component = ArchitectureComponent::new("orders-db", ServiceType::Database);
        let config = config();
        let ctx = FragmentContext {
            component: &component,
            binding: None,
            config: &config,
            id: "orders-db",
            siblings: &[],
        };

        let set = database(&ctx);
        let Fragment::Service { volumes, body, .. } = &set.fragments[0] else {
            panic!("expected a service");
        };
        assert_eq!(volumes, &vec!["orders-db-data".to_string()]);
        assert_eq!(body["environment"]["POSTGRES_DB"], "orders_db");
        assert!(set
            .requirements
            .iter()
            .any(|r| r.name == "ORDERS_DB_PASSWORD" && r.is_secret()));
    }
}
