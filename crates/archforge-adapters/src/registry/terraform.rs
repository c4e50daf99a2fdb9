//! Terraform resource fragments for AWS, Azure and GCP.
//!
//! Every generator returns `resource` blocks named with the component's
//! allocated identifier. Cloud-side names are built from
//! `var.project_name` and `var.environment` so the same fragment works for
//! every environment.

use archforge_core::domain::{CloudProvider, IdentifierRules, ServiceType, sanitize_digested};

use super::{FragmentContext, FragmentSet, MappingRow, Requirement};
use crate::syntax::hcl::{Block, Expr};

/// Static mapping table for Terraform.
pub const MAPPINGS: &[MappingRow] = &[
    (ServiceType::Compute, CloudProvider::Aws, aws_compute),
    (ServiceType::Database, CloudProvider::Aws, aws_database),
    (ServiceType::Cache, CloudProvider::Aws, aws_cache),
    (ServiceType::Storage, CloudProvider::Aws, aws_storage),
    (ServiceType::Queue, CloudProvider::Aws, aws_queue),
    (ServiceType::Cdn, CloudProvider::Aws, aws_cdn),
    (ServiceType::Networking, CloudProvider::Aws, aws_networking),
    (ServiceType::LoadBalancer, CloudProvider::Aws, aws_load_balancer),
    (ServiceType::Compute, CloudProvider::Azure, azure_compute),
    (ServiceType::Database, CloudProvider::Azure, azure_database),
    (ServiceType::Cache, CloudProvider::Azure, azure_cache),
    (ServiceType::Storage, CloudProvider::Azure, azure_storage),
    (ServiceType::Queue, CloudProvider::Azure, azure_queue),
    (ServiceType::Cdn, CloudProvider::Azure, azure_cdn),
    (ServiceType::Networking, CloudProvider::Azure, azure_networking),
    (ServiceType::Compute, CloudProvider::Gcp, gcp_compute),
    (ServiceType::Database, CloudProvider::Gcp, gcp_database),
    (ServiceType::Cache, CloudProvider::Gcp, gcp_cache),
    (ServiceType::Storage, CloudProvider::Gcp, gcp_storage),
    (ServiceType::Queue, CloudProvider::Gcp, gcp_queue),
    (ServiceType::Networking, CloudProvider::Gcp, gcp_networking),
];

// ── Shared helpers ────────────────────────────────────────────────────────────

/// `"${var.project_name}-${var.environment}-<component>"`
fn cloud_name(ctx: &FragmentContext<'_>) -> Expr {
    Expr::template(format!(
        "${{var.project_name}}-${{var.environment}}-{}",
        ctx.id.replace('_', "-")
    ))
}

fn name_tag(ctx: &FragmentContext<'_>) -> Expr {
    Expr::Object(vec![("Name".into(), cloud_name(ctx))])
}

fn db_credentials() -> [Requirement; 2] {
    [
        Requirement::text("db_username", "Administrator login for databases", "dbadmin")
            .with_default("dbadmin"),
        Requirement::secret("db_password", "Administrator password for databases"),
    ]
}

fn ref_id(resource_type: &str, id: &str, attr: &str) -> Expr {
    Expr::raw(format!("{resource_type}.{id}.{attr}"))
}

// ── AWS ───────────────────────────────────────────────────────────────────────

fn aws_compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    let subnet = ctx
        .first_sibling(ServiceType::Networking)
        .map(|net| ref_id("aws_subnet", &net.id, "id"));

    FragmentSet::new().hcl(
        Block::resource("aws_instance", ctx.id)
            .attr("ami", Expr::raw("data.aws_ami.ubuntu.id"))
            .attr("instance_type", ctx.sku_or("t3.micro"))
            .attr_opt("subnet_id", subnet)
            .attr("tags", name_tag(ctx)),
    )
}

fn aws_database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let prod = ctx.environment().is_production();
    let [user, password] = db_credentials();

    FragmentSet::new()
        .hcl(
            Block::resource("aws_db_instance", ctx.id)
                .attr("identifier", cloud_name(ctx))
                .attr("engine", "postgres")
                .attr("engine_version", "16")
                .attr("instance_class", ctx.sku_or("db.t3.micro"))
                .attr("allocated_storage", 20)
                .attr("username", Expr::var("db_username"))
                .attr("password", Expr::var("db_password"))
                .attr("multi_az", prod)
                .attr("storage_encrypted", true)
                .attr("skip_final_snapshot", !prod)
                .attr("tags", name_tag(ctx)),
        )
        .requires(user)
        .requires(password)
}

fn aws_cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("aws_elasticache_cluster", ctx.id)
            .attr("cluster_id", cloud_name(ctx))
            .attr("engine", "redis")
            .attr("node_type", ctx.sku_or("cache.t3.micro"))
            .attr("num_cache_nodes", 1)
            .attr("port", 6379)
            .attr("tags", name_tag(ctx)),
    )
}

fn aws_storage(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("aws_s3_bucket", ctx.id)
            .attr("bucket", cloud_name(ctx))
            .attr("force_destroy", !ctx.environment().is_production())
            .attr("tags", name_tag(ctx)),
    )
}

fn aws_queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("aws_sqs_queue", ctx.id)
            .attr("name", cloud_name(ctx))
            .attr("message_retention_seconds", 345_600)
            .attr("visibility_timeout_seconds", 30)
            .attr("tags", name_tag(ctx)),
    )
}

fn aws_cdn(ctx: &FragmentContext<'_>) -> FragmentSet {
    let origin_id = format!("{}-origin", ctx.id.replace('_', "-"));
    let (domain, requirement) = match ctx.first_sibling(ServiceType::Storage) {
        Some(bucket) => (
            ref_id("aws_s3_bucket", &bucket.id, "bucket_regional_domain_name"),
            None,
        ),
        None => (
            Expr::var("cdn_origin_domain"),
            Some(Requirement::text(
                "cdn_origin_domain",
                "Origin host name served through the CDN",
                "origin.example.com",
            )),
        ),
    };

    let block = Block::resource("aws_cloudfront_distribution", ctx.id)
        .attr("enabled", true)
        .attr("price_class", ctx.sku_or("PriceClass_100"))
        .block(
            Block::new("origin")
                .attr("domain_name", domain)
                .attr("origin_id", origin_id.clone()),
        )
        .block(
            Block::new("default_cache_behavior")
                .attr("allowed_methods", Expr::list(["GET", "HEAD"]))
                .attr("cached_methods", Expr::list(["GET", "HEAD"]))
                .attr("target_origin_id", origin_id)
                .attr("viewer_protocol_policy", "redirect-to-https")
                .block(
                    Block::new("forwarded_values")
                        .attr("query_string", false)
                        .block(Block::new("cookies").attr("forward", "none")),
                ),
        )
        .block(
            Block::new("restrictions")
                .block(Block::new("geo_restriction").attr("restriction_type", "none")),
        )
        .block(Block::new("viewer_certificate").attr("cloudfront_default_certificate", true))
        .attr("tags", name_tag(ctx));

    FragmentSet::new().hcl(block).requires_opt(requirement)
}

fn aws_networking(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .hcl(
            Block::resource("aws_vpc", ctx.id)
                .attr("cidr_block", "10.0.0.0/16")
                .attr("enable_dns_support", true)
                .attr("enable_dns_hostnames", true)
                .attr("tags", name_tag(ctx)),
        )
        .hcl(
            Block::resource("aws_subnet", ctx.id)
                .attr("vpc_id", ref_id("aws_vpc", ctx.id, "id"))
                .attr("cidr_block", "10.0.1.0/24")
                .attr("availability_zone", Expr::template("${var.region}a"))
                .attr("tags", name_tag(ctx)),
        )
}

fn aws_load_balancer(ctx: &FragmentContext<'_>) -> FragmentSet {
    let (subnets, requirement) = match ctx.first_sibling(ServiceType::Networking) {
        Some(net) => (Expr::List(vec![ref_id("aws_subnet", &net.id, "id")]), None),
        None => (
            Expr::var("subnet_ids"),
            Some(Requirement::list(
                "subnet_ids",
                "Subnets the load balancer is placed in",
                "subnet-00000000000000000,subnet-11111111111111111",
            )),
        ),
    };

    // ALB names are capped at 32 characters.
    let name = Expr::raw(format!(
        "substr(\"${{var.project_name}}-{}\", 0, 32)",
        ctx.id.replace('_', "-")
    ));

    FragmentSet::new()
        .hcl(
            Block::resource("aws_lb", ctx.id)
                .attr("name", name)
                .attr("internal", false)
                .attr("load_balancer_type", "application")
                .attr("subnets", subnets)
                .attr("tags", name_tag(ctx)),
        )
        .requires_opt(requirement)
}

// ── Azure ─────────────────────────────────────────────────────────────────────

fn in_resource_group(block: Block) -> Block {
    block
        .attr("resource_group_name", Expr::raw("azurerm_resource_group.main.name"))
        .attr("location", Expr::raw("azurerm_resource_group.main.location"))
}

fn azure_tags() -> Expr {
    Expr::raw("local.common_tags")
}

fn azure_compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut set = FragmentSet::new();

    let subnet = match ctx.first_sibling(ServiceType::Networking) {
        Some(net) => ref_id("azurerm_subnet", &net.id, "id"),
        None => {
            set = set.requires(Requirement::text(
                "subnet_id",
                "Subnet the virtual machine NIC attaches to",
                "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/example/providers/Microsoft.Network/virtualNetworks/example/subnets/default",
            ));
            Expr::var("subnet_id")
        }
    };

    let nic = in_resource_group(
        Block::resource("azurerm_network_interface", ctx.id).attr(
            "name",
            Expr::template(format!(
                "${{var.project_name}}-${{var.environment}}-{}-nic",
                ctx.id.replace('_', "-")
            )),
        ),
    )
    .block(
        Block::new("ip_configuration")
            .attr("name", "internal")
            .attr("subnet_id", subnet)
            .attr("private_ip_address_allocation", "Dynamic"),
    )
    .attr("tags", azure_tags());

    let vm = in_resource_group(Block::resource("azurerm_linux_virtual_machine", ctx.id).attr("name", cloud_name(ctx)))
        .attr("size", ctx.sku_or("Standard_B2s"))
        .attr("admin_username", Expr::var("admin_username"))
        .attr("admin_password", Expr::var("admin_password"))
        .attr("disable_password_authentication", false)
        .attr(
            "network_interface_ids",
            Expr::List(vec![ref_id("azurerm_network_interface", ctx.id, "id")]),
        )
        .block(
            Block::new("os_disk")
                .attr("caching", "ReadWrite")
                .attr("storage_account_type", "Standard_LRS"),
        )
        .block(
            Block::new("source_image_reference")
                .attr("publisher", "Canonical")
                .attr("offer", "0001-com-ubuntu-server-jammy")
                .attr("sku", "22_04-lts")
                .attr("version", "latest"),
        )
        .attr("tags", azure_tags());

    set.hcl(nic)
        .hcl(vm)
        .requires(
            Requirement::text("admin_username", "Administrator login for virtual machines", "azureuser")
                .with_default("azureuser"),
        )
        .requires(Requirement::secret(
            "admin_password",
            "Administrator password for virtual machines",
        ))
}

fn azure_database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let [user, password] = db_credentials();
    FragmentSet::new()
        .hcl(
            in_resource_group(
                Block::resource("azurerm_postgresql_flexible_server", ctx.id).attr("name", cloud_name(ctx)),
            )
            .attr("version", "16")
            .attr("administrator_login", Expr::var("db_username"))
            .attr("administrator_password", Expr::var("db_password"))
            .attr("sku_name", ctx.sku_or("B_Standard_B1ms"))
            .attr("storage_mb", 32_768)
            .attr(
                "backup_retention_days",
                if ctx.environment().is_production() { 35 } else { 7 },
            )
            .attr("tags", azure_tags()),
        )
        .requires(user)
        .requires(password)
}

fn azure_cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        in_resource_group(Block::resource("azurerm_redis_cache", ctx.id).attr("name", cloud_name(ctx)))
            .attr("capacity", 0)
            .attr("family", "C")
            .attr("sku_name", ctx.sku_or("Basic"))
            .attr("minimum_tls_version", "1.2")
            .attr("tags", azure_tags()),
    )
}

fn azure_storage(ctx: &FragmentContext<'_>) -> FragmentSet {
    let account = sanitize_digested(
        &format!("{}{}", ctx.config.project_name(), ctx.id),
        &IdentifierRules::AZURE_STORAGE,
    );
    let replication = if ctx.environment().is_production() { "GRS" } else { "LRS" };

    FragmentSet::new().hcl(
        in_resource_group(Block::resource("azurerm_storage_account", ctx.id).attr("name", account))
            .attr("account_tier", "Standard")
            .attr("account_replication_type", replication)
            .attr("min_tls_version", "TLS1_2")
            .attr("tags", azure_tags()),
    )
}

fn azure_queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .hcl(
            in_resource_group(
                Block::resource("azurerm_servicebus_namespace", ctx.id).attr("name", cloud_name(ctx)),
            )
            .attr("sku", ctx.sku_or("Standard"))
            .attr("tags", azure_tags()),
        )
        .hcl(
            Block::resource("azurerm_servicebus_queue", ctx.id)
                .attr("name", ctx.id.replace('_', "-"))
                .attr("namespace_id", ref_id("azurerm_servicebus_namespace", ctx.id, "id")),
        )
}

fn azure_cdn(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("azurerm_cdn_profile", ctx.id)
            .attr("name", cloud_name(ctx))
            .attr("location", "global")
            .attr("resource_group_name", Expr::raw("azurerm_resource_group.main.name"))
            .attr("sku", ctx.sku_or("Standard_Microsoft"))
            .attr("tags", azure_tags()),
    )
}

fn azure_networking(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .hcl(
            in_resource_group(
                Block::resource("azurerm_virtual_network", ctx.id).attr("name", cloud_name(ctx)),
            )
            .attr("address_space", Expr::list(["10.0.0.0/16"]))
            .attr("tags", azure_tags()),
        )
        .hcl(
            Block::resource("azurerm_subnet", ctx.id)
                .attr("name", "default")
                .attr("resource_group_name", Expr::raw("azurerm_resource_group.main.name"))
                .attr(
                    "virtual_network_name",
                    ref_id("azurerm_virtual_network", ctx.id, "name"),
                )
                .attr("address_prefixes", Expr::list(["10.0.1.0/24"])),
        )
}

// ── GCP ───────────────────────────────────────────────────────────────────────

fn gcp_labels() -> Expr {
    Expr::raw("local.common_labels")
}

fn gcp_compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut nic = Block::new("network_interface");
    match ctx.first_sibling(ServiceType::Networking) {
        Some(net) => {
            nic = nic
                .attr("network", ref_id("google_compute_network", &net.id, "id"))
                .attr("subnetwork", ref_id("google_compute_subnetwork", &net.id, "id"));
        }
        None => nic = nic.attr("network", "default"),
    }
    nic = nic.block(Block::new("access_config"));

    FragmentSet::new().hcl(
        Block::resource("google_compute_instance", ctx.id)
            .attr("name", cloud_name(ctx))
            .attr("machine_type", ctx.sku_or("e2-medium"))
            .attr("zone", Expr::template("${var.region}-a"))
            .attr("labels", gcp_labels())
            .block(
                Block::new("boot_disk").block(
                    Block::new("initialize_params").attr("image", "debian-cloud/debian-12"),
                ),
            )
            .block(nic),
    )
}

fn gcp_database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let [user, password] = db_credentials();
    FragmentSet::new()
        .hcl(
            Block::resource("google_sql_database_instance", ctx.id)
                .attr("name", cloud_name(ctx))
                .attr("database_version", "POSTGRES_16")
                .attr("region", Expr::var("region"))
                .attr("deletion_protection", ctx.environment().is_production())
                .block(
                    Block::new("settings")
                        .attr("tier", ctx.sku_or("db-f1-micro"))
                        .attr("user_labels", gcp_labels()),
                ),
        )
        .hcl(
            Block::resource("google_sql_user", ctx.id)
                .attr("name", Expr::var("db_username"))
                .attr("instance", ref_id("google_sql_database_instance", ctx.id, "name"))
                .attr("password", Expr::var("db_password")),
        )
        .requires(user)
        .requires(password)
}

fn gcp_cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("google_redis_instance", ctx.id)
            .attr("name", cloud_name(ctx))
            .attr("tier", ctx.sku_or("BASIC"))
            .attr("memory_size_gb", 1)
            .attr("region", Expr::var("region"))
            .attr("labels", gcp_labels()),
    )
}

fn gcp_storage(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("google_storage_bucket", ctx.id)
            .attr("name", cloud_name(ctx))
            .attr("location", Expr::var("region"))
            .attr("uniform_bucket_level_access", true)
            .attr("force_destroy", !ctx.environment().is_production())
            .attr("labels", gcp_labels()),
    )
}

fn gcp_queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().hcl(
        Block::resource("google_pubsub_topic", ctx.id)
            .attr("name", cloud_name(ctx))
            .attr("labels", gcp_labels()),
    )
}

fn gcp_networking(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .hcl(
            Block::resource("google_compute_network", ctx.id)
                .attr("name", cloud_name(ctx))
                .attr("auto_create_subnetworks", false),
        )
        .hcl(
            Block::resource("google_compute_subnetwork", ctx.id)
                .attr(
                    "name",
                    Expr::template(format!(
                        "${{var.project_name}}-${{var.environment}}-{}-subnet",
                        ctx.id.replace('_', "-")
                    )),
                )
                .attr("ip_cidr_range", "10.0.1.0/24")
                .attr("region", Expr::var("region"))
                .attr("network", ref_id("google_compute_network", ctx.id, "id")),
        )
}

#[cfg(test)]
mod tests {
    use archforge_core::domain::{
        ArchitectureComponent, Environment, GeneratorConfig, IacFormat, ProviderBinding,
    };

    use super::*;
    use crate::registry::{Fragment, Sibling};

    fn config(provider: CloudProvider, env: Environment) -> GeneratorConfig {
        GeneratorConfig::builder()
            .format(IacFormat::Terraform)
            .provider(provider)
            .project_name("shop")
            .environment(env)
            .build()
            .unwrap()
    }

    fn blocks(set: &FragmentSet) -> Vec<&Block> {
        set.fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Hcl(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn aws_database_requires_credentials() {
        let component = ArchitectureComponent::new("Orders DB", ServiceType::Database)
            .with_binding(CloudProvider::Aws, ProviderBinding::new("RDS", "db.m5.large", 120.0));
        let config = config(CloudProvider::Aws, Environment::Prod);
        let siblings = vec![Sibling {
            name: "Orders DB".into(),
            service_type: ServiceType::Database,
            id: "orders_db".into(),
        }];
        let ctx = FragmentContext {
            component: &component,
            binding: component.binding(CloudProvider::Aws),
            config: &config,
            id: "orders_db",
            siblings: &siblings,
        };

        let set = aws_database(&ctx);
        let block = blocks(&set)[0];
        assert_eq!(block.address(), "aws_db_instance.orders_db");
        assert!(block.body.contains(&crate::syntax::hcl::BodyItem::Attr(
            "instance_class".into(),
            Expr::str("db.m5.large")
        )));
        assert!(set.requirements.iter().any(|r| r.name == "db_password" && r.is_secret()));
    }

    #[test]
    fn compute_attaches_to_sibling_network() {
        let component = ArchitectureComponent::new("web", ServiceType::Compute);
        let config = config(CloudProvider::Azure, Environment::Dev);
        let siblings = vec![
            Sibling {
                name: "web".into(),
                service_type: ServiceType::Compute,
                id: "web".into(),
            },
            Sibling {
                name: "core net".into(),
                service_type: ServiceType::Networking,
                id: "core_net".into(),
            },
        ];
        let ctx = FragmentContext {
            component: &component,
            binding: None,
            config: &config,
            id: "web",
            siblings: &siblings,
        };

        let set = azure_compute(&ctx);
        assert_eq!(set.len(), 2);
        assert!(!set.requirements.iter().any(|r| r.name == "subnet_id"));
    }

    #[test]
    fn azure_storage_account_name_is_compact() {
        let component = ArchitectureComponent::new("Media Assets", ServiceType::Storage);
        let config = config(CloudProvider::Azure, Environment::Dev);
        let ctx = FragmentContext {
            component: &component,
            binding: None,
            config: &config,
            id: "media_assets",
            siblings: &[],
        };
        let set = azure_storage(&ctx);
        let block = blocks(&set)[0];
        assert!(block.body.contains(&crate::syntax::hcl::BodyItem::Attr(
            "name".into(),
            Expr::str("shopmediaassets")
        )));
    }
}
