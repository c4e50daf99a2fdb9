//! Azure Resource Manager fragments (Azure only).
//!
//! Each fragment is one element of the template's `resources` array, keyed by
//! its symbolic name. Cross-resource edges are written as explicit
//! `resourceId(...)` expressions in `dependsOn`.

use serde_json::{Value, json};

use archforge_core::domain::{CloudProvider, IdentifierRules, ServiceType, sanitize_digested};

use super::{FragmentContext, FragmentSet, MappingRow, Requirement, Sibling};

pub const MAPPINGS: &[MappingRow] = &[
    (ServiceType::Compute, CloudProvider::Azure, compute),
    (ServiceType::Database, CloudProvider::Azure, database),
    (ServiceType::Cache, CloudProvider::Azure, cache),
    (ServiceType::Storage, CloudProvider::Azure, storage),
    (ServiceType::Queue, CloudProvider::Azure, queue),
    (ServiceType::Cdn, CloudProvider::Azure, cdn),
    (ServiceType::Networking, CloudProvider::Azure, networking),
];

const VNET: &str = "Microsoft.Network/virtualNetworks";
const NIC: &str = "Microsoft.Network/networkInterfaces";
const SERVICEBUS: &str = "Microsoft.ServiceBus/namespaces";

const NIC_SUFFIX: &str = "Nic";
const QUEUE_SUFFIX: &str = "Queue";

/// Suffixes of the symbolic names a fragment adds next to the component's own.
pub fn derived_keys(service_type: ServiceType) -> &'static [&'static str] {
    match service_type {
        ServiceType::Compute => &[NIC_SUFFIX],
        ServiceType::Queue => &[QUEUE_SUFFIX],
        _ => &[],
    }
}

/// `WebApi2` → `web-api2`
fn kebab(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for (i, c) in id.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// ARM expression body (without brackets) for a resource's deployed name.
fn name_expr(id: &str, suffix: &str) -> String {
    format!(
        "concat(parameters('projectName'), '-', parameters('environment'), '-{}{suffix}')",
        kebab(id)
    )
}

fn name(id: &str, suffix: &str) -> String {
    format!("[{}]", name_expr(id, suffix))
}

/// `[resourceId('<type>', <name>)]`
pub fn resource_id(resource_type: &str, id: &str, suffix: &str) -> String {
    format!("[resourceId('{resource_type}', {})]", name_expr(id, suffix))
}

fn subnet_id(net: &Sibling) -> String {
    format!(
        "[resourceId('{VNET}/subnets', {}, 'default')]",
        name_expr(&net.id, "")
    )
}

fn base(resource_type: &str, api_version: &str, name: String) -> Value {
    json!({
        "type": resource_type,
        "apiVersion": api_version,
        "name": name,
        "location": "[parameters('location')]",
        "tags": "[variables('commonTags')]",
    })
}

fn compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut set = FragmentSet::new();
    let network = ctx.first_sibling(ServiceType::Networking);

    let subnet = match network {
        Some(net) => subnet_id(net),
        None => {
            set = set.requires(Requirement::text(
                "subnetId",
                "Resource ID of the subnet virtual machine NICs attach to",
                "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/example/providers/Microsoft.Network/virtualNetworks/example/subnets/default",
            ));
            "[parameters('subnetId')]".to_string()
        }
    };

    let mut nic = base(NIC, "2023-09-01", name(ctx.id, "-nic"));
    nic["properties"] = json!({
        "ipConfigurations": [{
            "name": "internal",
            "properties": {
                "privateIPAllocationMethod": "Dynamic",
                "subnet": { "id": subnet }
            }
        }]
    });
    if let Some(net) = network {
        nic["dependsOn"] = json!([resource_id(VNET, &net.id, "")]);
    }

    let mut vm = base("Microsoft.Compute/virtualMachines", "2023-09-01", name(ctx.id, ""));
    vm["dependsOn"] = json!([resource_id(NIC, ctx.id, "-nic")]);
    vm["properties"] = json!({
        "hardwareProfile": { "vmSize": ctx.sku_or("Standard_B2s") },
        "osProfile": {
            "computerName": kebab(ctx.id),
            "adminUsername": "[parameters('adminUsername')]",
            "adminPassword": "[parameters('adminPassword')]"
        },
        "storageProfile": {
            "imageReference": {
                "publisher": "Canonical",
                "offer": "0001-com-ubuntu-server-jammy",
                "sku": "22_04-lts",
                "version": "latest"
            },
            "osDisk": {
                "createOption": "FromImage",
                "managedDisk": { "storageAccountType": "Standard_LRS" }
            }
        },
        "networkProfile": {
            "networkInterfaces": [{ "id": resource_id(NIC, ctx.id, "-nic") }]
        }
    });

    set.resource(format!("{}{NIC_SUFFIX}", ctx.id), nic).resource(ctx.id, vm)
}

fn database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let retention = if ctx.environment().is_production() { 35 } else { 7 };
    let mut server = base(
        "Microsoft.DBforPostgreSQL/flexibleServers",
        "2022-12-01",
        name(ctx.id, ""),
    );
    server["sku"] = json!({ "name": ctx.sku_or("Standard_B1ms"), "tier": "Burstable" });
    server["properties"] = json!({
        "version": "16",
        "administratorLogin": "[parameters('adminUsername')]",
        "administratorLoginPassword": "[parameters('adminPassword')]",
        "storage": { "storageSizeGB": 32 },
        "backup": { "backupRetentionDays": retention, "geoRedundantBackup": "Disabled" }
    });
    FragmentSet::new().resource(ctx.id, server)
}

fn cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut redis = base("Microsoft.Cache/redis", "2023-08-01", name(ctx.id, ""));
    redis["properties"] = json!({
        "sku": { "name": ctx.sku_or("Basic"), "family": "C", "capacity": 0 },
        "enableNonSslPort": false,
        "minimumTlsVersion": "1.2"
    });
    FragmentSet::new().resource(ctx.id, redis)
}

fn storage(ctx: &FragmentContext<'_>) -> FragmentSet {
    let account = sanitize_digested(
        &format!("{}{}", ctx.config.project_name(), ctx.id),
        &IdentifierRules::AZURE_STORAGE,
    );
    let replication = if ctx.environment().is_production() {
        "Standard_GRS"
    } else {
        "Standard_LRS"
    };

    let mut body = base("Microsoft.Storage/storageAccounts", "2023-01-01", account);
    body["sku"] = json!({ "name": replication });
    body["kind"] = json!("StorageV2");
    body["properties"] = json!({
        "minimumTlsVersion": "TLS1_2",
        "supportsHttpsTrafficOnly": true,
        "allowBlobPublicAccess": false
    });
    FragmentSet::new().resource(ctx.id, body)
}

fn queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut namespace = base(SERVICEBUS, "2022-10-01-preview", name(ctx.id, ""));
    namespace["sku"] = json!({ "name": ctx.sku_or("Standard") });

    let queue = json!({
        "type": format!("{SERVICEBUS}/queues"),
        "apiVersion": "2022-10-01-preview",
        "name": format!("[concat({}, '/', '{}')]", name_expr(ctx.id, ""), kebab(ctx.id)),
        "dependsOn": [resource_id(SERVICEBUS, ctx.id, "")],
        "properties": { "maxDeliveryCount": 10, "lockDuration": "PT1M" }
    });

    FragmentSet::new()
        .resource(ctx.id, namespace)
        .resource(format!("{}{QUEUE_SUFFIX}", ctx.id), queue)
}

fn cdn(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut profile = base("Microsoft.Cdn/profiles", "2023-05-01", name(ctx.id, ""));
    profile["location"] = json!("global");
    profile["sku"] = json!({ "name": ctx.sku_or("Standard_Microsoft") });
    FragmentSet::new().resource(ctx.id, profile)
}

fn networking(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut vnet = base(VNET, "2023-09-01", name(ctx.id, ""));
    vnet["properties"] = json!({
        "addressSpace": { "addressPrefixes": ["10.0.0.0/16"] },
        "subnets": [{
            "name": "default",
            "properties": { "addressPrefix": "10.0.1.0/24" }
        }]
    });
    FragmentSet::new().resource(ctx.id, vnet)
}

#[cfg(test)]
mod tests {
    use archforge_core::domain::{ArchitectureComponent, Environment, GeneratorConfig, IacFormat};

    use super::*;
    use crate::registry::Fragment;

    fn config() -> GeneratorConfig {
        GeneratorConfig::builder()
            .format(IacFormat::Arm)
            .provider(CloudProvider::Azure)
            .project_name("shop")
            .environment(Environment::Staging)
            .build()
            .unwrap()
    }

    #[test]
    fn kebab_splits_pascal_case() {
        assert_eq!(kebab("WebApi2"), "web-api2");
        assert_eq!(kebab("Db"), "db");
    }

    #[test]
    fn vm_depends_on_its_nic_by_resource_id() {
        let component = ArchitectureComponent::new("web api", ServiceType::Compute);
        let config = config();
        let ctx = FragmentContext {
            component: &component,
            binding: None,
            config: &config,
            id: "WebApi",
            siblings: &[],
        };

        let set = compute(&ctx);
        assert_eq!(set.len(), 2);
        let Fragment::Resource { key, body } = &set.fragments[1] else {
            panic!("expected a keyed resource");
        };
        assert_eq!(key, "WebApi");
        let depends = body["dependsOn"][0].as_str().unwrap();
        assert!(depends.starts_with("[resourceId('Microsoft.Network/networkInterfaces'"));
        assert!(depends.contains("-web-api-nic"));
        assert!(set.requirements.iter().any(|r| r.name == "subnetId"));
    }

    #[test]
    fn queue_child_depends_on_namespace() {
        let component = ArchitectureComponent::new("jobs", ServiceType::Queue);
        let config = config();
        let ctx = FragmentContext {
            component: &component,
            binding: None,
            config: &config,
            id: "Jobs",
            siblings: &[],
        };

        let set = queue(&ctx);
        let Fragment::Resource { body, .. } = &set.fragments[1] else {
            panic!("expected a keyed resource");
        };
        assert_eq!(body["type"], "Microsoft.ServiceBus/namespaces/queues");
        assert!(body["dependsOn"][0]
            .as_str()
            .unwrap()
            .contains("Microsoft.ServiceBus/namespaces"));
    }

    #[test]
    fn long_storage_accounts_stay_distinct() {
        let config = config();
        let account = |name: &str, id: &str| {
            let component = ArchitectureComponent::new(name, ServiceType::Storage);
            let set = storage(&FragmentContext {
                component: &component,
                binding: None,
                config: &config,
                id,
                siblings: &[],
            });
            let Fragment::Resource { body, .. } = &set.fragments[0] else {
                panic!("expected a keyed resource");
            };
            body["name"].as_str().unwrap().to_string()
        };

        let primary = account("production assets primary", "ProductionAssetsPrimary");
        let backup = account("production assets backup", "ProductionAssetsBackup");
        assert_ne!(primary, backup);
        assert_eq!(primary.len(), 24);
        assert!(primary.starts_with("shopproductionas"));
    }
}
