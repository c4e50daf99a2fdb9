//! CloudFormation resource fragments (AWS only).
//!
//! Resources are keyed by their logical ID. Parameters referenced here
//! (`Environment`, `LatestAmiId`) are always declared by the emitter; anything
//! else is returned as a requirement.

use serde_json::{Value, json};

use archforge_core::domain::{CloudProvider, ServiceType};

use super::{FragmentContext, FragmentSet, MappingRow, Requirement};

pub const MAPPINGS: &[MappingRow] = &[
    (ServiceType::Compute, CloudProvider::Aws, compute),
    (ServiceType::Database, CloudProvider::Aws, database),
    (ServiceType::Cache, CloudProvider::Aws, cache),
    (ServiceType::Storage, CloudProvider::Aws, storage),
    (ServiceType::Queue, CloudProvider::Aws, queue),
    (ServiceType::Cdn, CloudProvider::Aws, cdn),
    (ServiceType::Networking, CloudProvider::Aws, networking),
    (ServiceType::LoadBalancer, CloudProvider::Aws, load_balancer),
];

const SUBNET_SUFFIX: &str = "Subnet";

/// Logical ID of the subnet that accompanies a VPC.
pub fn subnet_key(vpc_key: &str) -> String {
    format!("{vpc_key}{SUBNET_SUFFIX}")
}

/// Suffixes of the logical IDs a fragment adds next to the component's own.
pub fn derived_keys(service_type: ServiceType) -> &'static [&'static str] {
    match service_type {
        ServiceType::Networking => &[SUBNET_SUFFIX],
        _ => &[],
    }
}

fn tags(ctx: &FragmentContext<'_>) -> Value {
    json!([
        { "Key": "Name", "Value": { "Fn::Sub": format!("${{AWS::StackName}}-{}", ctx.id) } },
        { "Key": "Environment", "Value": { "Ref": "Environment" } }
    ])
}

fn resource(resource_type: &str, properties: Value) -> Value {
    json!({ "Type": resource_type, "Properties": properties })
}

fn db_credentials() -> [Requirement; 2] {
    [
        Requirement::text("DBUsername", "Master username for databases", "dbadmin")
            .with_default("dbadmin"),
        Requirement::secret("DBPassword", "Master password for databases"),
    ]
}

fn compute(ctx: &FragmentContext<'_>) -> FragmentSet {
    let mut properties = json!({
        "ImageId": { "Ref": "LatestAmiId" },
        "InstanceType": ctx.sku_or("t3.micro"),
    });
    if let Some(net) = ctx.first_sibling(ServiceType::Networking) {
        properties["SubnetId"] = json!({ "Ref": subnet_key(&net.id) });
    }
    properties["Tags"] = tags(ctx);

    FragmentSet::new().resource(ctx.id, resource("AWS::EC2::Instance", properties))
}

fn database(ctx: &FragmentContext<'_>) -> FragmentSet {
    let prod = ctx.environment().is_production();
    let mut body = resource(
        "AWS::RDS::DBInstance",
        json!({
            "Engine": "postgres",
            "EngineVersion": "16",
            "DBInstanceClass": ctx.sku_or("db.t3.micro"),
            "AllocatedStorage": "20",
            "MasterUsername": { "Ref": "DBUsername" },
            "MasterUserPassword": { "Ref": "DBPassword" },
            "MultiAZ": prod,
            "StorageEncrypted": true,
            "Tags": tags(ctx),
        }),
    );
    body["DeletionPolicy"] = json!(if prod { "Snapshot" } else { "Delete" });

    let [user, password] = db_credentials();
    FragmentSet::new()
        .resource(ctx.id, body)
        .requires(user)
        .requires(password)
}

fn cache(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().resource(
        ctx.id,
        resource(
            "AWS::ElastiCache::CacheCluster",
            json!({
                "Engine": "redis",
                "CacheNodeType": ctx.sku_or("cache.t3.micro"),
                "NumCacheNodes": 1,
                "Tags": tags(ctx),
            }),
        ),
    )
}

fn storage(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().resource(
        ctx.id,
        resource(
            "AWS::S3::Bucket",
            json!({
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [
                        { "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" } }
                    ]
                },
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true
                },
                "Tags": tags(ctx),
            }),
        ),
    )
}

fn queue(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new().resource(
        ctx.id,
        resource(
            "AWS::SQS::Queue",
            json!({
                "QueueName": { "Fn::Sub": format!("${{AWS::StackName}}-{}", ctx.id) },
                "MessageRetentionPeriod": 345_600,
                "VisibilityTimeout": 30,
                "Tags": tags(ctx),
            }),
        ),
    )
}

fn cdn(ctx: &FragmentContext<'_>) -> FragmentSet {
    let origin_id = format!("{}Origin", ctx.id);
    let (origin, requirement) = match ctx.first_sibling(ServiceType::Storage) {
        Some(bucket) => (
            json!({
                "Id": origin_id,
                "DomainName": { "Fn::GetAtt": [bucket.id, "RegionalDomainName"] },
                "S3OriginConfig": {}
            }),
            None,
        ),
        None => (
            json!({
                "Id": origin_id,
                "DomainName": { "Ref": "CdnOriginDomain" },
                "CustomOriginConfig": { "OriginProtocolPolicy": "https-only" }
            }),
            Some(Requirement::text(
                "CdnOriginDomain",
                "Origin host name served through the CDN",
                "origin.example.com",
            )),
        ),
    };

    FragmentSet::new()
        .resource(
            ctx.id,
            resource(
                "AWS::CloudFront::Distribution",
                json!({
                    "DistributionConfig": {
                        "Enabled": true,
                        "PriceClass": ctx.sku_or("PriceClass_100"),
                        "Origins": [origin],
                        "DefaultCacheBehavior": {
                            "TargetOriginId": origin_id,
                            "ViewerProtocolPolicy": "redirect-to-https",
                            "CachePolicyId": "658327ea-f89d-4fab-a63d-7e88639e58f6"
                        }
                    },
                    "Tags": tags(ctx),
                }),
            ),
        )
        .requires_opt(requirement)
}

fn networking(ctx: &FragmentContext<'_>) -> FragmentSet {
    FragmentSet::new()
        .resource(
            ctx.id,
            resource(
                "AWS::EC2::VPC",
                json!({
                    "CidrBlock": "10.0.0.0/16",
                    "EnableDnsSupport": true,
                    "EnableDnsHostnames": true,
                    "Tags": tags(ctx),
                }),
            ),
        )
        .resource(
            subnet_key(ctx.id),
            resource(
                "AWS::EC2::Subnet",
                json!({
                    "VpcId": { "Ref": ctx.id },
                    "CidrBlock": "10.0.1.0/24",
                    "AvailabilityZone": { "Fn::Select": [0, { "Fn::GetAZs": "" }] },
                    "Tags": tags(ctx),
                }),
            ),
        )
}

fn load_balancer(ctx: &FragmentContext<'_>) -> FragmentSet {
    let (subnets, requirement) = match ctx.first_sibling(ServiceType::Networking) {
        Some(net) => (json!([{ "Ref": subnet_key(&net.id) }]), None),
        None => (
            json!({ "Ref": "SubnetIds" }),
            Some(Requirement::list(
                "SubnetIds",
                "Subnets the load balancer is placed in",
                "subnet-00000000000000000,subnet-11111111111111111",
            )),
        ),
    };

    FragmentSet::new()
        .resource(
            ctx.id,
            resource(
                "AWS::ElasticLoadBalancingV2::LoadBalancer",
                json!({
                    "Type": "application",
                    "Scheme": "internet-facing",
                    "Subnets": subnets,
                    "Tags": tags(ctx),
                }),
            ),
        )
        .requires_opt(requirement)
}
