use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::topology::ResolvedTopology;

/// Property key carrying the resolved physical identifier of a resource.
pub const REF_PROPERTY: &str = "Ref";

/// One resolved companion resource as visible to a running function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResource {
    pub logical_name: String,
    pub resource_type: String,
    pub properties: BTreeMap<String, String>,
    /// Caller-supplied alias for exact lookup, when the declaring
    /// decorator published one.
    pub alias: Option<String>,
}

impl DiscoveryResource {
    /// The resolved physical identifier, when published.
    pub fn reference(&self) -> Option<&str> {
        self.properties.get(REF_PROPERTY).map(String::as_str)
    }
}

/// The per-function discovery record: every resource the function depends
/// on, keyed by logical name, with resolved physical identifiers.
/// Populated once by the deploy engine after physical provisioning;
/// read-only at runtime and safe to share across concurrent invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    pub function_name: String,
    pub resources: BTreeMap<String, DiscoveryResource>,
}

impl DiscoveryInfo {
    /// Builds the record for one function from the resolved topology and
    /// the physical identifiers reported by provisioning. Resources
    /// without a reported identifier fall back to their logical name,
    /// which is itself the provisioned name for generated resources.
    pub fn publish(
        topology: &ResolvedTopology,
        function_name: &str,
        physical_ids: &BTreeMap<String, String>,
    ) -> Self {
        let mut resources = BTreeMap::new();
        for dependency in topology.graph.dependencies_of(function_name) {
            let Some(resource) = topology.graph.get(dependency) else {
                continue;
            };
            let physical = physical_ids
                .get(dependency)
                .cloned()
                .unwrap_or_else(|| dependency.to_string());
            let mut properties = BTreeMap::new();
            properties.insert(REF_PROPERTY.to_string(), physical);
            resources.insert(
                dependency.to_string(),
                DiscoveryResource {
                    logical_name: dependency.to_string(),
                    resource_type: resource.resource_type.clone(),
                    properties,
                    alias: resource.discovery_alias.clone(),
                },
            );
        }
        Self {
            function_name: function_name.to_string(),
            resources,
        }
    }

    /// Every record whose declared type matches. A running handler does
    /// not know deploy-time-generated logical names, so type scan is the
    /// primary lookup. Zero matches is an empty result, not an error.
    pub fn lookup(&self, resource_type: &str) -> Vec<&DiscoveryResource> {
        self.resources
            .values()
            .filter(|resource| resource.resource_type == resource_type)
            .collect()
    }

    /// Exactly-one lookup by type. More than one match is ambiguous and
    /// reported as an error rather than resolved by scan order.
    pub fn lookup_one(&self, resource_type: &str) -> Result<Option<&DiscoveryResource>, String> {
        let matches = self.lookup(resource_type);
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            count => Err(format!(
                "ambiguous discovery lookup: {count} resources of type '{resource_type}'"
            )),
        }
    }

    /// Exact lookup by the alias the declaring decorator published.
    pub fn lookup_alias(&self, alias: &str) -> Option<&DiscoveryResource> {
        self.resources
            .values()
            .find(|resource| resource.alias.as_deref() == Some(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorator::CompanionResourceDecorator;
    use crate::function::FunctionDescriptor;
    use crate::graph::{DeletionPolicy, Resource, S3_BUCKET_RESOURCE_TYPE};
    use crate::privilege::RoleDefinition;
    use crate::topology::{TopologyBuilder, TopologyConfig};

    fn topology_with_bucket() -> (ResolvedTopology, String) {
        let mut descriptor =
            FunctionDescriptor::register("handlers::echo_s3_event", RoleDefinition::new());
        descriptor.add_decorator(CompanionResourceDecorator::new(
            "MessageBucket",
            Resource::s3_bucket()
                .with_deletion_policy(DeletionPolicy::Delete)
                .with_discovery_alias("mail-bodies"),
        ));
        let function_name = descriptor.logical_name().to_string();

        let mut builder = TopologyBuilder::new(TopologyConfig::default());
        builder.add(descriptor);
        (builder.build().expect("build should succeed"), function_name)
    }

    #[test]
    fn publish_includes_dependent_resources_with_refs() {
        let (topology, function_name) = topology_with_bucket();
        let physical_ids = BTreeMap::from([(
            "MessageBucket".to_string(),
            "message-bucket-1a2b3c".to_string(),
        )]);

        let info = DiscoveryInfo::publish(&topology, &function_name, &physical_ids);
        let resource = info
            .resources
            .get("MessageBucket")
            .expect("bucket should be published");
        assert_eq!(resource.resource_type, S3_BUCKET_RESOURCE_TYPE);
        assert_eq!(resource.reference(), Some("message-bucket-1a2b3c"));
    }

    #[test]
    fn lookup_by_type_returns_single_match() {
        let (topology, function_name) = topology_with_bucket();
        let info = DiscoveryInfo::publish(&topology, &function_name, &BTreeMap::new());

        let matches = info.lookup(S3_BUCKET_RESOURCE_TYPE);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].logical_name, "MessageBucket");
    }

    #[test]
    fn lookup_of_absent_type_is_empty_not_an_error() {
        let (topology, function_name) = topology_with_bucket();
        let info = DiscoveryInfo::publish(&topology, &function_name, &BTreeMap::new());
        assert!(info.lookup("AWS::SNS::Topic").is_empty());
        assert_eq!(info.lookup_one("AWS::SNS::Topic"), Ok(None));
    }

    #[test]
    fn lookup_one_rejects_ambiguous_matches() {
        let mut info = DiscoveryInfo {
            function_name: "Fn".to_string(),
            resources: BTreeMap::new(),
        };
        for name in ["BucketA", "BucketB"] {
            info.resources.insert(
                name.to_string(),
                DiscoveryResource {
                    logical_name: name.to_string(),
                    resource_type: S3_BUCKET_RESOURCE_TYPE.to_string(),
                    properties: BTreeMap::new(),
                    alias: None,
                },
            );
        }
        let error = info
            .lookup_one(S3_BUCKET_RESOURCE_TYPE)
            .expect_err("two buckets should be ambiguous");
        assert!(error.contains("ambiguous"));
    }

    #[test]
    fn alias_lookup_is_exact() {
        let (topology, function_name) = topology_with_bucket();
        let info = DiscoveryInfo::publish(&topology, &function_name, &BTreeMap::new());
        let resource = info
            .lookup_alias("mail-bodies")
            .expect("alias should match");
        assert_eq!(resource.logical_name, "MessageBucket");
        assert!(info.lookup_alias("unknown").is_none());
    }
}
