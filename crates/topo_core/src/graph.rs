use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TopologyError;

pub const FUNCTION_RESOURCE_TYPE: &str = "AWS::Lambda::Function";
pub const S3_BUCKET_RESOURCE_TYPE: &str = "AWS::S3::Bucket";
pub const SNS_TOPIC_RESOURCE_TYPE: &str = "AWS::SNS::Topic";

/// What happens to a provisioned resource when its parent stack is torn
/// down. The default is `Retain`: a decorator must opt into deletion, so
/// forgetting the policy can never silently destroy data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    #[default]
    Retain,
}

/// One provisionable resource definition in the shared graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_type: String,
    pub properties: BTreeMap<String, Value>,
    pub deletion_policy: DeletionPolicy,
    /// Caller-supplied alias published into discovery for exact lookup.
    pub discovery_alias: Option<String>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: BTreeMap::new(),
            deletion_policy: DeletionPolicy::default(),
            discovery_alias: None,
        }
    }

    pub fn s3_bucket() -> Self {
        Self::new(S3_BUCKET_RESOURCE_TYPE)
    }

    pub fn sns_topic() -> Self {
        Self::new(SNS_TOPIC_RESOURCE_TYPE)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    pub fn with_discovery_alias(mut self, alias: impl Into<String>) -> Self {
        self.discovery_alias = Some(alias.into());
        self
    }
}

/// A directed dependency edge: `from` must be provisioned after `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Shared resource graph accumulated during synthesis. Names are unique;
/// the edge set must stay acyclic through finalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGraph {
    resources: BTreeMap<String, Resource>,
    edges: BTreeSet<Edge>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Inserting under a name already present is an error; `inserted_by`
    /// names the function or decorator at fault in the report.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        resource: Resource,
        inserted_by: &str,
    ) -> Result<(), TopologyError> {
        let name = name.into();
        if self.resources.contains_key(&name) {
            return Err(TopologyError::DuplicateResourceName {
                name,
                inserted_by: inserted_by.to_string(),
            });
        }
        self.resources.insert(name, resource);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.insert(edge);
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&Edge::new(from, to))
    }

    pub fn resources(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.resources.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Names this resource must be provisioned after.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.from == name)
            .map(|edge| edge.to.as_str())
            .collect()
    }

    /// Fails if any recorded edge has an endpoint that names no resource.
    /// Decorators emit edges separately from resources, so a typo'd or
    /// never-inserted target is only detectable once the graph is final.
    pub fn validate_edges(&self) -> Result<(), TopologyError> {
        for edge in &self.edges {
            if !self.resources.contains_key(&edge.from) || !self.resources.contains_key(&edge.to) {
                return Err(TopologyError::DanglingDependency {
                    function: edge.from.clone(),
                    dependency: edge.to.clone(),
                });
            }
        }
        Ok(())
    }

    /// Kahn's algorithm over the dependency edges. Every resource appears
    /// after everything it depends on; ties break in name order so the
    /// result is deterministic. A cycle aborts with its member names.
    pub fn topological_order(&self) -> Result<Vec<String>, TopologyError> {
        let mut remaining_deps: BTreeMap<&str, BTreeSet<&str>> = self
            .resources
            .keys()
            .map(|name| (name.as_str(), BTreeSet::new()))
            .collect();
        for edge in &self.edges {
            if let Some(deps) = remaining_deps.get_mut(edge.from.as_str()) {
                if self.resources.contains_key(&edge.to) {
                    deps.insert(edge.to.as_str());
                }
            }
        }

        let mut order = Vec::with_capacity(self.resources.len());
        while !remaining_deps.is_empty() {
            let ready: Vec<&str> = remaining_deps
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(name, _)| *name)
                .collect();

            if ready.is_empty() {
                let members = remaining_deps.keys().map(|name| name.to_string()).collect();
                return Err(TopologyError::DependencyCycle { members });
            }

            for name in ready {
                remaining_deps.remove(name);
                for deps in remaining_deps.values_mut() {
                    deps.remove(name);
                }
                order.push(name.to_string());
            }
        }
        Ok(order)
    }
}
