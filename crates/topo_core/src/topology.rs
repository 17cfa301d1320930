use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::TopologyError;
use crate::event_source::StartingPosition;
use crate::function::FunctionDescriptor;
use crate::graph::{Edge, Resource, ResourceGraph, FUNCTION_RESOURCE_TYPE};
use crate::permission::InvocationType;

/// Deployment-wide settings, passed in explicitly at construction.
/// Defaults live here, next to the fields they apply to, rather than in
/// ad hoc environment lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub service_name: String,
    pub description: String,
    /// Applied when a descriptor leaves `memory_mb` unset.
    pub default_memory_mb: u32,
    /// Applied when a descriptor leaves `timeout_seconds` unset.
    pub default_timeout_seconds: u32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            service_name: "TopologyApplication".to_string(),
            description: String::new(),
            default_memory_mb: 128,
            default_timeout_seconds: 3,
        }
    }
}

impl TopologyConfig {
    pub fn named(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }
}

/// An invoke grant with its source identifier fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInvokeGrant {
    pub principal: String,
    pub action: String,
    pub source_arn: String,
    pub event_type_filters: Vec<String>,
    pub invocation_type: Option<InvocationType>,
}

/// A privilege statement with its resource identifier fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrivilege {
    pub actions: Vec<String>,
    pub resource: String,
}

/// A pull binding with its stream identifier fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEventSourceMapping {
    pub stream_arn: String,
    pub starting_position: StartingPosition,
    pub batch_size: usize,
    pub enabled: bool,
}

/// One function as handed to the deploy engine: all references resolved,
/// options defaulted, declaration order intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFunction {
    pub logical_name: String,
    pub handler_ref: String,
    pub description: String,
    pub memory_mb: u32,
    pub timeout_seconds: u32,
    pub privileges: Vec<ResolvedPrivilege>,
    pub invoke_grants: Vec<ResolvedInvokeGrant>,
    pub event_source_mappings: Vec<ResolvedEventSourceMapping>,
}

/// The finalized deployment description: the acyclic resource graph, a
/// provisioning order respecting every edge, and the resolved functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTopology {
    pub service_name: String,
    pub description: String,
    pub graph: ResourceGraph,
    pub provisioning_order: Vec<String>,
    pub functions: Vec<ResolvedFunction>,
}

impl ResolvedTopology {
    pub fn function(&self, logical_name: &str) -> Option<&ResolvedFunction> {
        self.functions
            .iter()
            .find(|function| function.logical_name == logical_name)
    }
}

/// Accumulates function descriptors and synthesizes the deployment
/// description. `build()` is atomic: any validation failure yields no
/// partial topology, so a colliding pair of functions registers neither.
pub struct TopologyBuilder {
    config: TopologyConfig,
    functions: Vec<FunctionDescriptor>,
}

impl TopologyBuilder {
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            config,
            functions: Vec::new(),
        }
    }

    /// Appends a descriptor. Repeatable; declaration order is preserved.
    pub fn add(&mut self, descriptor: FunctionDescriptor) -> &mut Self {
        self.functions.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn build(self) -> Result<ResolvedTopology, TopologyError> {
        self.check_unique_names()?;
        self.validate_declarations()?;

        let mut graph = ResourceGraph::new();
        for function in &self.functions {
            graph.insert(
                function.logical_name(),
                self.function_resource(function),
                function.logical_name(),
            )?;
        }
        self.inject_message_body_storage(&mut graph)?;
        self.run_decorators(&mut graph)?;
        self.record_declared_dependencies(&mut graph)?;
        graph.validate_edges()?;

        let provisioning_order = graph.topological_order()?;
        let functions = self.resolve_functions(&graph)?;

        Ok(ResolvedTopology {
            service_name: self.config.service_name,
            description: self.config.description,
            graph,
            provisioning_order,
            functions,
        })
    }

    fn check_unique_names(&self) -> Result<(), TopologyError> {
        let mut seen = BTreeSet::new();
        for function in &self.functions {
            if !seen.insert(function.logical_name()) {
                return Err(TopologyError::DuplicateFunctionName {
                    name: function.logical_name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_declarations(&self) -> Result<(), TopologyError> {
        for function in &self.functions {
            for permission in &function.permissions {
                permission.validate(function.logical_name())?;
            }
            for mapping in &function.event_source_mappings {
                mapping.validate(function.logical_name())?;
            }
        }
        Ok(())
    }

    fn function_resource(&self, function: &FunctionDescriptor) -> Resource {
        Resource::new(FUNCTION_RESOURCE_TYPE)
            .with_property("HandlerRef", json!(function.handler_ref()))
            .with_property(
                "MemorySize",
                json!(function
                    .options
                    .memory_mb
                    .unwrap_or(self.config.default_memory_mb)),
            )
            .with_property(
                "Timeout",
                json!(function
                    .options
                    .timeout_seconds
                    .unwrap_or(self.config.default_timeout_seconds)),
            )
    }

    /// SES message body buckets are companion resources declared through
    /// the permission rather than a decorator; they are injected here with
    /// the same collision rules, plus the function -> bucket edge.
    fn inject_message_body_storage(&self, graph: &mut ResourceGraph) -> Result<(), TopologyError> {
        for function in &self.functions {
            for permission in &function.permissions {
                if let Some(storage) = permission.message_body_storage() {
                    graph.insert(
                        storage.logical_name(),
                        storage.bucket_resource(),
                        function.logical_name(),
                    )?;
                    graph.add_edge(Edge::new(function.logical_name(), storage.logical_name()));
                }
            }
        }
        Ok(())
    }

    /// Runs every decorator exactly once. Functions are visited in an
    /// order that respects declared function-to-function dependencies
    /// (declaration order as the tie-break), so a later decorator may rely
    /// on resources an earlier one inserted. Each decorator sees the graph
    /// as a read-only snapshot and returns its delta.
    fn run_decorators(&self, graph: &mut ResourceGraph) -> Result<(), TopologyError> {
        for index in self.decorator_visit_order() {
            let function = &self.functions[index];
            for decorator in &function.decorators {
                let output = decorator.decorate(graph, function.logical_name())?;
                for (logical_name, resource) in output.resources {
                    graph.insert(logical_name, resource, function.logical_name())?;
                }
                for edge in output.edges {
                    graph.add_edge(edge);
                }
            }
        }
        Ok(())
    }

    /// Kahn over function-to-function `depends_on` edges only. If those
    /// edges are cyclic the remaining functions run in declaration order;
    /// the full graph sort reports the cycle afterwards.
    fn decorator_visit_order(&self) -> Vec<usize> {
        let function_names: Vec<&str> = self
            .functions
            .iter()
            .map(|function| function.logical_name())
            .collect();

        let mut visited = vec![false; self.functions.len()];
        let mut order = Vec::with_capacity(self.functions.len());
        while order.len() < self.functions.len() {
            let mut progressed = false;
            for (index, function) in self.functions.iter().enumerate() {
                if visited[index] {
                    continue;
                }
                let blocked = function.depends_on.iter().any(|dependency| {
                    function_names
                        .iter()
                        .position(|name| name == dependency)
                        .is_some_and(|target| !visited[target])
                });
                if !blocked {
                    visited[index] = true;
                    order.push(index);
                    progressed = true;
                }
            }
            if !progressed {
                for (index, flag) in visited.iter_mut().enumerate() {
                    if !*flag {
                        *flag = true;
                        order.push(index);
                    }
                }
            }
        }
        order
    }

    fn record_declared_dependencies(&self, graph: &mut ResourceGraph) -> Result<(), TopologyError> {
        for function in &self.functions {
            for dependency in &function.depends_on {
                if !graph.contains(dependency) {
                    return Err(TopologyError::DanglingDependency {
                        function: function.logical_name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
                graph.add_edge(Edge::new(function.logical_name(), dependency));
            }
        }
        Ok(())
    }

    /// Finalization: the single pass that resolves every deferred
    /// reference, after all decorators have run.
    fn resolve_functions(&self, graph: &ResourceGraph) -> Result<Vec<ResolvedFunction>, TopologyError> {
        let mut resolved = Vec::with_capacity(self.functions.len());
        for function in &self.functions {
            let name = function.logical_name();

            let mut privileges = Vec::with_capacity(function.role.privileges.len());
            for privilege in &function.role.privileges {
                privileges.push(ResolvedPrivilege {
                    actions: privilege.actions.clone(),
                    resource: privilege.resource.resolve(graph, name)?,
                });
            }

            let mut invoke_grants = Vec::with_capacity(function.permissions.len());
            for permission in &function.permissions {
                let grant = permission.invoke_grant(name)?;
                invoke_grants.push(ResolvedInvokeGrant {
                    principal: grant.principal,
                    action: grant.action,
                    source_arn: grant.source_arn.resolve(graph, name)?,
                    event_type_filters: grant.event_type_filters,
                    invocation_type: grant.invocation_type,
                });
            }

            let mut event_source_mappings =
                Vec::with_capacity(function.event_source_mappings.len());
            for mapping in &function.event_source_mappings {
                event_source_mappings.push(ResolvedEventSourceMapping {
                    stream_arn: mapping.stream.resolve(graph, name)?,
                    starting_position: mapping.starting_position,
                    batch_size: mapping.batch_size,
                    enabled: mapping.enabled,
                });
            }

            resolved.push(ResolvedFunction {
                logical_name: name.to_string(),
                handler_ref: function.handler_ref().to_string(),
                description: function.options.description.clone().unwrap_or_default(),
                memory_mb: function
                    .options
                    .memory_mb
                    .unwrap_or(self.config.default_memory_mb),
                timeout_seconds: function
                    .options
                    .timeout_seconds
                    .unwrap_or(self.config.default_timeout_seconds),
                privileges,
                invoke_grants,
                event_source_mappings,
            });
        }
        Ok(resolved)
    }
}
