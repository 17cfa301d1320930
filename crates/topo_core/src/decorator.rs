use crate::error::TopologyError;
use crate::graph::{Edge, Resource, ResourceGraph};

/// Resources and dependency edges a decorator wants added for its
/// function. Side effects are confined to this returned delta; decorators
/// never touch resources belonging to other functions.
#[derive(Debug, Clone, Default)]
pub struct DecoratorOutput {
    pub resources: Vec<(String, Resource)>,
    pub edges: Vec<Edge>,
}

impl DecoratorOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a resource and records the edge from the owning function,
    /// the common case for companion infrastructure.
    pub fn with_companion(
        mut self,
        self_name: &str,
        logical_name: impl Into<String>,
        resource: Resource,
    ) -> Self {
        let logical_name = logical_name.into();
        self.edges.push(Edge::new(self_name, &logical_name));
        self.resources.push((logical_name, resource));
        self
    }
}

/// Synthesis-time hook that injects auxiliary infrastructure tied to one
/// function. Invoked exactly once per function, after the function's own
/// resource is in the graph, before finalization. The graph argument is a
/// read-only snapshot; earlier decorators' insertions are visible in it.
pub trait Decorator {
    fn decorate(
        &self,
        graph: &ResourceGraph,
        self_name: &str,
    ) -> Result<DecoratorOutput, TopologyError>;
}

/// Plain-function decorators, for call sites that do not need a type.
impl<F> Decorator for F
where
    F: Fn(&ResourceGraph, &str) -> Result<DecoratorOutput, TopologyError>,
{
    fn decorate(
        &self,
        graph: &ResourceGraph,
        self_name: &str,
    ) -> Result<DecoratorOutput, TopologyError> {
        self(graph, self_name)
    }
}

/// Injects a single fixed companion resource under a fixed logical name.
pub struct CompanionResourceDecorator {
    logical_name: String,
    resource: Resource,
}

impl CompanionResourceDecorator {
    pub fn new(logical_name: impl Into<String>, resource: Resource) -> Self {
        Self {
            logical_name: logical_name.into(),
            resource,
        }
    }
}

impl Decorator for CompanionResourceDecorator {
    fn decorate(
        &self,
        _graph: &ResourceGraph,
        self_name: &str,
    ) -> Result<DecoratorOutput, TopologyError> {
        Ok(DecoratorOutput::new().with_companion(
            self_name,
            &self.logical_name,
            self.resource.clone(),
        ))
    }
}
