use serde::{Deserialize, Serialize};

use crate::decorator::Decorator;
use crate::event_source::EventSourceMapping;
use crate::names;
use crate::permission::Permission;
use crate::privilege::RoleDefinition;

/// Execution options applied to one function. Unset fields fall back to
/// the topology-level defaults at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionOptions {
    pub description: Option<String>,
    pub memory_mb: Option<u32>,
    pub timeout_seconds: Option<u32>,
}

/// The aggregate record for one deployable function: handler reference,
/// owned role, attached push permissions, pull stream mappings,
/// synthesis-time decorators, and structural dependencies.
///
/// Descriptors are write-once during the definition phase: every mutator
/// appends, and declaration order is preserved through synthesis.
pub struct FunctionDescriptor {
    logical_name: String,
    handler_ref: String,
    pub role: RoleDefinition,
    pub permissions: Vec<Permission>,
    pub event_source_mappings: Vec<EventSourceMapping>,
    pub decorators: Vec<Box<dyn Decorator>>,
    pub depends_on: Vec<String>,
    pub options: FunctionOptions,
}

impl FunctionDescriptor {
    /// Registers a handler for deployment. The logical name is derived
    /// deterministically from the handler reference.
    pub fn register(handler_ref: impl Into<String>, role: RoleDefinition) -> Self {
        let handler_ref = handler_ref.into();
        Self {
            logical_name: names::function_logical_name(&handler_ref),
            handler_ref,
            role,
            permissions: Vec::new(),
            event_source_mappings: Vec::new(),
            decorators: Vec::new(),
            depends_on: Vec::new(),
            options: FunctionOptions::default(),
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn handler_ref(&self) -> &str {
        &self.handler_ref
    }

    pub fn add_permission(&mut self, permission: Permission) -> &mut Self {
        self.permissions.push(permission);
        self
    }

    pub fn add_event_source_mapping(&mut self, mapping: EventSourceMapping) -> &mut Self {
        self.event_source_mappings.push(mapping);
        self
    }

    pub fn add_decorator(&mut self, decorator: impl Decorator + 'static) -> &mut Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    pub fn add_dependency(&mut self, logical_name: impl Into<String>) -> &mut Self {
        self.depends_on.push(logical_name.into());
        self
    }

    pub fn set_options(&mut self, options: FunctionOptions) -> &mut Self {
        self.options = options;
        self
    }
}

impl std::fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("logical_name", &self.logical_name)
            .field("handler_ref", &self.handler_ref)
            .field("permissions", &self.permissions.len())
            .field("event_source_mappings", &self.event_source_mappings.len())
            .field("decorators", &self.decorators.len())
            .field("depends_on", &self.depends_on)
            .finish()
    }
}
