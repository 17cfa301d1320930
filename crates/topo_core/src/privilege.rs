use serde::{Deserialize, Serialize};

use crate::reference::ResourceRef;

/// One IAM-style statement granting the function's role a set of actions
/// against a resource. The resource may be a deferred reference to a
/// companion resource a decorator is about to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamPrivilege {
    pub actions: Vec<String>,
    pub resource: ResourceRef,
}

impl IamPrivilege {
    pub fn new(actions: &[&str], resource: ResourceRef) -> Self {
        Self {
            actions: actions.iter().map(|action| action.to_string()).collect(),
            resource,
        }
    }
}

/// The function-owned execution role: the privileges the function needs
/// to read its own companion resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub privileges: Vec<IamPrivilege>,
}

impl RoleDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_privilege(mut self, privilege: IamPrivilege) -> Self {
        self.privileges.push(privilege);
        self
    }
}
