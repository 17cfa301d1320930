use std::fmt;

/// Fatal synthesis errors. Any variant aborts the whole topology build;
/// a failed build yields no partial output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    DuplicateFunctionName {
        name: String,
    },
    DanglingDependency {
        function: String,
        dependency: String,
    },
    DependencyCycle {
        members: Vec<String>,
    },
    DuplicateResourceName {
        name: String,
        inserted_by: String,
    },
    InvalidPermissionConfiguration {
        function: String,
        message: String,
    },
    InvalidEventSourceMapping {
        function: String,
        message: String,
    },
    UnresolvedReference {
        referrer: String,
        name: String,
    },
}

impl TopologyError {
    /// True for errors caused by the topology declaration itself rather
    /// than by graph structure.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::DependencyCycle { .. })
    }
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFunctionName { name } => {
                write!(f, "duplicate function logical name '{name}'")
            }
            Self::DanglingDependency {
                function,
                dependency,
            } => {
                write!(
                    f,
                    "function '{function}' depends on '{dependency}', which no function or decorator provides"
                )
            }
            Self::DependencyCycle { members } => {
                write!(f, "dependency cycle among: {}", members.join(" -> "))
            }
            Self::DuplicateResourceName { name, inserted_by } => {
                write!(
                    f,
                    "'{inserted_by}' attempted to insert resource '{name}', which already exists"
                )
            }
            Self::InvalidPermissionConfiguration { function, message } => {
                write!(f, "invalid permission on function '{function}': {message}")
            }
            Self::InvalidEventSourceMapping { function, message } => {
                write!(
                    f,
                    "invalid event source mapping on function '{function}': {message}"
                )
            }
            Self::UnresolvedReference { referrer, name } => {
                write!(
                    f,
                    "'{referrer}' holds a deferred reference to '{name}', which is not in the finalized graph"
                )
            }
        }
    }
}

impl std::error::Error for TopologyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_not_a_configuration_error() {
        let error = TopologyError::DependencyCycle {
            members: vec!["A".to_string(), "B".to_string()],
        };
        assert!(!error.is_configuration());
        assert_eq!(error.to_string(), "dependency cycle among: A -> B");
    }

    #[test]
    fn dangling_dependency_names_the_offender() {
        let error = TopologyError::DanglingDependency {
            function: "EchoS3".to_string(),
            dependency: "MissingBucket".to_string(),
        };
        assert!(error.is_configuration());
        assert!(error.to_string().contains("EchoS3"));
        assert!(error.to_string().contains("MissingBucket"));
    }
}
