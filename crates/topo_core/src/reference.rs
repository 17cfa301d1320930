use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::graph::ResourceGraph;

/// Rendering applied to a deferred reference once its target is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefFormat {
    /// The resource's logical name, verbatim.
    Name,
    /// `arn:aws:s3:::<name>` for a bucket resource.
    BucketArn,
    /// `arn:aws:s3:::<name>/*`, covering every key under a bucket.
    BucketAllKeysArn,
}

/// A resource identifier that is either known at declaration time or
/// deferred until the graph is finalized. Deferred references break the
/// circularity between a permission that names a resource and a decorator
/// that has not yet created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceRef {
    Literal(String),
    Deferred {
        logical_name: String,
        format: RefFormat,
    },
}

impl ResourceRef {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn deferred(logical_name: impl Into<String>) -> Self {
        Self::Deferred {
            logical_name: logical_name.into(),
            format: RefFormat::Name,
        }
    }

    pub fn deferred_with_format(logical_name: impl Into<String>, format: RefFormat) -> Self {
        Self::Deferred {
            logical_name: logical_name.into(),
            format,
        }
    }

    /// The logical name a deferred reference points at, if any.
    pub fn deferred_target(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Deferred { logical_name, .. } => Some(logical_name),
        }
    }

    /// Resolves against the finalized graph. Literal values pass through;
    /// deferred references must name a resource present in the graph.
    pub fn resolve(&self, graph: &ResourceGraph, referrer: &str) -> Result<String, TopologyError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Deferred {
                logical_name,
                format,
            } => {
                if !graph.contains(logical_name) {
                    return Err(TopologyError::UnresolvedReference {
                        referrer: referrer.to_string(),
                        name: logical_name.clone(),
                    });
                }
                Ok(match format {
                    RefFormat::Name => logical_name.clone(),
                    RefFormat::BucketArn => format!("arn:aws:s3:::{logical_name}"),
                    RefFormat::BucketAllKeysArn => format!("arn:aws:s3:::{logical_name}/*"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Resource, ResourceGraph};

    fn graph_with_bucket(name: &str) -> ResourceGraph {
        let mut graph = ResourceGraph::new();
        graph
            .insert(name, Resource::s3_bucket(), "test")
            .expect("insert should succeed");
        graph
    }

    #[test]
    fn literal_resolves_to_itself() {
        let graph = ResourceGraph::new();
        let reference = ResourceRef::literal("arn:aws:s3:::MyBucket");
        assert_eq!(
            reference.resolve(&graph, "caller").expect("should resolve"),
            "arn:aws:s3:::MyBucket"
        );
    }

    #[test]
    fn deferred_resolves_to_logical_name() {
        let graph = graph_with_bucket("BucketA");
        let reference = ResourceRef::deferred("BucketA");
        assert_eq!(
            reference.resolve(&graph, "caller").expect("should resolve"),
            "BucketA"
        );
    }

    #[test]
    fn deferred_arn_formats_render_bucket_arns() {
        let graph = graph_with_bucket("BucketA");
        let arn = ResourceRef::deferred_with_format("BucketA", RefFormat::BucketArn);
        let all_keys = ResourceRef::deferred_with_format("BucketA", RefFormat::BucketAllKeysArn);
        assert_eq!(
            arn.resolve(&graph, "caller").expect("should resolve"),
            "arn:aws:s3:::BucketA"
        );
        assert_eq!(
            all_keys.resolve(&graph, "caller").expect("should resolve"),
            "arn:aws:s3:::BucketA/*"
        );
    }

    #[test]
    fn deferred_to_missing_resource_fails() {
        let graph = ResourceGraph::new();
        let reference = ResourceRef::deferred("Ghost");
        let error = reference
            .resolve(&graph, "EchoS3")
            .expect_err("should fail");
        assert_eq!(
            error,
            TopologyError::UnresolvedReference {
                referrer: "EchoS3".to_string(),
                name: "Ghost".to_string(),
            }
        );
    }
}
