use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::reference::ResourceRef;

/// Stream service limit shared by DynamoDB and Kinesis mappings.
pub const MAX_BATCH_SIZE: usize = 10_000;

const KINESIS_ARN_PREFIX: &str = "arn:aws:kinesis:";
const DYNAMODB_ARN_PREFIX: &str = "arn:aws:dynamodb:";

/// Where stream polling begins for a new mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartingPosition {
    TrimHorizon,
    Latest,
    /// Kinesis only; epoch seconds.
    AtTimestamp(i64),
}

impl StartingPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrimHorizon => "TRIM_HORIZON",
            Self::Latest => "LATEST",
            Self::AtTimestamp(_) => "AT_TIMESTAMP",
        }
    }
}

/// A pull binding: continuous polling of a change or log stream. This is
/// deliberately not a `Permission` — it provisions polling infrastructure
/// rather than a one-time invoke grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSourceMapping {
    pub stream: ResourceRef,
    pub starting_position: StartingPosition,
    pub batch_size: usize,
    pub enabled: bool,
}

impl EventSourceMapping {
    pub fn new(stream: ResourceRef, starting_position: StartingPosition, batch_size: usize) -> Self {
        Self {
            stream,
            starting_position,
            batch_size,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Checks batch size and starting position against known stream
    /// limits. The stream type is only derivable from a literal ARN;
    /// deferred refs skip the type-specific check.
    pub fn validate(&self, function: &str) -> Result<(), TopologyError> {
        let invalid = |message: String| TopologyError::InvalidEventSourceMapping {
            function: function.to_string(),
            message,
        };

        if self.batch_size == 0 {
            return Err(invalid("batch size must be a positive integer".to_string()));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(invalid(format!(
                "batch size {} exceeds the stream limit of {MAX_BATCH_SIZE}",
                self.batch_size
            )));
        }

        if let StartingPosition::AtTimestamp(epoch_seconds) = self.starting_position {
            if epoch_seconds < 0 {
                return Err(invalid(
                    "AT_TIMESTAMP requires a non-negative epoch timestamp".to_string(),
                ));
            }
            if let ResourceRef::Literal(arn) = &self.stream {
                if arn.starts_with(DYNAMODB_ARN_PREFIX) {
                    return Err(invalid(
                        "AT_TIMESTAMP is not supported for DynamoDB streams".to_string(),
                    ));
                }
                if !arn.starts_with(KINESIS_ARN_PREFIX) {
                    return Err(invalid(
                        "AT_TIMESTAMP is only supported for Kinesis streams".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DYNAMO_STREAM: &str =
        "arn:aws:dynamodb:us-west-2:123412341234:table/myTableName/stream/2015-10-22T15:05:13.779";
    const KINESIS_STREAM: &str = "arn:aws:kinesis:us-west-2:123412341234:stream/testStream";

    #[test]
    fn accepts_trim_horizon_dynamo_mapping() {
        let mapping = EventSourceMapping::new(
            ResourceRef::literal(DYNAMO_STREAM),
            StartingPosition::TrimHorizon,
            10,
        );
        assert!(mapping.validate("EchoDynamo").is_ok());
        assert!(mapping.enabled);
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mapping = EventSourceMapping::new(
            ResourceRef::literal(KINESIS_STREAM),
            StartingPosition::Latest,
            0,
        );
        let error = mapping.validate("EchoKinesis").expect_err("should fail");
        assert!(error.to_string().contains("positive integer"));
    }

    #[test]
    fn rejects_batch_size_over_stream_limit() {
        let mapping = EventSourceMapping::new(
            ResourceRef::literal(KINESIS_STREAM),
            StartingPosition::Latest,
            MAX_BATCH_SIZE + 1,
        );
        assert!(mapping.validate("EchoKinesis").is_err());
    }

    #[test]
    fn rejects_at_timestamp_on_dynamo_stream() {
        let mapping = EventSourceMapping::new(
            ResourceRef::literal(DYNAMO_STREAM),
            StartingPosition::AtTimestamp(1_700_000_000),
            10,
        );
        let error = mapping.validate("EchoDynamo").expect_err("should fail");
        assert!(error.to_string().contains("DynamoDB"));
    }

    #[test]
    fn accepts_at_timestamp_on_kinesis_stream() {
        let mapping = EventSourceMapping::new(
            ResourceRef::literal(KINESIS_STREAM),
            StartingPosition::AtTimestamp(1_700_000_000),
            100,
        );
        assert!(mapping.validate("EchoKinesis").is_ok());
    }

    #[test]
    fn deferred_stream_skips_type_specific_check() {
        let mapping = EventSourceMapping::new(
            ResourceRef::deferred("DynamicStream"),
            StartingPosition::AtTimestamp(1_700_000_000),
            10,
        );
        assert!(mapping.validate("EchoDeferred").is_ok());
    }
}
