pub mod echo;
pub mod ses;

use std::fmt;

/// Invocation metadata threaded through every handler for log
/// correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerErrorKind {
    /// Malformed inbound payload; recovered locally, caller sees a 400.
    Decode,
    /// Missing or ambiguous deployment wiring; caller sees a 500.
    Configuration,
    /// Companion resource I/O failed; caller sees a 502. Retry policy
    /// belongs to the invocation layer, not here.
    Upstream,
}

/// A request-scoped failure. Never process-fatal; the binary layer turns
/// it into the invocation-level failure for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub kind: HandlerErrorKind,
    pub message: String,
}

impl HandlerError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: HandlerErrorKind::Decode,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: HandlerErrorKind::Configuration,
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: HandlerErrorKind::Upstream,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.kind {
            HandlerErrorKind::Decode => 400,
            HandlerErrorKind::Configuration => 500,
            HandlerErrorKind::Upstream => 502,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}
