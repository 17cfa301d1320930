use std::sync::Mutex;

use topo_core::discovery::DiscoveryInfo;

/// Environment variable the deploy engine writes the per-function
/// discovery record into.
pub const DISCOVERY_ENV_VAR: &str = "TOPOLOGY_DISCOVERY";

/// Source of the published discovery record for the current function.
pub trait DiscoverySource {
    fn fetch(&self) -> Result<DiscoveryInfo, String>;
}

/// Reads the record the deploy engine serialized into the process
/// environment.
pub struct EnvDiscoverySource {
    variable: String,
}

impl EnvDiscoverySource {
    pub fn new() -> Self {
        Self::from_variable(DISCOVERY_ENV_VAR)
    }

    pub fn from_variable(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Default for EnvDiscoverySource {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoverySource for EnvDiscoverySource {
    fn fetch(&self) -> Result<DiscoveryInfo, String> {
        let raw = std::env::var(&self.variable)
            .map_err(|_| format!("{} is not configured", self.variable))?;
        serde_json::from_str(&raw)
            .map_err(|error| format!("malformed discovery record in {}: {error}", self.variable))
    }
}

/// Wraps a source so repeated lookups within one invocation reuse a
/// single fetched snapshot. The published record is read-only, so the
/// cached copy never goes stale within an invocation.
pub struct CachedDiscoverySource<S: DiscoverySource> {
    inner: S,
    snapshot: Mutex<Option<DiscoveryInfo>>,
}

impl<S: DiscoverySource> CachedDiscoverySource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshot: Mutex::new(None),
        }
    }
}

impl<S: DiscoverySource> DiscoverySource for CachedDiscoverySource<S> {
    fn fetch(&self) -> Result<DiscoveryInfo, String> {
        let mut snapshot = self.snapshot.lock().expect("poisoned mutex");
        if let Some(info) = snapshot.as_ref() {
            return Ok(info.clone());
        }
        let info = self.inner.fetch()?;
        *snapshot = Some(info.clone());
        Ok(info)
    }
}
