//! Deterministic synthesis engine for serverless deployment topologies.
//!
//! This crate owns the declaration model (functions, permissions, stream
//! mappings, decorators), the resource graph with dependency ordering, and
//! the discovery contract consumed at runtime. It intentionally excludes
//! AWS SDK and Lambda runtime concerns; those live in `topo_lambda`.

pub mod decorator;
pub mod discovery;
pub mod error;
pub mod event_source;
pub mod function;
pub mod graph;
pub mod names;
pub mod permission;
pub mod privilege;
pub mod reference;
pub mod topology;
