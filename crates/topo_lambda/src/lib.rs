//! Runtime integration for deployed topology functions.
//!
//! This crate owns what executes inside an invocation: normalized inbound
//! event payloads, the echo and mail-receipt handlers, and the adapter
//! seams for discovery and companion object storage. Synthesis-time
//! concerns live in `topo_core`.

pub mod adapters;
pub mod events;
pub mod handlers;
