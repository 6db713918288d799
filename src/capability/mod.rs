//! Capability registry and dispatch core.
//!
//! Actions (MCP tools) and templates (MCP prompts) are declared as pure
//! definition and behaviour pairs, registered into a [`services::Registry`],
//! and reached through a transport-agnostic [`ports::Dispatcher`]. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
