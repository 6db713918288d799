//! Switchboard: capability registry and dispatch core for MCP-style servers.
//!
//! This crate declares invocable actions and message templates, gives each a
//! namespaced wire name, validates client arguments against their schemas,
//! and routes protocol requests to them with uniform error reporting.
//!
//! # Architecture
//!
//! Switchboard follows hexagonal architecture principles:
//!
//! - **Domain**: Definitions, components and the error taxonomy
//! - **Ports**: The dispatcher boundary the registry binds to
//! - **Adapters**: A newline-delimited JSON-RPC dispatcher
//!
//! # Modules
//!
//! - [`capability`]: Registry, repositories and dispatch
//! - [`capabilities`]: Bundled actions and templates
//! - [`config`]: Server configuration loading

pub mod capabilities;
pub mod capability;
pub mod config;
