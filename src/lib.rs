//! Humantask: a WS-HumanTask-style task lifecycle engine.
//!
//! This crate manages the lifecycle of a "human task": a unit of work
//! routed to one or more people or groups for claiming, execution,
//! delegation, and completion under role-based authorisation rules. The
//! core is a finite-state machine over task statuses whose every transition
//! is gated by roles derived dynamically from the task's assignment sets,
//! recorded in an append-only audit history, and committed under an
//! optimistic-concurrency version.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory)
//!
//! # Modules
//!
//! - [`domain`]: Task record, roles, audit events, and the lifecycle engine
//! - [`ports`]: Repository and history-sink contracts
//! - [`adapters`]: In-memory port implementations
//! - [`services`]: The task facade tying the pieces together

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
