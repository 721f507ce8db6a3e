//! Adapter implementations of the port contracts.

pub mod memory;
