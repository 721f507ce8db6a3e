//! Unit tests for the task lifecycle core.

mod adapter_tests;
mod role_tests;
