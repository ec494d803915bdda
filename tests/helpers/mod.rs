//! Shared fixtures for the integration tests.

pub mod fixtures;
pub mod memory_fs;
