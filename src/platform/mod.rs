// LogPeek - platform/mod.rs
//
// Platform abstraction layer: configuration files and file content access.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
