// LogPeek - core/mod.rs
//
// Core business logic layer: catalog, classification, assembly, limits.
// Must NOT depend on: app, platform, or any transport crate.

pub mod change;
pub mod classify;
pub mod discovery;
pub mod model;
pub mod parser;
pub mod size_guard;
pub mod truncate;
