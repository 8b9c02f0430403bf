// LogPeek - app/mod.rs
//
// Application layer: the per-request view pipeline, the JSON API and the
// HTTP server.
// Dependencies: core, platform, util.

pub mod api;
pub mod server;
pub mod viewer;
