//! Opsdesk daemon library.
//!
//! Routes inbound text/vision/ticket requests through capability agents and
//! opportunistically opens support tickets when free text looks like a
//! problem report.

pub mod agent;
pub mod agents;
pub mod config;
pub mod coordinator;
pub mod detector;
pub mod llm;
pub mod memory;
pub mod routes;
pub mod server;
pub mod store;
