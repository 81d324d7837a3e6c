//! Shared types for the opsdesk daemon and CLI.

pub mod api;
pub mod error;
pub mod ticket;
pub mod ui;
