// ABOUTME: Library root for shipline - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod proxy;
pub mod runtime;
pub mod topology;
pub mod types;
