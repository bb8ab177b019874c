// ABOUTME: Library root for ferry - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cloud;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod output;
pub mod source;
pub mod types;
