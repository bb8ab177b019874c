// ABOUTME: Application-wide error types for ferry.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ValidationError;
use crate::deploy::WorkflowError;
use crate::engine::ImageError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("container engine unavailable: {0}")]
    Engine(#[from] ImageError),

    #[error("cannot open repository: {0}")]
    Source(#[from] crate::source::SourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
