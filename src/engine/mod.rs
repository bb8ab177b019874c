// ABOUTME: Container engine capability for building and publishing images.
// ABOUTME: Defines the ImageEngine trait, build requests and registry credentials.

mod bollard;

pub use self::bollard::BollardEngine;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::types::ImageUri;

/// Build an image from a context directory and push it to a registry.
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Build `request.context` and apply every tag in `request.tags`.
    async fn build_image(&self, request: &BuildRequest) -> Result<(), ImageError>;

    /// Push the registry-qualified tag of `image`.
    async fn push_image(&self, image: &ImageUri, auth: &RegistryAuth) -> Result<(), ImageError>;
}

/// What to build and how to tag it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Directory sent to the engine as the build context.
    pub context: PathBuf,
    /// Dockerfile path relative to the context.
    pub dockerfile: String,
    /// Tags to apply; the first one is applied by the build itself.
    pub tags: Vec<String>,
}

/// Registry authentication credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
    pub server: String,
}

impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("server", &self.server)
            .finish()
    }
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("cannot connect to container engine: {0}")]
    Connection(String),

    #[error("cannot read build context {path}: {reason}")]
    Context { path: PathBuf, reason: String },

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("tagging failed: {0}")]
    TagFailed(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}
