// ABOUTME: Bollard-based ImageEngine talking to the local Docker-compatible engine.
// ABOUTME: Streams the build context as a tar archive and pushes with registry credentials.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::query_parameters::{
    BuildImageOptionsBuilder, PushImageOptionsBuilder, TagImageOptionsBuilder,
};
use bytes::Bytes;
use futures::StreamExt;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::{BuildRequest, ImageEngine, ImageError, RegistryAuth};
use crate::types::ImageUri;

/// Directory names never sent to the engine as part of a build context.
const CONTEXT_EXCLUDES: &[&str] = &[".git"];

const DOCKERIGNORE: &str = ".dockerignore";

pub struct BollardEngine {
    client: Docker,
}

impl BollardEngine {
    pub fn new(client: Docker) -> Self {
        Self { client }
    }

    /// Connect using `DOCKER_HOST` or the platform's default socket.
    pub fn connect_local() -> Result<Self, ImageError> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| ImageError::Connection(e.to_string()))?;
        Ok(Self::new(client))
    }

    async fn tag(&self, source: &str, target: &str) -> Result<(), ImageError> {
        let (repo, tag) = split_tag(target);
        let mut opts = TagImageOptionsBuilder::default().repo(repo);
        if let Some(tag) = tag {
            opts = opts.tag(tag);
        }

        self.client
            .tag_image(source, Some(opts.build()))
            .await
            .map_err(|e| ImageError::TagFailed(format!("{} -> {}: {}", source, target, e)))
    }
}

#[async_trait]
impl ImageEngine for BollardEngine {
    async fn build_image(&self, request: &BuildRequest) -> Result<(), ImageError> {
        let Some((primary, extra)) = request.tags.split_first() else {
            return Err(ImageError::BuildFailed("no tags requested".to_string()));
        };

        let context = request.context.clone();
        let dockerfile = request.dockerfile.clone();
        let archive = tokio::task::spawn_blocking(move || archive_context(&context, &dockerfile))
            .await
            .map_err(|e| ImageError::BuildFailed(e.to_string()))?
            .map_err(|e| ImageError::Context {
                path: request.context.clone(),
                reason: e.to_string(),
            })?;

        let opts = BuildImageOptionsBuilder::default()
            .dockerfile(&request.dockerfile)
            .t(primary)
            .rm(true)
            .build();

        let mut stream =
            self.client
                .build_image(opts, None, Some(bollard::body_full(Bytes::from(archive))));
        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| ImageError::BuildFailed(e.to_string()))?;
            if let Some(line) = info.stream.as_deref().map(str::trim_end)
                && !line.is_empty()
            {
                tracing::debug!(target: "ferry::build", "{}", line);
            }
        }

        for tag in extra {
            self.tag(primary, tag).await?;
        }

        Ok(())
    }

    async fn push_image(&self, image: &ImageUri, auth: &RegistryAuth) -> Result<(), ImageError> {
        let name = image.remote_name();
        let opts = PushImageOptionsBuilder::default().tag(image.tag()).build();

        let credentials = DockerCredentials {
            username: Some(auth.username.clone()),
            password: Some(auth.password.clone()),
            serveraddress: Some(auth.server.clone()),
            ..Default::default()
        };

        // Push returns a stream of progress updates - consume it
        let mut stream = self.client.push_image(&name, Some(opts), Some(credentials));
        while let Some(result) = stream.next().await {
            result.map_err(|e| ImageError::PushFailed(format!("{}: {}", image, e)))?;
        }

        Ok(())
    }
}

/// Split `repo:tag` at the last colon that is not part of a registry port.
fn split_tag(reference: &str) -> (&str, Option<&str>) {
    match reference.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, Some(tag)),
        _ => (reference, None),
    }
}

/// Tar up a build context directory, skipping VCS metadata and anything
/// `.dockerignore` excludes. The Dockerfile and `.dockerignore` are always sent.
pub(crate) fn archive_context(dir: &Path, dockerfile: &str) -> std::io::Result<Vec<u8>> {
    let ignored = load_dockerignore(dir)?;
    let keep = [Path::new(dockerfile), Path::new(DOCKERIGNORE)];

    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    append_tree(&mut builder, dir, Path::new(""), &ignored, &keep)?;
    builder.into_inner()
}

fn append_tree(
    builder: &mut tar::Builder<Vec<u8>>,
    root: &Path,
    relative: &Path,
    ignored: &Gitignore,
    keep: &[&Path],
) -> std::io::Result<()> {
    let mut entries = std::fs::read_dir(root.join(relative))?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        if relative.as_os_str().is_empty() && CONTEXT_EXCLUDES.iter().any(|x| name == *x) {
            continue;
        }

        let path = relative.join(&name);
        let file_type = entry.file_type()?;
        if ignored.matched(&path, file_type.is_dir()).is_ignore() && !keep.contains(&path.as_path())
        {
            continue;
        }

        if file_type.is_dir() {
            builder.append_dir(&path, entry.path())?;
            append_tree(builder, root, &path, ignored, keep)?;
        } else {
            builder.append_path_with_name(entry.path(), &path)?;
        }
    }

    Ok(())
}

/// Read `.dockerignore` patterns, which are relative to the context root.
fn load_dockerignore(dir: &Path) -> std::io::Result<Gitignore> {
    let mut patterns = GitignoreBuilder::new(dir);
    match std::fs::read_to_string(dir.join(DOCKERIGNORE)) {
        Ok(contents) => {
            for pattern in contents.lines().filter_map(anchor_pattern) {
                patterns
                    .add_line(None, &pattern)
                    .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    patterns
        .build()
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e.to_string()))
}

/// Rewrite a `.dockerignore` line as a root-anchored gitignore pattern.
fn anchor_pattern(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negate, pattern) = match line.strip_prefix('!') {
        Some(rest) => ("!", rest.trim()),
        None => ("", line),
    };
    let pattern = pattern.trim_start_matches("./").trim_start_matches('/');
    if pattern.is_empty() {
        return None;
    }
    Some(format!("{}/{}", negate, pattern))
}
