// ABOUTME: Configuration types and parsing for ferry.yml and command-line options.
// ABOUTME: Merges file and flag values, then validates them into immutable settings.

mod defaults;
mod validation;

pub use defaults::SynthesisDefaults;
pub use validation::ValidationError;

use validation::Checker;

use crate::error::{Error, Result};
use crate::types::{RepositoryName, ResourceName, RevisionSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "ferry.yml";
pub const CONFIG_FILENAME_ALT: &str = "ferry.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ferry/config.yml";

pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";
pub const DEFAULT_LIST_ITEMS: usize = 10;

/// Raw values from the config file or command line, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    pub region: Option<String>,
    pub repository: Option<String>,
    pub cluster: Option<String>,
    pub service: Option<String>,
    pub family: Option<String>,
    pub context: Option<PathBuf>,
    pub dockerfile: Option<String>,
    pub profile: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub wait_timeout: Option<Duration>,

    #[serde(default)]
    pub defaults: SynthesisDefaults,
}

/// Everything needed to build and push an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub region: String,
    pub repository: RepositoryName,
    pub context: PathBuf,
    pub dockerfile: String,
}

/// Everything needed to derive, register and roll out a task definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutSettings {
    pub cluster: ResourceName,
    pub service: ResourceName,
    pub family: ResourceName,
    pub wait_timeout: Duration,
    pub defaults: SynthesisDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    pub build: BuildSettings,
    pub rollout: RolloutSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSettings {
    pub region: String,
    pub family: ResourceName,
}

fn default_wait_timeout() -> Duration {
    Duration::from_secs(15 * 60)
}

impl Options {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`; no file is not an error.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Layer `overrides` on top of `self`; set values in `overrides` win.
    pub fn merge(self, overrides: Options) -> Options {
        Options {
            region: overrides.region.or(self.region),
            repository: overrides.repository.or(self.repository),
            cluster: overrides.cluster.or(self.cluster),
            service: overrides.service.or(self.service),
            family: overrides.family.or(self.family),
            context: overrides.context.or(self.context),
            dockerfile: overrides.dockerfile.or(self.dockerfile),
            profile: overrides.profile.or(self.profile),
            wait_timeout: overrides.wait_timeout.or(self.wait_timeout),
            defaults: self.defaults,
        }
    }

    fn context_dir(&self) -> PathBuf {
        self.context.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn dockerfile_name(&self) -> String {
        self.dockerfile
            .clone()
            .unwrap_or_else(|| DEFAULT_DOCKERFILE.to_string())
    }

    fn check_build(&self, check: &mut Checker) -> Option<BuildSettings> {
        let region = check.required("region", self.region.as_deref());
        let repository = check.repository(self.repository.as_deref());

        Some(BuildSettings {
            region: region?,
            repository: repository?,
            context: self.context_dir(),
            dockerfile: self.dockerfile_name(),
        })
    }

    fn check_rollout(&self, check: &mut Checker) -> Option<RolloutSettings> {
        let cluster = check.resource("cluster", self.cluster.as_deref());
        let service = check.resource("service", self.service.as_deref());
        let family = check.resource("family", self.family.as_deref());

        Some(RolloutSettings {
            cluster: cluster?,
            service: service?,
            family: family?,
            wait_timeout: self.wait_timeout.unwrap_or_else(default_wait_timeout),
            defaults: self.defaults.clone(),
        })
    }

    /// Settings for `build`: region and repository.
    pub fn build_settings(&self) -> std::result::Result<BuildSettings, ValidationError> {
        let mut check = Checker::default();
        let build = self.check_build(&mut check);
        build.ok_or_else(|| check.into_error())
    }

    /// Settings for `deploy`: build settings plus cluster, service and family.
    pub fn deploy_settings(&self) -> std::result::Result<DeploySettings, ValidationError> {
        let mut check = Checker::default();
        let build = self.check_build(&mut check);
        let rollout = self.check_rollout(&mut check);

        match (build, rollout) {
            (Some(build), Some(rollout)) => Ok(DeploySettings { build, rollout }),
            _ => Err(check.into_error()),
        }
    }

    /// Settings for `rollback`: deploy settings plus the target revision.
    pub fn rollback_settings(
        &self,
        target: Option<&str>,
    ) -> std::result::Result<(DeploySettings, RevisionSpec), ValidationError> {
        let mut check = Checker::default();
        let build = self.check_build(&mut check);
        let rollout = self.check_rollout(&mut check);
        let target = check.required("target-commit", target);

        match (build, rollout, target) {
            (Some(build), Some(rollout), Some(target)) => Ok((
                DeploySettings { build, rollout },
                RevisionSpec::parse(&target),
            )),
            _ => Err(check.into_error()),
        }
    }

    /// Settings for `list`: region and family.
    pub fn list_settings(&self) -> std::result::Result<ListSettings, ValidationError> {
        let mut check = Checker::default();
        let region = check.required("region", self.region.as_deref());
        let family = check.resource("family", self.family.as_deref());

        match (region, family) {
            (Some(region), Some(family)) => Ok(ListSettings { region, family }),
            _ => Err(check.into_error()),
        }
    }
}
