// ABOUTME: Identity and Orchestrator backed by the `aws` command-line client.
// ABOUTME: Stages drafts in a scratch file and decodes JSON responses with serde.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use snafu::{OptionExt, ResultExt};
use tokio::process::Command;

use super::error::{CommandFailedSnafu, DecodeSnafu, MalformedArnSnafu, ScratchSnafu, SpawnSnafu};
use super::{CloudError, DefinitionRevision, Identity, Orchestrator, TaskDefinition};
use super::task_definition::TaskDefinitionDraft;
use crate::engine::RegistryAuth;
use crate::types::ResourceName;

/// Message the service returns when a family has no active revision.
const DESCRIBE_NOT_FOUND: &str = "Unable to describe task definition";

/// Username the registry expects alongside a login token.
const REGISTRY_USER: &str = "AWS";

/// Client for the `aws` CLI, pinned to one region.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: String,
    profile: Option<String>,
}

impl AwsCli {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            program: PathBuf::from("aws"),
            region: region.into(),
            profile: None,
        }
    }

    /// Use a different executable (e.g. a pinned install).
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    async fn run(&self, args: &[&str]) -> Result<String, CloudError> {
        let command = format!("aws {}", args.join(" "));
        tracing::debug!(%command, region = %self.region, "invoking cloud CLI");

        let mut cmd = Command::new(&self.program);
        cmd.arg("--region").arg(&self.region);
        cmd.arg("--output").arg("json");
        if let Some(ref profile) = self.profile {
            cmd.arg("--profile").arg(profile);
        }

        // A dropped future (the stabilization timeout) must not leave the CLI polling
        let output = cmd
            .args(args)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context(SpawnSnafu { command: &command })?;

        if !output.status.success() {
            return CommandFailedSnafu {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .fail();
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, CloudError> {
        let stdout = self.run(args).await?;
        serde_json::from_str(&stdout).context(DecodeSnafu {
            command: format!("aws {}", args.join(" ")),
        })
    }
}

#[derive(Deserialize)]
struct CallerIdentity {
    #[serde(rename = "Account")]
    account: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeResponse {
    task_definition: TaskDefinition,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    task_definition: RegisteredBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisteredBody {
    task_definition_arn: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    task_definition_arns: Vec<String>,
}

#[async_trait]
impl Identity for AwsCli {
    async fn tenant_id(&self) -> Result<String, CloudError> {
        let identity: CallerIdentity = self.run_json(&["sts", "get-caller-identity"]).await?;
        Ok(identity.account)
    }

    async fn registry_auth(&self, registry_host: &str) -> Result<RegistryAuth, CloudError> {
        let token = self.run(&["ecr", "get-login-password"]).await?;
        Ok(RegistryAuth {
            username: REGISTRY_USER.to_string(),
            password: token.trim().to_string(),
            server: registry_host.to_string(),
        })
    }
}

#[async_trait]
impl Orchestrator for AwsCli {
    async fn describe_task_definition(
        &self,
        family: &ResourceName,
    ) -> Result<Option<TaskDefinition>, CloudError> {
        let result: Result<DescribeResponse, _> = self
            .run_json(&[
                "ecs",
                "describe-task-definition",
                "--task-definition",
                family.as_str(),
            ])
            .await;

        match result {
            Ok(response) => Ok(Some(response.task_definition)),
            Err(e) if e.stderr().is_some_and(|s| s.contains(DESCRIBE_NOT_FOUND)) => {
                tracing::info!(%family, "no existing task definition");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn register_task_definition(
        &self,
        draft: &TaskDefinitionDraft,
    ) -> Result<DefinitionRevision, CloudError> {
        // Held until registration returns; removed on drop.
        let mut scratch = tempfile::Builder::new()
            .prefix("ferry-draft-")
            .suffix(".json")
            .tempfile()
            .context(ScratchSnafu)?;
        serde_json::to_writer_pretty(scratch.as_file_mut(), draft)
            .map_err(std::io::Error::from)
            .context(ScratchSnafu)?;
        scratch.as_file_mut().flush().context(ScratchSnafu)?;

        tracing::debug!(
            path = %scratch.path().display(),
            family = %draft.family,
            "staged draft definition"
        );

        let input = format!("file://{}", scratch.path().display());
        let response: RegisterResponse = self
            .run_json(&["ecs", "register-task-definition", "--cli-input-json", &input])
            .await?;

        let arn = response
            .task_definition
            .task_definition_arn
            .context(MalformedArnSnafu { arn: "<missing>" })?;
        DefinitionRevision::from_arn(&arn)
    }

    async fn update_service(
        &self,
        cluster: &ResourceName,
        service: &ResourceName,
        revision: &DefinitionRevision,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ecs",
            "update-service",
            "--cluster",
            cluster.as_str(),
            "--service",
            service.as_str(),
            "--task-definition",
            revision.arn(),
        ])
        .await?;
        Ok(())
    }

    async fn wait_until_stable(
        &self,
        cluster: &ResourceName,
        service: &ResourceName,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ecs",
            "wait",
            "services-stable",
            "--cluster",
            cluster.as_str(),
            "--services",
            service.as_str(),
        ])
        .await?;
        Ok(())
    }

    async fn list_task_definitions(
        &self,
        family: &ResourceName,
        max_items: usize,
    ) -> Result<Vec<DefinitionRevision>, CloudError> {
        let max = max_items.to_string();
        let response: ListResponse = self
            .run_json(&[
                "ecs",
                "list-task-definitions",
                "--family-prefix",
                family.as_str(),
                "--sort",
                "DESC",
                "--max-items",
                &max,
            ])
            .await?;

        let mut revisions = response
            .task_definition_arns
            .iter()
            .map(|arn| DefinitionRevision::from_arn(arn))
            .collect::<Result<Vec<_>, _>>()?;

        // The prefix filter also matches e.g. `bia-worker` for `bia`.
        revisions.retain(|r| r.family() == family.as_str());
        revisions.truncate(max_items);
        Ok(revisions)
    }
}
