// ABOUTME: State transition methods for the build and deploy workflow.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::cloud::{Identity, Orchestrator, ServiceState, Stability};
use crate::config::RolloutSettings;
use crate::engine::{BuildRequest, ImageEngine};
use crate::source::SourceControl;
use crate::types::{ImageUri, RevisionSpec};

use super::Workflow;
use super::actions::{BuildOutcome, DeployOutcome};
use super::error::{AtStage, CloudErrorExt, DeployError, ImageErrorExt, Stage, WorkflowError};
use super::state::{Built, Idle, Resolved, RolledOut, Synthesized};
use super::synthesize::synthesize;

// =============================================================================
// Idle -> Resolved
// =============================================================================

impl<'a> Workflow<'a, Idle> {
    /// Resolve `spec` to a commit.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::UnknownRevision` if the reference names nothing.
    #[must_use = "workflow state must be used"]
    pub async fn resolve<G: SourceControl + ?Sized>(
        self,
        source: &G,
        spec: &RevisionSpec,
    ) -> Result<Workflow<'a, Resolved>, WorkflowError> {
        let revision = source.resolve(spec).await.at(Stage::Resolving)?;
        tracing::info!(reference = %spec, revision = %revision.full(), "resolved revision");
        Ok(self.advance(|Idle| Resolved { revision }))
    }
}

// =============================================================================
// Resolved -> Built
// =============================================================================

impl<'a> Workflow<'a, Resolved> {
    /// Build the image for the resolved revision and push it.
    ///
    /// The image is tagged both locally (`repository:short`) and with its
    /// registry-qualified name; only the latter is pushed. Partially built
    /// images are left in place on failure.
    ///
    /// # Errors
    ///
    /// Returns `Identity`, `Build` or `Push` errors from the respective step.
    #[must_use = "workflow state must be used"]
    pub async fn build<E, I>(
        self,
        engine: &E,
        identity: &I,
    ) -> Result<Workflow<'a, Built>, WorkflowError>
    where
        E: ImageEngine + ?Sized,
        I: Identity + ?Sized,
    {
        let settings = self.settings;

        let tenant = identity
            .tenant_id()
            .await
            .map_err(|e| e.into_deploy_error(DeployError::Identity))
            .at(Stage::Building)?;

        let image = ImageUri::new(
            &tenant,
            &settings.region,
            &settings.repository,
            &self.state.revision,
        );

        let auth = identity
            .registry_auth(&image.registry_host())
            .await
            .map_err(|e| e.into_deploy_error(DeployError::Push))
            .at(Stage::Building)?;

        let request = BuildRequest {
            context: settings.context.clone(),
            dockerfile: settings.dockerfile.clone(),
            tags: vec![image.local_tag(), image.to_string()],
        };

        tracing::info!(
            image = %image.canonical(),
            context = %settings.context.display(),
            "building image"
        );
        engine
            .build_image(&request)
            .await
            .map_err(ImageErrorExt::into_deploy_error)
            .at(Stage::Building)?;

        tracing::info!(image = %image, "pushing image");
        engine
            .push_image(&image, &auth)
            .await
            .map_err(|e| DeployError::Push(e.to_string()))
            .at(Stage::Building)?;

        Ok(self.advance(|state| Built {
            revision: state.revision,
            image,
        }))
    }
}

// =============================================================================
// Built -> Synthesized
// =============================================================================

impl<'a> Workflow<'a, Built> {
    /// Derive the next task definition for the pushed image.
    ///
    /// A family with no registered definition gets a minimal default draft.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Describe` if the current definition cannot be read.
    #[must_use = "workflow state must be used"]
    pub async fn synthesize<O: Orchestrator + ?Sized>(
        self,
        orchestrator: &O,
        rollout: &RolloutSettings,
    ) -> Result<Workflow<'a, Synthesized>, WorkflowError> {
        let current = orchestrator
            .describe_task_definition(&rollout.family)
            .await
            .map_err(|e| e.into_deploy_error(DeployError::Describe))
            .at(Stage::Synthesizing)?;

        let first_deploy = current.is_none();
        if first_deploy {
            tracing::warn!(
                family = %rollout.family,
                "no task definition found, using defaults"
            );
        }

        let draft = synthesize(
            current,
            &self.state.image,
            &rollout.family,
            &rollout.defaults,
        );

        Ok(self.advance(|state| Synthesized {
            revision: state.revision,
            image: state.image,
            draft,
            first_deploy,
        }))
    }

    /// Finish a build-only workflow.
    pub fn finish(self) -> BuildOutcome {
        BuildOutcome {
            revision: self.state.revision,
            image: self.state.image,
        }
    }
}

// =============================================================================
// Synthesized -> RolledOut
// =============================================================================

impl<'a> Workflow<'a, Synthesized> {
    /// Register the draft, point the service at it and wait for stability.
    ///
    /// The wait is bounded by `rollout.wait_timeout`. Nothing is reverted on
    /// failure: the service keeps whatever revision it was last given.
    ///
    /// # Errors
    ///
    /// Returns `Registration`, `ServiceUpdate` or `StabilizationTimeout`.
    #[must_use = "workflow state must be used"]
    pub async fn roll_out<O: Orchestrator + ?Sized>(
        self,
        orchestrator: &O,
        rollout: &RolloutSettings,
    ) -> Result<Workflow<'a, RolledOut>, WorkflowError> {
        let registered = orchestrator
            .register_task_definition(&self.state.draft)
            .await
            .map_err(|e| e.into_deploy_error(DeployError::Registration))
            .at(Stage::RollingOut)?;
        tracing::info!(task_definition = %registered, "registered task definition");

        orchestrator
            .update_service(&rollout.cluster, &rollout.service, &registered)
            .await
            .map_err(|e| e.into_deploy_error(DeployError::ServiceUpdate))
            .at(Stage::RollingOut)?;

        let mut service = ServiceState {
            cluster: rollout.cluster.clone(),
            service: rollout.service.clone(),
            task_definition: registered,
            stability: Stability::Converging,
        };
        tracing::info!(
            cluster = %service.cluster,
            service = %service.service,
            task_definition = %service.task_definition,
            stability = ?service.stability,
            "service updated, waiting for stability"
        );

        let wait = orchestrator.wait_until_stable(&rollout.cluster, &rollout.service);
        match tokio::time::timeout(rollout.wait_timeout, wait).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(WorkflowError::new(
                    Stage::RollingOut,
                    e.into_deploy_error(DeployError::StabilizationTimeout),
                ));
            }
            Err(_elapsed) => {
                return Err(WorkflowError::new(
                    Stage::RollingOut,
                    DeployError::StabilizationTimeout(format!(
                        "{} not stable after {:?}",
                        rollout.service, rollout.wait_timeout
                    )),
                ));
            }
        }

        service.stability = Stability::Stable;

        Ok(self.advance(|state| RolledOut {
            revision: state.revision,
            image: state.image,
            service,
            first_deploy: state.first_deploy,
        }))
    }
}

// =============================================================================
// RolledOut -> done
// =============================================================================

impl Workflow<'_, RolledOut> {
    /// Finish the workflow, yielding what was deployed.
    pub fn finish(self) -> DeployOutcome {
        DeployOutcome {
            revision: self.state.revision,
            image: self.state.image,
            service: self.state.service,
            first_deploy: self.state.first_deploy,
        }
    }
}
