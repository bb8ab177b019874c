// ABOUTME: Recording fakes for the source, engine and cloud collaborators.
// ABOUTME: All three append to one shared event log so call order can be asserted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use ferry::cloud::{
    CloudError, DefinitionRevision, Identity, Orchestrator, TaskDefinition, TaskDefinitionDraft,
};
use ferry::config::{BuildSettings, DeploySettings, RolloutSettings, SynthesisDefaults};
use ferry::deploy::Collaborators;
use ferry::engine::{BuildRequest, ImageEngine, ImageError, RegistryAuth};
use ferry::source::{SourceControl, SourceError};
use ferry::types::{ImageUri, RepositoryName, ResourceName, Revision, RevisionSpec};

pub const TENANT: &str = "acct";
pub const REGION: &str = "us-east-1";

/// Full id of the commit HEAD points at.
pub const HEAD_COMMIT: &str = "abc1234f00dabc1234f00dabc1234f00dabc1234";
/// Full id of an older commit reachable as `deadbee`.
pub const OLD_COMMIT: &str = "deadbeef00ddeadbeef00ddeadbeef00ddeadbee";

/// One call made to a collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Resolve(String),
    CurrentReference,
    Checkout(String),
    TenantId,
    RegistryAuth(String),
    Build(Vec<String>),
    Push(String),
    Describe(String),
    Register(TaskDefinitionDraft),
    UpdateService { service: String, task_definition: String },
    Wait(String),
    List(String),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

fn failed(command: &str, stderr: &str) -> CloudError {
    CloudError::CommandFailed {
        command: command.to_string(),
        code: Some(254),
        stderr: stderr.to_string(),
    }
}

// =============================================================================
// Source control
// =============================================================================

pub struct FakeSource {
    log: EventLog,
    refs: HashMap<String, String>,
    current: Mutex<String>,
    failing_checkouts: Vec<String>,
}

impl FakeSource {
    pub fn new(log: EventLog) -> Self {
        let refs = HashMap::from([
            ("HEAD".to_string(), HEAD_COMMIT.to_string()),
            ("main".to_string(), HEAD_COMMIT.to_string()),
            ("v1.0".to_string(), OLD_COMMIT.to_string()),
        ]);
        Self {
            log,
            refs,
            current: Mutex::new("main".to_string()),
            failing_checkouts: Vec::new(),
        }
    }

    /// Make checking out `reference` fail.
    pub fn fail_checkout_of(mut self, reference: &str) -> Self {
        self.failing_checkouts.push(reference.to_string());
        self
    }

    /// Reference the working tree is on.
    pub fn current(&self) -> String {
        self.current.lock().clone()
    }

    fn lookup(&self, reference: &str) -> Option<&String> {
        self.refs.get(reference).or_else(|| {
            self.refs
                .values()
                .find(|full| reference.len() >= 4 && full.starts_with(reference))
        })
    }
}

#[async_trait]
impl SourceControl for FakeSource {
    async fn resolve(&self, spec: &RevisionSpec) -> Result<Revision, SourceError> {
        self.log.lock().push(Event::Resolve(spec.to_string()));
        let full = self
            .lookup(spec.as_str())
            .ok_or_else(|| SourceError::UnknownRevision(spec.to_string()))?;
        Revision::new(full).map_err(|e| SourceError::Repository(e.to_string()))
    }

    async fn current_reference(&self) -> Result<String, SourceError> {
        self.log.lock().push(Event::CurrentReference);
        Ok(self.current())
    }

    async fn checkout(&self, reference: &str) -> Result<(), SourceError> {
        self.log.lock().push(Event::Checkout(reference.to_string()));
        if self.failing_checkouts.iter().any(|r| r == reference) {
            return Err(SourceError::Checkout {
                reference: reference.to_string(),
                reason: "local changes would be overwritten".to_string(),
            });
        }
        *self.current.lock() = reference.to_string();
        Ok(())
    }
}

// =============================================================================
// Image engine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineFailure {
    #[default]
    None,
    Build,
    Push,
}

pub struct FakeEngine {
    log: EventLog,
    failure: EngineFailure,
}

impl FakeEngine {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            failure: EngineFailure::None,
        }
    }

    pub fn failing(mut self, failure: EngineFailure) -> Self {
        self.failure = failure;
        self
    }
}

#[async_trait]
impl ImageEngine for FakeEngine {
    async fn build_image(&self, request: &BuildRequest) -> Result<(), ImageError> {
        self.log.lock().push(Event::Build(request.tags.clone()));
        if self.failure == EngineFailure::Build {
            return Err(ImageError::BuildFailed("RUN make: exit code 2".to_string()));
        }
        Ok(())
    }

    async fn push_image(&self, image: &ImageUri, _auth: &RegistryAuth) -> Result<(), ImageError> {
        self.log.lock().push(Event::Push(image.to_string()));
        if self.failure == EngineFailure::Push {
            return Err(ImageError::PushFailed("denied: not authorized".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Identity and orchestration service
// =============================================================================

/// How the stabilization wait behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitBehavior {
    #[default]
    Stable,
    /// The service's own waiter gives up.
    Fails,
    /// Never returns; only the local timeout ends it.
    Hangs,
}

pub struct FakeCloud {
    log: EventLog,
    current: Mutex<Option<TaskDefinition>>,
    next_revision: Mutex<u32>,
    reject_registration: bool,
    wait: WaitBehavior,
}

impl FakeCloud {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            current: Mutex::new(None),
            next_revision: Mutex::new(1),
            reject_registration: false,
            wait: WaitBehavior::Stable,
        }
    }

    /// Start with `definition` registered as the family's latest revision.
    pub fn with_definition(self, definition: TaskDefinition) -> Self {
        let next = definition.metadata.revision.unwrap_or(0) + 1;
        *self.current.lock() = Some(definition);
        *self.next_revision.lock() = next;
        self
    }

    pub fn rejecting_registration(mut self) -> Self {
        self.reject_registration = true;
        self
    }

    pub fn waiting(mut self, wait: WaitBehavior) -> Self {
        self.wait = wait;
        self
    }

    /// Drafts registered so far.
    pub fn registered(&self) -> Vec<TaskDefinitionDraft> {
        self.log
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Register(draft) => Some(draft.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Identity for FakeCloud {
    async fn tenant_id(&self) -> Result<String, CloudError> {
        self.log.lock().push(Event::TenantId);
        Ok(TENANT.to_string())
    }

    async fn registry_auth(&self, registry_host: &str) -> Result<RegistryAuth, CloudError> {
        self.log
            .lock()
            .push(Event::RegistryAuth(registry_host.to_string()));
        Ok(RegistryAuth {
            username: "AWS".to_string(),
            password: "token".to_string(),
            server: registry_host.to_string(),
        })
    }
}

#[async_trait]
impl Orchestrator for FakeCloud {
    async fn describe_task_definition(
        &self,
        family: &ResourceName,
    ) -> Result<Option<TaskDefinition>, CloudError> {
        self.log.lock().push(Event::Describe(family.to_string()));
        Ok(self.current.lock().clone())
    }

    async fn register_task_definition(
        &self,
        draft: &TaskDefinitionDraft,
    ) -> Result<DefinitionRevision, CloudError> {
        self.log.lock().push(Event::Register(draft.clone()));
        if self.reject_registration {
            return Err(failed(
                "aws ecs register-task-definition",
                "ClientException: Invalid 'cpu' setting for task.",
            ));
        }

        let revision = {
            let mut next = self.next_revision.lock();
            let revision = *next;
            *next += 1;
            revision
        };
        DefinitionRevision::from_arn(&format!(
            "arn:aws:ecs:{REGION}:{TENANT}:task-definition/{}:{revision}",
            draft.family
        ))
    }

    async fn update_service(
        &self,
        _cluster: &ResourceName,
        service: &ResourceName,
        revision: &DefinitionRevision,
    ) -> Result<(), CloudError> {
        self.log.lock().push(Event::UpdateService {
            service: service.to_string(),
            task_definition: revision.to_string(),
        });
        Ok(())
    }

    async fn wait_until_stable(
        &self,
        _cluster: &ResourceName,
        service: &ResourceName,
    ) -> Result<(), CloudError> {
        self.log.lock().push(Event::Wait(service.to_string()));
        match self.wait {
            WaitBehavior::Stable => Ok(()),
            WaitBehavior::Fails => Err(failed(
                "aws ecs wait services-stable",
                "Waiter ServicesStable failed: Max attempts exceeded",
            )),
            WaitBehavior::Hangs => std::future::pending().await,
        }
    }

    async fn list_task_definitions(
        &self,
        family: &ResourceName,
        max_items: usize,
    ) -> Result<Vec<DefinitionRevision>, CloudError> {
        self.log.lock().push(Event::List(family.to_string()));
        let latest = *self.next_revision.lock() - 1;
        (1..=latest)
            .rev()
            .take(max_items)
            .map(|n| {
                DefinitionRevision::from_arn(&format!(
                    "arn:aws:ecs:{REGION}:{TENANT}:task-definition/{family}:{n}"
                ))
            })
            .collect()
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// A full set of fakes sharing one event log.
pub struct Fakes {
    pub log: EventLog,
    pub source: FakeSource,
    pub engine: FakeEngine,
    pub cloud: FakeCloud,
}

impl Fakes {
    pub fn new() -> Self {
        let log = EventLog::default();
        Self {
            source: FakeSource::new(log.clone()),
            engine: FakeEngine::new(log.clone()),
            cloud: FakeCloud::new(log.clone()),
            log,
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_, FakeSource, FakeEngine, FakeCloud> {
        Collaborators {
            source: &self.source,
            engine: &self.engine,
            cloud: &self.cloud,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().clone()
    }

    /// Whether any event matched `pred`.
    pub fn saw(&self, pred: impl Fn(&Event) -> bool) -> bool {
        self.log.lock().iter().any(pred)
    }
}

// =============================================================================
// Settings
// =============================================================================

pub fn build_settings() -> BuildSettings {
    BuildSettings {
        region: REGION.to_string(),
        repository: RepositoryName::new("bia").unwrap(),
        context: ".".into(),
        dockerfile: "Dockerfile".to_string(),
    }
}

pub fn deploy_settings() -> DeploySettings {
    DeploySettings {
        build: build_settings(),
        rollout: RolloutSettings {
            cluster: ResourceName::new("cluster", "cluster-bia").unwrap(),
            service: ResourceName::new("service", "service-bia").unwrap(),
            family: ResourceName::new("family", "task-def-bia").unwrap(),
            wait_timeout: Duration::from_secs(5),
            defaults: SynthesisDefaults::default(),
        },
    }
}

/// A registered definition with two containers, as the service returns it.
pub fn existing_definition() -> TaskDefinition {
    serde_json::from_value(serde_json::json!({
        "taskDefinitionArn": "arn:aws:ecs:us-east-1:acct:task-definition/task-def-bia:3",
        "family": "task-def-bia",
        "revision": 3,
        "status": "ACTIVE",
        "registeredAt": "2024-05-01T10:00:00Z",
        "compatibilities": ["EC2"],
        "networkMode": "bridge",
        "containerDefinitions": [
            {
                "name": "bia",
                "image": "acct.dkr.ecr.us-east-1.amazonaws.com/bia:0000000",
                "memoryReservation": 400,
                "portMappings": [{"containerPort": 8080, "hostPort": 80}]
            },
            {"name": "log-router", "image": "fluent-bit:2"}
        ]
    }))
    .unwrap()
}
