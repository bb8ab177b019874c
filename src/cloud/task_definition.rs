// ABOUTME: Strongly-typed task definitions as read from and registered with the service.
// ABOUTME: The draft type is the allow-list of fields accepted on registration.

use std::collections::BTreeMap;

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A task definition revision as returned by the orchestration service.
///
/// Everything that can be echoed back on registration lives in
/// [`TaskDefinitionDraft`]; everything the service assigns lives in
/// [`RevisionMetadata`] and is dropped by [`TaskDefinition::into_draft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(flatten)]
    pub draft: TaskDefinitionDraft,

    #[serde(flatten)]
    pub metadata: RevisionMetadata,
}

impl TaskDefinition {
    /// Discard the service-assigned fields, keeping what can be registered again.
    pub fn into_draft(self) -> TaskDefinitionDraft {
        self.draft
    }
}

/// Fields the service assigns per revision. Supplying them on registration is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_definition_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_attributes: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatibilities: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deregistered_at: Option<Value>,
}

/// Registration input for a new task definition revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinitionDraft {
    pub family: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    #[serde(
        deserialize_with = "deserialize_containers",
        serialize_with = "serialize_containers"
    )]
    pub container_definitions: NonEmpty<ContainerDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placement_constraints: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_compatibilities: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipc_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_configuration: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inference_accelerators: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_platform: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_fault_injection: Option<bool>,
}

impl TaskDefinitionDraft {
    /// The container that receives new images.
    pub fn primary_container(&self) -> &ContainerDefinition {
        self.container_definitions.first()
    }
}

/// One container within a task definition.
///
/// Fields not modelled here (environment, secrets, health checks, ...) are
/// carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,

    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_reservation: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_configuration: Option<LogConfiguration>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Absent when the mapping uses `containerPortRange` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub log_driver: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_containers<'de, D>(
    deserializer: D,
) -> Result<NonEmpty<ContainerDefinition>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let containers: Vec<ContainerDefinition> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(containers)
        .ok_or_else(|| serde::de::Error::custom("at least one container definition is required"))
}

fn serialize_containers<S>(
    containers: &NonEmpty<ContainerDefinition>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(containers.iter())
}
