// ABOUTME: Derives the next task definition draft from the current one and a new image.
// ABOUTME: Falls back to a minimal single-container draft when the family is new.

use std::collections::BTreeMap;

use nonempty::NonEmpty;
use serde_json::Map;

use crate::cloud::task_definition::{ContainerDefinition, LogConfiguration, PortMapping};
use crate::cloud::{TaskDefinition, TaskDefinitionDraft};
use crate::config::SynthesisDefaults;
use crate::types::{ImageUri, ResourceName};

const LOG_DRIVER: &str = "awslogs";

/// Produce the draft to register for `image`.
///
/// With a current definition, every registrable field is copied and only the
/// first container's image changes. Without one, a minimal draft is built from
/// `defaults`. Never contacts the orchestration service.
pub fn synthesize(
    current: Option<TaskDefinition>,
    image: &ImageUri,
    family: &ResourceName,
    defaults: &SynthesisDefaults,
) -> TaskDefinitionDraft {
    match current {
        Some(current) => derive(current.into_draft(), image),
        None => minimal(image, family, defaults),
    }
}

fn derive(mut draft: TaskDefinitionDraft, image: &ImageUri) -> TaskDefinitionDraft {
    draft.container_definitions.head.image = image.to_string();
    draft
}

fn minimal(
    image: &ImageUri,
    family: &ResourceName,
    defaults: &SynthesisDefaults,
) -> TaskDefinitionDraft {
    let mut log_options = BTreeMap::new();
    log_options.insert(
        "awslogs-group".to_string(),
        defaults.log_group(family.as_str()),
    );
    log_options.insert("awslogs-region".to_string(), image.region().to_string());
    log_options.insert(
        "awslogs-stream-prefix".to_string(),
        defaults.log_stream_prefix.clone(),
    );

    let container = ContainerDefinition {
        name: family.to_string(),
        image: image.to_string(),
        cpu: None,
        memory: None,
        memory_reservation: None,
        essential: Some(true),
        port_mappings: vec![PortMapping {
            container_port: Some(defaults.container_port),
            host_port: None,
            protocol: Some(defaults.protocol.clone()),
            extra: Map::new(),
        }],
        log_configuration: Some(LogConfiguration {
            log_driver: LOG_DRIVER.to_string(),
            options: log_options,
            extra: Map::new(),
        }),
        extra: Map::new(),
    };

    TaskDefinitionDraft {
        family: family.to_string(),
        task_role_arn: defaults
            .task_role
            .as_deref()
            .map(|role| SynthesisDefaults::role_arn(image.tenant(), role)),
        execution_role_arn: Some(SynthesisDefaults::role_arn(
            image.tenant(),
            &defaults.execution_role,
        )),
        network_mode: Some(defaults.network_mode.clone()),
        container_definitions: NonEmpty::new(container),
        volumes: Vec::new(),
        placement_constraints: Vec::new(),
        requires_compatibilities: defaults.requires_compatibilities.clone(),
        cpu: Some(defaults.cpu.to_string()),
        memory: Some(defaults.memory.to_string()),
        pid_mode: None,
        ipc_mode: None,
        proxy_configuration: None,
        inference_accelerators: Vec::new(),
        ephemeral_storage: None,
        runtime_platform: None,
        enable_fault_injection: None,
    }
}
