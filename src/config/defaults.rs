// ABOUTME: Defaults used when a family has no task definition yet.
// ABOUTME: CPU/memory, port, logging and IAM role naming for the first deployment.

use serde::Deserialize;

/// Settings for synthesizing a first task definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthesisDefaults {
    /// Task-level CPU units.
    pub cpu: u32,
    /// Task-level memory in MiB.
    pub memory: u32,
    pub container_port: u16,
    pub protocol: String,
    pub network_mode: String,
    pub requires_compatibilities: Vec<String>,
    /// Prepended to the family name to form the log group.
    pub log_group_prefix: String,
    pub log_stream_prefix: String,
    /// Role name; expanded to `arn:aws:iam::<tenant>:role/<name>`.
    pub execution_role: String,
    pub task_role: Option<String>,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            cpu: 256,
            memory: 512,
            container_port: 80,
            protocol: "tcp".to_string(),
            network_mode: "awsvpc".to_string(),
            requires_compatibilities: vec!["FARGATE".to_string()],
            log_group_prefix: "/ecs/".to_string(),
            log_stream_prefix: "ecs".to_string(),
            execution_role: "ecsTaskExecutionRole".to_string(),
            task_role: Some("ecsTaskRole".to_string()),
        }
    }
}

impl SynthesisDefaults {
    pub fn log_group(&self, family: &str) -> String {
        format!("{}{}", self.log_group_prefix, family)
    }

    pub fn role_arn(tenant: &str, role: &str) -> String {
        format!("arn:aws:iam::{}:role/{}", tenant, role)
    }
}
