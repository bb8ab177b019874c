// ABOUTME: Cloud CLI error types with SNAFU pattern.
// ABOUTME: Separates spawn, exit-status, decode and staging failures.

use snafu::Snafu;

/// Failure talking to the identity, registry or orchestration service.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CloudError {
    #[snafu(display("failed to run `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` exited with {}: {}", display_code(*code), stderr.trim()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("unexpected output from `{command}`: {source}"))]
    Decode {
        command: String,
        source: serde_json::Error,
    },

    #[snafu(display("cannot stage draft definition: {source}"))]
    Scratch { source: std::io::Error },

    #[snafu(display("malformed task definition ARN: {arn}"))]
    MalformedArn { arn: String },
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl CloudError {
    /// Text reported by the service on a failed call, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CloudError::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
