// ABOUTME: Non-fatal findings gathered while a deploy or rollback runs.
// ABOUTME: Commands report them once the workflow has produced its result.

use std::fmt;

use crate::output::Output;

/// Warnings raised by a command that do not change its exit status.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning. It is logged immediately and printed by `report`.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Print every warning through `output`, oldest first.
    pub fn report(&self, output: &Output) {
        for warning in &self.warnings {
            output.warning(&warning.to_string());
        }
    }
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The rollback pipeline failed and `original` could not be checked out
    /// again, so the working tree still sits on the rollback target.
    pub fn restore_failed(original: &str, reason: impl fmt::Display) -> Self {
        Self {
            kind: WarningKind::RestoreFailed,
            message: format!(
                "working tree left at the rollback target; \
                 checking out {original} failed: {reason}"
            ),
        }
    }

    /// `family` had nothing registered, so `registered` was built from defaults.
    pub fn default_definition(family: impl fmt::Display, registered: impl fmt::Display) -> Self {
        Self {
            kind: WarningKind::DefaultDefinition,
            message: format!(
                "{family} had no task definition; registered {registered} from defaults, \
                 review its roles and sizing"
            ),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    RestoreFailed,
    DefaultDefinition,
}
