// ABOUTME: Collects every missing or invalid parameter before reporting.
// ABOUTME: Produces a single ValidationError naming all problems at once.

use std::fmt;

use crate::types::{RepositoryName, ResourceName};

/// Required parameters that were absent or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<String>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.missing.is_empty() {
            let names: Vec<String> = self.missing.iter().map(|m| format!("--{m}")).collect();
            write!(f, "missing required parameters: {}", names.join(", "))?;
        }
        if !self.invalid.is_empty() {
            if !self.missing.is_empty() {
                write!(f, "; ")?;
            }
            write!(f, "invalid parameters: {}", self.invalid.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates problems while extracting required values.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    error: ValidationError,
}

impl Checker {
    pub fn required(&mut self, name: &'static str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v.to_string()),
            None => {
                self.error.missing.push(name);
                None
            }
        }
    }

    pub fn resource(&mut self, name: &'static str, value: Option<&str>) -> Option<ResourceName> {
        let value = self.required(name, value)?;
        ResourceName::new(name, &value)
            .map_err(|e| self.error.invalid.push(e.to_string()))
            .ok()
    }

    pub fn repository(&mut self, value: Option<&str>) -> Option<RepositoryName> {
        let value = self.required("repository", value)?;
        RepositoryName::new(&value)
            .map_err(|e| self.error.invalid.push(e.to_string()))
            .ok()
    }

    pub fn into_error(self) -> ValidationError {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_missing_parameter() {
        let mut check = Checker::default();
        check.resource("cluster", None);
        check.resource("service", Some("  "));
        let err = check.into_error();

        assert_eq!(err.missing, vec!["cluster", "service"]);
        assert_eq!(
            err.to_string(),
            "missing required parameters: --cluster, --service"
        );
    }

    #[test]
    fn reports_invalid_alongside_missing() {
        let mut check = Checker::default();
        check.required("region", None);
        check.repository(Some("Bad Name"));
        let err = check.into_error();

        assert_eq!(err.missing, vec!["region"]);
        assert_eq!(err.invalid.len(), 1);
        assert!(err.to_string().contains("; invalid parameters:"));
    }

    #[test]
    fn present_values_are_trimmed() {
        let mut check = Checker::default();
        assert_eq!(
            check.required("region", Some(" us-east-1 ")),
            Some("us-east-1".to_string())
        );
        assert!(check.into_error().is_empty());
    }
}
