// ABOUTME: Validated names for orchestration and registry resources.
// ABOUTME: Covers cluster, service and family names plus registry repository names.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{what} exceeds maximum length of {max} characters")]
    TooLong { what: &'static str, max: usize },

    #[error("invalid character in {what}: '{ch}'")]
    InvalidChar { what: &'static str, ch: char },

    #[error("{0} must start with a letter or digit")]
    BadStart(&'static str),

    #[error("repository name must be lowercase")]
    NotLowercase,
}

/// Name of a cluster, service or task definition family.
///
/// Letters, digits, hyphens and underscores, up to 255 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    const MAX_LEN: usize = 255;

    pub fn new(what: &'static str, value: &str) -> Result<Self, ResourceNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ResourceNameError::Empty(what));
        }

        if value.len() > Self::MAX_LEN {
            return Err(ResourceNameError::TooLong {
                what,
                max: Self::MAX_LEN,
            });
        }

        for ch in value.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
                return Err(ResourceNameError::InvalidChar { what, ch });
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a repository in the container registry (e.g. `bia`, `team/api`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    const MAX_LEN: usize = 256;
    const WHAT: &'static str = "repository name";

    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ResourceNameError::Empty(Self::WHAT));
        }

        if value.len() > Self::MAX_LEN {
            return Err(ResourceNameError::TooLong {
                what: Self::WHAT,
                max: Self::MAX_LEN,
            });
        }

        if !value.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(ResourceNameError::BadStart(Self::WHAT));
        }

        for ch in value.chars() {
            if ch.is_ascii_uppercase() {
                return Err(ResourceNameError::NotLowercase);
            }
            if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && !"-_./".contains(ch) {
                return Err(ResourceNameError::InvalidChar {
                    what: Self::WHAT,
                    ch,
                });
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_name_accepts_hyphen_and_underscore() {
        let name = ResourceName::new("cluster", "bia-cluster_01").unwrap();
        assert_eq!(name.as_str(), "bia-cluster_01");
    }

    #[test]
    fn resource_name_rejects_empty() {
        assert_eq!(
            ResourceName::new("service", "  "),
            Err(ResourceNameError::Empty("service"))
        );
    }

    #[test]
    fn resource_name_rejects_slash() {
        assert_eq!(
            ResourceName::new("family", "a/b"),
            Err(ResourceNameError::InvalidChar {
                what: "family",
                ch: '/'
            })
        );
    }

    #[test]
    fn repository_allows_namespaces() {
        assert_eq!(RepositoryName::new("team/api").unwrap().as_str(), "team/api");
    }

    #[test]
    fn repository_must_be_lowercase() {
        assert_eq!(
            RepositoryName::new("Bia"),
            Err(ResourceNameError::NotLowercase)
        );
    }

    #[test]
    fn repository_must_start_alphanumeric() {
        assert!(RepositoryName::new("-bia").is_err());
    }
}
