// ABOUTME: Source revisions and the references that resolve to them.
// ABOUTME: A Revision carries the full commit id and its 7-character short form.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevisionError {
    #[error("commit id must be at least {min} characters, got {len}")]
    TooShort { min: usize, len: usize },

    #[error("invalid character in commit id: '{0}'")]
    InvalidChar(char),
}

/// A resolved point in source history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision {
    full: String,
}

impl Revision {
    /// Length of the canonical short form used for image tags.
    pub const SHORT_LEN: usize = 7;

    pub fn new(full: &str) -> Result<Self, RevisionError> {
        let full = full.trim();
        if full.len() < Self::SHORT_LEN {
            return Err(RevisionError::TooShort {
                min: Self::SHORT_LEN,
                len: full.len(),
            });
        }

        if let Some(c) = full.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(RevisionError::InvalidChar(c));
        }

        Ok(Self {
            full: full.to_ascii_lowercase(),
        })
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn short(&self) -> &str {
        // ASCII hex only, so byte slicing is on a char boundary
        &self.full[..Self::SHORT_LEN]
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// What the caller asked to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RevisionSpec {
    /// Whatever the working tree currently has checked out.
    #[default]
    Current,
    /// A branch, tag, or commit-ish.
    Named(String),
}

impl RevisionSpec {
    pub const CURRENT: &'static str = "HEAD";

    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() || input == Self::CURRENT {
            RevisionSpec::Current
        } else {
            RevisionSpec::Named(input.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RevisionSpec::Current => Self::CURRENT,
            RevisionSpec::Named(name) => name,
        }
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
