use crate::error::{Result, ScanError};
use serde::Serialize;
use std::fmt;

/// A username that passed sanitization and is safe to splice into a URL.
///
/// Only ASCII letters, digits, `-`, `_` and `.` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(ScanError::EmptyUsername);
        }
        if !raw.chars().all(is_allowed_char) {
            return Err(ScanError::InvalidUsername(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Username {
    type Error = ScanError;

    fn try_from(value: &str) -> Result<Self> {
        Username::parse(value)
    }
}
