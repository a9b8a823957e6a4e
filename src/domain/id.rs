//! Dimension identifiers
//!
//! A dimension is addressed by a non-empty opaque name such as `language`
//! or `region`. Identifiers are created once while parsing configuration and
//! used as map keys everywhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Dimension identifier must not be empty")]
    EmptyDimensionId,

    #[error("Value identifier in dimension '{0}' must not be empty")]
    EmptyValue(DimensionId),
}

/// Identifier of a content dimension
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionId(String);

impl DimensionId {
    /// Creates a new identifier, rejecting empty names
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::EmptyDimensionId);
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DimensionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for DimensionId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DimensionId> for String {
    fn from(id: DimensionId) -> Self {
        id.0
    }
}

impl AsRef<str> for DimensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
