//! # Dimension Sources
//!
//! Turns raw configuration into the validated, priority-ordered list of
//! content dimensions.
//!
//! ## Configuration Format
//!
//! | Key | Level | Meaning |
//! |-----|-------|---------|
//! | `defaultValue` | dimension | Name of the default value (required unless `values` is empty) |
//! | `values` | dimension | Map of root values |
//! | `constraints` | value | `{dimension: {'*': bool, value: bool}}` |
//! | `specializations` | value | Map of child values, same shape as `values` |
//! | anything else | both | Opaque configuration, passed through untouched |
//!
//! Parsing is all-or-nothing: the first violation aborts construction with a
//! [`SourceError`] and no partial model is produced.

mod configuration;
pub mod loader;

use thiserror::Error;

use crate::domain::{Dimension, DimensionError, DimensionId, IdError};

pub use configuration::ConfigurationDimensionSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Id(#[from] IdError),

    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error("Invalid configuration at '{path}': expected {expected}")]
    InvalidStructure { path: String, expected: &'static str },
}

impl SourceError {
    pub(crate) fn invalid(path: impl Into<String>, expected: &'static str) -> Self {
        SourceError::InvalidStructure {
            path: path.into(),
            expected,
        }
    }
}

/// Read access to the content dimensions of a repository
///
/// Implementations are immutable once built and shared freely between
/// readers.
pub trait DimensionSource: Send + Sync {
    /// Returns the dimension with the given id, if declared
    fn dimension(&self, id: &DimensionId) -> Option<&Dimension>;

    /// Returns all dimensions, highest priority first
    fn dimensions_by_priority(&self) -> &[Dimension];
}
