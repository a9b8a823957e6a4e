//! dimspace - Multi-axis content variation resolution
//!
//! Content varies along independent dimensions (language, region, channel),
//! each a forest of values related by specialization. dimspace parses that
//! configuration, enumerates the legal combinations of values across all
//! dimensions and answers which more general combination to fall back to
//! when content for a specific one is missing.

pub mod domain;
pub mod source;
pub mod space;
pub mod cli;

pub use domain::{Dimension, DimensionId, DimensionSpacePoint, DimensionValue, WeightedDimensionSpacePoint};
pub use source::{ConfigurationDimensionSource, DimensionSource, SourceError};
pub use space::{VariantType, VariationGraph, Zookeeper};
