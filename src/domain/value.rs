//! Dimension values
//!
//! One node of a dimension's specialization forest. Besides its name and
//! depth a value carries its outward constraints and an opaque configuration
//! blob owned by UI and behavior code.

use serde::Serialize;
use serde_json::{Map, Value};

use super::constraints::ConstraintSet;
use super::depth::SpecializationDepth;
use super::id::DimensionId;

/// Opaque per-value or per-dimension configuration
///
/// Never interpreted by the dimension model; addressable by dotted paths
/// such as `label.short`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueConfiguration(Map<String, Value>);

impl ValueConfiguration {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Looks up a nested entry by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A single value of a content dimension
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionValue {
    value: String,
    depth: SpecializationDepth,
    constraints: ConstraintSet,
    configuration: ValueConfiguration,
}

impl DimensionValue {
    pub fn new(
        value: impl Into<String>,
        depth: SpecializationDepth,
        constraints: ConstraintSet,
        configuration: ValueConfiguration,
    ) -> Self {
        Self {
            value: value.into(),
            depth,
            constraints,
            configuration,
        }
    }

    /// Creates an unconstrained value without configuration
    pub fn plain(value: impl Into<String>, depth: SpecializationDepth) -> Self {
        Self::new(
            value,
            depth,
            ConstraintSet::empty(),
            ValueConfiguration::default(),
        )
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn specialization_depth(&self) -> SpecializationDepth {
        self.depth
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn configuration(&self) -> &ValueConfiguration {
        &self.configuration
    }

    pub fn configuration_value(&self, path: &str) -> Option<&Value> {
        self.configuration.get(path)
    }

    /// Returns true if this value's own constraints allow `other` of `dimension`
    ///
    /// This checks one direction only; see
    /// [`are_mutually_compatible`](crate::space::are_mutually_compatible).
    pub fn can_be_combined_with(&self, dimension: &DimensionId, other: &DimensionValue) -> bool {
        self.constraints.allows(dimension, other.value())
    }
}
