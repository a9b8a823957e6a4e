//! Content dimensions
//!
//! A dimension owns its values in a flat arena (declaration order) and
//! stores the specialization forest as parent indices. All invariants are
//! checked once in [`Dimension::new`]; the result is immutable.
//!
//! # Invariants
//!
//! - Value names are unique and non-empty
//! - Every non-root value has exactly one generalization in the same dimension
//! - A value's depth is its generalization's depth + 1, roots have depth 0
//!   (which also rules out cycles)
//! - The default value is one of the dimension's values

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use super::depth::SpecializationDepth;
use super::id::{DimensionId, IdError};
use super::value::{DimensionValue, ValueConfiguration};

#[derive(Debug, Error, PartialEq)]
pub enum DimensionError {
    #[error(transparent)]
    Id(#[from] IdError),

    #[error("Dimension '{0}' declares value '{1}' more than once")]
    DuplicateValue(DimensionId, String),

    #[error("Dimension '{0}' has no defaultValue")]
    MissingDefaultValue(DimensionId),

    #[error("Default value '{1}' of dimension '{0}' is not one of its values")]
    UnknownDefaultValue(DimensionId, String),

    #[error("Variation edge in dimension '{0}' references unknown value '{1}'")]
    UnknownEdgeValue(DimensionId, String),

    #[error("Value '{1}' of dimension '{0}' has more than one generalization")]
    MultipleGeneralizations(DimensionId, String),

    #[error("Value '{value}' of dimension '{dimension}' has depth {actual}, expected {expected}")]
    DepthMismatch {
        dimension: DimensionId,
        value: String,
        expected: SpecializationDepth,
        actual: SpecializationDepth,
    },
}

/// A named axis of content variation
#[derive(Debug, Clone)]
pub struct Dimension {
    id: DimensionId,
    values: Vec<DimensionValue>,
    index: HashMap<String, usize>,
    generalizations: Vec<Option<usize>>,
    specializations: Vec<Vec<usize>>,
    default_value: Option<usize>,
    configuration: ValueConfiguration,
}

impl Dimension {
    /// Builds a dimension from its values and `(specialization, generalization)` edges
    ///
    /// `default_value` may only be omitted when there are no values.
    pub fn new(
        id: DimensionId,
        values: Vec<DimensionValue>,
        edges: Vec<(String, String)>,
        default_value: Option<String>,
        configuration: ValueConfiguration,
    ) -> Result<Self, DimensionError> {
        let mut index = HashMap::with_capacity(values.len());
        for (position, value) in values.iter().enumerate() {
            if value.value().is_empty() {
                return Err(IdError::EmptyValue(id.clone()).into());
            }
            if index.insert(value.value().to_string(), position).is_some() {
                return Err(DimensionError::DuplicateValue(
                    id.clone(),
                    value.value().to_string(),
                ));
            }
        }

        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| DimensionError::UnknownEdgeValue(id.clone(), name.to_string()))
        };

        let mut generalizations = vec![None; values.len()];
        let mut specializations = vec![Vec::new(); values.len()];
        for (specialization, generalization) in &edges {
            let child = lookup(specialization)?;
            let parent = lookup(generalization)?;
            if generalizations[child].replace(parent).is_some() {
                return Err(DimensionError::MultipleGeneralizations(
                    id.clone(),
                    specialization.clone(),
                ));
            }
            specializations[parent].push(child);
        }

        for (position, value) in values.iter().enumerate() {
            let expected = match generalizations[position] {
                Some(parent) => values[parent].specialization_depth().increment(),
                None => SpecializationDepth::ZERO,
            };
            if value.specialization_depth() != expected {
                return Err(DimensionError::DepthMismatch {
                    dimension: id.clone(),
                    value: value.value().to_string(),
                    expected,
                    actual: value.specialization_depth(),
                });
            }
        }

        let default_value = match default_value {
            Some(name) => Some(
                index
                    .get(&name)
                    .copied()
                    .ok_or_else(|| DimensionError::UnknownDefaultValue(id.clone(), name))?,
            ),
            None if values.is_empty() => None,
            None => return Err(DimensionError::MissingDefaultValue(id)),
        };

        Ok(Self {
            id,
            values,
            index,
            generalizations,
            specializations,
            default_value,
            configuration,
        })
    }

    pub fn id(&self) -> &DimensionId {
        &self.id
    }

    /// Returns all values in declaration order (depth-first through the trees)
    pub fn values(&self) -> impl Iterator<Item = &DimensionValue> {
        self.values.iter()
    }

    pub fn value(&self, name: &str) -> Option<&DimensionValue> {
        self.index.get(name).map(|&i| &self.values[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the default value; `None` only for a dimension without values
    pub fn default_value(&self) -> Option<&DimensionValue> {
        self.default_value.map(|i| &self.values[i])
    }

    pub fn configuration(&self) -> &ValueConfiguration {
        &self.configuration
    }

    pub fn configuration_value(&self, path: &str) -> Option<&Value> {
        self.configuration.get(path)
    }

    /// Returns values without a generalization
    pub fn root_values(&self) -> impl Iterator<Item = &DimensionValue> {
        self.values
            .iter()
            .zip(&self.generalizations)
            .filter(|(_, parent)| parent.is_none())
            .map(|(value, _)| value)
    }

    /// Returns all `(specialization, generalization)` pairs
    pub fn variation_edges(&self) -> impl Iterator<Item = (&DimensionValue, &DimensionValue)> {
        self.generalizations
            .iter()
            .enumerate()
            .filter_map(|(child, parent)| parent.map(|p| (&self.values[child], &self.values[p])))
    }

    /// Returns the direct generalization of a value
    pub fn generalization(&self, name: &str) -> Option<&DimensionValue> {
        let position = *self.index.get(name)?;
        self.generalizations[position].map(|p| &self.values[p])
    }

    /// Returns the direct specializations of a value
    pub fn specializations(&self, name: &str) -> Vec<&DimensionValue> {
        match self.index.get(name) {
            Some(&position) => self.specializations[position]
                .iter()
                .map(|&c| &self.values[c])
                .collect(),
            None => vec![],
        }
    }

    /// Returns the value itself followed by its ancestors, nearest first
    ///
    /// Empty if the value is unknown.
    pub fn ancestry(&self, name: &str) -> Vec<&DimensionValue> {
        let mut chain = Vec::new();
        let mut current = self.index.get(name).copied();
        while let Some(position) = current {
            chain.push(&self.values[position]);
            current = self.generalizations[position];
        }
        chain
    }

    /// Returns the ancestors of a value, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<&DimensionValue> {
        self.ancestry(name).into_iter().skip(1).collect()
    }

    /// Returns the deepest specialization depth in this dimension
    pub fn maximum_depth(&self) -> SpecializationDepth {
        self.values
            .iter()
            .map(DimensionValue::specialization_depth)
            .max()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(d: i64) -> SpecializationDepth {
        SpecializationDepth::new(d).unwrap()
    }

    fn id(name: &str) -> DimensionId {
        DimensionId::new(name).unwrap()
    }

    fn edge(child: &str, parent: &str) -> (String, String) {
        (child.to_string(), parent.to_string())
    }

    fn language() -> Dimension {
        Dimension::new(
            id("language"),
            vec![
                DimensionValue::plain("en", depth(0)),
                DimensionValue::plain("en_US", depth(1)),
                DimensionValue::plain("de", depth(0)),
                DimensionValue::plain("de_CH", depth(1)),
                DimensionValue::plain("gsw", depth(2)),
            ],
            vec![edge("en_US", "en"), edge("de_CH", "de"), edge("gsw", "de_CH")],
            Some("en".to_string()),
            ValueConfiguration::default(),
        )
        .unwrap()
    }

    #[test]
    fn forest_structure() {
        let dimension = language();

        let roots: Vec<_> = dimension.root_values().map(|v| v.value()).collect();
        assert_eq!(roots, vec!["en", "de"]);

        assert_eq!(dimension.generalization("gsw").unwrap().value(), "de_CH");
        assert!(dimension.generalization("de").is_none());

        let specs: Vec<_> = dimension.specializations("de").iter().map(|v| v.value()).collect();
        assert_eq!(specs, vec!["de_CH"]);
        assert!(dimension.specializations("unknown").is_empty());

        let ancestors: Vec<_> = dimension.ancestors("gsw").iter().map(|v| v.value()).collect();
        assert_eq!(ancestors, vec!["de_CH", "de"]);

        assert_eq!(dimension.maximum_depth(), depth(2));
        assert_eq!(dimension.default_value().unwrap().value(), "en");
        assert_eq!(dimension.variation_edges().count(), 3);
    }

    #[test]
    fn depth_mismatch_rejected() {
        let result = Dimension::new(
            id("language"),
            vec![
                DimensionValue::plain("en", depth(0)),
                DimensionValue::plain("en_US", depth(2)),
            ],
            vec![edge("en_US", "en")],
            Some("en".to_string()),
            ValueConfiguration::default(),
        );
        assert!(matches!(result, Err(DimensionError::DepthMismatch { .. })));
    }

    #[test]
    fn duplicate_value_rejected() {
        let result = Dimension::new(
            id("language"),
            vec![
                DimensionValue::plain("en", depth(0)),
                DimensionValue::plain("en", depth(0)),
            ],
            vec![],
            Some("en".to_string()),
            ValueConfiguration::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            DimensionError::DuplicateValue(id("language"), "en".to_string())
        );
    }

    #[test]
    fn unknown_default_rejected() {
        let result = Dimension::new(
            id("language"),
            vec![DimensionValue::plain("en", depth(0))],
            vec![],
            Some("fr".to_string()),
            ValueConfiguration::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            DimensionError::UnknownDefaultValue(id("language"), "fr".to_string())
        );
    }

    #[test]
    fn missing_default_rejected_unless_empty() {
        let result = Dimension::new(
            id("language"),
            vec![DimensionValue::plain("en", depth(0))],
            vec![],
            None,
            ValueConfiguration::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            DimensionError::MissingDefaultValue(id("language"))
        );

        let empty = Dimension::new(id("marker"), vec![], vec![], None, ValueConfiguration::default())
            .unwrap();
        assert!(empty.is_empty());
        assert!(empty.default_value().is_none());
        assert_eq!(empty.maximum_depth(), SpecializationDepth::ZERO);
    }

    #[test]
    fn second_generalization_rejected() {
        let result = Dimension::new(
            id("language"),
            vec![
                DimensionValue::plain("en", depth(0)),
                DimensionValue::plain("de", depth(0)),
                DimensionValue::plain("x", depth(1)),
            ],
            vec![edge("x", "en"), edge("x", "de")],
            Some("en".to_string()),
            ValueConfiguration::default(),
        );
        assert!(matches!(
            result,
            Err(DimensionError::MultipleGeneralizations(_, _))
        ));
    }

    #[test]
    fn empty_value_rejected() {
        let result = Dimension::new(
            id("language"),
            vec![DimensionValue::plain("", depth(0))],
            vec![],
            None,
            ValueConfiguration::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            DimensionError::Id(IdError::EmptyValue(id("language")))
        );
    }
}
