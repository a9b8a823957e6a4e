//! Configuration-based dimension source
//!
//! Parses the raw nested configuration into validated [`Dimension`]s:
//!
//! ```yaml
//! language:
//!   defaultValue: en
//!   label: Language            # dimension configuration, kept opaque
//!   values:
//!     en:
//!       label: English         # value configuration, kept opaque
//!       constraints:
//!         region: { '*': true, CA: false }
//!       specializations:
//!         en_GB: {}
//! ```
//!
//! Declaration order is priority order.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::domain::{
    ConstraintSet, Constraints, Dimension, DimensionId, DimensionValue, IdError,
    SpecializationDepth, ValueConfiguration,
};

use super::{DimensionSource, SourceError};

const DEFAULT_VALUE_KEY: &str = "defaultValue";
const VALUES_KEY: &str = "values";
const CONSTRAINTS_KEY: &str = "constraints";
const SPECIALIZATIONS_KEY: &str = "specializations";
const WILDCARD: &str = "*";

/// Dimension source built once from raw configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigurationDimensionSource {
    dimensions: Vec<Dimension>,
    index: HashMap<DimensionId, usize>,
}

impl ConfigurationDimensionSource {
    /// Parses a configuration document whose top level maps dimension ids to
    /// dimension definitions
    pub fn new(configuration: &Value) -> Result<Self, SourceError> {
        match configuration {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Self::from_map(map),
            _ => Err(SourceError::invalid("", "a map of dimensions")),
        }
    }

    pub fn from_map(configuration: &Map<String, Value>) -> Result<Self, SourceError> {
        let mut dimensions = Vec::with_capacity(configuration.len());
        let mut index = HashMap::with_capacity(configuration.len());

        for (raw_id, raw_dimension) in configuration {
            let dimension = parse_dimension(raw_id, raw_dimension)?;
            tracing::debug!(
                dimension = %dimension.id(),
                values = dimension.len(),
                maximum_depth = %dimension.maximum_depth(),
                "parsed content dimension"
            );
            index.insert(dimension.id().clone(), dimensions.len());
            dimensions.push(dimension);
        }

        let source = Self { dimensions, index };
        source.warn_about_dangling_constraints();
        Ok(source)
    }

    /// Constraints toward undeclared dimensions never match anything
    fn warn_about_dangling_constraints(&self) {
        let mut reported = HashSet::new();
        for dimension in &self.dimensions {
            for value in dimension.values() {
                for (target, _) in value.constraints().iter() {
                    if !self.index.contains_key(target)
                        && reported.insert((dimension.id().clone(), target.clone()))
                    {
                        tracing::warn!(
                            dimension = %dimension.id(),
                            target = %target,
                            "constraints reference an undeclared dimension"
                        );
                    }
                }
            }
        }
    }
}

impl DimensionSource for ConfigurationDimensionSource {
    fn dimension(&self, id: &DimensionId) -> Option<&Dimension> {
        self.index.get(id).map(|&i| &self.dimensions[i])
    }

    fn dimensions_by_priority(&self) -> &[Dimension] {
        &self.dimensions
    }
}

/// Values and edges collected while descending one dimension's trees
struct ValueTree {
    values: Vec<DimensionValue>,
    edges: Vec<(String, String)>,
}

fn parse_dimension(raw_id: &str, raw: &Value) -> Result<Dimension, SourceError> {
    let id = DimensionId::new(raw_id)?;
    let mut definition = as_map(raw, raw_id, "a dimension definition")?;

    let default_value = match definition.remove(DEFAULT_VALUE_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            return Err(SourceError::invalid(
                format!("{}.{}", raw_id, DEFAULT_VALUE_KEY),
                "a string",
            ))
        }
    };

    let raw_values = match definition.remove(VALUES_KEY) {
        Some(values) => as_map(&values, &format!("{}.{}", raw_id, VALUES_KEY), "a map of values")?,
        None => Map::new(),
    };

    let mut tree = ValueTree {
        values: Vec::new(),
        edges: Vec::new(),
    };
    let path = format!("{}.{}", raw_id, VALUES_KEY);
    parse_values(&id, &raw_values, None, &path, &mut tree)?;

    // remaining keys are opaque dimension configuration
    Ok(Dimension::new(
        id,
        tree.values,
        tree.edges,
        default_value,
        ValueConfiguration::new(definition),
    )?)
}

/// Depth-first descent; `generalization` is the parent value and its depth
fn parse_values(
    dimension: &DimensionId,
    nodes: &Map<String, Value>,
    generalization: Option<(&str, SpecializationDepth)>,
    path: &str,
    tree: &mut ValueTree,
) -> Result<(), SourceError> {
    for (raw_value, raw_node) in nodes {
        if raw_value.is_empty() {
            return Err(IdError::EmptyValue(dimension.clone()).into());
        }
        let node_path = format!("{}.{}", path, raw_value);
        let mut node = as_map(raw_node, &node_path, "a value definition")?;

        let depth = match generalization {
            Some((_, parent_depth)) => parent_depth.increment(),
            None => SpecializationDepth::ZERO,
        };

        let constraints = match node.remove(CONSTRAINTS_KEY) {
            Some(raw) => parse_constraints(&raw, &format!("{}.{}", node_path, CONSTRAINTS_KEY))?,
            None => ConstraintSet::empty(),
        };
        let specializations = match node.remove(SPECIALIZATIONS_KEY) {
            Some(raw) => as_map(
                &raw,
                &format!("{}.{}", node_path, SPECIALIZATIONS_KEY),
                "a map of values",
            )?,
            None => Map::new(),
        };

        tree.values.push(DimensionValue::new(
            raw_value.clone(),
            depth,
            constraints,
            ValueConfiguration::new(node),
        ));
        if let Some((parent, _)) = generalization {
            tree.edges.push((raw_value.clone(), parent.to_string()));
        }

        parse_values(
            dimension,
            &specializations,
            Some((raw_value.as_str(), depth)),
            &format!("{}.{}", node_path, SPECIALIZATIONS_KEY),
            tree,
        )?;
    }
    Ok(())
}

fn parse_constraints(raw: &Value, path: &str) -> Result<ConstraintSet, SourceError> {
    let targets = as_map(raw, path, "a map of dimension constraints")?;
    let mut constraints = HashMap::with_capacity(targets.len());

    for (raw_target, raw_rules) in &targets {
        let target = DimensionId::new(raw_target.as_str())?;
        let rule_path = format!("{}.{}", path, raw_target);
        let rules = as_map(raw_rules, &rule_path, "a map of value rules")?;

        let mut wildcard_allowed = true;
        let mut overrides = HashMap::with_capacity(rules.len());
        for (key, allowed) in &rules {
            let allowed = allowed
                .as_bool()
                .ok_or_else(|| SourceError::invalid(format!("{}.{}", rule_path, key), "a boolean"))?;
            if key == WILDCARD {
                wildcard_allowed = allowed;
            } else {
                overrides.insert(key.clone(), allowed);
            }
        }
        constraints.insert(target, Constraints::new(wildcard_allowed, overrides));
    }

    Ok(ConstraintSet::new(constraints))
}

/// `null` counts as an empty map, as produced by YAML keys without a body
fn as_map(value: &Value, path: &str, expected: &'static str) -> Result<Map<String, Value>, SourceError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        _ => Err(SourceError::invalid(path, expected)),
    }
}
