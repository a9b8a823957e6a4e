//! Allowed dimension combinations
//!
//! The zookeeper computes every legal combination of one value per
//! dimension as an incremental, constrained cartesian product: dimensions
//! are added one at a time in priority order and each partial combination
//! is only extended by values compatible with everything already in it.
//! Rejected partial combinations are never revisited, so the working set
//! stays bounded by what is still reachable.

use thiserror::Error;

use crate::domain::{
    Dimension, DimensionId, DimensionSpacePoint, DimensionSpacePointSet, DimensionValue,
};
use crate::source::DimensionSource;

#[derive(Debug, Error, PartialEq)]
pub enum SpaceError {
    #[error("Unknown dimension '{0}'")]
    UnknownDimension(DimensionId),

    #[error("Unknown value '{1}' in dimension '{0}'")]
    UnknownValue(DimensionId, String),

    #[error("Point {0} has no value for dimension '{1}'")]
    MissingDimension(DimensionSpacePoint, DimensionId),

    #[error("Point {0} is not within the allowed dimension subspace")]
    PointNotAllowed(DimensionSpacePoint),
}

/// Returns true if two values of different dimensions may co-occur
///
/// Each value only declares its own outward constraints, so both directions
/// are checked independently.
pub fn are_mutually_compatible(
    dimension_a: &DimensionId,
    value_a: &DimensionValue,
    dimension_b: &DimensionId,
    value_b: &DimensionValue,
) -> bool {
    value_a.can_be_combined_with(dimension_b, value_b)
        && value_b.can_be_combined_with(dimension_a, value_a)
}

/// Enumerates and guards the allowed dimension subspace
pub struct Zookeeper<'a> {
    source: &'a dyn DimensionSource,
    allowed_combinations: Vec<DimensionSpacePoint>,
    allowed_subspace: DimensionSpacePointSet,
}

impl<'a> Zookeeper<'a> {
    /// Computes the allowed combinations of `source` eagerly
    pub fn new(source: &'a dyn DimensionSource) -> Self {
        let allowed_combinations = enumerate(source.dimensions_by_priority());
        let allowed_subspace = allowed_combinations.iter().cloned().collect();

        Self {
            source,
            allowed_combinations,
            allowed_subspace,
        }
    }

    pub fn source(&self) -> &'a dyn DimensionSource {
        self.source
    }

    /// Returns every legal combination in construction order
    pub fn allowed_combinations(&self) -> &[DimensionSpacePoint] {
        &self.allowed_combinations
    }

    pub fn allowed_dimension_subspace(&self) -> &DimensionSpacePointSet {
        &self.allowed_subspace
    }

    pub fn is_allowed(&self, point: &DimensionSpacePoint) -> bool {
        self.allowed_subspace.contains(point)
    }

    /// Explains why a point is not part of the allowed subspace
    pub fn validate_point(&self, point: &DimensionSpacePoint) -> Result<(), SpaceError> {
        for (dimension_id, value) in point.coordinates() {
            let dimension = self
                .source
                .dimension(dimension_id)
                .ok_or_else(|| SpaceError::UnknownDimension(dimension_id.clone()))?;
            if !dimension.contains(value) {
                return Err(SpaceError::UnknownValue(
                    dimension_id.clone(),
                    value.to_string(),
                ));
            }
        }

        for dimension in self.source.dimensions_by_priority() {
            if !dimension.is_empty() && point.get(dimension.id()).is_none() {
                return Err(SpaceError::MissingDimension(
                    point.clone(),
                    dimension.id().clone(),
                ));
            }
        }

        if !self.is_allowed(point) {
            return Err(SpaceError::PointNotAllowed(point.clone()));
        }
        Ok(())
    }
}

/// Incremental constrained cartesian product over `dimensions`
fn enumerate(dimensions: &[Dimension]) -> Vec<DimensionSpacePoint> {
    let mut combinations: Vec<Vec<(&DimensionId, &DimensionValue)>> = vec![Vec::new()];

    for dimension in dimensions {
        // contributes nothing; no content varies along it
        if dimension.is_empty() {
            continue;
        }

        let mut extended = Vec::with_capacity(combinations.len() * dimension.len());
        for combination in &combinations {
            for candidate in dimension.values() {
                let compatible = combination.iter().all(|(other_id, other_value)| {
                    are_mutually_compatible(dimension.id(), candidate, other_id, other_value)
                });
                if compatible {
                    let mut next = combination.clone();
                    next.push((dimension.id(), candidate));
                    extended.push(next);
                } else {
                    tracing::trace!(
                        dimension = %dimension.id(),
                        value = candidate.value(),
                        "value rejected for partial combination"
                    );
                }
            }
        }

        tracing::debug!(
            dimension = %dimension.id(),
            before = combinations.len(),
            after = extended.len(),
            "extended dimension space"
        );
        combinations = extended;
    }

    combinations
        .into_iter()
        .map(|combination| {
            DimensionSpacePoint::new(
                combination
                    .into_iter()
                    .map(|(id, value)| (id.clone(), value.value().to_string()))
                    .collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ConfigurationDimensionSource;
    use serde_json::json;

    fn id(name: &str) -> DimensionId {
        DimensionId::new(name).unwrap()
    }

    fn point(s: &str) -> DimensionSpacePoint {
        s.parse().unwrap()
    }

    fn source(config: serde_json::Value) -> ConfigurationDimensionSource {
        ConfigurationDimensionSource::new(&config).unwrap()
    }

    fn language_region(en_constraints: serde_json::Value) -> ConfigurationDimensionSource {
        source(json!({
            "language": {
                "defaultValue": "en",
                "values": {
                    "en": {
                        "constraints": en_constraints,
                        "specializations": { "de": {} }
                    }
                }
            },
            "region": {
                "defaultValue": "US",
                "values": { "US": { "specializations": { "CA": {} } } }
            }
        }))
    }

    #[test]
    fn zero_dimensions_yield_one_empty_combination() {
        let source = source(json!({}));
        let zookeeper = Zookeeper::new(&source);

        assert_eq!(zookeeper.allowed_combinations(), &[DimensionSpacePoint::empty()]);
    }

    #[test]
    fn unconstrained_product() {
        let source = language_region(json!({}));
        let zookeeper = Zookeeper::new(&source);

        assert_eq!(
            zookeeper.allowed_combinations(),
            &[
                point("language=en,region=US"),
                point("language=en,region=CA"),
                point("language=de,region=US"),
                point("language=de,region=CA"),
            ]
        );
    }

    #[test]
    fn blacklisted_combination_is_excluded() {
        let source = language_region(json!({ "region": { "CA": false } }));
        let zookeeper = Zookeeper::new(&source);

        assert!(!zookeeper.is_allowed(&point("language=en,region=CA")));
        assert!(zookeeper.is_allowed(&point("language=de,region=CA")));
        assert_eq!(zookeeper.allowed_combinations().len(), 3);
    }

    #[test]
    fn constraints_are_enforced_in_both_directions() {
        // only the later dimension declares the restriction
        let source = source(json!({
            "language": {
                "defaultValue": "en",
                "values": { "en": {}, "fr": {} }
            },
            "region": {
                "defaultValue": "US",
                "values": {
                    "US": { "constraints": { "language": { "*": false, "en": true } } },
                    "FR": {}
                }
            }
        }));
        let zookeeper = Zookeeper::new(&source);

        assert!(zookeeper.is_allowed(&point("language=en,region=US")));
        assert!(!zookeeper.is_allowed(&point("language=fr,region=US")));
        assert!(zookeeper.is_allowed(&point("language=fr,region=FR")));
        assert_eq!(zookeeper.allowed_combinations().len(), 3);
    }

    #[test]
    fn mutual_compatibility_is_symmetric() {
        let source = language_region(json!({ "region": { "CA": false } }));
        let language = source.dimension(&id("language")).unwrap();
        let region = source.dimension(&id("region")).unwrap();
        let en = language.value("en").unwrap();
        let ca = region.value("CA").unwrap();

        assert!(!are_mutually_compatible(&id("language"), en, &id("region"), ca));
        assert!(!are_mutually_compatible(&id("region"), ca, &id("language"), en));
        // the one-directional check from CA alone would accept it
        assert!(ca.can_be_combined_with(&id("language"), en));
    }

    #[test]
    fn empty_dimension_contributes_nothing() {
        let source = source(json!({
            "marker": { "values": {} },
            "language": { "defaultValue": "en", "values": { "en": {}, "de": {} } }
        }));
        let zookeeper = Zookeeper::new(&source);

        assert_eq!(
            zookeeper.allowed_combinations(),
            &[point("language=en"), point("language=de")]
        );
    }

    #[test]
    fn whitelist_can_empty_the_space() {
        let source = source(json!({
            "language": {
                "defaultValue": "en",
                "values": { "en": { "constraints": { "region": { "*": false } } } }
            },
            "region": { "defaultValue": "US", "values": { "US": {} } }
        }));
        let zookeeper = Zookeeper::new(&source);
        assert!(zookeeper.allowed_combinations().is_empty());
    }

    #[test]
    fn validate_point_explains_rejections() {
        let source = language_region(json!({ "region": { "CA": false } }));
        let zookeeper = Zookeeper::new(&source);

        assert!(zookeeper.validate_point(&point("language=de,region=CA")).is_ok());
        assert_eq!(
            zookeeper.validate_point(&point("language=en,region=CA")),
            Err(SpaceError::PointNotAllowed(point("language=en,region=CA")))
        );
        assert_eq!(
            zookeeper.validate_point(&point("language=en,channel=web")),
            Err(SpaceError::UnknownDimension(id("channel")))
        );
        assert_eq!(
            zookeeper.validate_point(&point("language=fr,region=US")),
            Err(SpaceError::UnknownValue(id("language"), "fr".to_string()))
        );
        assert_eq!(
            zookeeper.validate_point(&point("language=en")),
            Err(SpaceError::MissingDimension(point("language=en"), id("region")))
        );
    }
}
