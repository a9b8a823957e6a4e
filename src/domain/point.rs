//! Dimension space points
//!
//! A point picks exactly one value per (non-empty) dimension. Weighted points
//! additionally carry the specialization depth of each coordinate in
//! dimension priority order, which is what the variation graph sorts by.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::depth::SpecializationDepth;
use super::id::{DimensionId, IdError};

#[derive(Debug, Error, PartialEq)]
pub enum PointParseError {
    #[error("Invalid coordinate '{0}': expected 'dimension=value'")]
    InvalidCoordinate(String),

    #[error("Dimension '{0}' appears more than once")]
    DuplicateDimension(DimensionId),

    #[error(transparent)]
    Id(#[from] IdError),
}

/// One combination of dimension values
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSpacePoint(BTreeMap<DimensionId, String>);

impl DimensionSpacePoint {
    pub fn new(coordinates: BTreeMap<DimensionId, String>) -> Self {
        Self(coordinates)
    }

    /// The point of a space without dimensions
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the value chosen for `dimension`
    pub fn get(&self, dimension: &DimensionId) -> Option<&str> {
        self.0.get(dimension).map(String::as_str)
    }

    /// Returns a copy with the coordinate of `dimension` replaced
    pub fn vary(&self, dimension: &DimensionId, value: impl Into<String>) -> Self {
        let mut coordinates = self.0.clone();
        coordinates.insert(dimension.clone(), value.into());
        Self(coordinates)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = (&DimensionId, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable string identity, independent of construction order
    pub fn identity_hash(&self) -> String {
        // keys are sorted, so the JSON rendering is canonical
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

/// Parses `dimension=value` pairs separated by commas; braces are optional
impl FromStr for DimensionSpacePoint {
    type Err = PointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(s);

        let mut coordinates = BTreeMap::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (dimension, value) = part
                .split_once('=')
                .ok_or_else(|| PointParseError::InvalidCoordinate(part.to_string()))?;
            let dimension: DimensionId = dimension.parse()?;
            let value = value.trim();
            if value.is_empty() {
                return Err(IdError::EmptyValue(dimension).into());
            }
            if coordinates.insert(dimension.clone(), value.to_string()).is_some() {
                return Err(PointParseError::DuplicateDimension(dimension));
            }
        }
        Ok(Self(coordinates))
    }
}

/// An insertion-ordered set of points
#[derive(Debug, Clone, Default)]
pub struct DimensionSpacePointSet {
    points: Vec<DimensionSpacePoint>,
    members: HashSet<DimensionSpacePoint>,
}

impl DimensionSpacePointSet {
    pub fn new(points: impl IntoIterator<Item = DimensionSpacePoint>) -> Self {
        let mut set = Self::default();
        for point in points {
            set.insert(point);
        }
        set
    }

    /// Adds a point, returning false if it was already present
    pub fn insert(&mut self, point: DimensionSpacePoint) -> bool {
        if self.members.insert(point.clone()) {
            self.points.push(point);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, point: &DimensionSpacePoint) -> bool {
        self.members.contains(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionSpacePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl PartialEq for DimensionSpacePointSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for DimensionSpacePointSet {}

impl Serialize for DimensionSpacePointSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.points)
    }
}

impl FromIterator<DimensionSpacePoint> for DimensionSpacePointSet {
    fn from_iter<I: IntoIterator<Item = DimensionSpacePoint>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Per-dimension distance between a point and one of its generalizations
///
/// Ordered by total distance first, then by the per-dimension deltas in
/// priority order, so a change in an earlier dimension weighs more.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VariationDistance {
    total: u32,
    deltas: Vec<u32>,
}

impl VariationDistance {
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn deltas(&self) -> &[u32] {
        &self.deltas
    }

    pub fn is_zero(&self) -> bool {
        self.total == 0
    }
}

/// Specialization depths of a point's coordinates, in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct VariationWeight(Vec<(DimensionId, SpecializationDepth)>);

impl VariationWeight {
    pub fn new(depths: Vec<(DimensionId, SpecializationDepth)>) -> Self {
        Self(depths)
    }

    pub fn depths(&self) -> impl Iterator<Item = (&DimensionId, SpecializationDepth)> {
        self.0.iter().map(|(id, depth)| (id, *depth))
    }

    pub fn depth(&self, dimension: &DimensionId) -> Option<SpecializationDepth> {
        self.0
            .iter()
            .find(|(id, _)| id == dimension)
            .map(|(_, depth)| *depth)
    }

    /// Sum of all depths
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, depth)| depth.get()).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|(_, depth)| depth.is_zero())
    }

    /// Encodes the weight as a single number in base `base`
    ///
    /// The first (highest priority) dimension is the most significant digit.
    /// `base` must exceed every depth for the encoding to be order-preserving.
    /// `None` if the encoding does not fit into a `u64`.
    pub fn normalize(&self, base: u64) -> Option<u64> {
        self.0.iter().try_fold(0u64, |acc, (_, depth)| {
            acc.checked_mul(base)?.checked_add(u64::from(depth.get()))
        })
    }

    /// Distance from `generalization` to `self`
    ///
    /// `None` if both weights do not cover the same dimensions in the same
    /// order, or if `generalization` is deeper in any dimension.
    pub fn distance_from(&self, generalization: &VariationWeight) -> Option<VariationDistance> {
        if self.0.len() != generalization.0.len() {
            return None;
        }
        let mut deltas = Vec::with_capacity(self.0.len());
        for ((id, depth), (other_id, other_depth)) in self.0.iter().zip(&generalization.0) {
            if id != other_id {
                return None;
            }
            deltas.push(depth.subtract(*other_depth).ok()?.get());
        }
        Some(VariationDistance {
            total: deltas.iter().sum(),
            deltas,
        })
    }
}

/// A point annotated with the depth of each of its values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WeightedDimensionSpacePoint {
    point: DimensionSpacePoint,
    weight: VariationWeight,
}

impl WeightedDimensionSpacePoint {
    pub fn new(point: DimensionSpacePoint, weight: VariationWeight) -> Self {
        Self { point, weight }
    }

    pub fn point(&self) -> &DimensionSpacePoint {
        &self.point
    }

    pub fn weight(&self) -> &VariationWeight {
        &self.weight
    }

    pub fn identity_hash(&self) -> String {
        self.point.identity_hash()
    }
}

impl fmt::Display for WeightedDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (weight {})", self.point, self.weight.total())
    }
}
