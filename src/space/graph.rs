//! Inter-dimensional variation graph
//!
//! Relates the allowed points of a dimension space by generalization and
//! specialization. Uses petgraph for the underlying structure.
//!
//! # Architecture
//!
//! - One node per allowed point, in enumeration order
//! - An edge `G -> S` exists iff `G != S` and, in every dimension, `G`'s
//!   value is `S`'s value or one of its ancestors
//! - The edge weight is the [`VariationDistance`] from `G` to `S`
//!
//! # Ordering
//!
//! Generalizations are returned nearest first: by total depth distance, then
//! by per-dimension distance in priority order. A smaller change in a
//! higher-priority dimension wins, so lower-priority dimensions generalize
//! first. Distinct generalizations of one point always have distinct
//! distance vectors, which makes the order total and the primary
//! generalization unique.

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{
    Dimension, DimensionSpacePoint, DimensionSpacePointSet, DimensionValue, VariationDistance,
    VariationWeight, WeightedDimensionSpacePoint,
};

use super::zookeeper::Zookeeper;

/// How one point relates to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Same,
    /// The subject generalizes the object
    Generalization,
    /// The subject specializes the object
    Specialization,
    Peer,
}

impl VariantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Same => "same",
            VariantType::Generalization => "generalization",
            VariantType::Specialization => "specialization",
            VariantType::Peer => "peer",
        }
    }
}

/// Immutable variation graph over the allowed dimension space
#[derive(Debug)]
pub struct VariationGraph {
    graph: DiGraph<WeightedDimensionSpacePoint, VariationDistance>,
    node_map: HashMap<DimensionSpacePoint, NodeIndex>,
    weight_normalization_base: u64,
}

impl VariationGraph {
    /// Builds the graph from the zookeeper's allowed combinations
    pub fn new(zookeeper: &Zookeeper<'_>) -> Self {
        let dimensions: Vec<&Dimension> = zookeeper
            .source()
            .dimensions_by_priority()
            .iter()
            .filter(|d| !d.is_empty())
            .collect();

        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for point in zookeeper.allowed_combinations() {
            let weighted = weigh(&dimensions, point);
            let idx = graph.add_node(weighted);
            node_map.insert(point.clone(), idx);
        }

        let specializations: Vec<NodeIndex> = graph.node_indices().collect();
        for specialization in specializations {
            let point = graph[specialization].point().clone();
            for candidate in ancestor_combinations(&dimensions, &point) {
                if candidate == point {
                    continue;
                }
                let Some(&generalization) = node_map.get(&candidate) else {
                    continue;
                };
                let distance = graph[specialization]
                    .weight()
                    .distance_from(graph[generalization].weight());
                if let Some(distance) = distance {
                    graph.add_edge(generalization, specialization, distance);
                }
            }
        }

        let weight_normalization_base = dimensions
            .iter()
            .map(|d| u64::from(d.maximum_depth().get()) + 1)
            .max()
            .unwrap_or(1);

        tracing::debug!(
            points = graph.node_count(),
            variations = graph.edge_count(),
            "built variation graph"
        );

        Self {
            graph,
            node_map,
            weight_normalization_base,
        }
    }

    /// Returns all weighted points, in allowed-combination order
    pub fn all_points(&self) -> impl Iterator<Item = &WeightedDimensionSpacePoint> {
        self.graph.node_weights()
    }

    /// Looks up the weighted version of an allowed point
    pub fn point(&self, point: &DimensionSpacePoint) -> Option<&WeightedDimensionSpacePoint> {
        self.node_map.get(point).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, point: &DimensionSpacePoint) -> bool {
        self.node_map.contains_key(point)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of generalization/specialization pairs
    pub fn variation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns every allowed generalization of `point`, nearest first
    ///
    /// Empty for points outside the allowed space and for points that are
    /// already maximally general.
    pub fn generalizations_of(&self, point: &DimensionSpacePoint) -> Vec<&WeightedDimensionSpacePoint> {
        self.generalizations_with_distance(point)
            .into_iter()
            .map(|(_, generalization)| generalization)
            .collect()
    }

    /// Like [`Self::generalizations_of`], paired with the distance to each
    pub fn generalizations_with_distance(
        &self,
        point: &DimensionSpacePoint,
    ) -> Vec<(&VariationDistance, &WeightedDimensionSpacePoint)> {
        let Some(&idx) = self.node_map.get(point) else {
            return vec![];
        };

        let mut generalizations: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| (edge.weight(), &self.graph[edge.source()]))
            .collect();
        generalizations.sort_by(|a, b| a.0.cmp(b.0));
        generalizations
    }

    /// Returns the nearest allowed generalization of `point`
    pub fn primary_generalization_of(
        &self,
        point: &DimensionSpacePoint,
    ) -> Option<&WeightedDimensionSpacePoint> {
        let idx = *self.node_map.get(point)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .min_by(|a, b| a.weight().cmp(b.weight()))
            .map(|edge| &self.graph[edge.source()])
    }

    /// Returns every allowed specialization of `point`, grouped by total distance
    ///
    /// Within a group, points are ordered like generalizations (priority
    /// order of the per-dimension distance), then by enumeration order.
    pub fn specializations_of(
        &self,
        point: &DimensionSpacePoint,
    ) -> BTreeMap<u32, Vec<&WeightedDimensionSpacePoint>> {
        let mut grouped: BTreeMap<u32, Vec<&WeightedDimensionSpacePoint>> = BTreeMap::new();
        let Some(&idx) = self.node_map.get(point) else {
            return grouped;
        };

        let mut specializations: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.weight(), edge.target()))
            .collect();
        specializations.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

        for (distance, target) in specializations {
            grouped
                .entry(distance.total())
                .or_default()
                .push(&self.graph[target]);
        }
        grouped
    }

    /// Returns the points to cascade a change at `origin` to
    ///
    /// Empty if `origin` is not an allowed point.
    pub fn specialization_set(
        &self,
        origin: &DimensionSpacePoint,
        include_origin: bool,
        excluded: Option<&DimensionSpacePointSet>,
    ) -> DimensionSpacePointSet {
        let mut set = DimensionSpacePointSet::default();
        if !self.contains(origin) {
            return set;
        }
        if include_origin {
            set.insert(origin.clone());
        }
        for group in self.specializations_of(origin).into_values() {
            for specialization in group {
                if excluded.map_or(true, |e| !e.contains(specialization.point())) {
                    set.insert(specialization.point().clone());
                }
            }
        }
        set
    }

    /// Returns the points that have no generalization
    pub fn root_generalizations(&self) -> Vec<&WeightedDimensionSpacePoint> {
        self.graph
            .externals(Direction::Incoming)
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Classifies how `subject` relates to `object`
    pub fn variant_type(&self, subject: &DimensionSpacePoint, object: &DimensionSpacePoint) -> VariantType {
        if subject == object {
            return VariantType::Same;
        }
        let (Some(&s), Some(&o)) = (self.node_map.get(subject), self.node_map.get(object)) else {
            return VariantType::Peer;
        };
        if self.graph.contains_edge(s, o) {
            VariantType::Generalization
        } else if self.graph.contains_edge(o, s) {
            VariantType::Specialization
        } else {
            VariantType::Peer
        }
    }

    /// One more than the deepest specialization depth of any dimension
    pub fn weight_normalization_base(&self) -> u64 {
        self.weight_normalization_base
    }

    /// Encodes a point's weight as a single priority-positional number
    ///
    /// `None` for unknown points and for spaces whose encoding exceeds `u64`.
    pub fn normalized_weight(&self, point: &DimensionSpacePoint) -> Option<u64> {
        self.point(point)?
            .weight()
            .normalize(self.weight_normalization_base)
    }

    /// Renders the primary generalization edges in Graphviz dot format
    pub fn to_dot(&self) -> String {
        let primary = self.graph.filter_map(
            |_, point| Some(point.point().to_string()),
            |edge, distance| {
                let (source, target) = self.graph.edge_endpoints(edge)?;
                let target_point = self.graph[target].point();
                let is_primary = self
                    .primary_generalization_of(target_point)
                    .map(|p| p.point() == self.graph[source].point())
                    .unwrap_or(false);
                is_primary.then(|| distance.total())
            },
        );
        format!("{}", Dot::with_config(&primary, &[]))
    }
}

/// Annotates a point with the depth of each coordinate in priority order
fn weigh(dimensions: &[&Dimension], point: &DimensionSpacePoint) -> WeightedDimensionSpacePoint {
    let depths = dimensions
        .iter()
        .filter_map(|dimension| {
            let value = dimension.value(point.get(dimension.id())?)?;
            Some((dimension.id().clone(), value.specialization_depth()))
        })
        .collect();
    WeightedDimensionSpacePoint::new(point.clone(), VariationWeight::new(depths))
}

/// Every combination of the point's values or their ancestors, the point included
fn ancestor_combinations(dimensions: &[&Dimension], point: &DimensionSpacePoint) -> Vec<DimensionSpacePoint> {
    let mut combinations = vec![DimensionSpacePoint::empty()];
    for dimension in dimensions {
        let Some(value) = point.get(dimension.id()) else {
            continue;
        };
        let chain: Vec<&DimensionValue> = dimension.ancestry(value);
        combinations = combinations
            .iter()
            .flat_map(|combination| {
                chain
                    .iter()
                    .map(move |ancestor| combination.vary(dimension.id(), ancestor.value()))
            })
            .collect();
    }
    combinations
}
