//! Domain models for the dimension space
//!
//! Pure value types without any I/O concerns. Everything here is immutable
//! once constructed.

mod id;
mod depth;
mod constraints;
mod value;
mod dimension;
mod point;

pub use id::{DimensionId, IdError};
pub use depth::{DepthError, SpecializationDepth};
pub use constraints::{ConstraintSet, Constraints};
pub use value::{DimensionValue, ValueConfiguration};
pub use dimension::{Dimension, DimensionError};
pub use point::{
    DimensionSpacePoint, DimensionSpacePointSet, PointParseError, VariationDistance,
    VariationWeight, WeightedDimensionSpacePoint,
};
