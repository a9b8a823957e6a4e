//! Specialization depth
//!
//! The edge count between a dimension value and the root of its tree.
//! Roots have depth 0, each specialization adds one.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DepthError {
    #[error("Specialization depth must not be negative, got {0}")]
    Negative(i64),

    #[error("Cannot subtract depth {subtrahend} from depth {minuend}")]
    Underflow { minuend: u32, subtrahend: u32 },

    #[error("Specialization depth {0} is out of range")]
    OutOfRange(i64),
}

/// Distance of a dimension value from its root
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpecializationDepth(u32);

impl SpecializationDepth {
    pub const ZERO: Self = Self(0);

    /// Creates a depth, rejecting negative values
    pub fn new(depth: i64) -> Result<Self, DepthError> {
        if depth < 0 {
            return Err(DepthError::Negative(depth));
        }
        u32::try_from(depth)
            .map(Self)
            .map_err(|_| DepthError::OutOfRange(depth))
    }

    /// Returns the raw depth
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns the depth one level further down the tree
    pub fn increment(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns `self - other`, failing if the result would be negative
    pub fn subtract(self, other: Self) -> Result<Self, DepthError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(DepthError::Underflow {
                minuend: self.0,
                subtrahend: other.0,
            })
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_greater_than(self, other: Self) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for SpecializationDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_depth_rejected() {
        assert_eq!(SpecializationDepth::new(-1), Err(DepthError::Negative(-1)));
    }

    #[test]
    fn increment_and_compare() {
        let root = SpecializationDepth::ZERO;
        let child = root.increment();

        assert!(root.is_zero());
        assert!(!child.is_zero());
        assert!(child.is_greater_than(root));
        assert!(!root.is_greater_than(child));
        assert_eq!(child.get(), 1);
    }

    #[test]
    fn subtract() {
        let three = SpecializationDepth::new(3).unwrap();
        let one = SpecializationDepth::new(1).unwrap();

        assert_eq!(three.subtract(one).unwrap().get(), 2);
        assert_eq!(
            one.subtract(three),
            Err(DepthError::Underflow {
                minuend: 1,
                subtrahend: 3
            })
        );
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(
            SpecializationDepth::new(i64::MAX),
            Err(DepthError::OutOfRange(_))
        ));
    }
}
