//! # Dimension Space
//!
//! Computes which combinations of dimension values are legal and how they
//! relate to each other.
//!
//! ## Key Types
//!
//! - [`Zookeeper`] - Enumerates the allowed combinations, pruning by constraints
//! - [`VariationGraph`] - Generalization/specialization queries for fallback resolution
//!
//! Both are built eagerly and are read-only afterwards.

mod zookeeper;
mod graph;

pub use zookeeper::{are_mutually_compatible, SpaceError, Zookeeper};
pub use graph::{VariantType, VariationGraph};
