//! Combination constraints between dimension values
//!
//! A value may restrict which values of *other* dimensions it can be
//! combined with. Each restriction is either a whitelist (`"*": false` plus
//! explicit `true` entries) or a blacklist (`"*": true`, the default, plus
//! explicit `false` entries).

use std::collections::HashMap;

use super::id::DimensionId;

/// Allow/deny rule toward the values of one other dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    wildcard_allowed: bool,
    overrides: HashMap<String, bool>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            wildcard_allowed: true,
            overrides: HashMap::new(),
        }
    }
}

impl Constraints {
    pub fn new(wildcard_allowed: bool, overrides: HashMap<String, bool>) -> Self {
        Self {
            wildcard_allowed,
            overrides,
        }
    }

    /// Returns true if `value` of the constrained dimension is allowed
    ///
    /// An explicit override wins, otherwise the wildcard decides.
    pub fn allows(&self, value: &str) -> bool {
        self.overrides
            .get(value)
            .copied()
            .unwrap_or(self.wildcard_allowed)
    }

    pub fn is_wildcard_allowed(&self) -> bool {
        self.wildcard_allowed
    }

    pub fn overrides(&self) -> &HashMap<String, bool> {
        &self.overrides
    }
}

/// Constraints of one value, indexed by the dimension they restrict
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet(HashMap<DimensionId, Constraints>);

impl ConstraintSet {
    pub fn new(constraints: HashMap<DimensionId, Constraints>) -> Self {
        Self(constraints)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, dimension: &DimensionId) -> Option<&Constraints> {
        self.0.get(dimension)
    }

    /// Returns true if combining with `value` of `dimension` is allowed
    ///
    /// Dimensions without declared constraints are unrestricted.
    pub fn allows(&self, dimension: &DimensionId, value: &str) -> bool {
        self.0
            .get(dimension)
            .map(|c| c.allows(value))
            .unwrap_or(true)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DimensionId, &Constraints)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(entries: &[(&str, bool)]) -> HashMap<String, bool> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn default_is_permissive() {
        let constraints = Constraints::default();
        assert!(constraints.is_wildcard_allowed());
        assert!(constraints.allows("anything"));
    }

    #[test]
    fn blacklist_mode() {
        let constraints = Constraints::new(true, overrides(&[("CA", false)]));
        assert!(constraints.allows("US"));
        assert!(!constraints.allows("CA"));
    }

    #[test]
    fn whitelist_mode() {
        let constraints = Constraints::new(false, overrides(&[("valueB1", true), ("valueB2", false)]));
        assert!(constraints.allows("valueB1"));
        assert!(!constraints.allows("valueB2"));
        assert!(!constraints.allows("valueB3"));
    }

    #[test]
    fn unconstrained_dimension_is_allowed() {
        let region = DimensionId::new("region").unwrap();
        let channel = DimensionId::new("channel").unwrap();

        let mut map = HashMap::new();
        map.insert(region.clone(), Constraints::new(false, HashMap::new()));
        let set = ConstraintSet::new(map);

        assert!(!set.allows(&region, "US"));
        assert!(set.allows(&channel, "web"));
        assert!(ConstraintSet::empty().allows(&region, "US"));
    }
}
