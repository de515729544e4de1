//! Deduplicated collection of discovered roots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ComplexNumber;

/// Decimals kept in a root's map key.
const KEY_SCALE: f64 = 1e6;

/// Map key: root location rounded to six decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootKey {
    re: i64,
    im: i64,
}

impl RootKey {
    /// Quantises `z`. Coordinates beyond the `i64` range saturate.
    pub fn of(z: ComplexNumber) -> Self {
        Self {
            re: (z.re * KEY_SCALE).round() as i64,
            im: (z.im * KEY_SCALE).round() as i64,
        }
    }
}

/// A distinct root and how often it was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoundRoot {
    /// Representative location (the discovery with the smallest error).
    pub value: ComplexNumber,
    /// `|f|` at the representative.
    pub best_error: f64,
    /// Iterations of the representative's run.
    pub iterations: usize,
    /// Cycles detected in the representative's run.
    pub cycles: usize,
    /// Number of converged runs that landed here.
    pub times_found: usize,
}

impl FoundRoot {
    /// A root seen for the first time.
    pub fn new(value: ComplexNumber, best_error: f64, iterations: usize, cycles: usize) -> Self {
        Self {
            value,
            best_error,
            iterations,
            cycles,
            times_found: 1,
        }
    }

    fn absorb(&mut self, other: FoundRoot) {
        self.times_found += other.times_found;
        if other.best_error < self.best_error {
            self.value = other.value;
            self.best_error = other.best_error;
            self.iterations = other.iterations;
            self.cycles = other.cycles;
        }
    }
}

/// Roots keyed by quantised location, merged within `min_distance`.
///
/// # Example
///
/// ```
/// use secant_core::search::{FoundRoot, RootSet};
/// use secant_core::types::ComplexNumber;
///
/// let mut roots = RootSet::new(0.05);
/// assert!(roots.insert(FoundRoot::new(ComplexNumber::ONE, 1e-13, 6, 0)));
/// assert!(!roots.insert(FoundRoot::new(ComplexNumber::new(1.0 + 1e-9, 0.0), 1e-14, 7, 0)));
///
/// let only = roots.iter().next().unwrap();
/// assert_eq!(only.times_found, 2);
/// assert_eq!(only.best_error, 1e-14);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RootSet {
    min_distance: f64,
    roots: BTreeMap<RootKey, FoundRoot>,
}

impl RootSet {
    /// Empty set merging roots closer than `min_distance`.
    pub fn new(min_distance: f64) -> Self {
        Self {
            min_distance,
            roots: BTreeMap::new(),
        }
    }

    /// Merge radius.
    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// Adds a discovery. Returns `true` if it is a new distinct root.
    pub fn insert(&mut self, candidate: FoundRoot) -> bool {
        let nearest = self
            .roots
            .iter()
            .map(|(key, root)| (*key, root.value.distance(candidate.value)))
            .filter(|(_, distance)| *distance < self.min_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key);

        match nearest {
            Some(key) => {
                if let Some(mut existing) = self.roots.remove(&key) {
                    existing.absorb(candidate);
                    self.place(existing);
                }
                false
            }
            None => {
                self.place(candidate);
                true
            }
        }
    }

    /// Stores `root` under its key, absorbing into any entry already there.
    fn place(&mut self, root: FoundRoot) {
        self.roots
            .entry(RootKey::of(root.value))
            .and_modify(|existing| existing.absorb(root))
            .or_insert(root);
    }

    /// Number of distinct roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// True when no root has been recorded.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Roots in key order.
    pub fn iter(&self) -> impl Iterator<Item = &FoundRoot> {
        self.roots.values()
    }

    /// Consumes the set, returning roots in key order.
    pub fn into_vec(self) -> Vec<FoundRoot> {
        self.roots.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(re: f64, im: f64, error: f64) -> FoundRoot {
        FoundRoot::new(ComplexNumber::new(re, im), error, 5, 0)
    }

    #[test]
    fn test_distinct_roots() {
        let mut set = RootSet::new(0.05);
        assert!(set.insert(root(1.0, 0.0, 1e-13)));
        assert!(set.insert(root(-0.5, 0.866, 1e-13)));
        assert!(set.insert(root(-0.5, -0.866, 1e-13)));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_rediscovery_increments_count() {
        let mut set = RootSet::new(0.05);
        set.insert(root(1.0, 0.0, 1e-13));
        set.insert(root(1.01, 0.0, 1e-12));
        set.insert(root(0.99, 0.0, 1e-12));
        assert_eq!(set.len(), 1);
        let only = set.iter().next().unwrap();
        assert_eq!(only.times_found, 3);
        // Better error keeps the representative.
        assert_eq!(only.value, ComplexNumber::ONE);
    }

    #[test]
    fn test_better_error_replaces_representative_and_key() {
        let mut set = RootSet::new(0.05);
        set.insert(root(1.01, 0.0, 1e-10));
        set.insert(root(1.0, 0.0, 1e-14));
        let roots = set.into_vec();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].value, ComplexNumber::ONE);
        assert_eq!(roots[0].best_error, 1e-14);
        assert_eq!(roots[0].times_found, 2);
    }

    #[test]
    fn test_merges_into_nearest() {
        let mut set = RootSet::new(0.5);
        set.insert(root(0.0, 0.0, 1e-13));
        set.insert(root(0.6, 0.0, 1e-13));
        // Within range of both, nearer to 0.6.
        set.insert(root(0.4, 0.0, 1e-12));
        let roots = set.into_vec();
        assert_eq!(roots[0].times_found, 1);
        assert_eq!(roots[1].times_found, 2);
    }

    #[test]
    fn test_key_order() {
        let mut set = RootSet::new(0.01);
        set.insert(root(1.0, 0.0, 1e-13));
        set.insert(root(-1.0, 0.0, 1e-13));
        let values: Vec<f64> = set.iter().map(|r| r.value.re).collect();
        assert_eq!(values, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_key_quantisation() {
        assert_eq!(
            RootKey::of(ComplexNumber::new(1.0000001, 0.0)),
            RootKey::of(ComplexNumber::new(1.0, 0.0))
        );
        assert_ne!(
            RootKey::of(ComplexNumber::new(1.00001, 0.0)),
            RootKey::of(ComplexNumber::new(1.0, 0.0))
        );
    }
}
