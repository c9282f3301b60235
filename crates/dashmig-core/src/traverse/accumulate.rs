//! Merge-able traversal results

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

/// Result type of a visitor
///
/// `Default` is the identity of [`Accumulate::merge`].
pub trait Accumulate: Default {
    /// Fold `other` into `self`
    fn merge(&mut self, other: Self);
}

impl Accumulate for () {
    #[inline]
    fn merge(&mut self, _other: Self) {}
}

/// Sum
impl Accumulate for usize {
    #[inline]
    fn merge(&mut self, other: Self) {
        *self += other;
    }
}

/// Union
impl<T: Ord> Accumulate for BTreeSet<T> {
    fn merge(&mut self, other: Self) {
        self.extend(other);
    }
}

/// Union
impl<T: Eq + Hash> Accumulate for HashSet<T> {
    fn merge(&mut self, other: Self) {
        self.extend(other);
    }
}

/// Concatenation, order preserved
impl<T> Accumulate for Vec<T> {
    fn merge(&mut self, other: Self) {
        self.extend(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_default_is_identity(v in proptest::collection::vec(any::<u8>(), 0..20)) {
            let mut left = Vec::default();
            left.merge(v.clone());
            prop_assert_eq!(&left, &v);

            let mut right = v.clone();
            right.merge(Vec::default());
            prop_assert_eq!(right, v);
        }

        #[test]
        fn prop_sets_merge_as_union(
            a in proptest::collection::btree_set(any::<u16>(), 0..20),
            b in proptest::collection::btree_set(any::<u16>(), 0..20),
        ) {
            let mut merged = a.clone();
            merged.merge(b.clone());
            let union: BTreeSet<u16> = a.union(&b).copied().collect();
            prop_assert_eq!(merged, union);
        }

        #[test]
        fn prop_vec_merge_concatenates(
            a in proptest::collection::vec(any::<i32>(), 0..20),
            b in proptest::collection::vec(any::<i32>(), 0..20),
        ) {
            let mut merged = a.clone();
            merged.merge(b.clone());
            prop_assert_eq!(merged.len(), a.len() + b.len());
            prop_assert_eq!(&merged[..a.len()], &a[..]);
            prop_assert_eq!(&merged[a.len()..], &b[..]);
        }
    }

    #[test]
    fn counts_add_up() {
        let mut n = 2usize;
        n.merge(3);
        assert_eq!(n, 5);
    }
}
