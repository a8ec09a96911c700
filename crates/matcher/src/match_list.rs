//! Persistent list of (expected, actual) row pairings.
//!
//! Key invariants:
//! - An expected index appears in at most one pair
//! - An actual index appears in at most one pair
//! - `add` shares the existing list with the new one; nothing is copied

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{MatchError, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MatchPair {
    pub expected: usize,
    pub actual: usize,
}

/// One line of a diff: an expected index, an actual index, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    pub expected: Option<usize>,
    pub actual: Option<usize>,
}

impl AlignedPair {
    pub fn both(expected: usize, actual: usize) -> Self {
        Self {
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    pub fn expected_only(expected: usize) -> Self {
        Self {
            expected: Some(expected),
            actual: None,
        }
    }

    pub fn actual_only(actual: usize) -> Self {
        Self {
            expected: None,
            actual: Some(actual),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.expected.is_some() && self.actual.is_some()
    }

    /// Pair `expected[i]` with `actual[i]`, padding the shorter side.
    pub fn zip(expected: &[usize], actual: &[usize]) -> Vec<AlignedPair> {
        (0..expected.len().max(actual.len()))
            .map(|i| AlignedPair {
                expected: expected.get(i).copied(),
                actual: actual.get(i).copied(),
            })
            .collect()
    }

    /// Positional pairing of `0..expected_len` with `0..actual_len`.
    pub fn positional(expected_len: usize, actual_len: usize) -> Vec<AlignedPair> {
        (0..expected_len.max(actual_len))
            .map(|i| AlignedPair {
                expected: (i < expected_len).then_some(i),
                actual: (i < actual_len).then_some(i),
            })
            .collect()
    }
}

struct Node {
    pair: MatchPair,
    prev: Option<Arc<Node>>,
}

#[derive(Clone, Default)]
pub struct ImmutableMatchList {
    /// Most recently added pair; older pairs hang off `prev`.
    tail: Option<Arc<Node>>,
    len: usize,
}

impl ImmutableMatchList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a list from pairs in order, rejecting any reused index.
    pub fn from_pairs(pairs: impl IntoIterator<Item = MatchPair>) -> Result<Self, MatchError> {
        Self::empty().concat_pairs(pairs)
    }

    /// A copy of this list with one more pair. Fails when either index is
    /// already paired.
    pub fn add(&self, expected: usize, actual: usize) -> Result<Self, MatchError> {
        if self.actual_for(expected).is_some() {
            return Err(MatchError::IndexReused {
                side: Side::Expected,
                index: expected,
            });
        }
        if self.expected_for(actual).is_some() {
            return Err(MatchError::IndexReused {
                side: Side::Actual,
                index: actual,
            });
        }
        Ok(self.push(MatchPair { expected, actual }))
    }

    /// This list followed by the pairs of `other`.
    pub fn concat(&self, other: &ImmutableMatchList) -> Result<Self, MatchError> {
        self.concat_pairs(other.to_vec())
    }

    /// The same pairings with the two sides exchanged.
    pub fn swapped(&self) -> Self {
        self.to_vec().into_iter().fold(Self::empty(), |list, p| {
            list.push(MatchPair {
                expected: p.actual,
                actual: p.expected,
            })
        })
    }

    /// Actual index paired with `expected`, if any. O(n).
    pub fn actual_for(&self, expected: usize) -> Option<usize> {
        self.nodes().find(|p| p.expected == expected).map(|p| p.actual)
    }

    /// Expected index paired with `actual`, if any. O(n).
    pub fn expected_for(&self, actual: usize) -> Option<usize> {
        self.nodes().find(|p| p.actual == actual).map(|p| p.expected)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pairs in insertion order.
    pub fn to_vec(&self) -> Vec<MatchPair> {
        let mut pairs: Vec<MatchPair> = self.nodes().collect();
        pairs.reverse();
        pairs
    }

    pub fn iter(&self) -> std::vec::IntoIter<MatchPair> {
        self.to_vec().into_iter()
    }

    /// Diff lines for the given rows: each expected index in order with its
    /// partner (if any), then every actual index left unpaired.
    pub fn aligned(&self, expected: &[usize], actual: &[usize]) -> Vec<AlignedPair> {
        let partners: HashMap<usize, usize> = self.nodes().map(|p| (p.expected, p.actual)).collect();
        let used: HashSet<usize> = partners.values().copied().collect();

        let mut out: Vec<AlignedPair> = expected
            .iter()
            .map(|&e| AlignedPair {
                expected: Some(e),
                actual: partners.get(&e).copied(),
            })
            .collect();
        out.extend(
            actual
                .iter()
                .filter(|&&a| !used.contains(&a))
                .map(|&a| AlignedPair::actual_only(a)),
        );
        out
    }

    fn push(&self, pair: MatchPair) -> Self {
        Self {
            tail: Some(Arc::new(Node {
                pair,
                prev: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    fn concat_pairs(&self, pairs: impl IntoIterator<Item = MatchPair>) -> Result<Self, MatchError> {
        let mut expected: HashSet<usize> = self.nodes().map(|p| p.expected).collect();
        let mut actual: HashSet<usize> = self.nodes().map(|p| p.actual).collect();
        let mut list = self.clone();
        for pair in pairs {
            if !expected.insert(pair.expected) {
                return Err(MatchError::IndexReused {
                    side: Side::Expected,
                    index: pair.expected,
                });
            }
            if !actual.insert(pair.actual) {
                return Err(MatchError::IndexReused {
                    side: Side::Actual,
                    index: pair.actual,
                });
            }
            list = list.push(pair);
        }
        Ok(list)
    }

    /// Pairs from newest to oldest.
    fn nodes(&self) -> impl Iterator<Item = MatchPair> + '_ {
        let mut next = self.tail.as_deref();
        std::iter::from_fn(move || {
            let node = next?;
            next = node.prev.as_deref();
            Some(node.pair)
        })
    }
}

impl fmt::Debug for ImmutableMatchList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.to_vec().iter().map(|p| (p.expected, p.actual)))
            .finish()
    }
}

impl Drop for ImmutableMatchList {
    // Unlink iteratively; a long chain would otherwise drop recursively.
    fn drop(&mut self) {
        let mut next = self.tail.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(expected: usize, actual: usize) -> MatchPair {
        MatchPair { expected, actual }
    }

    #[test]
    fn add_keeps_receiver() {
        let a = ImmutableMatchList::empty();
        let b = a.add(0, 2).unwrap();
        let c = b.add(1, 0).unwrap();
        assert!(a.is_empty());
        assert_eq!(b.len(), 1);
        assert_eq!(c.to_vec(), vec![pair(0, 2), pair(1, 0)]);
    }

    #[test]
    fn add_rejects_reuse() {
        let list = ImmutableMatchList::empty().add(0, 2).unwrap();
        let err = list.add(0, 3).unwrap_err();
        assert!(matches!(err, MatchError::IndexReused { side: Side::Expected, index: 0 }));
        let err = list.add(1, 2).unwrap_err();
        assert!(matches!(err, MatchError::IndexReused { side: Side::Actual, index: 2 }));
    }

    #[test]
    fn branches_share_prefix() {
        let base = ImmutableMatchList::empty().add(0, 0).unwrap();
        let left = base.add(1, 1).unwrap();
        let right = base.add(1, 2).unwrap();
        assert_eq!(left.actual_for(1), Some(1));
        assert_eq!(right.actual_for(1), Some(2));
        assert_eq!(base.actual_for(1), None);
    }

    #[test]
    fn lookups_both_ways() {
        let list = ImmutableMatchList::from_pairs([pair(0, 5), pair(3, 1)]).unwrap();
        assert_eq!(list.actual_for(3), Some(1));
        assert_eq!(list.expected_for(5), Some(0));
        assert_eq!(list.expected_for(0), None);
    }

    #[test]
    fn concat_and_swapped() {
        let a = ImmutableMatchList::from_pairs([pair(0, 1)]).unwrap();
        let b = ImmutableMatchList::from_pairs([pair(1, 0), pair(2, 2)]).unwrap();
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.to_vec(), vec![pair(0, 1), pair(1, 0), pair(2, 2)]);
        assert_eq!(joined.swapped().to_vec(), vec![pair(1, 0), pair(0, 1), pair(2, 2)]);
        assert!(a.concat(&a).is_err());
    }

    #[test]
    fn from_pairs_rejects_duplicates() {
        assert!(ImmutableMatchList::from_pairs([pair(0, 0), pair(1, 0)]).is_err());
    }

    #[test]
    fn aligned_lists_expected_then_leftover_actual() {
        let list = ImmutableMatchList::from_pairs([pair(2, 0), pair(0, 3)]).unwrap();
        let lines = list.aligned(&[0, 1, 2], &[0, 1, 2, 3]);
        assert_eq!(
            lines,
            vec![
                AlignedPair::both(0, 3),
                AlignedPair::expected_only(1),
                AlignedPair::both(2, 0),
                AlignedPair::actual_only(1),
                AlignedPair::actual_only(2),
            ]
        );
        assert!(!lines.iter().all(AlignedPair::is_complete));
    }

    #[test]
    fn positional_pads_shorter_side() {
        assert_eq!(
            AlignedPair::positional(1, 3),
            vec![AlignedPair::both(0, 0), AlignedPair::actual_only(1), AlignedPair::actual_only(2)]
        );
        assert_eq!(AlignedPair::zip(&[4, 5], &[7]), vec![AlignedPair::both(4, 7), AlignedPair::expected_only(5)]);
    }

    #[test]
    fn long_list_drops_without_overflow() {
        let pairs = (0..200_000).map(|i| pair(i, i));
        let list = ImmutableMatchList::from_pairs(pairs).unwrap();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }
}
