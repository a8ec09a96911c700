//! Persistent set of small row indices.
//!
//! Every operation that changes the set returns a new one and leaves the
//! receiver untouched, so a search branch can hold on to its snapshot while
//! deeper branches extend it.

use std::fmt;
use std::sync::Arc;

const WORD_BITS: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImmutableBitSet {
    /// Trailing zero words are always trimmed, so equal sets compare equal.
    words: Arc<[u64]>,
}

impl ImmutableBitSet {
    pub fn empty() -> Self {
        Self::from_words(Vec::new())
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut words: Vec<u64> = Vec::new();
        for i in indices {
            let w = i / WORD_BITS;
            if w >= words.len() {
                words.resize(w + 1, 0);
            }
            words[w] |= 1u64 << (i % WORD_BITS);
        }
        Self::from_words(words)
    }

    fn from_words(mut words: Vec<u64>) -> Self {
        while words.last() == Some(&0) {
            words.pop();
        }
        Self {
            words: Arc::from(words),
        }
    }

    /// A copy of this set with `index` added.
    pub fn set(&self, index: usize) -> Self {
        if self.contains(index) {
            return self.clone();
        }
        let w = index / WORD_BITS;
        let mut words = self.words.to_vec();
        if w >= words.len() {
            words.resize(w + 1, 0);
        }
        words[w] |= 1u64 << (index % WORD_BITS);
        Self::from_words(words)
    }

    /// A copy of this set without the members of `other`.
    pub fn and_not(&self, other: &ImmutableBitSet) -> Self {
        let words = self
            .words
            .iter()
            .enumerate()
            .map(|(i, w)| w & !other.words.get(i).copied().unwrap_or(0))
            .collect();
        Self::from_words(words)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (index % WORD_BITS)) != 0)
    }

    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl Default for ImmutableBitSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ImmutableBitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for ImmutableBitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}

impl<'a> IntoIterator for &'a ImmutableBitSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + bit);
            }
            self.word_index += 1;
            self.current = *self.words.get(self.word_index)?;
        }
    }
}
