//! Pairing of rows that may appear in any order.
//!
//! Two phases:
//! 1. Literal phase: expected rows without predicates are paired greedily
//!    with the first matching actual row, both sides visited in canonical
//!    order. Literal equality is transitive, so greedy never loses a match.
//! 2. Predicate phase: the remaining rows form a bipartite matching problem,
//!    solved by backtracking over the most constrained row first.
//!
//! Key invariants:
//! - Deterministic: the same input always yields the same pairing
//! - Every dead end is charged against the permutation limit; reaching the
//!   limit aborts with [`MatchError::TooManyPermutations`]
//! - A failed predicate phase contributes no pairs
//! - A row with no candidate partner at all ends the predicate phase before
//!   any search: the result is a plain mismatch, never
//!   [`MatchError::TooManyPermutations`], whatever the limit

use rowmatch_core::Row;

use crate::bitset::ImmutableBitSet;
use crate::error::MatchError;
use crate::match_list::{ImmutableMatchList, MatchPair};
use crate::value_matcher::ValueMatcher;

pub struct UnorderedMatcher<'a> {
    values: &'a ValueMatcher,
    limit: usize,
}

impl<'a> UnorderedMatcher<'a> {
    pub fn new(values: &'a ValueMatcher, limit: usize) -> Self {
        Self { values, limit }
    }

    /// Pair `expected` with `actual`. Rows are given with their table index,
    /// and the returned list is expressed in those indices.
    pub fn match_rows(
        &self,
        expected: &[(usize, &Row)],
        actual: &[(usize, &Row)],
    ) -> Result<ImmutableMatchList, MatchError> {
        let (literal, predicate): (Vec<usize>, Vec<usize>) =
            (0..expected.len()).partition(|&i| !expected[i].1.has_predicate());
        log::debug!(
            "unordered: {} expected ({} literal, {} predicate), {} actual",
            expected.len(),
            literal.len(),
            predicate.len(),
            actual.len()
        );

        let (literal_pairs, remaining) = self.literal_phase(expected, actual, literal)?;
        log::trace!("literal phase paired {} rows", literal_pairs.len());

        let predicate_pairs = match self.predicate_phase(expected, actual, &predicate, &remaining)? {
            Some(pairs) => pairs,
            None => {
                log::debug!("predicate phase found no complete pairing");
                Vec::new()
            }
        };

        let to_table = |(e, a): (usize, usize)| MatchPair {
            expected: expected[e].0,
            actual: actual[a].0,
        };
        ImmutableMatchList::from_pairs(literal_pairs.into_iter().chain(predicate_pairs).map(to_table))
    }

    // -----------------------------------------------------------------------
    // Literal phase
    // -----------------------------------------------------------------------

    /// Returns the (expected, actual) positions paired, and the actual
    /// positions left over in ascending order.
    fn literal_phase(
        &self,
        expected: &[(usize, &Row)],
        actual: &[(usize, &Row)],
        literal: Vec<usize>,
    ) -> Result<(Vec<(usize, usize)>, Vec<usize>), MatchError> {
        let mut available = canonical_order(actual, (0..actual.len()).collect());
        let mut pairs = Vec::new();
        for e in canonical_order(expected, literal) {
            let mut hit = None;
            for (slot, &a) in available.iter().enumerate() {
                if self.values.rows_match(expected[e].1, actual[a].1)? {
                    hit = Some(slot);
                    break;
                }
            }
            if let Some(slot) = hit {
                pairs.push((e, available.remove(slot)));
            }
        }
        available.sort_unstable();
        Ok((pairs, available))
    }

    // -----------------------------------------------------------------------
    // Predicate phase
    // -----------------------------------------------------------------------

    fn predicate_phase(
        &self,
        expected: &[(usize, &Row)],
        actual: &[(usize, &Row)],
        predicate: &[usize],
        remaining: &[usize],
    ) -> Result<Option<Vec<(usize, usize)>>, MatchError> {
        if predicate.is_empty() {
            return Ok(Some(Vec::new()));
        }
        if predicate.len() != remaining.len() {
            log::debug!(
                "predicate phase: {} predicate rows for {} remaining actual rows",
                predicate.len(),
                remaining.len()
            );
            return Ok(None);
        }

        // Compatibility in both directions, over local positions.
        let mut forward = vec![Vec::new(); predicate.len()];
        let mut backward = vec![Vec::new(); remaining.len()];
        for (i, &e) in predicate.iter().enumerate() {
            for (j, &a) in remaining.iter().enumerate() {
                if self.values.rows_match(expected[e].1, actual[a].1)? {
                    forward[i].push(j);
                    backward[j].push(i);
                }
            }
        }
        let forward = CandidateMap::new(forward);
        let backward = CandidateMap::new(backward);
        if forward.has_empty_row() || backward.has_empty_row() {
            log::debug!("predicate phase: a row has no candidates");
            return Ok(None);
        }

        let expected_primary = forward.first_cardinality() <= backward.first_cardinality();
        let (primary, secondary) = if expected_primary {
            (&forward, &backward)
        } else {
            (&backward, &forward)
        };

        let mut search = Search {
            primary,
            rank: secondary.rank(),
            limit: self.limit,
            dead_ends: 0,
        };
        let found = search.run(
            &ImmutableMatchList::empty(),
            &ImmutableBitSet::empty(),
            &ImmutableBitSet::empty(),
        )?;
        log::debug!(
            "predicate search over {} rows: {} after {} dead ends",
            predicate.len(),
            if found.is_some() { "matched" } else { "exhausted" },
            search.dead_ends
        );

        Ok(found.map(|list| {
            let list = if expected_primary { list } else { list.swapped() };
            list.iter()
                .map(|p| (predicate[p.expected], remaining[p.actual]))
                .collect()
        }))
    }
}

/// Positions of `rows` listed in `subset`, sorted by canonical key, ties by
/// position.
fn canonical_order(rows: &[(usize, &Row)], subset: Vec<usize>) -> Vec<usize> {
    let mut keyed: Vec<(Vec<String>, usize)> = subset
        .into_iter()
        .map(|i| (rows[i].1.canonical_key(), i))
        .collect();
    keyed.sort();
    keyed.into_iter().map(|(_, i)| i).collect()
}

/// Candidate partners per row, with rows ordered by ascending cardinality
/// (stable, so ties keep row order).
struct CandidateMap {
    order: Vec<usize>,
    candidates: Vec<ImmutableBitSet>,
}

impl CandidateMap {
    fn new(rows: Vec<Vec<usize>>) -> Self {
        let candidates: Vec<ImmutableBitSet> = rows.into_iter().map(ImmutableBitSet::from_indices).collect();
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&i| candidates[i].cardinality());
        Self { order, candidates }
    }

    fn has_empty_row(&self) -> bool {
        self.candidates.iter().any(ImmutableBitSet::is_empty)
    }

    fn first_cardinality(&self) -> usize {
        self.order
            .first()
            .map(|&i| self.candidates[i].cardinality())
            .unwrap_or(0)
    }

    /// `rank[row]` is the row's position in the sorted order.
    fn rank(&self) -> Vec<usize> {
        let mut rank = vec![0; self.order.len()];
        for (pos, &row) in self.order.iter().enumerate() {
            rank[row] = pos;
        }
        rank
    }
}

struct Search<'m> {
    primary: &'m CandidateMap,
    rank: Vec<usize>,
    limit: usize,
    dead_ends: usize,
}

impl Search<'_> {
    /// Extend `list` to a complete pairing. Pairs are (primary, secondary).
    fn run(
        &mut self,
        list: &ImmutableMatchList,
        matched: &ImmutableBitSet,
        used: &ImmutableBitSet,
    ) -> Result<Option<ImmutableMatchList>, MatchError> {
        let Some((row, open)) = self.most_constrained(matched, used) else {
            return Ok(Some(list.clone()));
        };

        if open.is_empty() {
            self.dead_ends += 1;
            log::trace!("dead end at row {row} ({} so far)", self.dead_ends);
            if self.dead_ends >= self.limit {
                return Err(MatchError::TooManyPermutations { limit: self.limit });
            }
            return Ok(None);
        }

        let mut tries: Vec<usize> = open.iter().collect();
        tries.sort_by_key(|&partner| self.rank[partner]);
        let matched = matched.set(row);
        for partner in tries {
            let next = list.add(row, partner)?;
            if let Some(done) = self.run(&next, &matched, &used.set(partner))? {
                return Ok(Some(done));
            }
        }
        Ok(None)
    }

    /// Unmatched primary row with the fewest open candidates, or `None`
    /// when every row is matched.
    fn most_constrained(&self, matched: &ImmutableBitSet, used: &ImmutableBitSet) -> Option<(usize, ImmutableBitSet)> {
        let mut best: Option<(usize, ImmutableBitSet)> = None;
        for &row in &self.primary.order {
            if matched.contains(row) {
                continue;
            }
            let open = self.primary.candidates[row].and_not(used);
            if open.is_empty() {
                return Some((row, open));
            }
            if best.as_ref().map_or(true, |(_, b)| open.cardinality() < b.cardinality()) {
                best = Some((row, open));
            }
        }
        best
    }
}
