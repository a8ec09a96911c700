use std::collections::HashMap;

use rowmatch_core::{ConversionMode, Literal, Row, Table};

use crate::config::{ColumnMode, CompareConfig, RowMode};
use crate::error::MatchError;
use crate::match_list::AlignedPair;
use crate::unordered::UnorderedMatcher;
use crate::value_matcher::ValueMatcher;

/// Result of lining up the rows of two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch {
    pub matched: bool,
    pub rows: Vec<AlignedPair>,
}

pub struct RowMatcher<'a> {
    config: &'a CompareConfig,
    values: ValueMatcher,
}

impl<'a> RowMatcher<'a> {
    pub fn new(config: &'a CompareConfig, values: ValueMatcher) -> Self {
        Self { config, values }
    }

    pub fn match_rows(&self, expected: &Table, actual: &Table) -> Result<RowMatch, MatchError> {
        match self.config.row_mode {
            RowMode::Ordered => self.ordered(expected, actual),
            RowMode::AnyOrder => {
                let e: Vec<(usize, &Row)> = expected.rows().iter().enumerate().collect();
                let a: Vec<(usize, &Row)> = actual.rows().iter().enumerate().collect();
                self.unordered(&e, &a)
            }
            RowMode::ByKey => self.by_key(expected, actual),
        }
    }

    // -----------------------------------------------------------------------
    // Ordered
    // -----------------------------------------------------------------------

    fn ordered(&self, expected: &Table, actual: &Table) -> Result<RowMatch, MatchError> {
        let rows = AlignedPair::positional(expected.len(), actual.len());
        if expected.len() != actual.len() {
            log::debug!("row count differs: {} expected, {} actual", expected.len(), actual.len());
            return Ok(RowMatch { matched: false, rows });
        }
        for (i, (e, a)) in expected.rows().iter().zip(actual.rows()).enumerate() {
            if !self.values.rows_match(e, a)? {
                log::debug!("row {i} differs");
                return Ok(RowMatch { matched: false, rows });
            }
        }
        Ok(RowMatch { matched: true, rows })
    }

    // -----------------------------------------------------------------------
    // Unordered
    // -----------------------------------------------------------------------

    fn unordered(&self, expected: &[(usize, &Row)], actual: &[(usize, &Row)]) -> Result<RowMatch, MatchError> {
        let list = UnorderedMatcher::new(&self.values, self.config.permutation_limit).match_rows(expected, actual)?;
        let rows = list.aligned(&indices(expected), &indices(actual));
        Ok(RowMatch {
            matched: rows.iter().all(AlignedPair::is_complete),
            rows,
        })
    }

    // -----------------------------------------------------------------------
    // Key-grouped
    // -----------------------------------------------------------------------

    fn by_key(&self, expected: &Table, actual: &Table) -> Result<RowMatch, MatchError> {
        let buckets = self.buckets(expected, actual)?;
        log::debug!("key grouping: {} buckets", buckets.len());

        let mut matched = true;
        let mut rows = Vec::with_capacity(expected.len().max(actual.len()));
        for bucket in &buckets {
            if bucket.expected.len() != bucket.actual.len() {
                log::debug!(
                    "bucket {:?}: {} expected rows, {} actual",
                    bucket.key,
                    bucket.expected.len(),
                    bucket.actual.len()
                );
                matched = false;
                rows.extend(AlignedPair::zip(
                    &indices(&bucket.expected),
                    &indices(&bucket.actual),
                ));
                continue;
            }
            if bucket.expected.len() == 1 {
                let (e, e_row) = bucket.expected[0];
                let (a, a_row) = bucket.actual[0];
                matched &= self.values.rows_match(e_row, a_row)?;
                rows.push(AlignedPair::both(e, a));
                continue;
            }
            let result = self.unordered(&bucket.expected, &bucket.actual)?;
            matched &= result.matched;
            rows.extend(result.rows);
        }
        Ok(RowMatch { matched, rows })
    }

    /// Rows of both tables grouped by key, buckets in order of first
    /// appearance (expected table first).
    fn buckets<'t>(&self, expected: &'t Table, actual: &'t Table) -> Result<Vec<Bucket<'t>>, MatchError> {
        let conversion = self.values.conversion();
        let expected_keys = self.key_columns(expected);
        let actual_keys = self.key_columns(actual);

        let mut slots: HashMap<Key, usize> = HashMap::new();
        let mut buckets: Vec<Bucket<'t>> = Vec::new();
        for (i, row) in expected.rows().iter().enumerate() {
            let slot = bucket_slot(&mut slots, &mut buckets, row_key(row, &expected_keys, conversion)?);
            buckets[slot].expected.push((i, row));
        }
        for (i, row) in actual.rows().iter().enumerate() {
            let slot = bucket_slot(&mut slots, &mut buckets, row_key(row, &actual_keys, conversion)?);
            buckets[slot].actual.push((i, row));
        }
        Ok(buckets)
    }

    /// Key column indices, ordered by name under by-name matching so both
    /// tables build their keys in the same column order.
    fn key_columns(&self, table: &Table) -> Vec<usize> {
        let mut keys = table.key_indices();
        if self.config.column_mode == ColumnMode::ByName {
            let name_case = self.config.name_case;
            keys.sort_by_cached_key(|&i| {
                let name = table.columns()[i].name().unwrap_or_default();
                name_case.normalize(name).into_owned()
            });
        }
        keys
    }
}

type Key = Vec<Option<Literal>>;

struct Bucket<'t> {
    key: Key,
    expected: Vec<(usize, &'t Row)>,
    actual: Vec<(usize, &'t Row)>,
}

fn bucket_slot<'t>(slots: &mut HashMap<Key, usize>, buckets: &mut Vec<Bucket<'t>>, key: Key) -> usize {
    if let Some(&slot) = slots.get(&key) {
        return slot;
    }
    slots.insert(key.clone(), buckets.len());
    buckets.push(Bucket {
        key,
        expected: Vec::new(),
        actual: Vec::new(),
    });
    buckets.len() - 1
}

/// Evaluated key cells; predicates in key columns cannot be evaluated.
fn row_key(row: &Row, columns: &[usize], conversion: ConversionMode) -> Result<Key, MatchError> {
    columns
        .iter()
        .map(|&c| -> Result<Option<Literal>, MatchError> {
            let value = row.get(c).map(|v| v.evaluate()).transpose()?.flatten();
            Ok(value.map(|l| l.canonical(conversion)))
        })
        .collect()
}

fn indices(rows: &[(usize, &Row)]) -> Vec<usize> {
    rows.iter().map(|(i, _)| *i).collect()
}
