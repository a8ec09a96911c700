use rowmatch_core::{Column, ConversionMode, DataType};

use crate::config::{ColumnMode, CompareConfig, NameCase};
use crate::error::{MatchError, Side};
use crate::match_list::AlignedPair;

/// Decides whether two column lists describe the same shape.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMatcher {
    mode: ColumnMode,
    conversion: ConversionMode,
    name_case: NameCase,
}

impl ColumnMatcher {
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            mode: config.column_mode,
            conversion: config.conversion,
            name_case: config.name_case,
        }
    }

    /// `Ok(false)` for a shape mismatch; `Err` when by-name matching is
    /// impossible (unnamed or duplicate columns).
    pub fn matches(&self, expected: &[Column], actual: &[Column]) -> Result<bool, MatchError> {
        match self.mode {
            ColumnMode::Positional => Ok(self.positional(expected, actual)),
            ColumnMode::ByName => self.by_name(expected, actual),
        }
    }

    /// Key columns must match on their own, then the full lists must match.
    /// Under by-name matching, unnamed and duplicate columns anywhere in
    /// either list are reported before keys are compared.
    pub fn matches_keys(&self, expected: &[Column], actual: &[Column]) -> Result<bool, MatchError> {
        if self.mode == ColumnMode::ByName {
            self.sorted_by_name(Side::Expected, expected)?;
            self.sorted_by_name(Side::Actual, actual)?;
        }
        let expected_keys = key_columns(expected);
        let actual_keys = key_columns(actual);
        if !self.matches(&expected_keys, &actual_keys)? {
            log::debug!(
                "key columns differ: {} expected, {} actual",
                expected_keys.len(),
                actual_keys.len()
            );
            return Ok(false);
        }
        self.matches(expected, actual)
    }

    /// Column lines for a diff.
    pub fn pairing(&self, expected: &[Column], actual: &[Column]) -> Vec<AlignedPair> {
        let named = expected.iter().chain(actual).all(|c| c.name().is_some());
        if self.mode == ColumnMode::Positional || !named {
            return AlignedPair::positional(expected.len(), actual.len());
        }

        let actual_names: Vec<String> = actual.iter().map(|c| self.normalized(c)).collect();
        let mut taken = vec![false; actual.len()];
        let mut out = Vec::with_capacity(expected.len().max(actual.len()));
        for (i, column) in expected.iter().enumerate() {
            let name = self.normalized(column);
            let partner = (0..actual.len()).find(|&j| !taken[j] && actual_names[j] == name);
            match partner {
                Some(j) => {
                    taken[j] = true;
                    out.push(AlignedPair::both(i, j));
                }
                None => out.push(AlignedPair::expected_only(i)),
            }
        }
        out.extend((0..actual.len()).filter(|&j| !taken[j]).map(AlignedPair::actual_only));
        out
    }

    fn positional(&self, expected: &[Column], actual: &[Column]) -> bool {
        expected.len() == actual.len()
            && expected
                .iter()
                .zip(actual)
                .all(|(e, a)| e.data_type().compatible_with(a.data_type(), self.conversion))
    }

    fn by_name(&self, expected: &[Column], actual: &[Column]) -> Result<bool, MatchError> {
        let expected = self.sorted_by_name(Side::Expected, expected)?;
        let actual = self.sorted_by_name(Side::Actual, actual)?;
        if expected.len() != actual.len() {
            return Ok(false);
        }
        Ok(expected.iter().zip(&actual).all(|((en, et), (an, at))| {
            en == an && et.compatible_with(*at, self.conversion)
        }))
    }

    /// (normalized name, type) sorted by name, rejecting unnamed and
    /// duplicated columns.
    fn sorted_by_name(&self, side: Side, columns: &[Column]) -> Result<Vec<(String, DataType)>, MatchError> {
        let mut named = Vec::with_capacity(columns.len());
        for column in columns {
            let name = column.name().ok_or(MatchError::UnnamedColumns { side })?;
            named.push((self.name_case.normalize(name).into_owned(), column.data_type()));
        }
        named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut duplicates: Vec<&str> = named
            .windows(2)
            .filter(|w| w[0].0 == w[1].0)
            .map(|w| w[0].0.as_str())
            .collect();
        if !duplicates.is_empty() {
            duplicates.dedup();
            return Err(MatchError::DuplicateColumnNames {
                side,
                names: duplicates.join(", "),
            });
        }
        Ok(named)
    }

    fn normalized(&self, column: &Column) -> String {
        self.name_case.normalize(column.name().unwrap_or_default()).into_owned()
    }
}

fn key_columns(columns: &[Column]) -> Vec<Column> {
    columns.iter().filter(|c| c.is_key()).cloned().collect()
}
