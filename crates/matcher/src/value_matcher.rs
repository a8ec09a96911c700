use rowmatch_core::{Column, ConversionMode, Row, Value};

use crate::config::{ColumnMode, CompareConfig, NameCase};
use crate::error::MatchError;

/// Cell-by-cell comparison of two rows whose columns already match.
#[derive(Debug, Clone)]
pub struct ValueMatcher {
    conversion: ConversionMode,
    /// `None`: compare by position. `Some(p)`: expected cell `i` is compared
    /// with actual cell `p[i]`; expected names absent from actual are `None`.
    projection: Option<Vec<Option<usize>>>,
}

impl ValueMatcher {
    pub fn positional(conversion: ConversionMode) -> Self {
        Self {
            conversion,
            projection: None,
        }
    }

    pub fn by_name(expected: &[Column], actual: &[Column], name_case: NameCase, conversion: ConversionMode) -> Self {
        let actual_names: Vec<Option<String>> = actual
            .iter()
            .map(|c| c.name().map(|n| name_case.normalize(n).into_owned()))
            .collect();
        let projection = expected
            .iter()
            .map(|column| {
                let name = name_case.normalize(column.name()?).into_owned();
                actual_names.iter().position(|n| n.as_deref() == Some(name.as_str()))
            })
            .collect();
        Self {
            conversion,
            projection: Some(projection),
        }
    }

    /// Matcher for the column mode in `config`.
    pub fn for_columns(config: &CompareConfig, expected: &[Column], actual: &[Column]) -> Self {
        match config.column_mode {
            ColumnMode::Positional => Self::positional(config.conversion),
            ColumnMode::ByName => Self::by_name(expected, actual, config.name_case, config.conversion),
        }
    }

    pub fn conversion(&self) -> ConversionMode {
        self.conversion
    }

    /// Index of the actual column compared with expected column `index`.
    pub fn actual_index(&self, index: usize) -> Option<usize> {
        match &self.projection {
            None => Some(index),
            Some(p) => p.get(index).copied().flatten(),
        }
    }

    pub fn matches(&self, expected: &[Value], actual: &[Value]) -> Result<bool, MatchError> {
        match &self.projection {
            None => {
                if expected.len() != actual.len() {
                    return Ok(false);
                }
                for (e, a) in expected.iter().zip(actual) {
                    if !e.matches(a, self.conversion)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Some(projection) => {
                for (e, slot) in expected.iter().zip(projection) {
                    let Some(j) = slot else { continue };
                    let Some(a) = actual.get(*j) else {
                        return Ok(false);
                    };
                    if !e.matches(a, self.conversion)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    pub fn rows_match(&self, expected: &Row, actual: &Row) -> Result<bool, MatchError> {
        self.matches(expected.values(), actual.values())
    }
}
