use once_cell::unsync::OnceCell;
use rowmatch_core::{Row, Table};
use serde::Serialize;

use crate::column_matcher::ColumnMatcher;
use crate::config::{CompareConfig, RowMode};
use crate::error::MatchError;
use crate::match_list::AlignedPair;
use crate::row_matcher::RowMatcher;
use crate::value_matcher::ValueMatcher;

/// Everything a diff renderer needs: the verdict and how rows and columns
/// line up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub matched: bool,
    pub rows: Vec<AlignedPair>,
    pub columns: Vec<AlignedPair>,
}

impl Outcome {
    pub fn unmatched_expected(&self) -> usize {
        self.rows.iter().filter(|p| p.actual.is_none()).count()
    }

    pub fn unmatched_actual(&self) -> usize {
        self.rows.iter().filter(|p| p.expected.is_none()).count()
    }
}

/// One expected-vs-actual comparison. The outcome is computed on first
/// query and cached.
pub struct Comparison<'t> {
    config: CompareConfig,
    expected: &'t Table,
    actual: &'t Table,
    outcome: OnceCell<Outcome>,
}

impl<'t> Comparison<'t> {
    pub fn new(config: CompareConfig, expected: &'t Table, actual: &'t Table) -> Self {
        Self {
            config,
            expected,
            actual,
            outcome: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn matches(&self) -> Result<bool, MatchError> {
        Ok(self.outcome()?.matched)
    }

    /// Errors are not cached; a failed evaluation is retried on the next
    /// query.
    pub fn outcome(&self) -> Result<&Outcome, MatchError> {
        self.outcome.get_or_try_init(|| self.evaluate())
    }

    /// Row lines of the diff, resolved to the rows themselves.
    pub fn aligned_rows(&self) -> Result<Vec<(Option<&'t Row>, Option<&'t Row>)>, MatchError> {
        let expected = self.expected;
        let actual = self.actual;
        Ok(self
            .outcome()?
            .rows
            .iter()
            .map(|p| {
                (
                    p.expected.and_then(|i| expected.row(i)),
                    p.actual.and_then(|i| actual.row(i)),
                )
            })
            .collect())
    }

    fn evaluate(&self) -> Result<Outcome, MatchError> {
        self.config.validate()?;
        let expected_columns = self.expected.columns();
        let actual_columns = self.actual.columns();
        log::debug!(
            "comparing {}x{} expected with {}x{} actual ({:?} columns, {:?} rows)",
            self.expected.len(),
            expected_columns.len(),
            self.actual.len(),
            actual_columns.len(),
            self.config.column_mode,
            self.config.row_mode
        );

        let column_matcher = ColumnMatcher::new(&self.config);
        let columns_match = match self.config.row_mode {
            RowMode::ByKey => column_matcher.matches_keys(expected_columns, actual_columns)?,
            RowMode::Ordered | RowMode::AnyOrder => column_matcher.matches(expected_columns, actual_columns)?,
        };
        let columns = column_matcher.pairing(expected_columns, actual_columns);

        if !columns_match {
            log::debug!("columns differ; rows not compared");
            return Ok(Outcome {
                matched: false,
                rows: AlignedPair::positional(self.expected.len(), self.actual.len()),
                columns,
            });
        }

        let values = ValueMatcher::for_columns(&self.config, expected_columns, actual_columns);
        let rows = RowMatcher::new(&self.config, values).match_rows(self.expected, self.actual)?;
        log::debug!("comparison {}", if rows.matched { "matched" } else { "did not match" });
        Ok(Outcome {
            matched: rows.matched,
            rows: rows.rows,
            columns,
        })
    }
}

/// Compare two tables once.
pub fn compare(config: &CompareConfig, expected: &Table, actual: &Table) -> Result<bool, MatchError> {
    Comparison::new(config.clone(), expected, actual).matches()
}
