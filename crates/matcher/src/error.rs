use std::fmt;

use rowmatch_core::TableError;

/// Which table a structural problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Expected,
    Actual,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Expected => "expected",
            Side::Actual => "actual",
        }
    }
}

#[derive(Debug)]
pub enum MatchError {
    /// Structural or evaluation error raised by the table model.
    Table(TableError),
    /// Two columns share a name under by-name matching.
    DuplicateColumnNames { side: Side, names: String },
    /// By-name matching on a table without column names.
    UnnamedColumns { side: Side },
    /// A row index was paired twice in one match list.
    IndexReused { side: Side, index: usize },
    /// The unordered search hit its dead-end budget.
    TooManyPermutations { limit: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error.
    ConfigValidation(String),
    /// IO error (config file read).
    Io(String),
}

impl MatchError {
    /// True when the comparison was abandoned for cost, not found unequal.
    /// Retrying with a larger permutation limit may succeed.
    pub fn is_too_many_permutations(&self) -> bool {
        matches!(self, Self::TooManyPermutations { .. })
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "{e}"),
            Self::DuplicateColumnNames { side, names } => {
                write!(f, "{} table has duplicate column names: {names}", side.as_str())
            }
            Self::UnnamedColumns { side } => {
                write!(f, "{} table has unnamed columns; by-name matching needs names", side.as_str())
            }
            Self::IndexReused { side, index } => {
                write!(f, "{} row {index} is already paired", side.as_str())
            }
            Self::TooManyPermutations { limit } => write!(
                f,
                "too many permutations: gave up after {limit} dead ends; raise permutation_limit or simplify the expected rows"
            ),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for MatchError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}
