use std::fmt;

use crate::types::DataType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A row was added with no values at all.
    EmptyRow,
    /// Row value count differs from the table's column count.
    ArityMismatch { expected: usize, actual: usize },
    /// Some columns carry a name and others don't.
    MixedColumnNames,
    /// A value's type is not accepted by its column.
    TypeMismatch { column: String, expected: DataType, actual: DataType },
    /// A predicate cell was asked for a concrete value.
    PredicateEvaluation { description: String },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRow => write!(f, "row has no values"),
            Self::ArityMismatch { expected, actual } => {
                write!(f, "row has {actual} value(s), table has {expected} column(s)")
            }
            Self::MixedColumnNames => {
                write!(f, "columns must be either all named or all unnamed")
            }
            Self::TypeMismatch { column, expected, actual } => {
                write!(f, "column {column}: expected type {expected}, got {actual}")
            }
            Self::PredicateEvaluation { description } => {
                write!(f, "predicate '{description}' cannot be evaluated to a value")
            }
        }
    }
}

impl std::error::Error for TableError {}
