//! `rowmatch-core` — Values, columns and tables compared by `rowmatch-engine`.
//!
//! Pure model crate: typed cells, predicate cells, type inference and the
//! relaxed numeric conversion rules. No IO.

pub mod convert;
pub mod error;
pub mod table;
pub mod types;
pub mod value;

pub use error::TableError;
pub use table::{Column, Row, Table};
pub use types::{ConversionMode, DataType};
pub use value::{Literal, Predicate, Value};
