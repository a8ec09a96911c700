//! Tables of typed rows.
//!
//! Key invariants:
//! - Every row holds exactly one value per column, in column order
//! - Columns are all named or all unnamed
//! - A wildcard column is narrowed to the type of the first concrete value
//!   stored in it, and is never changed afterward

use crate::convert;
use crate::error::TableError;
use crate::types::{ConversionMode, DataType};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: Option<String>,
    data_type: DataType,
    key: bool,
}

impl Column {
    pub fn new(data_type: DataType) -> Self {
        Self {
            name: None,
            data_type,
            key: false,
        }
    }

    pub fn named(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: Some(name.into()),
            data_type,
            key: false,
        }
    }

    /// Mark the column as part of the row identity for key-grouped matching.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_key(&self) -> bool {
        self.key
    }

    /// Name for messages: the column name, or `#index` when unnamed.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{index}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when at least one cell is a predicate.
    pub fn has_predicate(&self) -> bool {
        self.values.iter().any(Value::is_predicate)
    }

    /// Rendered cells in column order; rows sort lexicographically by this.
    pub fn canonical_key(&self) -> Vec<String> {
        self.values.iter().map(Value::canonical_text).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
    conversion: ConversionMode,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        Self::with_conversion(columns, ConversionMode::Strict)
    }

    /// Under [`ConversionMode::Relaxed`] numeric values are converted into
    /// the column type on insertion.
    pub fn with_conversion(columns: Vec<Column>, conversion: ConversionMode) -> Result<Self, TableError> {
        let named = columns.iter().filter(|c| c.name.is_some()).count();
        if named != 0 && named != columns.len() {
            return Err(TableError::MixedColumnNames);
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            conversion,
        })
    }

    /// Append a row. The table is left untouched when the row is rejected.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), TableError> {
        if values.is_empty() {
            return Err(TableError::EmptyRow);
        }
        if values.len() != self.columns.len() {
            return Err(TableError::ArityMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        let mut types: Vec<DataType> = self.columns.iter().map(Column::data_type).collect();
        let mut stored = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let literal = match value {
                Value::Literal(l) => l,
                other => {
                    stored.push(other);
                    continue;
                }
            };
            let column_type = types[i];
            let value_type = literal.data_type();
            if column_type == DataType::Any {
                log::trace!("column {} inferred as {value_type}", self.columns[i].label(i));
                types[i] = value_type;
                stored.push(Value::Literal(literal));
            } else if column_type == value_type {
                stored.push(Value::Literal(literal));
            } else {
                let converted = if column_type.accepts(value_type, self.conversion) {
                    convert::convert(&literal, column_type)
                } else {
                    None
                };
                match converted {
                    Some(l) => stored.push(Value::Literal(l)),
                    None => {
                        return Err(TableError::TypeMismatch {
                            column: self.columns[i].label(i),
                            expected: column_type,
                            actual: value_type,
                        })
                    }
                }
            }
        }

        for (column, ty) in self.columns.iter_mut().zip(types) {
            column.data_type = ty;
        }
        self.rows.push(Row { values: stored });
        Ok(())
    }

    /// Chaining form of [`Table::push_row`].
    pub fn with_row(mut self, values: Vec<Value>) -> Result<Self, TableError> {
        self.push_row(values)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn conversion(&self) -> ConversionMode {
        self.conversion
    }

    /// True when the columns carry names. Empty tables count as unnamed.
    pub fn is_named(&self) -> bool {
        self.columns.first().is_some_and(|c| c.name.is_some())
    }

    /// Indices of key columns, in column order.
    pub fn key_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.key)
            .map(|(i, _)| i)
            .collect()
    }
}
