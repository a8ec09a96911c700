use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;

use crate::convert;
use crate::error::TableError;
use crate::types::{ConversionMode, DataType};

/// A concrete cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    Integer(i32),
    Long(i64),
    Float(OrderedFloat<f64>),
    Boolean(bool),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Integer(_) => DataType::Integer,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Boolean(_) => DataType::Boolean,
            Self::String(_) => DataType::String,
            Self::Date(_) => DataType::Date,
            Self::DateTime(_) => DataType::DateTime,
            Self::Decimal(_) => DataType::Decimal,
        }
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        match convert::convert(self, DataType::Decimal)? {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Equality under `mode`. Relaxed mode compares numeric literals of
    /// different types by their decimal form.
    pub fn equivalent(&self, other: &Literal, mode: ConversionMode) -> bool {
        if self == other {
            return true;
        }
        if !mode.is_relaxed() || !self.data_type().is_numeric() || !other.data_type().is_numeric() {
            return false;
        }
        match (self.to_decimal(), other.to_decimal()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Form used to group rows by key: relaxed numerics collapse to one
    /// normalized decimal so `1`, `1i64` and `1.0` land in the same bucket.
    pub fn canonical(&self, mode: ConversionMode) -> Literal {
        if mode.is_relaxed() && self.data_type().is_numeric() {
            if let Some(d) = self.to_decimal() {
                return Self::Decimal(d.normalize());
            }
        }
        self.clone()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{}", n.0),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Decimal(d) => write!(f, "{d}"),
        }
    }
}

/// A cell that matches by testing the other side's value.
///
/// The test receives `None` when the other side is null.
#[derive(Clone)]
pub struct Predicate {
    description: String,
    test: Arc<dyn Fn(Option<&Literal>) -> bool + Send + Sync>,
}

impl Predicate {
    pub fn new<F>(description: impl Into<String>, test: F) -> Self
    where
        F: Fn(Option<&Literal>) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn test(&self, value: Option<&Literal>) -> bool {
        (self.test)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.description).finish()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Literal(Literal),
    Predicate(Predicate),
}

impl Value {
    pub fn predicate<F>(description: impl Into<String>, test: F) -> Self
    where
        F: Fn(Option<&Literal>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Predicate::new(description, test))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }

    /// Concrete type of the value. Nulls and predicates have none.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Literal(l) => Some(l.data_type()),
            Self::Null | Self::Predicate(_) => None,
        }
    }

    /// The concrete value, `None` for null. Predicates have no concrete
    /// value and yield an error.
    pub fn evaluate(&self) -> Result<Option<&Literal>, TableError> {
        match self {
            Self::Null => Ok(None),
            Self::Literal(l) => Ok(Some(l)),
            Self::Predicate(p) => Err(TableError::PredicateEvaluation {
                description: p.description.clone(),
            }),
        }
    }

    /// Match this (expected) value against an actual value.
    pub fn matches(&self, actual: &Value, mode: ConversionMode) -> Result<bool, TableError> {
        let other = actual.evaluate()?;
        Ok(match self {
            Self::Null => other.is_none(),
            Self::Literal(l) => other.is_some_and(|o| l.equivalent(o, mode)),
            Self::Predicate(p) => p.test(other),
        })
    }

    /// Text used to order rows deterministically.
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Literal(l) => l.to_string(),
            Self::Predicate(p) => p.description.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Literal(l) => write!(f, "{l}"),
            Self::Predicate(p) => write!(f, "<{}>", p.description),
        }
    }
}

impl From<Literal> for Value {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl From<Predicate> for Value {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Literal(Literal::Integer(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Literal(Literal::Long(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Literal(Literal::Float(OrderedFloat(n)))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Literal(Literal::Boolean(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Literal(Literal::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Literal(Literal::String(s))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Literal(Literal::Date(d))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Literal(Literal::DateTime(dt))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Literal(Literal::Decimal(d))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
