use serde::{Deserialize, Serialize};

use crate::convert;

/// Semantic type of a column or a literal value.
///
/// `Any` is the wildcard: it accepts every type, and a column declared as
/// `Any` takes on the type of the first concrete value stored in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Integer,
    Long,
    Float,
    Boolean,
    String,
    Date,
    DateTime,
    Decimal,
    Any,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Decimal => "decimal",
            Self::Any => "any",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Long | Self::Float | Self::Decimal)
    }

    /// Whether a column of this type can hold a value of `value_type`.
    pub fn accepts(self, value_type: DataType, mode: ConversionMode) -> bool {
        self == Self::Any
            || self == value_type
            || (mode.is_relaxed() && convert::can_convert(value_type, self))
    }

    /// Column-level compatibility. Symmetric, unlike [`DataType::accepts`].
    pub fn compatible_with(self, other: DataType, mode: ConversionMode) -> bool {
        if self == other || self == Self::Any || other == Self::Any {
            return true;
        }
        mode.is_relaxed() && (convert::can_convert(self, other) || convert::can_convert(other, self))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether numeric values may cross type boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    #[default]
    Strict,
    /// Integer, long, float and decimal convert into each other when the
    /// value survives the conversion.
    Relaxed,
}

impl ConversionMode {
    pub fn is_relaxed(self) -> bool {
        self == Self::Relaxed
    }
}
