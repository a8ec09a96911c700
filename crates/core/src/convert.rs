//! Relaxed numeric conversions.
//!
//! The dispatch table is built lazily on first use and shared by every
//! table and comparison in the process. Only conversions listed here are
//! allowed under [`ConversionMode::Relaxed`](crate::types::ConversionMode);
//! narrowing entries return `None` when the value does not survive.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::types::DataType;
use crate::value::Literal;

type Converter = fn(&Literal) -> Option<Literal>;

static CONVERSIONS: Lazy<HashMap<(DataType, DataType), Converter>> = Lazy::new(|| {
    log::trace!("building numeric conversion table");
    let mut table: HashMap<(DataType, DataType), Converter> = HashMap::new();
    table.insert((DataType::Integer, DataType::Long), integer_to_long);
    table.insert((DataType::Integer, DataType::Float), integer_to_float);
    table.insert((DataType::Integer, DataType::Decimal), integer_to_decimal);
    table.insert((DataType::Long, DataType::Integer), long_to_integer);
    table.insert((DataType::Long, DataType::Float), long_to_float);
    table.insert((DataType::Long, DataType::Decimal), long_to_decimal);
    table.insert((DataType::Float, DataType::Integer), float_to_integer);
    table.insert((DataType::Float, DataType::Long), float_to_long);
    table.insert((DataType::Float, DataType::Decimal), float_to_decimal);
    table.insert((DataType::Decimal, DataType::Integer), decimal_to_integer);
    table.insert((DataType::Decimal, DataType::Long), decimal_to_long);
    table.insert((DataType::Decimal, DataType::Float), decimal_to_float);
    table
});

/// Whether a relaxed conversion from `from` to `to` exists.
pub fn can_convert(from: DataType, to: DataType) -> bool {
    from == to || CONVERSIONS.contains_key(&(from, to))
}

/// Convert `value` into `to`. Returns `None` when no conversion exists or
/// the value would not survive it.
pub fn convert(value: &Literal, to: DataType) -> Option<Literal> {
    let from = value.data_type();
    if from == to || to == DataType::Any {
        return Some(value.clone());
    }
    CONVERSIONS.get(&(from, to)).and_then(|f| f(value))
}

fn integer_to_long(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Integer(n) => Some(Literal::Long(i64::from(*n))),
        _ => None,
    }
}

fn integer_to_float(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Integer(n) => Some(Literal::Float(OrderedFloat(f64::from(*n)))),
        _ => None,
    }
}

fn integer_to_decimal(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Integer(n) => Some(Literal::Decimal(Decimal::from(*n))),
        _ => None,
    }
}

fn long_to_integer(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Long(n) => i32::try_from(*n).ok().map(Literal::Integer),
        _ => None,
    }
}

fn long_to_float(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Long(n) => {
            let f = *n as f64;
            // Above 2^53 the float no longer holds the exact integer.
            if f.abs() <= 9_007_199_254_740_992.0 {
                Some(Literal::Float(OrderedFloat(f)))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn long_to_decimal(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Long(n) => Some(Literal::Decimal(Decimal::from(*n))),
        _ => None,
    }
}

fn float_to_integer(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Float(f) if f.0.fract() == 0.0 => f.0.to_i32().map(Literal::Integer),
        _ => None,
    }
}

fn float_to_long(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Float(f) if f.0.fract() == 0.0 => f.0.to_i64().map(Literal::Long),
        _ => None,
    }
}

fn float_to_decimal(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Float(f) => Decimal::from_f64(f.0).map(Literal::Decimal),
        _ => None,
    }
}

fn decimal_to_integer(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Decimal(d) if d.fract().is_zero() => d.to_i32().map(Literal::Integer),
        _ => None,
    }
}

fn decimal_to_long(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Decimal(d) if d.fract().is_zero() => d.to_i64().map(Literal::Long),
        _ => None,
    }
}

fn decimal_to_float(v: &Literal) -> Option<Literal> {
    match v {
        Literal::Decimal(d) => d.to_f64().map(|f| Literal::Float(OrderedFloat(f))),
        _ => None,
    }
}
