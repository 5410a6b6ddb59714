//! Bind parameters for prepared statements.

use scylla::value::CqlValue;

/// Parameter value for prepared statements.
///
/// Each variant maps onto exactly one CQL type, so the cluster sees the
/// width the caller asked for (`Int` for `int` columns, `BigInt` for `bigint`).
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// NULL value
    Null,
    /// `boolean`
    Boolean(bool),
    /// `int`
    Int(i32),
    /// `bigint`
    BigInt(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `text` / `varchar`
    Text(String),
    /// `blob`
    Blob(Vec<u8>),
}

impl Parameter {
    /// Convert to the driver value sent over the wire. `Null` becomes `None`.
    pub fn to_cql_value(&self) -> Option<CqlValue> {
        match self {
            Parameter::Null => None,
            Parameter::Boolean(b) => Some(CqlValue::Boolean(*b)),
            Parameter::Int(i) => Some(CqlValue::Int(*i)),
            Parameter::BigInt(i) => Some(CqlValue::BigInt(*i)),
            Parameter::Float(f) => Some(CqlValue::Float(*f)),
            Parameter::Double(f) => Some(CqlValue::Double(*f)),
            Parameter::Text(s) => Some(CqlValue::Text(s.clone())),
            Parameter::Blob(b) => Some(CqlValue::Blob(b.clone())),
        }
    }
}

impl From<bool> for Parameter {
    fn from(value: bool) -> Self {
        Parameter::Boolean(value)
    }
}

impl From<i32> for Parameter {
    fn from(value: i32) -> Self {
        Parameter::Int(value)
    }
}

impl From<i64> for Parameter {
    fn from(value: i64) -> Self {
        Parameter::BigInt(value)
    }
}

impl From<f32> for Parameter {
    fn from(value: f32) -> Self {
        Parameter::Float(value)
    }
}

impl From<f64> for Parameter {
    fn from(value: f64) -> Self {
        Parameter::Double(value)
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Parameter::Text(value)
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Parameter::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Parameter {
    fn from(value: Vec<u8>) -> Self {
        Parameter::Blob(value)
    }
}

impl<T: Into<Parameter>> From<Option<T>> for Parameter {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Parameter::Null)
    }
}
