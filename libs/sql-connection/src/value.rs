use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::fmt;

/// A value bound as a query parameter or read out of a result row. Nullable
/// payloads carry the type of the column even when the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(Option<i64>),
    Real(Option<Decimal>),
    Boolean(Option<bool>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    DateTime(Option<DateTime<Utc>>),
    /// A homogeneous value list, used for array parameters (id sets).
    Array(Option<Vec<Value>>),
}

impl Value {
    pub fn integer(value: impl Into<i64>) -> Self {
        Value::Integer(Some(value.into()))
    }

    pub fn real(value: Decimal) -> Self {
        Value::Real(Some(value))
    }

    pub fn boolean(value: bool) -> Self {
        Value::Boolean(Some(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Some(value.into()))
    }

    pub fn date(value: NaiveDate) -> Self {
        Value::Date(Some(value))
    }

    pub fn time(value: NaiveTime) -> Self {
        Value::Time(Some(value))
    }

    pub fn datetime(value: DateTime<Utc>) -> Self {
        Value::DateTime(Some(value))
    }

    pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Some(values.into_iter().collect()))
    }

    /// An integer-array parameter from a set of row ids.
    pub fn id_array(ids: impl IntoIterator<Item = i64>) -> Self {
        Value::array(ids.into_iter().map(Value::integer))
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Integer(i) => i.is_none(),
            Value::Real(r) => r.is_none(),
            Value::Boolean(b) => b.is_none(),
            Value::Text(t) => t.is_none(),
            Value::Date(d) => d.is_none(),
            Value::Time(t) => t.is_none(),
            Value::DateTime(dt) => dt.is_none(),
            Value::Array(a) => a.is_none(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => *i,
            Value::Real(r) => r.and_then(|d| d.trunc().to_i64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(Some(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The store renders booleans as 0/1 numerics, so integers coerce here.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(i) => i.map(|i| i == 1),
            Value::Real(r) => r.map(|d| d == Decimal::ONE),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(Some(i)) => write!(f, "{i}"),
            Value::Real(Some(d)) => write!(f, "{d}"),
            Value::Boolean(Some(b)) => write!(f, "{b}"),
            Value::Text(Some(s)) => write!(f, "\"{s}\""),
            Value::Date(Some(d)) => write!(f, "\"{d}\""),
            Value::Time(Some(t)) => write!(f, "\"{t}\""),
            Value::DateTime(Some(dt)) => write!(f, "\"{}\"", dt.to_rfc3339()),
            Value::Array(Some(values)) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            _ => write!(f, "null"),
        }
    }
}

/// Parameter list wrapper for debug logging of executed queries.
pub struct Params<'a>(pub &'a [Value]);

impl fmt::Display for Params<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_coerces_to_bool() {
        assert_eq!(Value::integer(1).as_bool(), Some(true));
        assert_eq!(Value::integer(0).as_bool(), Some(false));
        assert_eq!(Value::boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Text(None).as_bool(), None);
    }

    #[test]
    fn null_detection_covers_all_variants() {
        assert!(Value::Integer(None).is_null());
        assert!(Value::Text(None).is_null());
        assert!(!Value::text("x").is_null());
    }

    #[test]
    fn params_render_for_logging() {
        let params = vec![Value::integer(42), Value::text("it's")];
        assert_eq!(format!("{}", Params(&params)), r#"[42,"it's"]"#);
    }
}
