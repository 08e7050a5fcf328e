//! Typed record values.

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::fields::FieldMap;
use crate::record::RecordData;

/// A value held by a record field.
///
/// The variant set is closed: key derivation and serialization dispatch on
/// it directly instead of probing a value's structure.
///
/// Note: `Real` uses bit-pattern equality and hashing, so `NaN == NaN` and
/// `0.0 != -0.0`. That keeps `Eq` and `Hash` lawful for records.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,

    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Real(f64),
    /// UTF-8 text.
    Text(String),

    // ===== Temporal Types =====
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time of day without an offset.
    DateTime(NaiveDateTime),
    /// Date and time of day with a UTC offset.
    Timestamp(DateTime<FixedOffset>),

    // ===== Structured Types =====
    /// Ordered sequence (lists and tuples alike).
    List(Vec<Value>),
    /// Nested string-keyed mapping.
    Map(FieldMap),
    /// Nested record. Only its data is carried, never its side attributes.
    Record(RecordData),
}

/// The shape of a value, as seen by hash-index key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Null,
    Boolean,
    Integer,
    Real,
    Text,
    Temporal,
    Sequence,
    Mapping,
    Record,
}

impl ValueShape {
    /// Whether values of this shape have a stable linear representation.
    ///
    /// Text and sequences are ordered by construction; integers (and
    /// booleans, which behave as integers) render the same way every time.
    pub fn is_orderable(self) -> bool {
        matches!(
            self,
            ValueShape::Boolean | ValueShape::Integer | ValueShape::Text | ValueShape::Sequence
        )
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false, // Different types are not equal
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Real(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::DateTime(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            Value::Map(v) => v.hash(state),
            Value::Record(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Returns the shape tag of this value.
    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Null => ValueShape::Null,
            Value::Boolean(_) => ValueShape::Boolean,
            Value::Integer(_) => ValueShape::Integer,
            Value::Real(_) => ValueShape::Real,
            Value::Text(_) => ValueShape::Text,
            Value::Date(_) | Value::DateTime(_) | Value::Timestamp(_) => ValueShape::Temporal,
            Value::List(_) => ValueShape::Sequence,
            Value::Map(_) => ValueShape::Mapping,
            Value::Record(_) => ValueShape::Record,
        }
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for null, zero, `false` and empty text or collections.
    pub fn is_vacant(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(b) => !b,
            Value::Integer(v) => *v == 0,
            Value::Real(v) => *v == 0.0,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Record(data) => data.is_empty(),
            Value::Date(_) | Value::DateTime(_) | Value::Timestamp(_) => false,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordData> {
        match self {
            Value::Record(data) => Some(data),
            _ => None,
        }
    }

    /// Builds a value from parsed JSON.
    ///
    /// Strings stay text (no date sniffing). Numbers that fit an `i64`
    /// become integers, every other number becomes a real.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Value::Integer(v),
                None => n.as_f64().map_or(Value::Null, Value::Real),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::from_json(value)))
                    .collect(),
            ),
        }
    }
}

/// Renders the value the way it appears inside a hash-index key.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => write_entries(f, map.iter()),
            Value::Record(data) => write_entries(f, data.iter()),
        }
    }
}

pub(crate) fn write_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
) -> fmt::Result {
    write!(f, "{{")?;
    for (idx, (key, value)) in entries.enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    write!(f, "}}")
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<FieldMap> for Value {
    fn from(v: FieldMap) -> Self {
        Value::Map(v)
    }
}

impl From<RecordData> for Value {
    fn from(v: RecordData) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
