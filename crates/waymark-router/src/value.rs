//! Route values produced by matching.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::convert::Decimal;
use crate::template::eq_ignore_case;

/// A single bound value: the converted form of a parameter's text, or `Null`
/// when the parameter is declared but has no value for this match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Guid(Uuid),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    String(String),
    List(Vec<RouteValue>),
}

impl RouteValue {
    /// Whether this is the `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, RouteValue::Null)
    }

    /// The text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RouteValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an `i32`, if it is an `Int`.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            RouteValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an `i64`, widening an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RouteValue::Long(v) => Some(*v),
            RouteValue::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// The items of a `List`.
    pub fn as_list(&self) -> Option<&[RouteValue]> {
        match self {
            RouteValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteValue::Null => f.write_str("null"),
            RouteValue::Bool(v) => write!(f, "{}", v),
            RouteValue::Int(v) => write!(f, "{}", v),
            RouteValue::Long(v) => write!(f, "{}", v),
            RouteValue::Float(v) => write!(f, "{}", v),
            RouteValue::Double(v) => write!(f, "{}", v),
            RouteValue::Decimal(v) => write!(f, "{}", v),
            RouteValue::Guid(v) => write!(f, "{}", v),
            RouteValue::DateTime(v) => write!(f, "{}", v),
            RouteValue::Date(v) => write!(f, "{}", v),
            RouteValue::Time(v) => write!(f, "{}", v),
            RouteValue::String(v) => f.write_str(v),
            RouteValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for RouteValue {
    fn from(value: &str) -> Self {
        RouteValue::String(value.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(value: String) -> Self {
        RouteValue::String(value)
    }
}

impl From<i32> for RouteValue {
    fn from(value: i32) -> Self {
        RouteValue::Int(value)
    }
}

impl From<i64> for RouteValue {
    fn from(value: i64) -> Self {
        RouteValue::Long(value)
    }
}

impl From<bool> for RouteValue {
    fn from(value: bool) -> Self {
        RouteValue::Bool(value)
    }
}

/// Parameter values bound by a match, keyed case-insensitively.
///
/// Keys keep the casing they were first inserted with. The backing vector is
/// only allocated once the first value is inserted, so pure-literal matches
/// never allocate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteValues {
    entries: Vec<(String, RouteValue)>,
}

impl RouteValues {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no name is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&RouteValue> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    /// Whether `name` is bound, ignoring case.
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insert or replace a value. A replaced entry keeps its original key casing.
    pub fn insert(&mut self, name: &str, value: RouteValue) {
        match self.position(name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Insert only when no value is bound under `name`. Returns whether it inserted.
    pub fn insert_if_absent(&mut self, name: &str, value: RouteValue) -> bool {
        if self.contains_key(name) {
            return false;
        }
        self.entries.push((name.to_string(), value));
        true
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| eq_ignore_case(k, name))
    }
}

impl IntoIterator for RouteValues {
    type Item = (String, RouteValue);
    type IntoIter = std::vec::IntoIter<(String, RouteValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for RouteValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
