//! Typed property values

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque state of a stateful node, as captured by `capture_state`
pub type StateValue = serde_json::Value;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of value a declared property holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Boolean,
    Integer,
    Float,
    Date,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::String => "string",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Integer => "integer",
            PropertyKind::Float => "float",
            PropertyKind::Date => "date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDateTime),
    /// Indexed property: `name[key] = value`
    Map(IndexMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Date(_) => "date",
            PropertyValue::Map(_) => "map",
        }
    }

    pub fn matches(&self, kind: PropertyKind) -> bool {
        matches!(
            (self, kind),
            (PropertyValue::String(_), PropertyKind::String)
                | (PropertyValue::Boolean(_), PropertyKind::Boolean)
                | (PropertyValue::Integer(_), PropertyKind::Integer)
                | (PropertyValue::Float(_), PropertyKind::Float)
                | (PropertyValue::Date(_), PropertyKind::Date)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Convert a value supplied at runtime (a record field, restored state) to
    /// the kind a property declares. Returns `None` when no sensible conversion
    /// exists.
    pub fn coerce(self, kind: PropertyKind) -> Option<PropertyValue> {
        if self.matches(kind) {
            return Some(self);
        }

        match (self, kind) {
            (PropertyValue::Integer(i), PropertyKind::Float) => Some(PropertyValue::Float(i as f64)),
            (PropertyValue::Integer(i), PropertyKind::String) => Some(PropertyValue::String(i.to_string())),
            (PropertyValue::Float(f), PropertyKind::String) => Some(PropertyValue::String(f.to_string())),
            (PropertyValue::Boolean(b), PropertyKind::String) => Some(PropertyValue::String(b.to_string())),
            (PropertyValue::Date(d), PropertyKind::String) => {
                Some(PropertyValue::String(d.format(DATE_TIME_FORMAT).to_string()))
            }
            (PropertyValue::String(s), PropertyKind::Integer) => s.trim().parse().ok().map(PropertyValue::Integer),
            (PropertyValue::String(s), PropertyKind::Float) => s.trim().parse().ok().map(PropertyValue::Float),
            (PropertyValue::String(s), PropertyKind::Boolean) => match s.trim() {
                "true" => Some(PropertyValue::Boolean(true)),
                "false" => Some(PropertyValue::Boolean(false)),
                _ => None,
            },
            (PropertyValue::String(s), PropertyKind::Date) => parse_date(&s).map(PropertyValue::Date),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::Boolean(b) => serde_json::Value::Bool(*b),
            PropertyValue::Integer(i) => serde_json::Value::from(*i),
            PropertyValue::Float(f) => serde_json::Value::from(*f),
            PropertyValue::Date(d) => serde_json::Value::String(d.format(DATE_TIME_FORMAT).to_string()),
            PropertyValue::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Read a plain JSON scalar. Objects, arrays and null have no property equivalent.
    pub fn from_json(value: &serde_json::Value) -> Option<PropertyValue> {
        match value {
            serde_json::Value::String(s) => Some(PropertyValue::String(s.clone())),
            serde_json::Value::Bool(b) => Some(PropertyValue::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(PropertyValue::Integer)
                .or_else(|| n.as_f64().map(PropertyValue::Float)),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{:?}", s),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::Date(d) => write!(f, "{}", d.format(DATE_TIME_FORMAT)),
            PropertyValue::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|d| d.naive_utc()))
}
