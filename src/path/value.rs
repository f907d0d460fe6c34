//! Leaf values and their typed-column classification

use serde_json::{Number, Value};

/// Leaf column value marking an explicitly empty object
pub const EMPTY_OBJECT_MARKER: &str = "\u{2400}EMPTY_OBJECT";

/// Leaf column value marking an explicitly empty array
pub const EMPTY_ARRAY_MARKER: &str = "\u{2400}EMPTY_ARRAY";

/// Kind of a decoded leaf, used for type-strict comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
    Bool,
    Null,
    Container,
}

/// Content of a single stored row
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    /// Stored in `text_value`
    Text(String),
    /// Stored in `dbl_value`
    Double(f64),
    /// Stored in `bool_value`
    Bool(bool),
    /// All value columns null
    Null,
    /// `leaf` = [`EMPTY_OBJECT_MARKER`]
    EmptyObject,
    /// `leaf` = [`EMPTY_ARRAY_MARKER`]
    EmptyArray,
}

impl LeafValue {
    /// Classify a JSON value. Non-empty containers are not leaves.
    pub fn classify(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(LeafValue::Null),
            Value::Bool(b) => Some(LeafValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(LeafValue::Double),
            Value::String(s) => Some(LeafValue::Text(s.clone())),
            Value::Object(map) if map.is_empty() => Some(LeafValue::EmptyObject),
            Value::Array(items) if items.is_empty() => Some(LeafValue::EmptyArray),
            Value::Object(_) | Value::Array(_) => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            LeafValue::Text(_) => ValueKind::Text,
            LeafValue::Double(_) => ValueKind::Number,
            LeafValue::Bool(_) => ValueKind::Bool,
            LeafValue::Null => ValueKind::Null,
            LeafValue::EmptyObject | LeafValue::EmptyArray => ValueKind::Container,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, LeafValue::EmptyObject | LeafValue::EmptyArray)
    }

    /// Marker string for the `leaf` column, if this is an empty container
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            LeafValue::EmptyObject => Some(EMPTY_OBJECT_MARKER),
            LeafValue::EmptyArray => Some(EMPTY_ARRAY_MARKER),
            _ => None,
        }
    }

    /// JSON rendering; integral doubles come back as integers
    pub fn to_json(&self) -> Value {
        match self {
            LeafValue::Text(s) => Value::String(s.clone()),
            LeafValue::Double(d) => double_to_json(*d),
            LeafValue::Bool(b) => Value::Bool(*b),
            LeafValue::Null => Value::Null,
            LeafValue::EmptyObject => Value::Object(Default::default()),
            LeafValue::EmptyArray => Value::Array(Vec::new()),
        }
    }
}

fn double_to_json(d: f64) -> Value {
    const SAFE_INTEGER_BOUND: f64 = 9_007_199_254_740_992.0; // 2^53
    if d.fract() == 0.0 && d.abs() <= SAFE_INTEGER_BOUND {
        return Value::Number(Number::from(d as i64));
    }
    Number::from_f64(d).map_or(Value::Null, Value::Number)
}
