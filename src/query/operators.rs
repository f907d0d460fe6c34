//! Filter operators and their evaluation over decoded leaves
//!
//! Comparisons are type strict: a text literal never matches a number, a
//! number never matches a boolean, and empty-container markers match
//! nothing.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::errors::{DocsError, DocsResult};
use crate::path::{LeafValue, ValueKind};
use crate::store::{ColumnLiteral, CompareOp, ValuePredicate};

/// Scalar operand of a filter operator
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl Scalar {
    pub fn from_json(value: &Value) -> DocsResult<Self> {
        match value {
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            Value::Number(n) => n
                .as_f64()
                .map(Scalar::Number)
                .ok_or_else(|| DocsError::invalid_filter(format!("unsupported number {}", n))),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Null => Ok(Scalar::Null),
            Value::Array(_) | Value::Object(_) => Err(DocsError::invalid_filter(format!(
                "operator values must be scalars, got {}",
                value
            ))),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Scalar::Text(_) => ValueKind::Text,
            Scalar::Number(_) => ValueKind::Number,
            Scalar::Bool(_) => ValueKind::Bool,
            Scalar::Null => ValueKind::Null,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Number(n) => LeafValue::Double(*n).to_json(),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Null => Value::Null,
        }
    }

    /// Ordering of `leaf` relative to this literal, when both have one kind
    fn compare(&self, leaf: &LeafValue) -> Option<Ordering> {
        match (leaf, self) {
            (LeafValue::Text(a), Scalar::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            (LeafValue::Double(a), Scalar::Number(b)) => a.partial_cmp(b),
            (LeafValue::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (LeafValue::Null, Scalar::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// One `$op: operand` entry of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Eq(Scalar),
    Ne(Scalar),
    Gt(Scalar),
    Gte(Scalar),
    Lt(Scalar),
    Lte(Scalar),
    In(Vec<Scalar>),
    Nin(Vec<Scalar>),
}

impl Operator {
    /// Parse one operator entry such as `"$gt": 3`
    pub fn parse(name: &str, operand: &Value) -> DocsResult<Self> {
        let scalar = || Scalar::from_json(operand);
        let list = || -> DocsResult<Vec<Scalar>> {
            operand
                .as_array()
                .ok_or_else(|| {
                    DocsError::invalid_filter(format!("{} requires an array of values", name))
                })?
                .iter()
                .map(Scalar::from_json)
                .collect()
        };

        match name {
            "$eq" => scalar().map(Operator::Eq),
            "$ne" => scalar().map(Operator::Ne),
            "$gt" => scalar().map(Operator::Gt),
            "$gte" => scalar().map(Operator::Gte),
            "$lt" => scalar().map(Operator::Lt),
            "$lte" => scalar().map(Operator::Lte),
            "$in" => list().map(Operator::In),
            "$nin" => list().map(Operator::Nin),
            other => Err(DocsError::invalid_filter(format!(
                "unknown operator '{}'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eq(_) => "$eq",
            Operator::Ne(_) => "$ne",
            Operator::Gt(_) => "$gt",
            Operator::Gte(_) => "$gte",
            Operator::Lt(_) => "$lt",
            Operator::Lte(_) => "$lte",
            Operator::In(_) => "$in",
            Operator::Nin(_) => "$nin",
        }
    }

    pub fn operand_json(&self) -> Value {
        match self {
            Operator::Eq(s)
            | Operator::Ne(s)
            | Operator::Gt(s)
            | Operator::Gte(s)
            | Operator::Lt(s)
            | Operator::Lte(s) => s.to_json(),
            Operator::In(list) | Operator::Nin(list) => {
                Value::Array(list.iter().map(Scalar::to_json).collect())
            }
        }
    }

    /// Native predicate on one typed column, if the store can evaluate this
    /// operator exactly
    pub fn pushdown(&self) -> Option<ValuePredicate> {
        let (op, scalar) = match self {
            Operator::Eq(s) => (CompareOp::Eq, s),
            Operator::Gt(s) => (CompareOp::Gt, s),
            Operator::Gte(s) => (CompareOp::Gte, s),
            Operator::Lt(s) => (CompareOp::Lt, s),
            Operator::Lte(s) => (CompareOp::Lte, s),
            Operator::Ne(_) | Operator::In(_) | Operator::Nin(_) => return None,
        };
        let literal = match scalar {
            Scalar::Text(s) => ColumnLiteral::Text(s.clone()),
            Scalar::Number(n) => ColumnLiteral::Double(*n),
            Scalar::Bool(b) if op == CompareOp::Eq => ColumnLiteral::Bool(*b),
            Scalar::Bool(_) | Scalar::Null => return None,
        };
        Some(ValuePredicate::new(op, literal))
    }

    /// Evaluate against one decoded leaf
    pub fn matches(&self, leaf: &LeafValue) -> bool {
        if leaf.is_marker() {
            return false;
        }
        match self {
            Operator::Eq(s) => s.compare(leaf) == Some(Ordering::Equal),
            Operator::Ne(s) => matches!(s.compare(leaf), Some(o) if o != Ordering::Equal),
            Operator::Gt(s) => ordered(s, leaf, |o| o == Ordering::Greater),
            Operator::Gte(s) => ordered(s, leaf, |o| o != Ordering::Less),
            Operator::Lt(s) => ordered(s, leaf, |o| o == Ordering::Less),
            Operator::Lte(s) => ordered(s, leaf, |o| o != Ordering::Greater),
            Operator::In(list) => list.iter().any(|s| s.compare(leaf) == Some(Ordering::Equal)),
            Operator::Nin(list) => list
                .iter()
                .all(|s| s.kind() == leaf.kind() && s.compare(leaf) != Some(Ordering::Equal)),
        }
    }
}

/// Ordering operators only compare numbers with numbers and text with text
fn ordered(scalar: &Scalar, leaf: &LeafValue, accept: impl Fn(Ordering) -> bool) -> bool {
    if !matches!(scalar.kind(), ValueKind::Number | ValueKind::Text) {
        return false;
    }
    scalar.compare(leaf).map_or(false, accept)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.operand_json())
    }
}
