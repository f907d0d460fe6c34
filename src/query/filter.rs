//! Filter trees: path pattern → operator object

use std::fmt;

use serde_json::Value;

use super::operators::Operator;
use super::pattern::PathPattern;
use crate::errors::{DocsError, DocsResult};
use crate::path::DocPath;
use crate::store::Leaf;
use crate::write::parse_document;

/// Operators applied to every leaf matching one path pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub pattern: PathPattern,
    pub operators: Vec<Operator>,
}

impl Condition {
    /// True if all operators accept the leaf
    pub fn accepts(&self, leaf: &Leaf) -> bool {
        self.pattern.matches(&leaf.path) && self.operators.iter().all(|op| op.matches(&leaf.value))
    }

    /// Existential: some leaf matching the pattern satisfies every operator
    pub fn holds<'a>(&self, leaves: impl IntoIterator<Item = &'a Leaf>) -> bool {
        leaves.into_iter().any(|leaf| self.accepts(leaf))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operators: Vec<String> = self.operators.iter().map(|o| o.to_string()).collect();
        write!(f, "{} {{{}}}", self.pattern, operators.join(", "))
    }
}

/// Conjunction of conditions, at most one per distinct path pattern
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Parse a JSON filter string such as `{"a.*.c": {"$gt": 1}}`
    pub fn parse(raw: &str, max_depth: usize) -> DocsResult<Self> {
        let value = parse_document(raw)
            .map_err(|e| DocsError::invalid_filter(format!("malformed filter: {}", e)))?;
        Self::from_value(&value, max_depth)
    }

    pub fn from_value(value: &Value, max_depth: usize) -> DocsResult<Self> {
        let entries = value
            .as_object()
            .ok_or_else(|| DocsError::invalid_filter("filter must be a JSON object"))?;

        let mut conditions: Vec<Condition> = Vec::with_capacity(entries.len());
        for (raw_path, raw_operators) in entries {
            let pattern = PathPattern::parse(raw_path)?;
            if pattern.len() > max_depth {
                return Err(DocsError::invalid_filter(format!(
                    "path '{}' is deeper than the maximum depth of {}",
                    raw_path, max_depth
                )));
            }
            if conditions.iter().any(|c| c.pattern == pattern) {
                return Err(DocsError::invalid_filter(format!(
                    "path '{}' appears more than once",
                    pattern
                )));
            }

            let operator_object = raw_operators.as_object().ok_or_else(|| {
                DocsError::invalid_filter(format!(
                    "conditions for '{}' must be an operator object",
                    raw_path
                ))
            })?;
            if operator_object.is_empty() {
                return Err(DocsError::invalid_filter(format!(
                    "conditions for '{}' cannot be empty",
                    raw_path
                )));
            }
            let operators = operator_object
                .iter()
                .map(|(name, operand)| Operator::parse(name, operand))
                .collect::<DocsResult<Vec<_>>>()?;

            conditions.push(Condition { pattern, operators });
        }
        Ok(Self::new(conditions))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Same filter with every pattern rooted below `base`
    pub fn under(&self, base: &DocPath) -> Filter {
        Self::new(
            self.conditions
                .iter()
                .map(|c| Condition {
                    pattern: c.pattern.under(base),
                    operators: c.operators.clone(),
                })
                .collect(),
        )
    }

    /// Every condition holds for the leaves of one document
    pub fn matches(&self, leaves: &[Leaf]) -> bool {
        self.conditions.iter().all(|c| c.holds(leaves))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::LeafValue;
    use serde_json::json;

    fn leaf(path: &str, value: LeafValue) -> Leaf {
        Leaf {
            document_id: "id1".into(),
            path: DocPath::parse_dotted(path).unwrap(),
            value,
            write_time: 1,
        }
    }

    #[test]
    fn test_existential_per_condition() {
        let leaves = vec![
            leaf("a.b.c", LeafValue::Double(1.0)),
            leaf("a.d.c", LeafValue::Double(10.0)),
        ];

        let strict = Filter::parse(r#"{"a.*.c": {"$gt": 1, "$ne": 10}}"#, 8).unwrap();
        assert!(!strict.matches(&leaves));

        let loose = Filter::parse(r#"{"a.*.c": {"$gt": 1}}"#, 8).unwrap();
        assert!(loose.matches(&leaves));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let leaves = vec![leaf("a", LeafValue::Double(1.0)), leaf("b", LeafValue::Text("x".into()))];
        assert!(Filter::parse(r#"{"a": {"$eq": 1}, "b": {"$eq": "x"}}"#, 8)
            .unwrap()
            .matches(&leaves));
        assert!(!Filter::parse(r#"{"a": {"$eq": 1}, "b": {"$eq": "y"}}"#, 8)
            .unwrap()
            .matches(&leaves));
    }

    #[test]
    fn test_missing_path_never_holds() {
        let leaves = vec![leaf("a", LeafValue::Double(1.0))];
        let filter = Filter::parse(r#"{"z": {"$ne": 5}}"#, 8).unwrap();
        assert!(!filter.matches(&leaves));
    }

    #[test]
    fn test_rejects_malformed_filters() {
        for raw in [
            r#"[]"#,
            r#"{"a": 1}"#,
            r#"{"a": {}}"#,
            r#"{"a": {"$like": "x"}}"#,
            r#"{"a": {"$eq": [1]}}"#,
            r#"{"a": {"$eq": 1}, "a": {"$eq": 2}}"#,
            r#"{"a.[1]": {"$eq": 1}, "a.[000001]": {"$eq": 2}}"#,
            r#"{"a.b.c": {"$eq": 1}}"#,
        ] {
            let err = Filter::parse(raw, 2).unwrap_err();
            assert_eq!(err.code(), "DOCS_INVALID_FILTER", "input {}", raw);
        }
    }

    #[test]
    fn test_under_prefixes_patterns() {
        let filter = Filter::from_value(&json!({"*.c": {"$eq": 1}}), 8)
            .unwrap()
            .under(&DocPath::parse_dotted("x").unwrap());
        assert_eq!(filter.conditions()[0].pattern.to_string(), "x.*.c");
    }
}
