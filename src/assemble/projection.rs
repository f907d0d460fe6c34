//! Field projection

use serde_json::Value;

use crate::errors::{DocsError, DocsResult};
use crate::path::DocPath;

/// Set of dotted field paths, relative to a projection base
///
/// A leaf is kept when its path relative to the base starts with one of the
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    fields: Vec<DocPath>,
}

impl Projection {
    pub fn new(fields: Vec<DocPath>) -> Self {
        Self { fields }
    }

    /// Parse a JSON array of dotted paths, e.g. `["a.b", "c"]`
    ///
    /// An empty array means no projection.
    pub fn parse(raw: &str) -> DocsResult<Option<Self>> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| DocsError::invalid_filter(format!("fields: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> DocsResult<Option<Self>> {
        let items = value
            .as_array()
            .ok_or_else(|| DocsError::invalid_filter("fields must be a JSON array of strings"))?;

        let mut fields = Vec::with_capacity(items.len());
        for item in items {
            let raw = item.as_str().ok_or_else(|| {
                DocsError::invalid_filter(format!("field {} is not a string", item))
            })?;
            if raw.is_empty() {
                return Err(DocsError::invalid_filter("field paths cannot be empty"));
            }
            let path = DocPath::parse_dotted(raw)
                .map_err(|e| DocsError::invalid_filter(format!("field '{}': {}", raw, e)))?;
            fields.push(path);
        }

        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(fields)))
    }

    pub fn fields(&self) -> &[DocPath] {
        &self.fields
    }

    /// True if a leaf at `relative` belongs to a projected subtree
    pub fn includes(&self, relative: &DocPath) -> bool {
        self.fields.iter().any(|f| relative.starts_with(f))
    }

    /// Longest field path, for depth checks against the configured maximum
    pub fn max_len(&self) -> usize {
        self.fields.iter().map(DocPath::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_include() {
        let projection = Projection::parse(r#"["a.b", "c"]"#).unwrap().unwrap();
        assert!(projection.includes(&DocPath::parse_dotted("a.b").unwrap()));
        assert!(projection.includes(&DocPath::parse_dotted("a.b.[0]").unwrap()));
        assert!(projection.includes(&DocPath::parse_dotted("c").unwrap()));
        assert!(!projection.includes(&DocPath::parse_dotted("a").unwrap()));
        assert!(!projection.includes(&DocPath::parse_dotted("a.bb").unwrap()));
        assert_eq!(projection.max_len(), 2);
    }

    #[test]
    fn test_empty_list_means_everything() {
        assert_eq!(Projection::parse("[]").unwrap(), None);
    }

    #[test]
    fn test_malformed_fields() {
        for raw in [r#"{"a": 1}"#, "[1]", r#"[""]"#, r#"["a.*"]"#, "not json"] {
            let err = Projection::parse(raw).unwrap_err();
            assert_eq!(err.code(), "DOCS_INVALID_FILTER", "input {}", raw);
        }
    }
}
