//! Responses in wrapped or raw form

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Result of reading one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document_id: String,
    pub page_state: Option<String>,
    pub data: Value,
    /// Latest write time among the rows read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_time: Option<i64>,
}

impl DocumentResponse {
    pub fn new(document_id: impl Into<String>, data: Value) -> Self {
        Self {
            document_id: document_id.into(),
            page_state: None,
            data,
            write_time: None,
        }
    }

    /// `raw` yields the bare data; otherwise the wrapped envelope
    pub fn render(&self, raw: bool) -> Value {
        if raw {
            return self.data.clone();
        }
        json!({
            "documentId": self.document_id,
            "pageState": self.page_state,
            "data": self.data,
        })
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    /// Matched documents in id order
    pub documents: Vec<(String, Value)>,
    pub page_state: Option<String>,
}

impl SearchResponse {
    /// Documents keyed by id
    pub fn data(&self) -> Value {
        let map: Map<String, Value> = self.documents.iter().cloned().collect();
        Value::Object(map)
    }

    pub fn render(&self, raw: bool) -> Value {
        if raw {
            return self.data();
        }
        json!({
            "pageState": self.page_state,
            "data": self.data(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_render_modes() {
        let mut response = DocumentResponse::new("id1", json!({"a": 1}));
        response.page_state = Some("abc".into());
        assert_eq!(response.render(true), json!({"a": 1}));
        assert_eq!(
            response.render(false),
            json!({"documentId": "id1", "pageState": "abc", "data": {"a": 1}})
        );
    }

    #[test]
    fn test_search_render_keys_by_id() {
        let response = SearchResponse {
            documents: vec![("b".into(), json!(2)), ("a".into(), json!(1))],
            page_state: None,
        };
        assert_eq!(response.render(true), json!({"a": 1, "b": 2}));
        assert_eq!(
            response.render(false),
            json!({"pageState": null, "data": {"a": 1, "b": 2}})
        );
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let value = serde_json::to_value(DocumentResponse::new("x", json!(null))).unwrap();
        assert_eq!(value, json!({"documentId": "x", "pageState": null, "data": null}));
    }
}
