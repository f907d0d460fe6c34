//! Physical rows and their decoded form

use crate::errors::{DocsError, DocsResult};
use crate::path::{DocPath, LeafValue, EMPTY_ARRAY_MARKER, EMPTY_OBJECT_MARKER};

/// One clustered row of the document table
///
/// `segments` holds exactly `max_depth` columns for full rows. Rows selected
/// with [`Columns::KeyAndLeaf`](super::Columns::KeyAndLeaf) leave it empty
/// and carry no values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub document_id: String,
    pub segments: Vec<String>,
    pub leaf: String,
    pub text_value: Option<String>,
    pub dbl_value: Option<f64>,
    pub bool_value: Option<bool>,
    pub write_time: i64,
}

impl Row {
    /// Encode a leaf into its row form
    pub fn encode(
        document_id: &str,
        path: &DocPath,
        value: &LeafValue,
        max_depth: usize,
        write_time: i64,
    ) -> DocsResult<Self> {
        let segments = path.to_columns(max_depth)?;
        let leaf = match value.marker() {
            Some(marker) => marker.to_string(),
            None => path
                .last()
                .map(|s| s.encode().into_owned())
                .unwrap_or_default(),
        };

        let mut row = Row {
            document_id: document_id.to_string(),
            segments,
            leaf,
            text_value: None,
            dbl_value: None,
            bool_value: None,
            write_time,
        };
        match value {
            LeafValue::Text(s) => row.text_value = Some(s.clone()),
            LeafValue::Double(d) => row.dbl_value = Some(*d),
            LeafValue::Bool(b) => row.bool_value = Some(*b),
            LeafValue::Null | LeafValue::EmptyObject | LeafValue::EmptyArray => {}
        }
        Ok(row)
    }

    /// Decode into a path and value, rejecting rows no writer produces
    pub fn decode(&self) -> DocsResult<Leaf> {
        let path = DocPath::from_columns(&self.segments)?;
        let set = [
            self.text_value.is_some(),
            self.dbl_value.is_some(),
            self.bool_value.is_some(),
        ]
        .iter()
        .filter(|s| **s)
        .count();

        if set > 1 {
            return Err(DocsError::corrupt_row(format!(
                "document '{}' path '{}' has {} typed values",
                self.document_id, path, set
            )));
        }

        let value = match self.leaf.as_str() {
            EMPTY_OBJECT_MARKER | EMPTY_ARRAY_MARKER if set > 0 => {
                return Err(DocsError::corrupt_row(format!(
                    "document '{}' path '{}' is an empty-container marker with a value",
                    self.document_id, path
                )));
            }
            EMPTY_OBJECT_MARKER => LeafValue::EmptyObject,
            EMPTY_ARRAY_MARKER => LeafValue::EmptyArray,
            _ => {
                if let Some(text) = &self.text_value {
                    LeafValue::Text(text.clone())
                } else if let Some(d) = self.dbl_value {
                    LeafValue::Double(d)
                } else if let Some(b) = self.bool_value {
                    LeafValue::Bool(b)
                } else {
                    LeafValue::Null
                }
            }
        };

        Ok(Leaf {
            document_id: self.document_id.clone(),
            path,
            value,
            write_time: self.write_time,
        })
    }
}

/// A decoded row
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub document_id: String,
    pub path: DocPath,
    pub value: LeafValue,
    pub write_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> DocPath {
        DocPath::parse_dotted(raw).unwrap()
    }

    #[test]
    fn test_encode_scalar() {
        let row = Row::encode("id1", &path("g.[0].h"), &LeafValue::Double(1.0), 4, 100).unwrap();
        assert_eq!(row.segments, vec!["g", "[000000]", "h", ""]);
        assert_eq!(row.leaf, "h");
        assert_eq!(row.dbl_value, Some(1.0));
        assert_eq!(row.text_value, None);
        assert_eq!(row.write_time, 100);
    }

    #[test]
    fn test_encode_markers_and_null() {
        let row = Row::encode("id1", &path("d"), &LeafValue::EmptyObject, 2, 1).unwrap();
        assert_eq!(row.leaf, EMPTY_OBJECT_MARKER);
        assert!(row.text_value.is_none() && row.dbl_value.is_none() && row.bool_value.is_none());

        let row = Row::encode("id1", &path("f"), &LeafValue::Null, 2, 1).unwrap();
        assert_eq!(row.leaf, "f");
        assert!(row.text_value.is_none() && row.dbl_value.is_none() && row.bool_value.is_none());
    }

    #[test]
    fn test_decode_round_trip() {
        for value in [
            LeafValue::Text("x".into()),
            LeafValue::Double(2.5),
            LeafValue::Bool(false),
            LeafValue::Null,
            LeafValue::EmptyArray,
        ] {
            let row = Row::encode("id", &path("a.[3]"), &value, 4, 7).unwrap();
            let leaf = row.decode().unwrap();
            assert_eq!(leaf.path, path("a.[3]"));
            assert_eq!(leaf.value, value);
            assert_eq!(leaf.write_time, 7);
        }
    }

    #[test]
    fn test_decode_rejects_two_typed_values() {
        let mut row = Row::encode("id", &path("a"), &LeafValue::Double(1.0), 2, 1).unwrap();
        row.text_value = Some("also".into());
        assert_eq!(row.decode().unwrap_err().code(), "DOCS_CORRUPT_ROW");
    }

    #[test]
    fn test_decode_rejects_marker_with_value() {
        let mut row = Row::encode("id", &path("a"), &LeafValue::EmptyObject, 2, 1).unwrap();
        row.bool_value = Some(true);
        assert_eq!(row.decode().unwrap_err().code(), "DOCS_CORRUPT_ROW");
    }
}
