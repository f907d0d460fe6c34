//! Rows → JSON

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::projection::Projection;
use crate::errors::{DocsError, DocsResult};
use crate::path::{DocPath, LeafValue, Segment};
use crate::store::{Leaf, Row};

/// Rebuilds JSON values from decoded rows
///
/// Leaves outside `base` are ignored and the result is rooted at `base`.
/// With a projection, only leaves whose path below `base` falls in a
/// projected subtree contribute.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    base: DocPath,
    projection: Option<Projection>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root the output at `base`
    pub fn at(base: DocPath) -> Self {
        Self {
            base,
            projection: None,
        }
    }

    pub fn with_projection(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn base(&self) -> &DocPath {
        &self.base
    }

    /// Assemble the rows of one document
    ///
    /// Returns `None` when no row lies under the base. A document whose rows
    /// are all pruned by the projection assembles to `{}`.
    pub fn assemble(&self, rows: &[Row]) -> DocsResult<Option<Value>> {
        let leaves = rows.iter().map(Row::decode).collect::<DocsResult<Vec<_>>>()?;
        self.assemble_leaves(leaves)
    }

    /// Assemble rows of several documents, grouped by id in id order
    pub fn assemble_many(&self, rows: &[Row]) -> DocsResult<Vec<(String, Value)>> {
        let mut by_document: BTreeMap<String, Vec<Leaf>> = BTreeMap::new();
        for row in rows {
            let leaf = row.decode()?;
            by_document
                .entry(leaf.document_id.clone())
                .or_default()
                .push(leaf);
        }

        let mut documents = Vec::with_capacity(by_document.len());
        for (document_id, leaves) in by_document {
            if let Some(value) = self.assemble_leaves(leaves)? {
                documents.push((document_id, value));
            }
        }
        Ok(documents)
    }

    /// Assemble already-decoded leaves of one document
    pub fn assemble_leaves(&self, leaves: Vec<Leaf>) -> DocsResult<Option<Value>> {
        let mut relative: Vec<(DocPath, LeafValue)> = leaves
            .into_iter()
            .filter_map(|leaf| {
                leaf.path
                    .strip_prefix(&self.base)
                    .map(|path| (path, leaf.value))
            })
            .collect();

        if relative.is_empty() {
            return Ok(None);
        }

        if let Some(projection) = &self.projection {
            relative.retain(|(path, _)| projection.includes(path));
            if relative.is_empty() {
                return Ok(Some(Value::Object(Map::new())));
            }
        }

        // build() expects segment order
        relative.sort_by(|a, b| a.0.cmp(&b.0));
        build(&relative, 0).map(Some)
    }

    /// Navigate to the value at `base` inside an assembled document
    pub fn subtree<'v>(value: &'v Value, base: &DocPath) -> Option<&'v Value> {
        base.segments()
            .iter()
            .try_fold(value, |current, segment| match (segment, current) {
                (Segment::Field(name), Value::Object(map)) => map.get(name),
                (Segment::Index(i), Value::Array(items)) => items.get(*i as usize),
                _ => None,
            })
    }
}

/// Build the value for a sorted run of leaves sharing their first `depth`
/// segments
fn build(leaves: &[(DocPath, LeafValue)], depth: usize) -> DocsResult<Value> {
    let (first_path, first_value) = &leaves[0];
    if first_path.len() == depth {
        if leaves.len() > 1 {
            return Err(DocsError::corrupt_row(format!(
                "leaf at '{}' also has descendants",
                first_path
            )));
        }
        return Ok(first_value.to_json());
    }

    let mut groups: Vec<(&Segment, &[(DocPath, LeafValue)])> = Vec::new();
    let mut start = 0;
    while start < leaves.len() {
        let segment = &leaves[start].0.segments()[depth];
        let end = leaves[start..]
            .iter()
            .position(|(p, _)| &p.segments()[depth] != segment)
            .map_or(leaves.len(), |offset| start + offset);
        groups.push((segment, &leaves[start..end]));
        start = end;
    }

    let indexes = groups.iter().filter(|(s, _)| s.is_index()).count();
    if indexes == groups.len() {
        let mut items = Vec::with_capacity(groups.len());
        for (segment, group) in groups {
            if let Segment::Index(i) = segment {
                items.resize(*i as usize, Value::Null);
            }
            items.push(build(group, depth + 1)?);
        }
        Ok(Value::Array(items))
    } else if indexes == 0 {
        let mut object = Map::new();
        for (segment, group) in groups {
            if let Segment::Field(name) = segment {
                object.insert(name.clone(), build(group, depth + 1)?);
            }
        }
        Ok(Value::Object(object))
    } else {
        Err(DocsError::corrupt_row(format!(
            "'{}' mixes array indexes and object fields",
            first_path.prefix(depth)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::store::Mutation;
    use crate::write::Decomposer;
    use serde_json::json;

    fn rows(id: &str, value: &Value) -> Vec<Row> {
        Decomposer::new(&DocsConfig::with_max_depth(8))
            .put(id, &DocPath::root(), value, false, 1)
            .unwrap()
            .inserts
            .into_iter()
            .filter_map(|m| match m {
                Mutation::Insert { row } => Some(row),
                _ => None,
            })
            .collect()
    }

    fn row(path: &str, value: LeafValue) -> Row {
        Row::encode("id1", &DocPath::parse_dotted(path).unwrap(), &value, 8, 1).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let doc = json!({
            "a": {"b": [1, 2.5, "x", null, true, {}, []]},
            "c": {"d": {"e": "deep"}},
            "f": []
        });
        let assembled = Assembler::new().assemble(&rows("id1", &doc)).unwrap();
        assert_eq!(assembled, Some(doc));
    }

    #[test]
    fn test_root_scalar_and_empty_object() {
        assert_eq!(
            Assembler::new().assemble(&rows("id1", &json!(42))).unwrap(),
            Some(json!(42))
        );
        assert_eq!(
            Assembler::new().assemble(&rows("id1", &json!({}))).unwrap(),
            Some(json!({}))
        );
    }

    #[test]
    fn test_unsorted_rows_are_sorted() {
        let mut shuffled = rows("id1", &json!({"a": [1, 2, 3], "b": "x"}));
        shuffled.reverse();
        assert_eq!(
            Assembler::new().assemble(&shuffled).unwrap(),
            Some(json!({"a": [1, 2, 3], "b": "x"}))
        );
    }

    #[test]
    fn test_array_gaps_filled_with_null() {
        let sparse = vec![row("a.[2]", LeafValue::Double(7.0))];
        assert_eq!(
            Assembler::new().assemble(&sparse).unwrap(),
            Some(json!({"a": [null, null, 7]}))
        );
    }

    #[test]
    fn test_projection_prunes_and_keeps_empty_match() {
        let doc_rows = rows("id1", &json!({"a": {"b": 1, "c": 2}, "d": 3}));
        let projection = Projection::parse(r#"["a.c", "d"]"#).unwrap();
        let assembled = Assembler::new()
            .with_projection(projection)
            .assemble(&doc_rows)
            .unwrap();
        assert_eq!(assembled, Some(json!({"a": {"c": 2}, "d": 3})));

        let projection = Projection::parse(r#"["missing"]"#).unwrap();
        let assembled = Assembler::new()
            .with_projection(projection)
            .assemble(&doc_rows)
            .unwrap();
        assert_eq!(assembled, Some(json!({})));
    }

    #[test]
    fn test_base_roots_the_result() {
        let doc_rows = rows("id1", &json!({"a": {"b": {"c": 1}}, "z": 0}));
        let at = Assembler::at(DocPath::parse_dotted("a.b").unwrap());
        assert_eq!(at.assemble(&doc_rows).unwrap(), Some(json!({"c": 1})));

        let missing = Assembler::at(DocPath::parse_dotted("nope").unwrap());
        assert_eq!(missing.assemble(&doc_rows).unwrap(), None);
    }

    #[test]
    fn test_assemble_many_groups_by_id() {
        let mut all = rows("b", &json!({"x": 2}));
        all.extend(rows("a", &json!({"x": 1})));
        let docs = Assembler::new().assemble_many(&all).unwrap();
        assert_eq!(
            docs,
            vec![("a".to_string(), json!({"x": 1})), ("b".to_string(), json!({"x": 2}))]
        );
    }

    #[test]
    fn test_mixed_children_are_corrupt() {
        let mixed = vec![
            row("a.[0]", LeafValue::Double(1.0)),
            row("a.b", LeafValue::Double(1.0)),
        ];
        let err = Assembler::new().assemble(&mixed).unwrap_err();
        assert_eq!(err.code(), "DOCS_CORRUPT_ROW");
    }

    #[test]
    fn test_leaf_with_descendants_is_corrupt() {
        let shadowed = vec![
            row("a", LeafValue::Text("x".into())),
            row("a.b", LeafValue::Double(1.0)),
        ];
        let err = Assembler::new().assemble(&shadowed).unwrap_err();
        assert_eq!(err.code(), "DOCS_CORRUPT_ROW");
    }

    #[test]
    fn test_subtree_navigation() {
        let doc = json!({"a": [{"b": 1}, {"b": 2}]});
        let base = DocPath::parse_dotted("a.[1].b").unwrap();
        assert_eq!(Assembler::subtree(&doc, &base), Some(&json!(2)));
        assert_eq!(
            Assembler::subtree(&doc, &DocPath::parse_dotted("a.x").unwrap()),
            None
        );
    }
}
