//! Write decomposition
//!
//! Turns a JSON value written at a target path into rows to insert plus the
//! deletes that clear whatever the write replaces.

use serde_json::Value;

use super::batch::WriteBatch;
use crate::config::DocsConfig;
use crate::errors::{DocsError, DocsResult};
use crate::path::{DocPath, LeafValue, Segment};
use crate::store::{Mutation, Row, SegmentRange};

/// Key naming the row stored exactly at a delete prefix
const SELF_KEY: &str = "";

/// Decomposes JSON writes into row mutations
#[derive(Debug, Clone)]
pub struct Decomposer {
    max_depth: usize,
    max_array_length: usize,
}

impl Decomposer {
    pub fn new(config: &DocsConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_array_length: config.max_array_length,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decompose a full-replace (`patching = false`) or patch write
    pub fn put(
        &self,
        document_id: &str,
        target: &DocPath,
        value: &Value,
        patching: bool,
        write_time: i64,
    ) -> DocsResult<WriteBatch> {
        target.check_depth(self.max_depth)?;
        let delete_time = write_time.saturating_sub(1);
        let mut batch = WriteBatch::new(document_id, write_time);

        self.walk(document_id, target, value, write_time, &mut batch.inserts)?;

        if patching {
            let object = match value {
                Value::Object(map) if !map.is_empty() => map,
                Value::Object(_) => {
                    return Err(DocsError::invalid_document(
                        "a patch must contain at least one field",
                    ))
                }
                _ => {
                    return Err(DocsError::invalid_document(
                        "a patch payload must be a JSON object",
                    ))
                }
            };
            batch.deletes.push(Mutation::DeleteRange {
                document_id: document_id.to_string(),
                prefix: target.clone(),
                range: Some(SegmentRange::indexes()),
                write_time: delete_time,
            });
            // Field names were validated by the walk above
            let mut keys = vec![SELF_KEY.to_string()];
            keys.extend(object.keys().cloned());
            batch.deletes.push(Mutation::DeleteKeys {
                document_id: document_id.to_string(),
                prefix: target.clone(),
                keys,
                write_time: delete_time,
            });
        } else {
            batch.deletes.push(Mutation::DeleteRange {
                document_id: document_id.to_string(),
                prefix: target.clone(),
                range: None,
                write_time: delete_time,
            });
        }

        batch
            .deletes
            .extend(ancestor_deletes(document_id, target, delete_time));
        Ok(batch)
    }

    /// Delete the subtree at `target`
    pub fn delete(&self, document_id: &str, target: &DocPath, write_time: i64) -> DocsResult<WriteBatch> {
        target.check_depth(self.max_depth)?;
        let mut batch = WriteBatch::new(document_id, write_time);
        batch.deletes.push(Mutation::DeleteRange {
            document_id: document_id.to_string(),
            prefix: target.clone(),
            range: None,
            write_time,
        });
        Ok(batch)
    }

    fn walk(
        &self,
        document_id: &str,
        path: &DocPath,
        value: &Value,
        write_time: i64,
        out: &mut Vec<Mutation>,
    ) -> DocsResult<()> {
        if let Some(leaf) = LeafValue::classify(value) {
            let row = Row::encode(document_id, path, &leaf, self.max_depth, write_time)?;
            out.push(Mutation::Insert { row });
            return Ok(());
        }

        if path.len() >= self.max_depth {
            return Err(DocsError::invalid_path(format!(
                "document nests deeper than the maximum depth of {} below '{}'",
                self.max_depth, path
            )));
        }

        match value {
            Value::Object(map) => {
                for (name, child) in map {
                    let segment = Segment::field(name.as_str())?;
                    self.walk(document_id, &path.child(segment), child, write_time, out)?;
                }
            }
            Value::Array(items) => {
                if items.len() > self.max_array_length {
                    return Err(DocsError::invalid_path(format!(
                        "array at '{}' has {} elements, maximum is {}",
                        path,
                        items.len(),
                        self.max_array_length
                    )));
                }
                for (i, child) in items.iter().enumerate() {
                    let segment = Segment::index(i)?;
                    self.walk(document_id, &path.child(segment), child, write_time, out)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Deletes that keep every ancestor of `target` of the kind the write needs
fn ancestor_deletes(document_id: &str, target: &DocPath, delete_time: i64) -> Vec<Mutation> {
    let mut deletes = Vec::new();
    for (depth, next) in target.segments().iter().enumerate() {
        let ancestor = target.prefix(depth);
        match next {
            Segment::Field(_) => {
                deletes.push(Mutation::DeleteKeys {
                    document_id: document_id.to_string(),
                    prefix: ancestor.clone(),
                    keys: vec![SELF_KEY.to_string()],
                    write_time: delete_time,
                });
                deletes.push(Mutation::DeleteRange {
                    document_id: document_id.to_string(),
                    prefix: ancestor,
                    range: Some(SegmentRange::indexes()),
                    write_time: delete_time,
                });
            }
            // below_indexes also covers the row stored at the ancestor itself
            Segment::Index(_) => {
                deletes.push(Mutation::DeleteRange {
                    document_id: document_id.to_string(),
                    prefix: ancestor.clone(),
                    range: Some(SegmentRange::below_indexes()),
                    write_time: delete_time,
                });
                deletes.push(Mutation::DeleteRange {
                    document_id: document_id.to_string(),
                    prefix: ancestor,
                    range: Some(SegmentRange::above_indexes()),
                    write_time: delete_time,
                });
            }
        }
    }
    deletes
}
