//! Row mutations produced by one logical write

use serde_json::{json, Value};

use crate::store::{Mutation, SegmentRange};

/// Deletes and inserts of one write
///
/// Inserts carry `write_time`; deletes carry `write_time - 1` so a write
/// never shadows its own rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    pub document_id: String,
    pub write_time: i64,
    pub deletes: Vec<Mutation>,
    pub inserts: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new(document_id: impl Into<String>, write_time: i64) -> Self {
        Self {
            document_id: document_id.into(),
            write_time,
            deletes: Vec::new(),
            inserts: Vec::new(),
        }
    }

    /// Deletes first, then inserts
    pub fn mutations(&self) -> Vec<Mutation> {
        self.deletes
            .iter()
            .chain(self.inserts.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.deletes.len() + self.inserts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON description of every mutation, one value per mutation
    pub fn describe(&self) -> Vec<Value> {
        self.deletes
            .iter()
            .chain(self.inserts.iter())
            .map(describe_mutation)
            .collect()
    }
}

fn describe_mutation(mutation: &Mutation) -> Value {
    match mutation {
        Mutation::Insert { row } => {
            let used: Vec<&str> = row
                .segments
                .iter()
                .map(String::as_str)
                .take_while(|s| !s.is_empty())
                .collect();
            json!({
                "op": "insert",
                "segments": used,
                "leaf": row.leaf,
                "text_value": row.text_value,
                "dbl_value": row.dbl_value,
                "bool_value": row.bool_value,
                "write_time": row.write_time,
            })
        }
        Mutation::DeleteRange {
            prefix,
            range,
            write_time,
            ..
        } => json!({
            "op": "delete_range",
            "prefix": prefix.to_dotted(),
            "range": range.as_ref().map(describe_range),
            "write_time": write_time,
        }),
        Mutation::DeleteKeys {
            prefix,
            keys,
            write_time,
            ..
        } => json!({
            "op": "delete_keys",
            "prefix": prefix.to_dotted(),
            "keys": keys,
            "write_time": write_time,
        }),
    }
}

fn describe_range(range: &SegmentRange) -> String {
    use std::ops::Bound;

    let lower = match &range.lower {
        Bound::Included(v) => format!("[{:?}", v),
        Bound::Excluded(v) => format!("({:?}", v),
        Bound::Unbounded => "(-inf".to_string(),
    };
    let upper = match &range.upper {
        Bound::Included(v) => format!("{:?}]", v),
        Bound::Excluded(v) => format!("{:?})", v),
        Bound::Unbounded => "+inf)".to_string(),
    };
    format!("{}, {}", lower, upper)
}
