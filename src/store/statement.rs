//! Select statements and row mutations understood by a row store

use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::row::Row;
use crate::path::{DocPath, INDEX_RANGE_END, INDEX_RANGE_START};

/// Keyspace-qualified document table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    pub keyspace: String,
    pub table: String,
}

impl TableRef {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

/// Condition on one segment column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentCondition {
    /// `pN = value`
    Eq(String),
    /// `pN > value`; `> ''` selects any used segment
    Gt(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPredicate {
    pub position: usize,
    pub condition: SegmentCondition,
}

impl SegmentPredicate {
    pub fn matches(&self, column: &str) -> bool {
        match &self.condition {
            SegmentCondition::Eq(v) => column == v,
            SegmentCondition::Gt(v) => column > v.as_str(),
        }
    }
}

/// Native comparison on a typed value column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// Apply to an ordering of `column` relative to the literal
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Literal bound to a value predicate; its type selects the column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnLiteral {
    Text(String),
    Double(f64),
    Bool(bool),
}

impl ColumnLiteral {
    pub fn column_name(&self) -> &'static str {
        match self {
            ColumnLiteral::Text(_) => "text_value",
            ColumnLiteral::Double(_) => "dbl_value",
            ColumnLiteral::Bool(_) => "bool_value",
        }
    }
}

/// `<typed column> <op> <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePredicate {
    pub op: CompareOp,
    pub literal: ColumnLiteral,
}

impl ValuePredicate {
    pub fn new(op: CompareOp, literal: ColumnLiteral) -> Self {
        Self { op, literal }
    }

    /// Evaluate against a row; a null column never matches
    pub fn matches(&self, row: &Row) -> bool {
        let ordering = match (&self.literal, row) {
            (ColumnLiteral::Text(lit), Row { text_value: Some(v), .. }) => Some(v.as_str().cmp(lit)),
            (ColumnLiteral::Double(lit), Row { dbl_value: Some(v), .. }) => v.partial_cmp(lit),
            (ColumnLiteral::Bool(lit), Row { bool_value: Some(v), .. }) => Some(v.cmp(lit)),
            _ => None,
        };
        ordering.map_or(false, |o| self.op.accepts(o))
    }
}

impl fmt::Display for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = match &self.literal {
            ColumnLiteral::Text(s) => format!("{:?}", s),
            ColumnLiteral::Double(d) => d.to_string(),
            ColumnLiteral::Bool(b) => b.to_string(),
        };
        write!(f, "{} {} {}", self.literal.column_name(), self.op.as_str(), literal)
    }
}

/// Which columns a select returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Columns {
    /// Every column plus the write time of `leaf`
    #[default]
    Full,
    /// Only the document id and `leaf`
    KeyAndLeaf,
}

/// Opaque continuation token handed out by a row store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState(pub Vec<u8>);

/// Select statement over the document table
///
/// Without a document id the statement spans every partition and the store
/// only accepts it with `allow_filtering` set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub document_id: Option<String>,
    pub segments: Vec<SegmentPredicate>,
    pub leaf: Option<String>,
    pub value: Option<ValuePredicate>,
    pub columns: Columns,
    pub allow_filtering: bool,
    pub start_after_document: Option<String>,
    pub page_size: Option<usize>,
    pub paging_state: Option<PagingState>,
}

impl Select {
    /// All rows of one document
    pub fn document(document_id: impl Into<String>) -> Self {
        Self {
            document_id: Some(document_id.into()),
            ..Default::default()
        }
    }

    /// Rows across every document
    pub fn scan() -> Self {
        Self {
            allow_filtering: true,
            ..Default::default()
        }
    }

    /// Equality on the first `prefix.len()` segment columns
    pub fn with_prefix(mut self, prefix: &DocPath) -> Self {
        for (position, segment) in prefix.segments().iter().enumerate() {
            self.segments.push(SegmentPredicate {
                position,
                condition: SegmentCondition::Eq(segment.encode().into_owned()),
            });
        }
        self
    }

    pub fn with_segment(mut self, position: usize, condition: SegmentCondition) -> Self {
        self.segments.push(SegmentPredicate {
            position,
            condition,
        });
        self
    }

    pub fn with_leaf(mut self, leaf: impl Into<String>) -> Self {
        self.leaf = Some(leaf.into());
        self.allow_filtering = true;
        self
    }

    pub fn with_value(mut self, predicate: ValuePredicate) -> Self {
        self.value = Some(predicate);
        self.allow_filtering = true;
        self
    }

    pub fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }

    pub fn key_and_leaf(mut self) -> Self {
        self.columns = Columns::KeyAndLeaf;
        self
    }

    pub fn after_document(mut self, document_id: Option<String>) -> Self {
        self.start_after_document = document_id;
        self
    }

    pub fn with_page(mut self, page_size: usize, paging_state: Option<PagingState>) -> Self {
        self.page_size = Some(page_size);
        self.paging_state = paging_state;
        self
    }

    /// Evaluate the column predicates against a full row
    pub fn matches(&self, row: &Row) -> bool {
        if let Some(id) = &self.document_id {
            if &row.document_id != id {
                return false;
            }
        }
        if let Some(leaf) = &self.leaf {
            if &row.leaf != leaf {
                return false;
            }
        }
        let segments_match = self.segments.iter().all(|p| {
            row.segments
                .get(p.position)
                .map_or(false, |column| p.matches(column))
        });
        segments_match && self.value.as_ref().map_or(true, |v| v.matches(row))
    }
}

/// One page of select results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowPage {
    pub rows: Vec<Row>,
    /// Present when more rows may follow
    pub paging_state: Option<PagingState>,
}

/// Segment interval directly under a delete prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRange {
    pub lower: Bound<String>,
    pub upper: Bound<String>,
}

impl SegmentRange {
    /// `[000000]..=[999999]`: every array index
    pub fn indexes() -> Self {
        Self {
            lower: Bound::Included(INDEX_RANGE_START.to_string()),
            upper: Bound::Included(INDEX_RANGE_END.to_string()),
        }
    }

    /// Field names sorting before the index range, plus ""
    pub fn below_indexes() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(INDEX_RANGE_START.to_string()),
        }
    }

    /// Field names sorting after the index range
    pub fn above_indexes() -> Self {
        Self {
            lower: Bound::Excluded(INDEX_RANGE_END.to_string()),
            upper: Bound::Unbounded,
        }
    }

    pub fn contains_segment(&self, segment: &str) -> bool {
        let above_lower = match &self.lower {
            Bound::Included(lower) => segment >= lower.as_str(),
            Bound::Excluded(lower) => segment > lower.as_str(),
            Bound::Unbounded => true,
        };
        let below_upper = match &self.upper {
            Bound::Included(upper) => segment <= upper.as_str(),
            Bound::Excluded(upper) => segment < upper.as_str(),
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }
}

/// Consistency level requested for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consistency {
    One,
    #[default]
    LocalQuorum,
    Quorum,
    All,
}

/// Per-write options forwarded to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteOptions {
    #[serde(default)]
    pub consistency: Consistency,
}

/// One row-level change; every variant is scoped to a single document
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Write a row at `row.write_time`
    Insert { row: Row },

    /// Delete the whole subtree at `prefix`, or with `range`, only the
    /// subtrees whose next segment falls in the range
    DeleteRange {
        document_id: String,
        prefix: DocPath,
        range: Option<SegmentRange>,
        write_time: i64,
    },

    /// Delete the subtrees whose next segment after `prefix` is in `keys`;
    /// the key "" names the row stored exactly at `prefix`
    DeleteKeys {
        document_id: String,
        prefix: DocPath,
        keys: Vec<String>,
        write_time: i64,
    },
}

impl Mutation {
    pub fn document_id(&self) -> &str {
        match self {
            Mutation::Insert { row } => &row.document_id,
            Mutation::DeleteRange { document_id, .. } | Mutation::DeleteKeys { document_id, .. } => {
                document_id
            }
        }
    }

    pub fn write_time(&self) -> i64 {
        match self {
            Mutation::Insert { row } => row.write_time,
            Mutation::DeleteRange { write_time, .. } | Mutation::DeleteKeys { write_time, .. } => {
                *write_time
            }
        }
    }

    pub fn is_delete(&self) -> bool {
        !matches!(self, Mutation::Insert { .. })
    }
}
