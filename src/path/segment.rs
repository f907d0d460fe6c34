//! Path segments and their fixed-width column encoding

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::value::{EMPTY_ARRAY_MARKER, EMPTY_OBJECT_MARKER};
use crate::errors::{DocsError, DocsResult};

/// Largest array index the 6-digit encoding can hold
pub const MAX_ENCODABLE_INDEX: u32 = 999_999;

/// First encoded index segment
pub const INDEX_RANGE_START: &str = "[000000]";

/// Last encoded index segment
pub const INDEX_RANGE_END: &str = "[999999]";

/// Characters that are structural in paths and may not appear in field names
pub const RESERVED_CHARS: [char; 4] = ['[', ']', '.', '*'];

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\[(\d+)\]$").expect("index pattern is valid"))
}

/// One step of a document path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member name
    Field(String),
    /// Array position
    Index(u32),
}

impl Segment {
    /// Parse a caller-supplied segment: `name`, `[3]` or `[000003]`
    pub fn parse(raw: &str) -> DocsResult<Self> {
        if raw.starts_with('[') {
            let digits = index_pattern()
                .captures(raw)
                .and_then(|c| c.get(1))
                .ok_or_else(|| DocsError::invalid_path(format!("malformed array index '{}'", raw)))?
                .as_str();
            if digits.len() > 6 {
                return Err(DocsError::invalid_path(format!(
                    "array index '{}' exceeds the maximum of {}",
                    raw, MAX_ENCODABLE_INDEX
                )));
            }
            let index: u32 = digits
                .parse()
                .map_err(|_| DocsError::invalid_path(format!("malformed array index '{}'", raw)))?;
            return Self::index(index as usize);
        }
        Self::field(raw)
    }

    /// Validate a field name
    pub fn field(name: impl Into<String>) -> DocsResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DocsError::invalid_path("field names cannot be empty"));
        }
        if let Some(c) = name.chars().find(|c| RESERVED_CHARS.contains(c)) {
            return Err(DocsError::invalid_path(format!(
                "field name '{}' contains reserved character '{}'",
                name, c
            )));
        }
        if name == EMPTY_OBJECT_MARKER || name == EMPTY_ARRAY_MARKER {
            return Err(DocsError::invalid_path(format!(
                "field name '{}' is reserved for empty containers",
                name
            )));
        }
        Ok(Segment::Field(name))
    }

    /// Validate an array position against the encoding capacity
    pub fn index(index: usize) -> DocsResult<Self> {
        if index > MAX_ENCODABLE_INDEX as usize {
            return Err(DocsError::invalid_path(format!(
                "array index {} exceeds the maximum of {}",
                index, MAX_ENCODABLE_INDEX
            )));
        }
        Ok(Segment::Index(index as u32))
    }

    /// Decode a stored segment column. Stored text is trusted: anything that
    /// is not a 6-digit bracketed token is a field name.
    pub fn from_column(raw: &str) -> Self {
        if raw.len() == 8 {
            if let Some(index) = index_pattern()
                .captures(raw)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
            {
                return Segment::Index(index);
            }
        }
        Segment::Field(raw.to_string())
    }

    /// Column representation
    pub fn encode(&self) -> Cow<'_, str> {
        match self {
            Segment::Field(name) => Cow::Borrowed(name),
            Segment::Index(i) => Cow::Owned(format!("[{:06}]", i)),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            Segment::Field(name) => Some(name),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Orders segments the way their encoded columns sort.
impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Field(a), Segment::Field(b)) => a.cmp(b),
            (Segment::Index(a), Segment::Index(b)) => a.cmp(b),
            (Segment::Field(a), Segment::Index(_)) => {
                if a.as_str() < "[" {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Segment::Index(_), Segment::Field(b)) => {
                if b.as_str() < "[" {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
