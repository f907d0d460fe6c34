//! Document paths and their segment-column form

use std::fmt;

use super::segment::Segment;
use crate::errors::{DocsError, DocsResult};

/// Ordered sequence of segments from the document root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    segments: Vec<Segment>,
}

impl DocPath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Build from URL-style segments such as `["x", "y", "[0]"]`
    pub fn parse_segments<S: AsRef<str>>(raw: &[S]) -> DocsResult<Self> {
        raw.iter()
            .map(|s| Segment::parse(s.as_ref()))
            .collect::<DocsResult<Vec<_>>>()
            .map(Self::new)
    }

    /// Build from a dotted path such as `a.b.[0].c`
    pub fn parse_dotted(raw: &str) -> DocsResult<Self> {
        if raw.is_empty() {
            return Ok(Self::root());
        }
        raw.split('.')
            .map(Segment::parse)
            .collect::<DocsResult<Vec<_>>>()
            .map(Self::new)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Path with the last segment removed (root stays root)
    pub fn parent(&self) -> DocPath {
        let end = self.segments.len().saturating_sub(1);
        Self::new(self.segments[..end].to_vec())
    }

    /// Path extended by one segment
    pub fn child(&self, segment: Segment) -> DocPath {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self::new(segments)
    }

    /// Path extended by another path
    pub fn join(&self, other: &DocPath) -> DocPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self::new(segments)
    }

    /// First `len` segments
    pub fn prefix(&self, len: usize) -> DocPath {
        Self::new(self.segments[..len.min(self.segments.len())].to_vec())
    }

    /// Segments after the first `len`
    pub fn strip_prefix(&self, prefix: &DocPath) -> Option<DocPath> {
        if self.starts_with(prefix) {
            Some(Self::new(self.segments[prefix.len()..].to_vec()))
        } else {
            None
        }
    }

    /// True if `prefix` is this path or one of its ancestors
    pub fn starts_with(&self, prefix: &DocPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// True if this path is a proper ancestor of `other`
    pub fn is_ancestor_of(&self, other: &DocPath) -> bool {
        self.len() < other.len() && other.starts_with(self)
    }

    /// Reject paths that do not fit the configured segment columns
    pub fn check_depth(&self, max_depth: usize) -> DocsResult<()> {
        if self.len() > max_depth {
            return Err(DocsError::invalid_path(format!(
                "path '{}' has {} segments, maximum depth is {}",
                self,
                self.len(),
                max_depth
            )));
        }
        Ok(())
    }

    /// Encode into exactly `max_depth` segment columns, padding with ""
    pub fn to_columns(&self, max_depth: usize) -> DocsResult<Vec<String>> {
        self.check_depth(max_depth)?;
        let mut columns: Vec<String> = self
            .segments
            .iter()
            .map(|s| s.encode().into_owned())
            .collect();
        columns.resize(max_depth, String::new());
        Ok(columns)
    }

    /// Decode segment columns, trimming the trailing empty ones
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> DocsResult<Self> {
        let used = columns
            .iter()
            .rposition(|c| !c.as_ref().is_empty())
            .map_or(0, |i| i + 1);

        let mut segments = Vec::with_capacity(used);
        for (position, column) in columns[..used].iter().enumerate() {
            let column = column.as_ref();
            if column.is_empty() {
                return Err(DocsError::corrupt_row(format!(
                    "empty segment at position {} precedes a non-empty one",
                    position
                )));
            }
            segments.push(Segment::from_column(column));
        }
        Ok(Self::new(segments))
    }

    /// Dotted rendering, e.g. `a.[000001].b`
    pub fn to_dotted(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.encode().into_owned())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("$");
        }
        f.write_str(&self.to_dotted())
    }
}

impl From<Vec<Segment>> for DocPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self::new(segments)
    }
}
