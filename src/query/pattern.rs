//! Path patterns with single-segment wildcards

use std::fmt;

use crate::errors::{DocsError, DocsResult};
use crate::path::{DocPath, Segment};

/// Wildcard token in dotted filter paths
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSegment {
    Exact(Segment),
    /// Matches any single segment
    Wildcard,
}

impl PatternSegment {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, PatternSegment::Wildcard)
    }

    pub fn matches(&self, segment: &Segment) -> bool {
        match self {
            PatternSegment::Exact(expected) => expected == segment,
            PatternSegment::Wildcard => true,
        }
    }
}

impl fmt::Display for PatternSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSegment::Exact(segment) => write!(f, "{}", segment),
            PatternSegment::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// Dotted path whose segments may be `*`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    pub fn new(segments: Vec<PatternSegment>) -> Self {
        Self { segments }
    }

    /// Parse `a.*.[0].b`; malformed segments are filter errors
    pub fn parse(raw: &str) -> DocsResult<Self> {
        if raw.is_empty() {
            return Err(DocsError::invalid_filter("filter paths cannot be empty"));
        }
        let segments = raw
            .split('.')
            .map(|s| {
                if s == WILDCARD {
                    return Ok(PatternSegment::Wildcard);
                }
                Segment::parse(s)
                    .map(PatternSegment::Exact)
                    .map_err(|e| DocsError::invalid_filter(format!("path '{}': {}", raw, e)))
            })
            .collect::<DocsResult<Vec<_>>>()?;
        Ok(Self::new(segments))
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(PatternSegment::is_wildcard)
    }

    pub fn last(&self) -> Option<&PatternSegment> {
        self.segments.last()
    }

    /// Pattern with the last segment removed
    pub fn parent(&self) -> PathPattern {
        let end = self.segments.len().saturating_sub(1);
        Self::new(self.segments[..end].to_vec())
    }

    /// Leading segments up to the first wildcard
    pub fn fixed_prefix(&self) -> DocPath {
        self.segments
            .iter()
            .map_while(|s| match s {
                PatternSegment::Exact(segment) => Some(segment.clone()),
                PatternSegment::Wildcard => None,
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Pattern rooted below `base`
    pub fn under(&self, base: &DocPath) -> PathPattern {
        let mut segments: Vec<PatternSegment> = base
            .segments()
            .iter()
            .cloned()
            .map(PatternSegment::Exact)
            .collect();
        segments.extend(self.segments.iter().cloned());
        Self::new(segments)
    }

    /// Exact-length match, `*` matching any one segment
    pub fn matches(&self, path: &DocPath) -> bool {
        path.len() == self.len()
            && self
                .segments
                .iter()
                .zip(path.segments())
                .all(|(p, s)| p.matches(s))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        f.write_str(&rendered.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> DocPath {
        DocPath::parse_dotted(raw).unwrap()
    }

    #[test]
    fn test_wildcard_matches_one_segment() {
        let pattern = PathPattern::parse("a.*.c").unwrap();
        assert!(pattern.matches(&path("a.b.c")));
        assert!(pattern.matches(&path("a.[3].c")));
        assert!(!pattern.matches(&path("a.c")));
        assert!(!pattern.matches(&path("a.b.x.c")));
        assert!(!pattern.matches(&path("a.b.c.d")));
    }

    #[test]
    fn test_index_forms_normalize() {
        assert_eq!(
            PathPattern::parse("a.[1]").unwrap(),
            PathPattern::parse("a.[000001]").unwrap()
        );
        assert_eq!(PathPattern::parse("a.[1]").unwrap().to_string(), "a.[000001]");
    }

    #[test]
    fn test_fixed_prefix_and_parent() {
        let pattern = PathPattern::parse("a.b.*.d").unwrap();
        assert_eq!(pattern.fixed_prefix(), path("a.b"));
        assert_eq!(pattern.parent().to_string(), "a.b.*");
        assert_eq!(PathPattern::parse("*.x").unwrap().fixed_prefix(), DocPath::root());
    }

    #[test]
    fn test_under_base() {
        let pattern = PathPattern::parse("*.c").unwrap().under(&path("x.y"));
        assert!(pattern.matches(&path("x.y.q.c")));
        assert_eq!(pattern.fixed_prefix(), path("x.y"));
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["", "a..b", "a.[x]", "a.b*", "a.[1000000]"] {
            let err = PathPattern::parse(raw).unwrap_err();
            assert_eq!(err.code(), "DOCS_INVALID_FILTER", "input {:?}", raw);
        }
    }
}
