//! User-supplied skip patterns such as `kube-system/Secret/*`.

use crate::resource::ResourceRecord;

/// One slash-delimited component of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Wildcard,
    /// Lower-cased literal.
    Literal(String),
}

impl Segment {
    fn parse(segment: &str) -> Self {
        if segment == "*" {
            Segment::Wildcard
        } else {
            Segment::Literal(segment.to_lowercase())
        }
    }

    fn matches(&self, part: &str) -> bool {
        match self {
            Segment::Wildcard => true,
            Segment::Literal(literal) => literal.as_str() == part,
        }
    }
}

/// A parsed skip pattern: `[namespace/]kind/name`, compared
/// case-insensitively, where any segment may be `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPattern {
    source: String,
    segments: Vec<Segment>,
}

impl FilterPattern {
    pub fn parse(pattern: &str) -> Self {
        let source = pattern.trim().to_lowercase();
        let segments = source.split('/').map(Segment::parse).collect();
        Self { source, segments }
    }

    /// Patterns with exactly one slash apply to cluster-scoped objects.
    pub fn is_global(&self) -> bool {
        self.segments.len() == 2
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Matches an identity tuple (`[namespace, kind, name]` or `[kind, name]`).
    pub fn matches(&self, identity: &[&str]) -> bool {
        let parts: Vec<String> = identity.iter().map(|p| p.to_lowercase()).collect();

        if self.source == parts.join("/") {
            return true;
        }

        self.segments.len() == parts.len()
            && self
                .segments
                .iter()
                .zip(parts.iter())
                .all(|(segment, part)| segment.matches(part))
    }
}

impl std::fmt::Display for FilterPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Skip patterns split by the scope they apply to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    pub global: Vec<FilterPattern>,
    pub namespaced: Vec<FilterPattern>,
}

impl PatternSet {
    /// Parses a comma-separated pattern list.
    pub fn parse(list: &str) -> Self {
        let (global, namespaced) = list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(FilterPattern::parse)
            .partition(FilterPattern::is_global);
        Self { global, namespaced }
    }

    pub fn from_option(list: Option<&str>) -> Self {
        list.map(Self::parse).unwrap_or_default()
    }

    /// First global pattern matching a cluster-scoped object.
    pub fn global_match(&self, record: &ResourceRecord) -> Option<&FilterPattern> {
        first_match(&self.global, record)
    }

    /// First namespaced pattern matching a namespaced object.
    pub fn namespaced_match(&self, record: &ResourceRecord) -> Option<&FilterPattern> {
        first_match(&self.namespaced, record)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.namespaced.is_empty()
    }
}

/// Identity tuple of an object; the namespace is left out when absent.
pub fn identity(record: &ResourceRecord) -> Vec<&str> {
    let mut parts = Vec::with_capacity(3);
    if let Some(ns) = record.namespace() {
        parts.push(ns);
    }
    parts.push(record.kind());
    parts.push(record.name());
    parts
}

fn first_match<'a>(
    patterns: &'a [FilterPattern],
    record: &ResourceRecord,
) -> Option<&'a FilterPattern> {
    if patterns.is_empty() {
        return None;
    }
    let identity = identity(record);
    patterns.iter().find(|pattern| pattern.matches(&identity))
}
