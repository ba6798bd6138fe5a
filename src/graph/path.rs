//! Dotted/indexed path lookup over JSON values.
//!
//! Paths look like `company.miniCompany.name` or
//! `*companyIndustries[0].localizedName`. Each `.`-separated segment indexes
//! an object by key; a `[n]` suffix then indexes the resulting array. A bare
//! numeric segment (`attributes.0.detailData`) indexes arrays directly.
//!
//! Lookups never fail loudly: a missing or null intermediate node, or a
//! segment applied to a value it cannot index, yields `None`.

use std::fmt;

use serde_json::Value;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key (or array index when the key is all digits and the
    /// current node is an array).
    Key(String),
    /// Bracketed array index.
    Index(usize),
}

/// A parsed field path.
///
/// A path with malformed brackets (`a[x]`, `a[1`) parses into an invalid
/// path that resolves to `None` everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Option<Vec<PathSegment>>,
}

impl FieldPath {
    /// Parse a path expression.
    pub fn parse(path: &str) -> Self {
        Self {
            raw: path.to_string(),
            segments: parse_segments(path),
        }
    }

    /// The original path text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the path parsed cleanly.
    pub fn is_valid(&self) -> bool {
        self.segments.is_some()
    }

    /// Parsed segments, if the path is valid.
    pub fn segments(&self) -> Option<&[PathSegment]> {
        self.segments.as_deref()
    }

    /// Resolve this path against a value.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let segments = self.segments.as_ref()?;

        let mut current = value;
        for segment in segments {
            current = step(current, segment)?;
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

fn parse_segments(path: &str) -> Option<Vec<PathSegment>> {
    if path.is_empty() {
        return Some(Vec::new());
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let Some(open) = part.find('[') else {
            segments.push(PathSegment::Key(part.to_string()));
            continue;
        };

        let key = &part[..open];
        if !key.is_empty() {
            segments.push(PathSegment::Key(key.to_string()));
        }

        // One or more `[n]` groups, nothing after the last `]`.
        let mut rest = &part[open..];
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index = inner[..close].trim().parse::<usize>().ok()?;
            segments.push(PathSegment::Index(index));
            rest = &inner[close + 1..];
        }
    }

    Some(segments)
}

fn step<'a>(current: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(items), PathSegment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|idx| items.get(idx))
        }
        (Value::Array(items), PathSegment::Index(idx)) => items.get(*idx),
        (Value::Object(map), PathSegment::Index(idx)) => map.get(&idx.to_string()),
        // Null, scalars: nothing to index into.
        _ => None,
    }
}

/// Resolve `path` against `value`.
///
/// An explicit `null` at the end of the path is returned as `Some(Null)`;
/// a `null` anywhere before the end short-circuits to `None`.
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    FieldPath::parse(path).resolve(value)
}

/// Resolve `path` and return it as a string slice.
pub fn get_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    get(value, path).and_then(Value::as_str)
}

/// Resolve `path` and return it as an array slice.
pub fn get_array<'a>(value: &'a Value, path: &str) -> Option<&'a [Value]> {
    get(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// Resolve `path`, treating an explicit `null` the same as a missing node.
pub fn get_present<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    get(value, path).filter(|v| !v.is_null())
}
