//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse route patterns ("/login", "/auth/google/callback", "/:pathMatch(.*)*")
//! - Match request paths segment by segment
//! - Capture named params and the trailing wildcard
//!
//! # Design Decisions
//! - Static segments compare case-insensitively
//! - Empty segments are skipped, so a trailing slash still matches
//! - Query string and fragment never take part in matching
//! - No regex: the only accepted capture body is `(.*)`

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Values captured by a pattern, keyed by param name.
pub type Params = BTreeMap<String, String>;

/// Error type for pattern parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    MissingLeadingSlash,
    #[error("param name missing in segment '{0}'")]
    EmptyParamName(String),
    #[error("unsupported segment syntax '{0}'")]
    Unsupported(String),
    #[error("wildcard segment '{0}' must be the last segment")]
    WildcardNotLast(String),
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal segment.
    Static(String),
    /// `:name` captures exactly one segment.
    Param(String),
    /// `:name(.*)*` captures the remaining path; `allow_empty` is false for
    /// the one-or-more form.
    Wildcard { name: String, allow_empty: bool },
}

/// A compiled route path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern as written in a route declaration.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash);
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = parse_segment(part)?;
            if matches!(segment, Segment::Wildcard { .. }) && i + 1 != parts.len() {
                return Err(PatternError::WildcardNotLast(part.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern ends in a wildcard capture.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard { .. }))
    }

    /// Match a request path. Returns the captured params on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts = split_path(path);
        let mut params = Params::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    let part = parts.get(i)?;
                    if !part.eq_ignore_ascii_case(expected) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(i)?;
                    params.insert(name.clone(), part.to_string());
                }
                Segment::Wildcard { name, allow_empty } => {
                    let rest = parts.get(i..).unwrap_or_default();
                    if rest.is_empty() && !allow_empty {
                        return None;
                    }
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a request path into its non-empty segments, dropping any query
/// string or fragment.
pub fn split_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

fn parse_segment(part: &str) -> Result<Segment, PatternError> {
    let Some(body) = part.strip_prefix(':') else {
        if part.contains(['(', ')', '*', ':']) {
            return Err(PatternError::Unsupported(part.to_string()));
        }
        return Ok(Segment::Static(part.to_string()));
    };

    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    let (name, modifier) = body.split_at(name_len);
    if name.is_empty() {
        return Err(PatternError::EmptyParamName(part.to_string()));
    }

    match modifier {
        "" => Ok(Segment::Param(name.to_string())),
        "(.*)*" => Ok(Segment::Wildcard {
            name: name.to_string(),
            allow_empty: true,
        }),
        "(.*)" | "(.*)+" => Ok(Segment::Wildcard {
            name: name.to_string(),
            allow_empty: false,
        }),
        _ => Err(PatternError::Unsupported(part.to_string())),
    }
}
