//! Path pattern compilation.
//!
//! # Responsibilities
//! - Split a pattern such as `/hello/:p1/goblin/:p2` into segments
//! - Reject malformed patterns at registration time
//! - Match a split request path against the compiled segments
//!
//! # Design Decisions
//! - Only literal and named (`:name`) segments, no regex, no wildcard tail
//! - Literals compare byte-for-byte (case-sensitive)
//! - Segment counts must be equal for a match

use std::collections::HashSet;
use thiserror::Error;

use crate::routing::matcher::Params;

/// Marker that opens a named parameter segment.
pub const PARAM_MARKER: char = ':';

/// Reasons a pattern cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("pattern must start with '/'")]
    MissingLeadingSlash,
    #[error("parameter at segment {position} has no name")]
    EmptyParamName { position: usize },
    #[error("parameter `{0}` is declared more than once")]
    DuplicateParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    /// Whether the pattern itself is written with a trailing `/`.
    trailing_slash: bool,
}

impl Pattern {
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if !raw.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash);
        }

        let (parts, trailing_slash) = split_path(raw);
        let mut seen = HashSet::new();
        let mut segments = Vec::with_capacity(parts.len());

        for (position, part) in parts.into_iter().enumerate() {
            match part.strip_prefix(PARAM_MARKER) {
                Some("") => return Err(PatternError::EmptyParamName { position }),
                Some(name) => {
                    if !seen.insert(name) {
                        return Err(PatternError::DuplicateParam(name.to_string()));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            trailing_slash,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Names of the parameters in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Compare already-split request segments with this pattern.
    ///
    /// Returns the positional parameter values when every literal matches.
    /// Parameters never bind an empty segment.
    pub(crate) fn capture(&self, parts: &[&str]) -> Option<Params> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit.as_str() == *part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => params.insert(name.clone(), (*part).to_string()),
            }
        }
        Some(params)
    }
}

/// Split a path into segments, reporting whether it ended with `/`.
///
/// The root path `/` has no segments and no trailing slash.
pub(crate) fn split_path(path: &str) -> (Vec<&str>, bool) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (Vec::new(), false);
    }

    let (body, trailing) = match trimmed.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };
    if body.is_empty() {
        // "//" style paths: one empty segment followed by the trailing slash.
        return (vec![""], trailing);
    }
    (body.split('/').collect(), trailing)
}
