//! Route pattern module
//!
//! Implements path matching for registered routes. A pattern is either an
//! exact path or a segmented form where `:name` segments capture the
//! corresponding path segment.

use std::collections::HashMap;

/// One segment of a parameterized pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matched byte-for-byte
    Literal(String),
    /// Matches any single segment, capturing it under the given name
    Param(String),
}

/// A registered path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Literal path, matched byte-for-byte (trailing slashes significant)
    Exact(String),
    /// Segment-wise pattern containing at least one `:name` parameter
    Segments(Vec<PatternSegment>),
}

impl RoutePattern {
    /// Parse a pattern string. `"/users"` is an exact pattern;
    /// `"/users/:id"` is segmented with one captured parameter.
    pub fn parse(pattern: &str) -> Self {
        if !pattern.contains(':') {
            return Self::Exact(pattern.to_string());
        }

        let segments = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => PatternSegment::Param(name.to_string()),
                None => PatternSegment::Literal(segment.to_string()),
            })
            .collect();
        Self::Segments(segments)
    }

    /// Match a request path, returning captured parameters on success.
    /// Exact patterns return an empty capture map.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        match self {
            Self::Exact(exact) => (path == exact).then(HashMap::new),
            Self::Segments(segments) => {
                let parts: Vec<&str> = path.split('/').collect();
                if parts.len() != segments.len() {
                    return None;
                }

                let mut params = HashMap::new();
                for (segment, part) in segments.iter().zip(&parts) {
                    match segment {
                        PatternSegment::Literal(literal) => {
                            if literal != part {
                                return None;
                            }
                        }
                        PatternSegment::Param(name) => {
                            params.insert(name.clone(), (*part).to_string());
                        }
                    }
                }
                Some(params)
            }
        }
    }
}
