//! Path template compilation and matching.
//!
//! Templates are compiled once at registration into typed segments; request
//! paths are matched segment-wise with no per-call parsing of the template.

use crate::params::Params;
use thiserror::Error;

/// Errors from compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `{` without a matching `}` (or the reverse) in a segment.
    #[error("unbalanced braces in segment '{0}'")]
    UnbalancedBraces(String),
    /// A capture segment with no name, i.e. `{}`.
    #[error("empty capture name in template '{0}'")]
    EmptyCaptureName(String),
    /// The same capture name used twice in one template.
    #[error("duplicate capture name '{0}'")]
    DuplicateCaptureName(String),
}

/// One compiled template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Matches any single non-empty segment, capturing it under the name.
    Capture(String),
}

/// A compiled path template.
///
/// Literal templates compile to a static pattern; templates containing
/// `{name}` segments capture those segments by name.
///
/// # Example
///
/// ```
/// use hermes_router::PathPattern;
///
/// let pattern = PathPattern::parse("/items/{id}/update").unwrap();
/// let params = pattern.match_path("/items/42/update").unwrap();
/// assert_eq!(params.get("id"), Some("42"));
/// assert!(pattern.match_path("/items/42").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    is_static: bool,
}

impl PathPattern {
    /// Compiles a path template.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for raw in template.split('/').filter(|s| !s.is_empty()) {
            if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if inner.is_empty() {
                    return Err(PatternError::EmptyCaptureName(template.to_string()));
                }
                if names.contains(&inner) {
                    return Err(PatternError::DuplicateCaptureName(inner.to_string()));
                }
                names.push(inner);
                segments.push(Segment::Capture(inner.to_string()));
            } else if raw.contains('{') || raw.contains('}') {
                return Err(PatternError::UnbalancedBraces(raw.to_string()));
            } else {
                segments.push(Segment::Literal(raw.to_string()));
            }
        }

        let is_static = names.is_empty();
        Ok(Self {
            template: template.to_string(),
            segments,
            is_static,
        })
    }

    /// Returns the original template string.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns `true` if the template has no capture segments.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Matches a request path against this pattern.
    ///
    /// Empty segments are filtered on both sides, so trailing slashes are
    /// normalized away. Returns the captured variables on a structural
    /// match, `None` otherwise.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let mut params = Params::new();
        let mut segments = self.segments.iter();

        for part in path.split('/').filter(|s| !s.is_empty()) {
            match segments.next()? {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Capture(name) => params.push(name.clone(), part),
            }
        }

        // All request segments consumed; the template must be exhausted too.
        if segments.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template_is_static() {
        let pattern = PathPattern::parse("/items").unwrap();
        assert!(pattern.is_static());
        assert!(pattern.match_path("/items").is_some());
        assert!(pattern.match_path("/items/1").is_none());
    }

    #[test]
    fn test_capture_segment() {
        let pattern = PathPattern::parse("/items/{id}").unwrap();
        assert!(!pattern.is_static());

        let params = pattern.match_path("/items/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_capture_between_literals() {
        let pattern = PathPattern::parse("/items/{id}/update").unwrap();

        let params = pattern.match_path("/items/42/update").unwrap();
        assert_eq!(params.get("id"), Some("42"));

        assert!(pattern.match_path("/items/42/delete").is_none());
        assert!(pattern.match_path("/items/42").is_none());
        assert!(pattern.match_path("/items/42/update/extra").is_none());
    }

    #[test]
    fn test_multiple_captures() {
        let pattern = PathPattern::parse("/users/{user_id}/posts/{post_id}").unwrap();
        let params = pattern.match_path("/users/7/posts/99").unwrap();
        assert_eq!(params.get("user_id"), Some("7"));
        assert_eq!(params.get("post_id"), Some("99"));
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let pattern = PathPattern::parse("/items/{id}").unwrap();
        assert!(pattern.match_path("/items/42/").is_some());
    }

    #[test]
    fn test_capture_does_not_span_segments() {
        let pattern = PathPattern::parse("/files/{name}").unwrap();
        assert!(pattern.match_path("/files/a/b").is_none());
    }

    #[test]
    fn test_empty_capture_name_rejected() {
        assert_eq!(
            PathPattern::parse("/items/{}"),
            Err(PatternError::EmptyCaptureName("/items/{}".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        assert!(matches!(
            PathPattern::parse("/items/{id"),
            Err(PatternError::UnbalancedBraces(_))
        ));
    }

    #[test]
    fn test_duplicate_capture_rejected() {
        assert_eq!(
            PathPattern::parse("/pair/{id}/{id}"),
            Err(PatternError::DuplicateCaptureName("id".to_string()))
        );
    }
}
