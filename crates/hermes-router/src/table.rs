//! The route table: exact-match map plus an ordered pattern list.
//!
//! Resolution order is the load-bearing invariant here: an exact match
//! always wins over any pattern, even one registered earlier that would
//! also match; among patterns, first-registered wins.

use crate::params::Params;
use crate::pattern::{PathPattern, PatternError};
use http::Method;
use std::collections::HashMap;

/// A successful route resolution.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched route.
    pub value: &'a T,
    /// Captured path variables (empty for exact matches).
    pub params: Params,
}

/// Stores routes and resolves `(method, path)` to a registered value.
///
/// `T` is whatever the caller routes to; Hermes stores a handler plus its
/// route-scoped middleware list. The table must be treated as read-only
/// once the service starts taking requests.
///
/// # Example
///
/// ```
/// use hermes_router::RouteTable;
/// use http::Method;
///
/// let mut table = RouteTable::new();
/// table.insert(Method::GET, "/items/{id}", "getItem").unwrap();
///
/// let matched = table.resolve(&Method::GET, "/items/42").unwrap();
/// assert_eq!(*matched.value, "getItem");
/// assert_eq!(matched.params.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    /// Literal routes, keyed by method and normalized path.
    exact: HashMap<(Method, String), T>,
    /// Pattern routes in registration order.
    patterns: Vec<(Method, PathPattern, T)>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: Vec::new(),
        }
    }

    /// Registers a route.
    ///
    /// Literal templates land in the exact-match table; templates with
    /// `{name}` segments are appended to the pattern list. Re-registering
    /// the same literal route replaces the previous value.
    pub fn insert(
        &mut self,
        method: Method,
        template: &str,
        value: T,
    ) -> Result<(), PatternError> {
        let pattern = PathPattern::parse(template)?;
        if pattern.is_static() {
            self.exact
                .insert((method, normalize(template).to_string()), value);
        } else {
            self.patterns.push((method, pattern, value));
        }
        Ok(())
    }

    /// Resolves a request to a registered route.
    ///
    /// Checks the exact table first, then scans the pattern list in
    /// registration order and returns the first structural match.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let key = (method.clone(), normalize(path).to_string());
        if let Some(value) = self.exact.get(&key) {
            return Some(RouteMatch {
                value,
                params: Params::new(),
            });
        }

        self.patterns
            .iter()
            .filter(|(m, _, _)| m == method)
            .find_map(|(_, pattern, value)| {
                pattern
                    .match_path(path)
                    .map(|params| RouteMatch { value, params })
            })
    }

    /// Returns the total number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}

/// Trims trailing slashes so `/items/` and `/items` key identically. The
/// root path stays as-is.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/items", "listItems").unwrap();

        let matched = table.resolve(&Method::GET, "/items").unwrap();
        assert_eq!(*matched.value, "listItems");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_method_mismatch_is_miss() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/items", "listItems").unwrap();
        table.insert(Method::GET, "/items/{id}", "getItem").unwrap();

        assert!(table.resolve(&Method::POST, "/items").is_none());
        assert!(table.resolve(&Method::POST, "/items/1").is_none());
    }

    #[test]
    fn test_pattern_match_captures() {
        let mut table = RouteTable::new();
        table
            .insert(Method::POST, "/items/{id}/update", "updateItem")
            .unwrap();

        let matched = table.resolve(&Method::POST, "/items/42/update").unwrap();
        assert_eq!(*matched.value, "updateItem");
        assert_eq!(matched.params.get("id"), Some("42"));
    }

    #[test]
    fn test_unmatched_path_is_miss() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/items/{id}", "getItem").unwrap();

        assert!(table.resolve(&Method::GET, "/orders/1").is_none());
    }

    #[test]
    fn test_exact_beats_pattern_regardless_of_order() {
        // Pattern registered first; the exact route must still win.
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/items/{id}", "getItem").unwrap();
        table.insert(Method::GET, "/items/special", "getSpecial").unwrap();

        let matched = table.resolve(&Method::GET, "/items/special").unwrap();
        assert_eq!(*matched.value, "getSpecial");

        let matched = table.resolve(&Method::GET, "/items/42").unwrap();
        assert_eq!(*matched.value, "getItem");
    }

    #[test]
    fn test_first_registered_pattern_wins() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/x/{a}", "first").unwrap();
        table.insert(Method::GET, "/x/{b}", "second").unwrap();

        let matched = table.resolve(&Method::GET, "/x/1").unwrap();
        assert_eq!(*matched.value, "first");
    }

    #[test]
    fn test_trailing_slash_resolves() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/items", "listItems").unwrap();

        assert!(table.resolve(&Method::GET, "/items/").is_some());
    }

    #[test]
    fn test_root_path() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/", "root").unwrap();

        let matched = table.resolve(&Method::GET, "/").unwrap();
        assert_eq!(*matched.value, "root");
    }

    #[test]
    fn test_reregistration_replaces_exact_route() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, "/items", "old").unwrap();
        table.insert(Method::GET, "/items", "new").unwrap();

        assert_eq!(*table.resolve(&Method::GET, "/items").unwrap().value, "new");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_len_counts_both_kinds() {
        let mut table = RouteTable::new();
        assert!(table.is_empty());

        table.insert(Method::GET, "/a", 1).unwrap();
        table.insert(Method::GET, "/b/{id}", 2).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_bad_template_is_rejected() {
        let mut table: RouteTable<&str> = RouteTable::new();
        assert!(table.insert(Method::GET, "/items/{", "broken").is_err());
        assert!(table.is_empty());
    }
}
