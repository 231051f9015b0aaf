//! Route storage and resolution for Hermes.
//!
//! Routes come in two forms: literal paths, kept in an exact-match table
//! keyed by `(method, path)`, and templates with `{name}` capture segments,
//! kept in an ordered list scanned in registration order. Exact matches
//! always take precedence; among patterns, the first registered match wins.
//!
//! # Example
//!
//! ```
//! use hermes_router::RouteTable;
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.insert(Method::GET, "/items", "listItems").unwrap();
//! table.insert(Method::GET, "/items/{id}", "getItem").unwrap();
//!
//! let matched = table.resolve(&Method::GET, "/items/42").unwrap();
//! assert_eq!(*matched.value, "getItem");
//! assert_eq!(matched.params.get("id"), Some("42"));
//! ```

mod params;
mod pattern;
mod table;

pub use params::Params;
pub use pattern::{PathPattern, PatternError};
pub use table::{RouteMatch, RouteTable};
