//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use uri_builder::prelude::*;
//!
//! let mut builder = UriBuilder::new();
//! builder.path(["a", "{b}"]).unwrap();
//! let uri: Uri = builder.build_from_values(&["c"]).unwrap();
//! assert_eq!(uri.as_str(), "a/c");
//! ```
//!
//! Encoding helpers and constants are left out; import them from the crate
//! root.

pub use crate::{
    // Core types
    MatrixParam, PathSegment, Template, Uri, UriBuilder,
    // Resolvers
    MapResolver, PositionalResolver, RejectAll, VariableResolver,
    // Resources
    ResourceClass, ResourceMethod, StaticMethod, StaticResource,
    // Errors
    ParseError, TemplateError, UriBuilderError,
};
