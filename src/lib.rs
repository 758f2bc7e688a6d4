//! Mutable URI builder with matrix parameters and `{name}` templates.
//!
//! A [`UriBuilder`] collects scheme, user-info, host, port, path segments,
//! query and fragment through fluent setters. Every value is percent-encoded
//! (or, with encoding disabled, validated) when it comes in, so the builder
//! only ever holds legal URI text plus `{name}` placeholders. The `build*`
//! methods resolve the placeholders and parse the result into a [`Uri`].
//!
//! # Quick Start
//!
//! ```rust
//! use uri_builder::UriBuilder;
//!
//! let mut builder = UriBuilder::new();
//! builder
//!     .scheme("http")?
//!     .host("localhost")?
//!     .port(8080)
//!     .path(["shop", "{category}"])?
//!     .matrix_param("color", "dark red")?
//!     .query_param("page", "{page}")?;
//!
//! // Placeholders stay visible until build time
//! assert_eq!(
//!     builder.to_string(),
//!     "http://localhost:8080/shop/{category};color=dark%20red?page={page}"
//! );
//!
//! let uri = builder.build_from_values(&["hats", "2"])?;
//! assert_eq!(uri.as_str(), "http://localhost:8080/shop/hats;color=dark%20red?page=2");
//! assert_eq!(uri.port(), Some(8080));
//! # Ok::<(), uri_builder::UriBuilderError>(())
//! ```
//!
//! # Resolving Placeholders
//!
//! | Method | Resolver | Fails when |
//! |--------|----------|------------|
//! | [`UriBuilder::build`] | [`RejectAll`] | any placeholder is left |
//! | [`UriBuilder::build_from_map`] | [`MapResolver`] | a name is missing from the map |
//! | [`UriBuilder::build_from_values`] | [`PositionalResolver`] | the values run out |
//! | [`UriBuilder::build_with`] | any [`VariableResolver`] | the resolver fails |
//!
//! Resolved values are inserted verbatim; they must already be encoded.
//!
//! # Encoding
//!
//! With encoding enabled (the default), characters outside a component's
//! legal set are percent-encoded and `%` is always escaped. With encoding
//! disabled, the same characters are rejected with
//! [`UriBuilderError::InvalidArgument`] and existing `%XX` escapes are kept.
//! The scheme is always validated, never encoded.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod builder;
mod constants;
mod encoding;
mod error;
mod path_segment;
pub mod prelude;
mod query;
mod resolver;
mod resource;
mod template;
mod uri;

pub use builder::UriBuilder;
pub use constants::{
    ESCAPED_CLOSE, ESCAPED_OPEN, PORT_UNSET, SUB_DELIMS, TEMPLATE_CLOSE, TEMPLATE_OPEN,
    UNRESERVED_MARKS,
};
pub use encoding::{
    Component, check_scheme, encode_component, encode_literal, encode_or_validate,
    is_valid_scheme, percent_decode, validate,
};
pub use error::{
    ArgumentError, ComponentError, ComponentErrorKind, ParseError, ParseErrorKind,
    PathTemplateError, TemplateError, UriBuilderError,
};
pub use path_segment::{MatrixParam, PathSegment, SegmentOptions};
pub use resolver::{MapResolver, PositionalResolver, RejectAll, VariableResolver};
pub use resource::{ResourceClass, ResourceMethod, StaticMethod, StaticResource};
pub use template::{Template, Token};
pub use uri::Uri;
