//! Error types for URI building, template resolution and URI parsing.

use thiserror::Error;

use crate::encoding::Component;

/// Errors returned by [`UriBuilder`](crate::UriBuilder) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriBuilderError {
    /// A setter received malformed input; the builder was left unchanged.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// The operation needs state the builder does not have yet.
    #[error("cannot {operation}: {reason}")]
    IllegalState {
        /// The operation that was attempted
        operation: &'static str,
        /// What is missing
        reason: &'static str,
    },

    /// A component that needs an authority host was set without a host.
    #[error("a host must be set when a {component} is set")]
    MissingHost {
        /// The component that requires the host (`port` or `user-info`)
        component: &'static str,
    },

    /// A template placeholder could not be resolved.
    #[error("template resolution failed: {0}")]
    TemplateResolution(#[from] TemplateError),

    /// The fully resolved string is not a valid URI reference.
    #[error("could not build a URI: {0}")]
    UriSyntax(#[from] ParseError),
}

impl From<ComponentError> for UriBuilderError {
    fn from(e: ComponentError) -> Self {
        Self::InvalidArgument(ArgumentError::Component(e))
    }
}

impl From<PathTemplateError> for UriBuilderError {
    fn from(e: PathTemplateError) -> Self {
        Self::InvalidArgument(ArgumentError::PathTemplate(e))
    }
}

/// Causes of [`UriBuilderError::InvalidArgument`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// A component value is illegal for its component.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The path-template lookup for a resource failed.
    #[error(transparent)]
    PathTemplate(#[from] PathTemplateError),

    /// A port could not be read as an integer.
    #[error("invalid port '{value}'; expected decimal digits")]
    InvalidPort {
        /// The offending port text
        value: String,
    },
}

/// A value is not legal for the URI component it was given for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {component} '{value}': {kind}")]
pub struct ComponentError {
    /// The component the value was meant for
    pub component: Component,
    /// The rejected value
    pub value: String,
    /// What is wrong with it
    pub kind: ComponentErrorKind,
}

/// Specific component validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentErrorKind {
    /// The component may not be empty
    #[error("value cannot be empty")]
    Empty,
    /// A character outside the legal set, with encoding disabled
    #[error(
        "invalid character '{char}' at position {position}; enable encoding or percent-encode it"
    )]
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position in the input (in characters)
        position: usize,
    },
    /// A `%` not followed by two hex digits, with encoding disabled
    #[error("invalid percent encoding at position {position}")]
    InvalidPercentEncoding {
        /// Position of the `%` (in characters)
        position: usize,
    },
    /// A scheme must start with an ASCII letter
    #[error("scheme must start with a letter, found '{found}'")]
    InvalidSchemeStart {
        /// The character found
        found: char,
    },
}

/// Failures reported by the path-template collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathTemplateError {
    /// The resource carries no path template at all
    #[error("resource '{resource}' has no path template")]
    NotAnnotated {
        /// The resource name
        resource: String,
    },
    /// The resource or method carries a template that is not a valid path
    #[error("illegal path template '{path}' on '{resource}': {reason}")]
    IllegalPath {
        /// The resource or method name
        resource: String,
        /// The rejected template
        path: String,
        /// Reason for invalidity
        reason: String,
    },
    /// No method with the name carries a path template
    #[error("resource '{resource}' has no method '{method}' with a path template")]
    NoMatchingMethod {
        /// The resource name
        resource: String,
        /// The requested method name
        method: String,
    },
    /// More than one method with the name carries a different path template
    #[error("resource '{resource}' has more than one method '{method}' with a path template")]
    AmbiguousMethod {
        /// The resource name
        resource: String,
        /// The requested method name
        method: String,
    },
}

/// Failures of a [`VariableResolver`](crate::VariableResolver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder was found where none are allowed
    #[error("the builder must not contain template variables, found '{{{name}}}'")]
    VariablesNotAllowed {
        /// The placeholder name
        name: String,
    },
    /// The value map has no entry for a placeholder
    #[error("no value supplied for template variable '{name}'")]
    MissingValue {
        /// The placeholder name
        name: String,
    },
    /// The positional values ran out
    #[error("not enough values: {supplied} supplied, none left for template variable '{name}'")]
    NotEnoughValues {
        /// The placeholder name that needed a new value
        name: String,
        /// Number of values supplied
        supplied: usize,
    },
}

/// A string failed to parse as a URI reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse URI '{input}': {kind}")]
pub struct ParseError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

/// Specific URI parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Invalid character in a component
    #[error("invalid character '{char}' in {component} at position {position}")]
    InvalidChar {
        /// The component being parsed
        component: Component,
        /// The unexpected character
        char: char,
        /// Position in the input (in bytes)
        position: usize,
    },
    /// A `%` not followed by two hex digits
    #[error("invalid percent encoding in {component} at position {position}")]
    InvalidPercentEncoding {
        /// The component being parsed
        component: Component,
        /// Position in the input (in bytes)
        position: usize,
    },
    /// Port is not a decimal number in range
    #[error("invalid port '{value}'")]
    InvalidPort {
        /// The port text
        value: String,
    },
    /// A relative path whose first segment contains a colon
    #[error("first segment of a relative path cannot contain ':'")]
    ColonInFirstSegment,
    /// A path without an authority that begins with `//`
    #[error("a path without an authority cannot begin with \"//\"")]
    DoubleSlashPath,
}
