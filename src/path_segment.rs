//! Path segments and their matrix parameters.

use std::convert::Infallible;
use std::fmt;

use crate::encoding::{Component, encode_or_validate, percent_decode};
use crate::error::ComponentError;
use crate::template::push_text;

/// A `;name=value` parameter attached to one path segment.
///
/// Name and value are stored in their encoded form. A parameter without a
/// value renders as `;name`; one with an empty value renders as `;name=`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixParam {
    name: String,
    value: Option<String>,
}

impl MatrixParam {
    /// Creates a parameter from already-encoded parts.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Creates a bare `;name` parameter from an already-encoded name.
    #[must_use]
    pub fn without_value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter value, or `None` for a bare `;name`.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Parses `;`-joined `name=value` pairs. A leading `;` and empty pairs
    /// are ignored; a pair without `=` has no value.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError`] if a name or value is illegal and neither
    /// encoding nor decoding is requested.
    pub fn parse_list(text: &str, options: SegmentOptions) -> Result<Vec<Self>, ComponentError> {
        split_params(text, |part, component| {
            convert(part, component, options.decode_matrix, options.encode)
        })
    }

    fn render(&self, out: &mut String, convert_braces: bool) {
        out.push(';');
        push_text(out, &self.name, convert_braces);
        if let Some(value) = &self.value {
            out.push('=');
            push_text(out, value, convert_braces);
        }
    }
}

/// How raw segment text is turned into a [`PathSegment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Percent-encode illegal characters instead of rejecting them.
    pub encode: bool,
    /// Percent-decode the segment text.
    pub decode_path: bool,
    /// Percent-decode matrix parameter names and values.
    pub decode_matrix: bool,
}

impl SegmentOptions {
    /// Options used by the builder: no decoding, encoding as given.
    #[must_use]
    pub const fn encoding(encode: bool) -> Self {
        Self {
            encode,
            decode_path: false,
            decode_matrix: false,
        }
    }

    /// Options that decode both the segment text and its matrix parameters.
    #[must_use]
    pub const fn decoded() -> Self {
        Self {
            encode: false,
            decode_path: true,
            decode_matrix: true,
        }
    }
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self::encoding(true)
    }
}

/// One element of a URI path plus its ordered matrix parameters.
///
/// Duplicate parameter names are kept in insertion order.
///
/// # Examples
///
/// ```
/// use uri_builder::{PathSegment, SegmentOptions};
///
/// let seg = PathSegment::parse("cars;color=red;year=2008", SegmentOptions::default()).unwrap();
/// assert_eq!(seg.text(), "cars");
/// assert_eq!(seg.matrix_params().len(), 2);
/// assert_eq!(seg.to_string(), "cars;color=red;year=2008");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathSegment {
    text: String,
    matrix_params: Vec<MatrixParam>,
}

impl PathSegment {
    /// Creates a segment from already-encoded text with no matrix parameters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            matrix_params: Vec::new(),
        }
    }

    /// Parses one segment, splitting off any `;name=value` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError`] if encoding is disabled, the matching
    /// decode flag is off, and the text or a matrix parameter is illegal.
    pub fn parse(raw: &str, options: SegmentOptions) -> Result<Self, ComponentError> {
        let (text, matrix) = raw.split_once(';').unwrap_or((raw, ""));
        Ok(Self {
            text: convert(text, Component::PathSegment, options.decode_path, options.encode)?,
            matrix_params: MatrixParam::parse_list(matrix, options)?,
        })
    }

    /// Percent-decodes one raw segment and its matrix parameters.
    ///
    /// Unlike [`parse`](Self::parse) this cannot fail: malformed escapes are
    /// kept as they are.
    pub(crate) fn decode(raw: &str) -> Self {
        let (text, matrix) = raw.split_once(';').unwrap_or((raw, ""));
        let Ok(matrix_params) =
            split_params(matrix, |part, _| -> Result<String, Infallible> {
                Ok(percent_decode(part).into_owned())
            });
        Self {
            text: percent_decode(text).into_owned(),
            matrix_params,
        }
    }

    /// Returns the segment text without matrix parameters.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the matrix parameters in insertion order.
    #[must_use]
    pub fn matrix_params(&self) -> &[MatrixParam] {
        &self.matrix_params
    }

    /// Appends a matrix parameter.
    pub fn add_matrix_param(&mut self, param: MatrixParam) {
        self.matrix_params.push(param);
    }

    /// Replaces all matrix parameters.
    pub fn set_matrix_params(&mut self, params: Vec<MatrixParam>) {
        self.matrix_params = params;
    }

    /// Removes all matrix parameters.
    pub fn clear_matrix_params(&mut self) {
        self.matrix_params.clear();
    }

    /// Writes the segment text followed by its matrix parameters.
    ///
    /// With `convert_braces`, braces that do not form a placeholder are
    /// written as `%7B`/`%7D`.
    pub(crate) fn render(&self, out: &mut String, convert_braces: bool) {
        push_text(out, &self.text, convert_braces);
        for param in &self.matrix_params {
            param.render(out, convert_braces);
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, false);
        f.write_str(&out)
    }
}

fn split_params<E>(
    text: &str,
    mut part: impl FnMut(&str, Component) -> Result<String, E>,
) -> Result<Vec<MatrixParam>, E> {
    text.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<MatrixParam, E> {
            Ok(match pair.split_once('=') {
                Some((name, value)) => MatrixParam::new(
                    part(name, Component::MatrixName)?,
                    part(value, Component::MatrixValue)?,
                ),
                None => MatrixParam::without_value(part(pair, Component::MatrixName)?),
            })
        })
        .collect()
}

fn convert(
    part: &str,
    component: Component,
    decode: bool,
    encode: bool,
) -> Result<String, ComponentError> {
    if decode {
        Ok(percent_decode(part).into_owned())
    } else {
        encode_or_validate(part, component, encode)
    }
}
