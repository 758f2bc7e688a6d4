//! Per-component percent-encoding and validation.
//!
//! Every value that enters a [`UriBuilder`](crate::UriBuilder) passes through
//! [`encode_or_validate`]. With encoding enabled, characters outside the
//! component's legal set are percent-encoded; with encoding disabled they are
//! rejected. Template braces are legal in every component except the scheme
//! and are never encoded, so placeholders survive until build time.

use std::borrow::Cow;
use std::fmt;

use crate::constants::{
    ESCAPED_CLOSE, ESCAPED_OPEN, SUB_DELIMS, TEMPLATE_CLOSE, TEMPLATE_OPEN, UNRESERVED_MARKS,
};
use crate::error::{ComponentError, ComponentErrorKind};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// The kind of URI component a value is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// `scheme`
    Scheme,
    /// `userinfo` (before `@`)
    UserInfo,
    /// `host` as a registered name
    Host,
    /// A single path segment without matrix parameters
    PathSegment,
    /// Name of a `;name=value` matrix parameter
    MatrixName,
    /// Value of a `;name=value` matrix parameter
    MatrixValue,
    /// Name of a `name=value` query parameter
    QueryName,
    /// Value of a `name=value` query parameter
    QueryValue,
    /// A whole query string
    Query,
    /// A whole path
    Path,
    /// `fragment` (after `#`)
    Fragment,
}

impl Component {
    /// Returns true if the ASCII byte may appear unencoded in this component.
    ///
    /// Template braces and `%` are handled by the callers, not here.
    #[must_use]
    pub fn allows(self, b: u8) -> bool {
        if self == Self::Scheme {
            return b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.');
        }
        if b.is_ascii_alphanumeric() || is_in(b, UNRESERVED_MARKS) {
            return true;
        }
        let sub_delim = is_in(b, SUB_DELIMS);
        let pchar = sub_delim || matches!(b, b':' | b'@');
        let query_char = pchar || matches!(b, b'/' | b'?');
        match self {
            Self::Scheme => false,
            Self::Host => sub_delim,
            Self::UserInfo => sub_delim || b == b':',
            Self::PathSegment | Self::MatrixValue => pchar && b != b';',
            Self::MatrixName => pchar && b != b';' && b != b'=',
            Self::QueryName => query_char && b != b'&' && b != b'=',
            Self::QueryValue => query_char && b != b'&',
            Self::Query | Self::Fragment => query_char,
            Self::Path => pchar || b == b'/',
        }
    }

    /// Returns true if `c` is ASCII and may appear unencoded.
    #[must_use]
    pub fn allows_char(self, c: char) -> bool {
        u8::try_from(c).is_ok_and(|b| b.is_ascii() && self.allows(b))
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Scheme => "scheme",
            Self::UserInfo => "user-info",
            Self::Host => "host",
            Self::PathSegment => "path segment",
            Self::MatrixName => "matrix parameter name",
            Self::MatrixValue => "matrix parameter value",
            Self::QueryName => "query parameter name",
            Self::QueryValue => "query parameter value",
            Self::Query => "query",
            Self::Path => "path",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_in(b: u8, set: &str) -> bool {
    set.as_bytes().contains(&b)
}

const fn is_template_char(c: char) -> bool {
    c == TEMPLATE_OPEN || c == TEMPLATE_CLOSE
}

/// Encodes `value` for `component` when `encode` is true, otherwise checks
/// that it is already legal and returns it unchanged.
///
/// # Errors
///
/// Returns [`ComponentError`] if `encode` is false and `value` contains a
/// character that is illegal for `component` or a malformed `%` escape.
/// Scheme values are always validated; see [`check_scheme`].
pub fn encode_or_validate(
    value: &str,
    component: Component,
    encode: bool,
) -> Result<String, ComponentError> {
    if component == Component::Scheme {
        check_scheme(value)?;
        return Ok(value.to_string());
    }
    if encode {
        Ok(encode_component(value, component))
    } else {
        validate(value, component)?;
        Ok(value.to_string())
    }
}

/// Percent-encodes every character of `value` outside the legal set of
/// `component`, leaving template braces untouched.
///
/// A `%` is always encoded, so already-encoded input is encoded again.
#[must_use]
pub fn encode_component(value: &str, component: Component) -> String {
    encode_with(value, component, true)
}

/// Percent-encodes `value` for `component`, encoding template braces too.
///
/// Use this for text that must never be read as a placeholder.
#[must_use]
pub fn encode_literal(value: &str, component: Component) -> String {
    encode_with(value, component, false)
}

/// Replaces template braces with their percent-escapes.
pub(crate) fn escape_braces(value: &str) -> String {
    value
        .replace(TEMPLATE_OPEN, ESCAPED_OPEN)
        .replace(TEMPLATE_CLOSE, ESCAPED_CLOSE)
}

fn encode_with(value: &str, component: Component, keep_braces: bool) -> String {
    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if (keep_braces && is_template_char(c)) || component.allows_char(c) {
            out.push(c);
            continue;
        }
        for &b in c.encode_utf8(&mut buf).as_bytes() {
            out.push('%');
            out.push(char::from(HEX_UPPER[usize::from(b >> 4)]));
            out.push(char::from(HEX_UPPER[usize::from(b & 0x0f)]));
        }
    }
    out
}

/// Checks that `value` only contains characters legal for `component`,
/// well-formed `%XX` escapes, or template braces.
///
/// # Errors
///
/// Returns [`ComponentError`] naming the first offending character.
pub fn validate(value: &str, component: Component) -> Result<(), ComponentError> {
    let chars: Vec<char> = value.chars().collect();
    for (position, &c) in chars.iter().enumerate() {
        if c == '%' {
            let hex_at = |i: usize| chars.get(i).is_some_and(char::is_ascii_hexdigit);
            if !(hex_at(position + 1) && hex_at(position + 2)) {
                return Err(ComponentError {
                    component,
                    value: value.to_string(),
                    kind: ComponentErrorKind::InvalidPercentEncoding { position },
                });
            }
            continue;
        }
        let legal = (is_template_char(c) && component != Component::Scheme)
            || component.allows_char(c);
        if !legal {
            return Err(ComponentError {
                component,
                value: value.to_string(),
                kind: ComponentErrorKind::InvalidChar { char: c, position },
            });
        }
    }
    Ok(())
}

/// Returns true if `scheme` matches `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
#[must_use]
pub fn is_valid_scheme(scheme: &str) -> bool {
    check_scheme(scheme).is_ok()
}

/// Validates scheme syntax.
///
/// # Errors
///
/// Returns [`ComponentError`] if `scheme` is empty, does not start with an
/// ASCII letter, or contains a character other than letters, digits, `+`,
/// `-` and `.`.
pub fn check_scheme(scheme: &str) -> Result<(), ComponentError> {
    let error = |kind| ComponentError {
        component: Component::Scheme,
        value: scheme.to_string(),
        kind,
    };
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err(error(ComponentErrorKind::Empty)),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(error(ComponentErrorKind::InvalidSchemeStart { found: c }));
        }
        Some(_) => {}
    }
    for (i, c) in chars.enumerate() {
        if !Component::Scheme.allows_char(c) {
            return Err(error(ComponentErrorKind::InvalidChar {
                char: c,
                position: i + 1,
            }));
        }
    }
    Ok(())
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%XX` escapes. Malformed escapes are kept as they are and
/// invalid UTF-8 is replaced with U+FFFD.
#[must_use]
pub fn percent_decode(value: &str) -> Cow<'_, str> {
    if !value.contains('%') {
        return Cow::Borrowed(value);
    }
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).copied().and_then(hex_value),
                bytes.get(i + 2).copied().and_then(hex_value),
            ) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    match String::from_utf8(out) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
