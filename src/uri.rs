//! Parsed URI references.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::encoding::{Component, is_valid_scheme, percent_decode};
use crate::error::{ParseError, ParseErrorKind};
use crate::path_segment::PathSegment;
use crate::query::decoded_pairs;

/// The `[userinfo@]host[:port]` part of a reference, split but not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Authority<'a> {
    pub(crate) user_info: Option<&'a str>,
    pub(crate) host: &'a str,
    pub(crate) port: Option<&'a str>,
}

/// A reference split into its components, not yet checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Parts<'a> {
    pub(crate) scheme: Option<&'a str>,
    pub(crate) authority: Option<Authority<'a>>,
    pub(crate) path: &'a str,
    pub(crate) query: Option<&'a str>,
    pub(crate) fragment: Option<&'a str>,
}

/// Splits `input` as `[scheme:][//authority][path][?query][#fragment]`.
///
/// A scheme is only recognized when `detect_scheme` is set and the text
/// before the first `:` is a valid scheme.
pub(crate) fn split(input: &str, detect_scheme: bool) -> Parts<'_> {
    let (rest, fragment) = match input.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (input, None),
    };
    let (mut rest, query) = match rest.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (rest, None),
    };

    let mut scheme = None;
    let candidate = rest
        .split_once(':')
        .filter(|(candidate, _)| detect_scheme && is_valid_scheme(candidate));
    if let Some((name, after)) = candidate {
        scheme = Some(name);
        rest = after;
    }

    let mut authority = None;
    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find('/').unwrap_or(after.len());
        authority = Some(split_authority(&after[..end]));
        rest = &after[end..];
    }

    Parts {
        scheme,
        authority,
        path: rest,
        query,
        fragment,
    }
}

fn split_authority(authority: &str) -> Authority<'_> {
    let (user_info, host_port) = match authority.rfind('@') {
        Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
        None => (None, authority),
    };
    let (host, port) = match host_port.rfind(':') {
        Some(colon) => (&host_port[..colon], Some(&host_port[colon + 1..])),
        None => (host_port, None),
    };
    Authority {
        user_info,
        host,
        port,
    }
}

/// A parsed and validated URI reference.
///
/// This is what [`UriBuilder::build`](crate::UriBuilder::build) produces.
/// Components are kept in their percent-encoded form; the `raw_*` accessors
/// return them verbatim and the plain accessors decode them.
///
/// IPv6 literals are not recognized.
///
/// # Examples
///
/// ```
/// use uri_builder::Uri;
///
/// let uri = Uri::parse("http://me@example.com:8080/a%20b;v=1?q=x%26y#top").unwrap();
/// assert_eq!(uri.scheme(), Some("http"));
/// assert_eq!(uri.user_info().as_deref(), Some("me"));
/// assert_eq!(uri.host().as_deref(), Some("example.com"));
/// assert_eq!(uri.port(), Some(8080));
/// assert_eq!(uri.raw_path(), "/a%20b;v=1");
/// assert_eq!(uri.path(), "/a b;v=1");
/// assert_eq!(uri.raw_query(), Some("q=x%26y"));
/// assert_eq!(uri.fragment().as_deref(), Some("top"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    scheme: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
    serialized: String,
}

impl Uri {
    /// Parses a URI reference.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - A component contains a character it does not allow, including
    ///   template braces
    /// - A `%` is not followed by two hex digits
    /// - The port is not a number in `0..=65535`
    /// - A reference without scheme or authority has a `:` in its first
    ///   path segment
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::parse_inner(input).map_err(|kind| ParseError {
            input: input.to_string(),
            kind,
        })
    }

    fn parse_inner(input: &str) -> Result<Self, ParseErrorKind> {
        let parts = split(input, true);

        let mut user_info = None;
        let mut host = None;
        let mut port = None;
        if let Some(authority) = parts.authority {
            if let Some(ui) = authority.user_info {
                check(input, ui, Component::UserInfo)?;
                user_info = Some(ui.to_string());
            }
            check(input, authority.host, Component::Host)?;
            host = Some(authority.host.to_string());
            port = parse_port(authority.port)?;
        }

        if parts.scheme.is_none() && parts.authority.is_none() {
            let first = parts.path.split('/').next().unwrap_or_default();
            if first.contains(':') {
                return Err(ParseErrorKind::ColonInFirstSegment);
            }
        }
        check(input, parts.path, Component::Path)?;
        if let Some(query) = parts.query {
            check(input, query, Component::Query)?;
        }
        if let Some(fragment) = parts.fragment {
            check(input, fragment, Component::Fragment)?;
        }

        Ok(Self {
            scheme: parts.scheme.map(str::to_string),
            user_info,
            host,
            port,
            path: parts.path.to_string(),
            query: parts.query.map(str::to_string),
            fragment: parts.fragment.map(str::to_string),
            serialized: input.to_string(),
        })
    }

    /// Returns the scheme, if present.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns true if the reference has an authority (`//...`).
    #[must_use]
    pub const fn has_authority(&self) -> bool {
        self.host.is_some()
    }

    /// Returns the encoded user-info, if present.
    #[must_use]
    pub fn raw_user_info(&self) -> Option<&str> {
        self.user_info.as_deref()
    }

    /// Returns the decoded user-info, if present.
    #[must_use]
    pub fn user_info(&self) -> Option<Cow<'_, str>> {
        self.user_info.as_deref().map(percent_decode)
    }

    /// Returns the encoded host. Present, possibly empty, whenever the
    /// reference has an authority.
    #[must_use]
    pub fn raw_host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the decoded host.
    #[must_use]
    pub fn host(&self) -> Option<Cow<'_, str>> {
        self.host.as_deref().map(percent_decode)
    }

    /// Returns the port, if one was given.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the encoded path, including matrix parameters.
    #[must_use]
    pub fn raw_path(&self) -> &str {
        &self.path
    }

    /// Returns the decoded path.
    #[must_use]
    pub fn path(&self) -> Cow<'_, str> {
        percent_decode(&self.path)
    }

    /// Returns the path split into decoded segments.
    ///
    /// A leading `/` does not produce an empty first segment, so `/` alone
    /// is one empty segment.
    #[must_use]
    pub fn path_segments(&self) -> Vec<PathSegment> {
        if self.path.is_empty() {
            return Vec::new();
        }
        let path = self.path.strip_prefix('/').unwrap_or(&self.path);
        path.split('/').map(PathSegment::decode).collect()
    }

    /// Returns the encoded query, if present.
    #[must_use]
    pub fn raw_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the decoded query, if present.
    #[must_use]
    pub fn query(&self) -> Option<Cow<'_, str>> {
        self.query.as_deref().map(percent_decode)
    }

    /// Returns the query as decoded `(name, value)` pairs.
    pub fn query_pairs(&self) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
        decoded_pairs(self.query.as_deref().unwrap_or_default())
    }

    /// Returns the encoded fragment, if present.
    #[must_use]
    pub fn raw_fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the decoded fragment, if present.
    #[must_use]
    pub fn fragment(&self) -> Option<Cow<'_, str>> {
        self.fragment.as_deref().map(percent_decode)
    }

    /// Returns the reference as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.serialized
    }
}

fn parse_port(port: Option<&str>) -> Result<Option<u16>, ParseErrorKind> {
    match port {
        None | Some("") => Ok(None),
        Some(text) => {
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseErrorKind::InvalidPort {
                    value: text.to_string(),
                });
            }
            text.parse().map(Some).map_err(|_| ParseErrorKind::InvalidPort {
                value: text.to_string(),
            })
        }
    }
}

/// Checks that `part`, a slice of `input`, is legal for `component`.
/// Positions are reported as byte offsets into `input`.
fn check(input: &str, part: &str, component: Component) -> Result<(), ParseErrorKind> {
    let base = part.as_ptr() as usize - input.as_ptr() as usize;
    let bytes = part.as_bytes();
    for (i, c) in part.char_indices() {
        let position = base + i;
        if c == '%' {
            let hex_at = |j: usize| bytes.get(j).is_some_and(u8::is_ascii_hexdigit);
            if !(hex_at(i + 1) && hex_at(i + 2)) {
                return Err(ParseErrorKind::InvalidPercentEncoding {
                    component,
                    position,
                });
            }
        } else if !component.allows_char(c) {
            return Err(ParseErrorKind::InvalidChar {
                component,
                char: c,
                position,
            });
        }
    }
    Ok(())
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

impl FromStr for Uri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.serialized
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialized.cmp(&other.serialized)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.serialized)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
