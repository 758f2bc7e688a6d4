//! Mutable builder for URI references with `{name}` placeholders.
//!
//! Every setter encodes or validates its input at call time and leaves the
//! builder unchanged when it fails. Placeholders are resolved only by the
//! `build*` methods.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use tracing::{debug, trace};

use crate::constants::PORT_UNSET;
use crate::encoding::{
    Component, encode_component, encode_literal, encode_or_validate, escape_braces, validate,
};
use crate::error::{ArgumentError, ComponentError, ParseError, ParseErrorKind, UriBuilderError};
use crate::path_segment::{MatrixParam, PathSegment, SegmentOptions};
use crate::query::{append_param, encode_param, full_query, reencode};
use crate::resolver::{MapResolver, PositionalResolver, RejectAll, VariableResolver};
use crate::resource::{ResourceClass, ResourceMethod, method_template, required_template};
use crate::template::{Template, push_text};
use crate::uri::{Uri, split};

/// A mutable URI builder.
///
/// Components may contain `{name}` placeholders, which survive encoding and
/// are resolved when the URI is built. With encoding enabled (the default),
/// illegal characters are percent-encoded as they come in; with encoding
/// disabled they are rejected.
///
/// Cloning yields a fully independent builder.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use uri_builder::UriBuilder;
///
/// let mut builder = UriBuilder::new();
/// builder
///     .scheme("https")?
///     .host("example.com")?
///     .path(["users", "{id}"])?
///     .query_param("tab", "recent posts")?;
///
/// assert_eq!(
///     builder.to_string(),
///     "https://example.com/users/{id}?tab=recent%20posts"
/// );
///
/// let uri = builder.build_from_map(&HashMap::from([("id", "42")]))?;
/// assert_eq!(uri.as_str(), "https://example.com/users/42?tab=recent%20posts");
///
/// let uri = builder.build_from_values(&["7"])?;
/// assert_eq!(uri.raw_path(), "/users/7");
/// # Ok::<(), uri_builder::UriBuilderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriBuilder {
    encode: bool,
    scheme: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<i32>,
    path: Vec<PathSegment>,
    query: Option<String>,
    fragment: Option<String>,
}

impl Default for UriBuilder {
    fn default() -> Self {
        Self::with_encode(true)
    }
}

impl UriBuilder {
    /// Creates an empty builder with encoding enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with the given encoding mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_builder::UriBuilder;
    ///
    /// let mut strict = UriBuilder::with_encode(false);
    /// assert!(strict.host("bad host").is_err());
    /// assert!(strict.host("good%20host").is_ok());
    /// ```
    #[must_use]
    pub const fn with_encode(encode: bool) -> Self {
        Self {
            encode,
            scheme: None,
            user_info: None,
            host: None,
            port: None,
            path: Vec::new(),
            query: None,
            fragment: None,
        }
    }

    /// Enables or disables encoding for subsequent setter calls.
    ///
    /// Values already stored are not revisited.
    pub fn encode(&mut self, enable: bool) -> &mut Self {
        self.encode = enable;
        self
    }

    /// Returns true if setters percent-encode their input.
    #[must_use]
    pub const fn is_encode(&self) -> bool {
        self.encode
    }

    /// Sets the scheme.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if `scheme` does not match
    /// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`, whatever the encoding
    /// mode.
    pub fn scheme(&mut self, scheme: &str) -> Result<&mut Self, UriBuilderError> {
        self.scheme = Some(encode_or_validate(scheme, Component::Scheme, self.encode)?);
        Ok(self)
    }

    /// Sets the user-info.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if encoding is disabled
    /// and `user_info` is not legal.
    pub fn user_info(&mut self, user_info: &str) -> Result<&mut Self, UriBuilderError> {
        self.user_info = Some(encode_or_validate(user_info, Component::UserInfo, self.encode)?);
        Ok(self)
    }

    /// Sets the host.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if encoding is disabled
    /// and `host` is not legal.
    pub fn host(&mut self, host: &str) -> Result<&mut Self, UriBuilderError> {
        self.host = Some(encode_or_validate(host, Component::Host, self.encode)?);
        Ok(self)
    }

    /// Sets the port. [`PORT_UNSET`] or any other negative value clears it.
    ///
    /// The upper bound is not checked here; an out-of-range port fails when
    /// the URI is built.
    pub fn port(&mut self, port: i32) -> &mut Self {
        self.port = (port > PORT_UNSET).then_some(port);
        self
    }

    /// Sets the fragment.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if encoding is disabled
    /// and `fragment` is not legal.
    pub fn fragment(&mut self, fragment: &str) -> Result<&mut Self, UriBuilderError> {
        self.fragment = Some(encode_or_validate(fragment, Component::Fragment, self.encode)?);
        Ok(self)
    }

    /// Appends path segments.
    ///
    /// Each string loses one leading `/` and is then split on `/`; every
    /// piece becomes a segment, empty ones included, and a `;name=value`
    /// suffix becomes matrix parameters. An empty string adds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if encoding is disabled
    /// and any segment is illegal. No segment is added in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_builder::UriBuilder;
    ///
    /// let mut builder = UriBuilder::new();
    /// builder.path(["/a/b", "c"])?.path(["d;v=1"])?;
    /// assert_eq!(builder.to_string(), "a/b/c/d;v=1");
    /// # Ok::<(), uri_builder::UriBuilderError>(())
    /// ```
    pub fn path<I, S>(&mut self, segments: I) -> Result<&mut Self, UriBuilderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let converted = convert_path(segments, self.encode)?;
        self.path.extend(converted);
        Ok(self)
    }

    /// Replaces the whole path, matrix parameters included.
    ///
    /// Passing no strings, or only empty ones, clears the path.
    ///
    /// # Errors
    ///
    /// Same as [`path`](Self::path). The old path is kept on failure.
    pub fn replace_path<I, S>(&mut self, segments: I) -> Result<&mut Self, UriBuilderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.path = convert_path(segments, self.encode)?;
        Ok(self)
    }

    /// Appends the path template declared by `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if the resource declares
    /// no usable template, or if the template is illegal and encoding is
    /// disabled.
    pub fn resource_path(
        &mut self,
        resource: &dyn ResourceClass,
    ) -> Result<&mut Self, UriBuilderError> {
        let template = resource.path_template()?;
        self.path([template])
    }

    /// Appends the template of `resource` followed by that of its method
    /// called `method`.
    ///
    /// Methods without a template are ignored. Several methods with the same
    /// template count as one.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if the resource has no
    /// template, if no method matches, or if matching methods disagree.
    pub fn resource_method_path(
        &mut self,
        resource: &dyn ResourceClass,
        method: &str,
    ) -> Result<&mut Self, UriBuilderError> {
        let class_template = resource.path_template()?;
        let method_template = method_template(resource, method)?;
        self.path([class_template, method_template])
    }

    /// Appends the templates of `methods`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if any method declares no
    /// template. Nothing is appended in that case.
    pub fn method_paths(
        &mut self,
        methods: &[&dyn ResourceMethod],
    ) -> Result<&mut Self, UriBuilderError> {
        let templates = methods
            .iter()
            .map(|m| required_template(*m))
            .collect::<Result<Vec<_>, _>>()?;
        self.path(templates)
    }

    /// Appends a matrix parameter to the last path segment.
    ///
    /// Parameters stay attached to that segment when more segments are
    /// added. With encoding disabled, braces in `name` and `value` are taken
    /// literally and never become placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::IllegalState`] if there is no path segment,
    /// or [`UriBuilderError::InvalidArgument`] if encoding is disabled and
    /// `name` or `value` is illegal.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_builder::UriBuilder;
    ///
    /// let mut builder = UriBuilder::new();
    /// builder.path(["a", "b"])?.matrix_param("m", "1")?.path(["c"])?;
    /// assert_eq!(builder.to_string(), "a/b;m=1/c");
    /// # Ok::<(), uri_builder::UriBuilderError>(())
    /// ```
    pub fn matrix_param(&mut self, name: &str, value: &str) -> Result<&mut Self, UriBuilderError> {
        let encode = self.encode;
        let last = self
            .path
            .last_mut()
            .ok_or_else(|| no_segment("add a matrix parameter"))?;
        let param = MatrixParam::new(
            matrix_part(name, Component::MatrixName, encode)?,
            matrix_part(value, Component::MatrixValue, encode)?,
        );
        last.add_matrix_param(param);
        Ok(self)
    }

    /// Replaces the matrix parameters of the last path segment with the
    /// `;`-joined `name=value` pairs in `matrix`. `None` or an empty string
    /// removes them.
    ///
    /// # Errors
    ///
    /// Same as [`matrix_param`](Self::matrix_param).
    pub fn replace_matrix_params(
        &mut self,
        matrix: Option<&str>,
    ) -> Result<&mut Self, UriBuilderError> {
        let encode = self.encode;
        let last = self
            .path
            .last_mut()
            .ok_or_else(|| no_segment("replace matrix parameters"))?;
        let Some(matrix) = matrix.filter(|m| !m.is_empty()) else {
            last.clear_matrix_params();
            return Ok(self);
        };
        let params = matrix
            .split(';')
            .filter(|pair| !pair.is_empty())
            .map(|pair| -> Result<MatrixParam, ComponentError> {
                Ok(match pair.split_once('=') {
                    Some((name, value)) => MatrixParam::new(
                        matrix_part(name, Component::MatrixName, encode)?,
                        matrix_part(value, Component::MatrixValue, encode)?,
                    ),
                    None => MatrixParam::without_value(matrix_part(
                        pair,
                        Component::MatrixName,
                        encode,
                    )?),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        last.set_matrix_params(params);
        Ok(self)
    }

    /// Appends `name=value` to the query.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if encoding is disabled
    /// and `name` or `value` is illegal.
    pub fn query_param(&mut self, name: &str, value: &str) -> Result<&mut Self, UriBuilderError> {
        let (name, value) = encode_param(name, value, self.encode)?;
        append_param(&mut self.query, &name, &value);
        Ok(self)
    }

    /// Replaces the whole query. `None` or an empty string removes it.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if encoding is disabled
    /// and `query` is not a legal query.
    pub fn replace_query_params(
        &mut self,
        query: Option<&str>,
    ) -> Result<&mut Self, UriBuilderError> {
        self.query = match query.filter(|q| !q.is_empty()) {
            Some(query) => Some(full_query(query, self.encode)?),
            None => None,
        };
        Ok(self)
    }

    /// Replaces user-info, host, port, path, query and fragment with the
    /// parts of `ssp`, read as `[//authority][path][?query][#fragment]`.
    ///
    /// The parts must already be legal; they are never encoded. The scheme
    /// and encoding mode are kept.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if a part is illegal or
    /// the port is not a decimal integer. The builder is unchanged then.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_builder::UriBuilder;
    ///
    /// let mut builder = UriBuilder::new();
    /// builder.scheme("http")?.scheme_specific_part("//me@h:81/a;x=1?q=1#f")?;
    /// assert_eq!(builder.to_string(), "http://me@h:81/a;x=1?q=1#f");
    /// # Ok::<(), uri_builder::UriBuilderError>(())
    /// ```
    pub fn scheme_specific_part(&mut self, ssp: &str) -> Result<&mut Self, UriBuilderError> {
        let parts = split(ssp, false);
        let (user_info, host, port) = match parts.authority {
            Some(authority) => (
                authority
                    .user_info
                    .map(|ui| encode_or_validate(ui, Component::UserInfo, false))
                    .transpose()?,
                Some(encode_or_validate(authority.host, Component::Host, false)?),
                parse_port(authority.port)?,
            ),
            None => (None, None, None),
        };
        let path = convert_path([parts.path], false)?;
        let query = parts.query.map(|q| full_query(q, false)).transpose()?;
        let fragment = parts
            .fragment
            .map(|f| encode_or_validate(f, Component::Fragment, false))
            .transpose()?;

        trace!(ssp, "replaced scheme-specific part");
        self.user_info = user_info;
        self.host = host;
        self.port = port;
        self.path = path;
        self.query = query;
        self.fragment = fragment;
        Ok(self)
    }

    /// Copies every component present in `uri` into this builder.
    ///
    /// With encoding enabled the decoded components are read and encoded
    /// again, braces included, so nothing copied can become a placeholder.
    /// With encoding disabled the raw components are copied as they are.
    ///
    /// # Errors
    ///
    /// Returns [`UriBuilderError::InvalidArgument`] if a component cannot be
    /// taken over. A parsed [`Uri`] always can.
    pub fn uri(&mut self, uri: &Uri) -> Result<&mut Self, UriBuilderError> {
        let copied = if self.encode {
            Copied {
                user_info: uri.user_info().map(|v| encode_literal(&v, Component::UserInfo)),
                host: uri.host().map(|v| encode_literal(&v, Component::Host)),
                path: uri
                    .path_segments()
                    .iter()
                    .map(reencode_segment)
                    .collect(),
                query: uri.raw_query().map(reencode),
                fragment: uri.fragment().map(|v| encode_literal(&v, Component::Fragment)),
            }
        } else {
            Copied {
                user_info: uri.raw_user_info().map(str::to_string),
                host: uri.raw_host().map(str::to_string),
                path: convert_path([uri.raw_path()], false)?,
                query: uri.raw_query().map(str::to_string),
                fragment: uri.raw_fragment().map(str::to_string),
            }
        };

        if let Some(scheme) = uri.scheme() {
            self.scheme = Some(scheme.to_string());
        }
        if let Some(port) = uri.port() {
            self.port = Some(i32::from(port));
        }
        if copied.user_info.is_some() {
            self.user_info = copied.user_info;
        }
        if copied.host.is_some() {
            self.host = copied.host;
        }
        if !uri.raw_path().is_empty() {
            self.path = copied.path;
        }
        if copied.query.is_some() {
            self.query = copied.query;
        }
        if copied.fragment.is_some() {
            self.fragment = copied.fragment;
        }
        Ok(self)
    }

    /// Builds the URI, failing if any placeholder is left.
    ///
    /// Braces that do not form a placeholder are written as `%7B`/`%7D`.
    ///
    /// # Errors
    ///
    /// - [`UriBuilderError::MissingHost`] if a port or user-info is set
    ///   without a host
    /// - [`UriBuilderError::TemplateResolution`] if a placeholder remains
    /// - [`UriBuilderError::UriSyntax`] if the result does not parse
    pub fn build(&self) -> Result<Uri, UriBuilderError> {
        self.build_inner(&mut RejectAll, true)
    }

    /// Builds the URI, resolving placeholders by name from `values`.
    ///
    /// Values are inserted verbatim and must already be encoded.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), with [`UriBuilderError::TemplateResolution`]
    /// raised for a placeholder missing from `values`.
    pub fn build_from_map<K, V, S>(&self, values: &HashMap<K, V, S>) -> Result<Uri, UriBuilderError>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
        S: BuildHasher,
    {
        self.build_inner(&mut MapResolver::new(values), false)
    }

    /// Builds the URI, resolving placeholders from `values` in order.
    ///
    /// The first occurrence of each placeholder name takes the next value;
    /// later occurrences reuse it. Surplus values are ignored.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), with [`UriBuilderError::TemplateResolution`]
    /// raised when the values run out.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_builder::UriBuilder;
    ///
    /// let mut builder = UriBuilder::new();
    /// builder.path(["{a}", "{b}", "{a}"])?;
    /// assert_eq!(builder.build_from_values(&["x", "y"])?.as_str(), "x/y/x");
    /// # Ok::<(), uri_builder::UriBuilderError>(())
    /// ```
    pub fn build_from_values<V: AsRef<str>>(&self, values: &[V]) -> Result<Uri, UriBuilderError> {
        self.build_inner(&mut PositionalResolver::new(values), false)
    }

    /// Builds the URI with a caller-supplied resolver.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), with whatever error `resolver` returns.
    pub fn build_with<R>(&self, resolver: &mut R) -> Result<Uri, UriBuilderError>
    where
        R: VariableResolver + ?Sized,
    {
        self.build_inner(resolver, false)
    }

    fn build_inner<R>(&self, resolver: &mut R, convert_braces: bool) -> Result<Uri, UriBuilderError>
    where
        R: VariableResolver + ?Sized,
    {
        self.check_authority()?;
        let source = self.write_template(convert_braces);
        trace!(template = %source, "building URI");
        let resolved = Template::parse(&source)
            .format(resolver)
            .inspect_err(|e| debug!(template = %source, error = %e, "template resolution failed"))?;
        let uri = Uri::parse(&resolved)
            .inspect_err(|e| debug!(uri = %resolved, error = %e, "built URI does not parse"))?;
        if self.is_relative() {
            stays_relative(&uri)
                .map_err(|kind| ParseError {
                    input: resolved.clone(),
                    kind,
                })
                .inspect_err(|e| debug!(uri = %resolved, error = %e, "relative path escaped"))?;
        }
        Ok(uri)
    }

    fn check_authority(&self) -> Result<(), UriBuilderError> {
        if self.host.is_some() {
            return Ok(());
        }
        if self.port.is_some() {
            return Err(UriBuilderError::MissingHost { component: "port" });
        }
        if self.user_info.is_some() {
            return Err(UriBuilderError::MissingHost {
                component: "user-info",
            });
        }
        Ok(())
    }

    const fn is_relative(&self) -> bool {
        self.scheme.is_none()
            && self.user_info.is_none()
            && self.host.is_none()
            && self.port.is_none()
    }

    fn write_template(&self, convert_braces: bool) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push_str("://");
        }
        if let Some(user_info) = &self.user_info {
            push_text(&mut out, user_info, convert_braces);
            out.push('@');
        }
        if let Some(host) = &self.host {
            push_text(&mut out, host, convert_braces);
        }
        if let Some(port) = self.port {
            out.push(':');
            out.push_str(&port.to_string());
        }
        let relative = self.is_relative();
        for (i, segment) in self.path.iter().enumerate() {
            if !(relative && i == 0) {
                out.push('/');
            }
            segment.render(&mut out, convert_braces);
        }
        if let Some(query) = &self.query {
            out.push('?');
            push_text(&mut out, query, convert_braces);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            push_text(&mut out, fragment, convert_braces);
        }
        out
    }
}

/// Shows the builder as a template, placeholders intact.
impl fmt::Display for UriBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.write_template(false))
    }
}

struct Copied {
    user_info: Option<String>,
    host: Option<String>,
    path: Vec<PathSegment>,
    query: Option<String>,
    fragment: Option<String>,
}

fn no_segment(operation: &'static str) -> UriBuilderError {
    UriBuilderError::IllegalState {
        operation,
        reason: "the path has no segment yet",
    }
}

fn convert_path<I, S>(segments: I, encode: bool) -> Result<Vec<PathSegment>, ComponentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let options = SegmentOptions::encoding(encode);
    let mut converted = Vec::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        for raw in segment.split('/') {
            converted.push(PathSegment::parse(raw, options)?);
        }
    }
    Ok(converted)
}

/// A builder without scheme or authority must yield a relative-path
/// reference. Empty leading segments can write `//host` and a first segment
/// such as `a:b` reads as a scheme.
fn stays_relative(uri: &Uri) -> Result<(), ParseErrorKind> {
    if uri.has_authority() {
        Err(ParseErrorKind::DoubleSlashPath)
    } else if uri.scheme().is_some() {
        Err(ParseErrorKind::ColonInFirstSegment)
    } else {
        Ok(())
    }
}

fn matrix_part(text: &str, component: Component, encode: bool) -> Result<String, ComponentError> {
    if encode {
        Ok(encode_component(text, component))
    } else {
        validate(text, component)?;
        Ok(escape_braces(text))
    }
}

fn reencode_segment(segment: &PathSegment) -> PathSegment {
    let mut encoded = PathSegment::new(encode_literal(segment.text(), Component::PathSegment));
    encoded.set_matrix_params(
        segment
            .matrix_params()
            .iter()
            .map(|p| {
                let name = encode_literal(p.name(), Component::MatrixName);
                match p.value() {
                    Some(value) => {
                        MatrixParam::new(name, encode_literal(value, Component::MatrixValue))
                    }
                    None => MatrixParam::without_value(name),
                }
            })
            .collect(),
    );
    encoded
}

fn parse_port(port: Option<&str>) -> Result<Option<i32>, ArgumentError> {
    match port {
        None | Some("") => Ok(None),
        Some(text) => {
            let invalid = || ArgumentError::InvalidPort {
                value: text.to_string(),
            };
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            text.parse().map(Some).map_err(|_| invalid())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ComponentErrorKind, PathTemplateError, TemplateError};
    use crate::resource::{StaticMethod, StaticResource};

    fn sample() -> UriBuilder {
        let mut b = UriBuilder::new();
        b.scheme("http")
            .unwrap()
            .user_info("me")
            .unwrap()
            .host("example.com")
            .unwrap()
            .port(8080)
            .path(["a", "b"])
            .unwrap()
            .query_param("q", "1")
            .unwrap()
            .fragment("top")
            .unwrap();
        b
    }

    #[test]
    fn empty_builder_renders_nothing() {
        assert_eq!(UriBuilder::new().to_string(), "");
        assert!(UriBuilder::new().is_encode());
        assert!(!UriBuilder::with_encode(false).is_encode());
    }

    #[test]
    fn full_builder_serializes_in_order() {
        assert_eq!(
            sample().build().unwrap().as_str(),
            "http://me@example.com:8080/a/b?q=1#top"
        );
    }

    #[test]
    fn relative_path_has_no_leading_slash() {
        let mut b = UriBuilder::new();
        b.path(["a", "b"]).unwrap();
        assert_eq!(b.build().unwrap().as_str(), "a/b");

        b.host("x").unwrap();
        assert_eq!(b.build().unwrap().as_str(), "x/a/b");
    }

    #[test]
    fn port_requires_host() {
        let mut b = UriBuilder::new();
        b.port(8080);
        assert_eq!(
            b.build(),
            Err(UriBuilderError::MissingHost { component: "port" })
        );
        // not checked for display
        assert_eq!(b.to_string(), ":8080");

        b.host("x").unwrap();
        assert_eq!(b.build().unwrap().as_str(), "x:8080");
    }

    #[test]
    fn user_info_requires_host() {
        let mut b = UriBuilder::new();
        b.user_info("me").unwrap();
        assert_eq!(
            b.build(),
            Err(UriBuilderError::MissingHost {
                component: "user-info"
            })
        );
    }

    #[test]
    fn port_unset_clears() {
        let mut b = UriBuilder::new();
        b.host("h").unwrap().port(80).port(PORT_UNSET);
        assert_eq!(b.to_string(), "h");
    }

    #[test]
    fn out_of_range_port_fails_at_build() {
        let mut b = UriBuilder::new();
        b.scheme("http").unwrap().host("h").unwrap().port(70000);
        assert!(matches!(b.build(), Err(UriBuilderError::UriSyntax(_))));
    }

    #[test]
    fn invalid_scheme_is_rejected_and_state_kept() {
        let mut b = UriBuilder::new();
        b.scheme("http").unwrap();
        let err = b.scheme("1http").unwrap_err();
        assert!(matches!(err, UriBuilderError::InvalidArgument(_)));
        assert_eq!(b.to_string(), "http://");
    }

    #[test]
    fn setters_encode_by_default() {
        let mut b = UriBuilder::new();
        b.host("my host")
            .unwrap()
            .path(["a b"])
            .unwrap()
            .fragment("x y")
            .unwrap();
        assert_eq!(b.to_string(), "my%20host/a%20b#x%20y");
    }

    #[test]
    fn setters_validate_when_encoding_disabled() {
        let mut b = UriBuilder::with_encode(false);
        let err = b.host("my host").unwrap_err();
        match err {
            UriBuilderError::InvalidArgument(ArgumentError::Component(e)) => {
                assert_eq!(e.component, Component::Host);
                assert_eq!(
                    e.kind,
                    ComponentErrorKind::InvalidChar {
                        char: ' ',
                        position: 2
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(b.user_info("a b").is_err());
        assert!(b.fragment("a b").is_err());
        assert!(b.host("my%20host").is_ok());
    }

    #[test]
    fn encode_flag_applies_to_later_calls_only() {
        let mut b = UriBuilder::new();
        b.path(["a b"]).unwrap().encode(false);
        assert!(b.path(["c d"]).is_err());
        assert_eq!(b.to_string(), "a%20b");
    }

    #[test]
    fn path_failure_adds_nothing() {
        let mut b = UriBuilder::with_encode(false);
        b.path(["x"]).unwrap();
        assert!(b.path(["ok", "not ok"]).is_err());
        assert_eq!(b.to_string(), "x");
    }

    #[test]
    fn path_splits_and_keeps_empty_segments() {
        let mut b = UriBuilder::new();
        b.host("h").unwrap().path(["/a//b/", "", "c"]).unwrap();
        assert_eq!(b.to_string(), "h/a//b//c");
    }

    #[test]
    fn path_with_matrix_suffix() {
        let mut b = UriBuilder::new();
        b.path(["cars;color=red/2008"]).unwrap();
        assert_eq!(b.to_string(), "cars;color=red/2008");
    }

    #[test]
    fn replace_path_clears_segments_and_matrix() {
        let mut b = UriBuilder::new();
        b.path(["a"]).unwrap().matrix_param("m", "1").unwrap();
        b.replace_path(["x/y"]).unwrap();
        assert_eq!(b.to_string(), "x/y");
        b.replace_path([""]).unwrap();
        assert_eq!(b.to_string(), "");
        b.path(["z"]).unwrap().replace_path(Vec::<&str>::new()).unwrap();
        assert_eq!(b.to_string(), "");
    }

    #[test]
    fn matrix_param_attaches_to_last_segment() {
        let mut b = UriBuilder::new();
        b.path(["a", "b"]).unwrap().matrix_param("m", "1").unwrap();
        assert_eq!(b.to_string(), "a/b;m=1");
        b.path(["c"]).unwrap();
        assert_eq!(b.to_string(), "a/b;m=1/c");
    }

    #[test]
    fn matrix_param_duplicates_in_order() {
        let mut b = UriBuilder::new();
        b.path(["a"])
            .unwrap()
            .matrix_param("m", "1")
            .unwrap()
            .matrix_param("m", "2")
            .unwrap()
            .matrix_param("flag", "")
            .unwrap();
        assert_eq!(b.to_string(), "a;m=1;m=2;flag=");
    }

    #[test]
    fn matrix_param_without_segment_is_illegal_state() {
        let mut b = UriBuilder::new();
        assert!(matches!(
            b.matrix_param("m", "1"),
            Err(UriBuilderError::IllegalState { .. })
        ));
        assert!(matches!(
            b.replace_matrix_params(Some("m=1")),
            Err(UriBuilderError::IllegalState { .. })
        ));
    }

    #[test]
    fn matrix_param_encodes_separators() {
        let mut b = UriBuilder::new();
        b.path(["a"]).unwrap().matrix_param("n=;", "v;w").unwrap();
        assert_eq!(b.to_string(), "a;n%3D%3B=v%3Bw");
    }

    #[test]
    fn matrix_braces_are_literal_when_encoding_disabled() {
        let mut b = UriBuilder::with_encode(false);
        b.path(["a"]).unwrap().matrix_param("m", "{v}").unwrap();
        assert_eq!(b.to_string(), "a;m=%7Bv%7D");
        assert_eq!(b.build().unwrap().as_str(), "a;m=%7Bv%7D");

        let mut b = UriBuilder::new();
        b.path(["a"]).unwrap().matrix_param("m", "{v}").unwrap();
        assert_eq!(b.to_string(), "a;m={v}");
    }

    #[test]
    fn replace_matrix_params_replaces_or_clears() {
        let mut b = UriBuilder::new();
        b.path(["a"]).unwrap().matrix_param("m", "1").unwrap();
        b.replace_matrix_params(Some(";x=1;y;z=a b")).unwrap();
        assert_eq!(b.to_string(), "a;x=1;y;z=a%20b");
        b.replace_matrix_params(Some("")).unwrap();
        assert_eq!(b.to_string(), "a");
        b.matrix_param("m", "1").unwrap().replace_matrix_params(None).unwrap();
        assert_eq!(b.to_string(), "a");
    }

    #[test]
    fn replace_matrix_params_failure_keeps_params() {
        let mut b = UriBuilder::with_encode(false);
        b.path(["a"]).unwrap().matrix_param("m", "1").unwrap();
        assert!(b.replace_matrix_params(Some("x=1;y=a b")).is_err());
        assert_eq!(b.to_string(), "a;m=1");
    }

    #[test]
    fn query_params_accumulate() {
        let mut b = UriBuilder::new();
        b.query_param("a", "1")
            .unwrap()
            .query_param("a", "2")
            .unwrap()
            .query_param("b&c", "x=y")
            .unwrap();
        assert_eq!(b.to_string(), "?a=1&a=2&b%26c=x=y");
    }

    #[test]
    fn replace_query_params() {
        let mut b = UriBuilder::new();
        b.query_param("a", "1").unwrap();
        b.replace_query_params(Some("x=1 2&y")).unwrap();
        assert_eq!(b.to_string(), "?x=1%202&y");
        b.replace_query_params(None).unwrap();
        assert_eq!(b.to_string(), "");
        b.query_param("c", "3").unwrap();
        assert_eq!(b.to_string(), "?c=3");

        let mut strict = UriBuilder::with_encode(false);
        assert!(strict.replace_query_params(Some("a b")).is_err());
        strict.replace_query_params(Some("a=%20")).unwrap();
        assert_eq!(strict.to_string(), "?a=%20");
    }

    #[test]
    fn scheme_specific_part_overwrites_all_but_scheme() {
        let mut b = sample();
        b.scheme_specific_part("//h2/x?y#z").unwrap();
        assert_eq!(b.to_string(), "http://h2/x?y#z");

        b.scheme_specific_part("only/path").unwrap();
        assert_eq!(b.to_string(), "http:///only/path");
    }

    #[test]
    fn scheme_specific_part_is_validated_not_encoded() {
        let mut b = UriBuilder::new();
        b.scheme("s").unwrap();
        assert!(b.scheme_specific_part("//h/a b").is_err());
        assert_eq!(
            b.scheme_specific_part("//h:8x/"),
            Err(UriBuilderError::InvalidArgument(ArgumentError::InvalidPort {
                value: "8x".to_string()
            }))
        );
        assert_eq!(b.to_string(), "s://");
        b.scheme_specific_part("//{host}/{p}").unwrap();
        assert_eq!(b.to_string(), "s://{host}/{p}");
    }

    #[test]
    fn build_rejects_placeholders() {
        let mut b = UriBuilder::new();
        b.path(["users", "{id}"]).unwrap();
        assert_eq!(
            b.build(),
            Err(UriBuilderError::TemplateResolution(
                TemplateError::VariablesNotAllowed {
                    name: "id".to_string()
                }
            ))
        );
    }

    #[test]
    fn build_escapes_stray_braces() {
        let mut b = UriBuilder::new();
        b.path(["a{b", "c}"]).unwrap();
        assert_eq!(b.build().unwrap().as_str(), "a%7Bb/c%7D");
        assert_eq!(b.to_string(), "a{b/c}");
    }

    #[test]
    fn build_from_map_substitutes_everywhere() {
        let mut b = UriBuilder::new();
        b.scheme("http")
            .unwrap()
            .host("{host}")
            .unwrap()
            .path(["{p}"])
            .unwrap()
            .query_param("q", "{v}")
            .unwrap()
            .fragment("{p}")
            .unwrap();
        let values = HashMap::from([("host", "h"), ("p", "x"), ("v", "1")]);
        assert_eq!(
            b.build_from_map(&values).unwrap().as_str(),
            "http://h/x?q=1#x"
        );
    }

    #[test]
    fn build_from_map_missing_value() {
        let mut b = UriBuilder::new();
        b.path(["{a}", "{b}"]).unwrap();
        let values: HashMap<String, String> = HashMap::from([("a".to_string(), "1".to_string())]);
        assert_eq!(
            b.build_from_map(&values),
            Err(UriBuilderError::TemplateResolution(TemplateError::MissingValue {
                name: "b".to_string()
            }))
        );
    }

    #[test]
    fn build_from_map_ignores_surplus() {
        let mut b = UriBuilder::new();
        b.path(["{a}"]).unwrap();
        let values = HashMap::from([("a", "1"), ("unused", "2")]);
        assert_eq!(b.build_from_map(&values).unwrap().as_str(), "1");
    }

    #[test]
    fn build_from_values_reuses_repeated_names() {
        let mut b = UriBuilder::new();
        b.path(["{x}", "{y}", "{x}"]).unwrap();
        assert_eq!(b.build_from_values(&["1", "2"]).unwrap().as_str(), "1/2/1");
        assert_eq!(
            b.build_from_values(&["1"]),
            Err(UriBuilderError::TemplateResolution(
                TemplateError::NotEnoughValues {
                    name: "y".to_string(),
                    supplied: 1
                }
            ))
        );
    }

    #[test]
    fn resolved_values_are_not_encoded() {
        let mut b = UriBuilder::new();
        b.path(["{p}"]).unwrap();
        assert_eq!(b.build_from_values(&["a%20b"]).unwrap().as_str(), "a%20b");
        assert!(matches!(
            b.build_from_values(&["a b"]),
            Err(UriBuilderError::UriSyntax(_))
        ));
    }

    #[test]
    fn build_with_closure() {
        let mut b = UriBuilder::new();
        b.path(["{a}", "{b}"]).unwrap();
        let mut upper = |name: &str| -> Result<String, TemplateError> { Ok(name.to_uppercase()) };
        assert_eq!(b.build_with(&mut upper).unwrap().as_str(), "A/B");
    }

    #[test]
    fn build_is_repeatable() {
        let b = sample();
        assert_eq!(b.build().unwrap(), b.build().unwrap());
        assert_eq!(b.to_string(), b.to_string());
    }

    #[test]
    fn clone_is_independent() {
        let mut original = UriBuilder::new();
        original
            .path(["a"])
            .unwrap()
            .matrix_param("m", "1")
            .unwrap()
            .query_param("q", "1")
            .unwrap();
        let mut copy = original.clone();
        copy.matrix_param("n", "2")
            .unwrap()
            .query_param("r", "2")
            .unwrap()
            .path(["b"])
            .unwrap();
        original.query_param("s", "3").unwrap();

        assert_eq!(original.to_string(), "a;m=1?q=1&s=3");
        assert_eq!(copy.to_string(), "a;m=1;n=2/b?q=1&r=2");
    }

    #[test]
    fn uri_round_trip() {
        let built = sample().build().unwrap();
        let mut b = UriBuilder::new();
        b.uri(&built).unwrap();
        assert_eq!(b.build().unwrap(), built);
    }

    #[test]
    fn uri_round_trip_without_encoding() {
        let built = Uri::parse("http://h/a%20b;m=%7B/c?x=%26#%23").unwrap();
        let mut b = UriBuilder::with_encode(false);
        b.uri(&built).unwrap();
        assert_eq!(b.build().unwrap(), built);
    }

    #[test]
    fn uri_reencodes_decoded_components() {
        let source = Uri::parse("http://h/a%7Bb%7D;m=%7Bx%7D?q=%7B%7D&r=%7e#%7Bf%7D").unwrap();
        let mut b = UriBuilder::new();
        b.uri(&source).unwrap();
        assert_eq!(
            b.to_string(),
            "http://h/a%7Bb%7D;m=%7Bx%7D?q=%7B%7D&r=~#%7Bf%7D"
        );
        assert!(b.build().is_ok());
    }

    #[test]
    fn uri_copies_only_present_components() {
        let mut b = sample();
        b.uri(&Uri::parse("?z=9").unwrap()).unwrap();
        assert_eq!(b.to_string(), "http://me@example.com:8080/a/b?z=9#top");
    }

    #[test]
    fn uri_keeps_empty_matrix_values() {
        let source = Uri::parse("http://h/a;m=;n/b").unwrap();

        let mut raw = UriBuilder::with_encode(false);
        raw.uri(&source).unwrap();
        assert_eq!(raw.build().unwrap(), source);

        let mut encoded = UriBuilder::new();
        encoded.uri(&source).unwrap();
        assert_eq!(encoded.build().unwrap(), source);
    }

    #[test]
    fn relative_path_cannot_gain_an_authority() {
        let mut b = UriBuilder::new();
        b.path(["///evil.com/x"]).unwrap();
        let err = b.build().unwrap_err();
        assert!(matches!(
            err,
            UriBuilderError::UriSyntax(ParseError {
                kind: ParseErrorKind::DoubleSlashPath,
                ..
            })
        ));

        let mut b = UriBuilder::new();
        b.path(["{p}", "x", "{q}"]).unwrap();
        let values = HashMap::from([("p", ""), ("q", "y")]);
        assert_eq!(b.build_from_map(&values).unwrap().as_str(), "/x/y");
    }

    #[test]
    fn relative_path_cannot_gain_a_scheme() {
        let mut b = UriBuilder::new();
        b.path(["a:b", "c"]).unwrap();
        assert!(matches!(
            b.build(),
            Err(UriBuilderError::UriSyntax(ParseError {
                kind: ParseErrorKind::ColonInFirstSegment,
                ..
            }))
        ));

        let mut b = UriBuilder::new();
        b.path(["{s}"]).unwrap();
        assert!(b.build_from_values(&["mailto:x"]).is_err());

        let mut b = UriBuilder::new();
        b.path(["b", "a:c"]).unwrap();
        assert_eq!(b.build().unwrap().as_str(), "b/a:c");
    }

    #[test]
    fn uri_keeps_root_path() {
        let built = Uri::parse("http://h/").unwrap();
        let mut b = UriBuilder::new();
        b.uri(&built).unwrap();
        assert_eq!(b.build().unwrap().as_str(), "http://h/");
    }

    #[test]
    fn resource_paths() {
        let resource = StaticResource::new("Orders", "/orders")
            .with_method(StaticMethod::new("get", "{id}"))
            .with_method(StaticMethod::new("find", "a"))
            .with_method(StaticMethod::new("find", "b"));

        let mut b = UriBuilder::new();
        b.resource_path(&resource).unwrap();
        assert_eq!(b.to_string(), "orders");

        let mut b = UriBuilder::new();
        b.resource_method_path(&resource, "get").unwrap();
        assert_eq!(b.to_string(), "orders/{id}");

        assert_eq!(
            b.resource_method_path(&resource, "find"),
            Err(UriBuilderError::InvalidArgument(ArgumentError::PathTemplate(
                PathTemplateError::AmbiguousMethod {
                    resource: "Orders".to_string(),
                    method: "find".to_string()
                }
            )))
        );
        assert_eq!(b.to_string(), "orders/{id}");
    }

    #[test]
    fn unannotated_resource_is_invalid_argument() {
        let mut b = UriBuilder::new();
        assert!(matches!(
            b.resource_path(&StaticResource::unannotated("Plain")),
            Err(UriBuilderError::InvalidArgument(ArgumentError::PathTemplate(
                PathTemplateError::NotAnnotated { .. }
            )))
        ));
    }

    #[test]
    fn method_paths_all_or_nothing() {
        let get = StaticMethod::new("get", "items/{id}");
        let tags = StaticMethod::new("tags", "tags");
        let plain = StaticMethod::unannotated("plain");

        let mut b = UriBuilder::new();
        b.method_paths(&[&get, &tags]).unwrap();
        assert_eq!(b.to_string(), "items/{id}/tags");

        assert!(b.method_paths(&[&get, &plain]).is_err());
        assert_eq!(b.to_string(), "items/{id}/tags");
    }

    #[test]
    fn scheme_without_host_keeps_leading_slash() {
        let mut b = UriBuilder::new();
        b.scheme("file").unwrap().path(["etc", "hosts"]).unwrap();
        assert_eq!(b.build().unwrap().as_str(), "file:///etc/hosts");
    }
}
