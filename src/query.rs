//! Query string assembly.

use std::borrow::Cow;

use crate::encoding::{
    Component, encode_component, encode_literal, encode_or_validate, percent_decode, validate,
};
use crate::error::ComponentError;

/// Appends `name=value` to `query`, joining with `&`.
///
/// `name` and `value` must already be encoded.
pub(crate) fn append_param(query: &mut Option<String>, name: &str, value: &str) {
    let buf = query.get_or_insert_with(String::new);
    if !buf.is_empty() {
        buf.push('&');
    }
    buf.push_str(name);
    buf.push('=');
    buf.push_str(value);
}

/// Encodes or validates one query parameter.
pub(crate) fn encode_param(
    name: &str,
    value: &str,
    encode: bool,
) -> Result<(String, String), ComponentError> {
    Ok((
        encode_or_validate(name, Component::QueryName, encode)?,
        encode_or_validate(value, Component::QueryValue, encode)?,
    ))
}

/// Prepares a whole query string.
///
/// With `encode`, each `&`-separated pair is encoded as a name and an
/// optional `=value`, keeping the separators. Without it, the text must
/// already be a legal query.
pub(crate) fn full_query(query: &str, encode: bool) -> Result<String, ComponentError> {
    if !encode {
        validate(query, Component::Query)?;
        return Ok(query.to_string());
    }
    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => format!(
                "{}={}",
                encode_component(name, Component::QueryName),
                encode_component(value, Component::QueryValue)
            ),
            None => encode_component(pair, Component::QueryName),
        })
        .collect();
    Ok(pairs.join("&"))
}

/// Decodes each pair of a raw query and encodes it again, braces included.
pub(crate) fn reencode(raw: &str) -> String {
    let pairs: Vec<String> = raw
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => format!(
                "{}={}",
                encode_literal(&percent_decode(name), Component::QueryName),
                encode_literal(&percent_decode(value), Component::QueryValue)
            ),
            None => encode_literal(&percent_decode(pair), Component::QueryName),
        })
        .collect();
    pairs.join("&")
}

/// Splits a raw query into decoded `(name, value)` pairs.
///
/// Empty pairs are skipped; a pair without `=` has an empty value.
pub(crate) fn decoded_pairs(query: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    query.split('&').filter(|p| !p.is_empty()).map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (percent_decode(name), percent_decode(value))
    })
}
