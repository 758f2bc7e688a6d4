//! Lexical `{name}` templates.

use std::fmt;

use crate::constants::{ESCAPED_CLOSE, ESCAPED_OPEN, TEMPLATE_CLOSE, TEMPLATE_OPEN};
use crate::error::TemplateError;
use crate::resolver::VariableResolver;

/// One piece of a parsed [`Template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text copied verbatim
    Literal(String),
    /// A `{name}` placeholder, holding the name without braces
    Variable(String),
}

/// A string split into literal runs and `{name}` placeholders.
///
/// Parsing never fails: a brace that does not open a well-formed
/// placeholder is kept as literal text.
///
/// # Examples
///
/// ```
/// use uri_builder::{RejectAll, Template};
///
/// let template = Template::parse("users/{id}/posts/{id}");
/// assert_eq!(template.variable_names(), vec!["id"]);
///
/// let literal = Template::parse("no/placeholders");
/// assert_eq!(literal.format(&mut RejectAll).unwrap(), "no/placeholders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Parses `source` into tokens.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find(TEMPLATE_OPEN) {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + TEMPLATE_OPEN.len_utf8()..];
            match placeholder_name(after_open) {
                Some(name) => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Variable(name.to_string()));
                    rest = &after_open[name.len() + TEMPLATE_CLOSE.len_utf8()..];
                }
                None => {
                    literal.push(TEMPLATE_OPEN);
                    rest = after_open;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self { tokens }
    }

    /// Returns the parsed tokens in source order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns true if the template contains at least one placeholder.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Variable(_)))
    }

    /// Returns the distinct placeholder names in first-occurrence order.
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let variables = self.tokens.iter().filter_map(|t| match t {
            Token::Variable(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        });
        for name in variables {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Substitutes every placeholder with the value returned by `resolver`.
    ///
    /// Tokens are visited left to right; resolved values are copied verbatim.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `resolver`.
    pub fn format<R>(&self, resolver: &mut R) -> Result<String, TemplateError>
    where
        R: VariableResolver + ?Sized,
    {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Variable(name) => out.push_str(&resolver.resolve(name)?),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                Token::Literal(text) => f.write_str(text)?,
                Token::Variable(name) => write!(f, "{TEMPLATE_OPEN}{name}{TEMPLATE_CLOSE}")?,
            }
        }
        Ok(())
    }
}

/// Returns the placeholder name if `s` (the text after an opening brace)
/// starts with `name}`.
fn placeholder_name(s: &str) -> Option<&str> {
    let close = s.find(TEMPLATE_CLOSE)?;
    let name = &s[..close];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    valid.then_some(name)
}

/// Appends `text` to `out`, escaping braces that are not part of a
/// placeholder so a later [`Template::parse`] reads them as literal text
/// and the URI parser never sees them raw.
pub(crate) fn push_escaping_literal_braces(out: &mut String, text: &str) {
    if !text.contains([TEMPLATE_OPEN, TEMPLATE_CLOSE]) {
        out.push_str(text);
        return;
    }
    for token in Template::parse(text).tokens {
        match token {
            Token::Literal(literal) => {
                for c in literal.chars() {
                    match c {
                        TEMPLATE_OPEN => out.push_str(ESCAPED_OPEN),
                        TEMPLATE_CLOSE => out.push_str(ESCAPED_CLOSE),
                        _ => out.push(c),
                    }
                }
            }
            Token::Variable(name) => {
                out.push(TEMPLATE_OPEN);
                out.push_str(&name);
                out.push(TEMPLATE_CLOSE);
            }
        }
    }
}

/// Appends `text`, escaping literal braces only when `convert_braces` is set.
pub(crate) fn push_text(out: &mut String, text: &str, convert_braces: bool) {
    if convert_braces {
        push_escaping_literal_braces(out, text);
    } else {
        out.push_str(text);
    }
}
