//! Strategies for resolving template placeholders at build time.
//!
//! A resolver lives for a single [`Template::format`](crate::Template::format)
//! call. [`PositionalResolver`] carries per-call state and must not be reused
//! across builds.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use crate::error::TemplateError;

/// Supplies the value for a placeholder name.
///
/// Closures of type `FnMut(&str) -> Result<String, TemplateError>` are
/// resolvers too.
pub trait VariableResolver {
    /// Returns the value for the placeholder `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if no value can be supplied.
    fn resolve(&mut self, name: &str) -> Result<String, TemplateError>;
}

impl<F> VariableResolver for F
where
    F: FnMut(&str) -> Result<String, TemplateError>,
{
    fn resolve(&mut self, name: &str) -> Result<String, TemplateError> {
        self(name)
    }
}

/// Fails on every placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl VariableResolver for RejectAll {
    fn resolve(&mut self, name: &str) -> Result<String, TemplateError> {
        Err(TemplateError::VariablesNotAllowed {
            name: name.to_string(),
        })
    }
}

/// Looks placeholder names up in a map.
#[derive(Debug)]
pub struct MapResolver<'a, K, V, S> {
    values: &'a HashMap<K, V, S>,
}

impl<'a, K, V, S> MapResolver<'a, K, V, S> {
    /// Creates a resolver over `values`.
    #[must_use]
    pub const fn new(values: &'a HashMap<K, V, S>) -> Self {
        Self { values }
    }
}

impl<K, V, S> VariableResolver for MapResolver<'_, K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn resolve(&mut self, name: &str) -> Result<String, TemplateError> {
        self.values
            .get(name)
            .map(|v| v.as_ref().to_string())
            .ok_or_else(|| TemplateError::MissingValue {
                name: name.to_string(),
            })
    }
}

/// Consumes values in order, one per distinct placeholder name.
///
/// The first occurrence of a name takes the next unused value; later
/// occurrences of the same name reuse it.
///
/// # Examples
///
/// ```
/// use uri_builder::{PositionalResolver, Template};
///
/// let mut resolver = PositionalResolver::new(&["x", "y", "z"]);
/// let out = Template::parse("{a}/{b}/{a}").format(&mut resolver).unwrap();
/// assert_eq!(out, "x/y/x");
/// assert_eq!(resolver.consumed(), 2);
/// ```
#[derive(Debug)]
pub struct PositionalResolver<'a, V> {
    values: &'a [V],
    next: usize,
    seen: HashMap<String, usize>,
}

impl<'a, V> PositionalResolver<'a, V> {
    /// Creates a resolver over `values`.
    #[must_use]
    pub fn new(values: &'a [V]) -> Self {
        Self {
            values,
            next: 0,
            seen: HashMap::new(),
        }
    }

    /// Returns how many values have been consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.next
    }
}

impl<V: AsRef<str>> VariableResolver for PositionalResolver<'_, V> {
    fn resolve(&mut self, name: &str) -> Result<String, TemplateError> {
        if let Some(&index) = self.seen.get(name) {
            return Ok(self.values[index].as_ref().to_string());
        }
        let value = self
            .values
            .get(self.next)
            .ok_or_else(|| TemplateError::NotEnoughValues {
                name: name.to_string(),
                supplied: self.values.len(),
            })?;
        self.seen.insert(name.to_string(), self.next);
        self.next += 1;
        Ok(value.as_ref().to_string())
    }
}
