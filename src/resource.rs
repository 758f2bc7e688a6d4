//! Path templates declared on resources and their methods.
//!
//! The builder does not know how templates are declared; it asks a
//! [`ResourceClass`] or [`ResourceMethod`] for one. [`StaticResource`] and
//! [`StaticMethod`] are plain in-memory declarations.

use crate::error::PathTemplateError;

/// A method of a resource that may declare a path template.
pub trait ResourceMethod {
    /// The method name.
    fn name(&self) -> &str;

    /// The declared path template, or `None` if the method declares none.
    ///
    /// # Errors
    ///
    /// Returns [`PathTemplateError::IllegalPath`] if the declared template is
    /// not usable as a path.
    fn path_template(&self) -> Result<Option<&str>, PathTemplateError>;
}

/// A resource that declares a path template and has methods.
pub trait ResourceClass {
    /// The resource name.
    fn name(&self) -> &str;

    /// The declared path template.
    ///
    /// # Errors
    ///
    /// Returns [`PathTemplateError::NotAnnotated`] if the resource declares no
    /// template, or [`PathTemplateError::IllegalPath`] if it is unusable.
    fn path_template(&self) -> Result<&str, PathTemplateError>;

    /// The methods of the resource.
    fn methods(&self) -> Vec<&dyn ResourceMethod>;
}

/// Finds the single template declared by methods called `method` on
/// `resource`.
///
/// Methods without a template are skipped. Several methods declaring the
/// same template count as one.
pub(crate) fn method_template<'r>(
    resource: &'r dyn ResourceClass,
    method: &str,
) -> Result<&'r str, PathTemplateError> {
    let mut found: Option<&str> = None;
    for candidate in resource.methods() {
        if candidate.name() != method {
            continue;
        }
        let Some(path) = candidate.path_template()? else {
            continue;
        };
        match found {
            Some(existing) if existing != path => {
                return Err(PathTemplateError::AmbiguousMethod {
                    resource: resource.name().to_string(),
                    method: method.to_string(),
                });
            }
            _ => found = Some(path),
        }
    }
    found.ok_or_else(|| PathTemplateError::NoMatchingMethod {
        resource: resource.name().to_string(),
        method: method.to_string(),
    })
}

/// Returns the template of `method`, failing if it declares none.
pub(crate) fn required_template<'m>(
    method: &'m dyn ResourceMethod,
) -> Result<&'m str, PathTemplateError> {
    method
        .path_template()?
        .ok_or_else(|| PathTemplateError::NotAnnotated {
            resource: method.name().to_string(),
        })
}

fn check_template<'t>(owner: &str, template: &'t str) -> Result<&'t str, PathTemplateError> {
    match template.find(['?', '#']) {
        Some(_) => Err(PathTemplateError::IllegalPath {
            resource: owner.to_string(),
            path: template.to_string(),
            reason: "a path template cannot contain '?' or '#'".to_string(),
        }),
        None => Ok(template),
    }
}

/// An in-memory [`ResourceMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMethod {
    name: String,
    path: Option<String>,
}

impl StaticMethod {
    /// A method declaring `path`.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
        }
    }

    /// A method declaring no path template.
    #[must_use]
    pub fn unannotated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }
}

impl ResourceMethod for StaticMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn path_template(&self) -> Result<Option<&str>, PathTemplateError> {
        self.path
            .as_deref()
            .map(|p| check_template(&self.name, p))
            .transpose()
    }
}

/// An in-memory [`ResourceClass`].
///
/// # Examples
///
/// ```
/// use uri_builder::{StaticMethod, StaticResource, UriBuilder};
///
/// let orders = StaticResource::new("Orders", "/orders")
///     .with_method(StaticMethod::new("get", "{id}"));
///
/// let mut builder = UriBuilder::new();
/// builder.resource_method_path(&orders, "get")?;
/// assert_eq!(builder.to_string(), "orders/{id}");
/// # Ok::<(), uri_builder::UriBuilderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticResource {
    name: String,
    path: Option<String>,
    methods: Vec<StaticMethod>,
}

impl StaticResource {
    /// A resource declaring `path`.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            methods: Vec::new(),
        }
    }

    /// A resource declaring no path template.
    #[must_use]
    pub fn unannotated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            methods: Vec::new(),
        }
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: StaticMethod) -> Self {
        self.methods.push(method);
        self
    }
}

impl ResourceClass for StaticResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn path_template(&self) -> Result<&str, PathTemplateError> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| PathTemplateError::NotAnnotated {
                resource: self.name.clone(),
            })?;
        check_template(&self.name, path)
    }

    fn methods(&self) -> Vec<&dyn ResourceMethod> {
        self.methods
            .iter()
            .map(|m| m as &dyn ResourceMethod)
            .collect()
    }
}
