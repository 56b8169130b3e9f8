//! Declared handler signatures
//!
//! Handlers declare their parameters once, as a value: an ordered list of
//! names, each with an annotation selecting a conversion rule and an optional
//! default. The signature is built either through [`SignatureBuilder`] or
//! from a config document, then cached for the handler's lifetime.

use crate::core::field::{Field, ScalarType, builtin_field};
use std::sync::Arc;

/// How a declared parameter converts
#[derive(Debug, Clone)]
pub enum Annotation {
    /// No declared kind; the value passes through as text
    None,
    /// A built-in scalar kind, resolved through the shared table
    Scalar(ScalarType),
    /// An explicit validator instance, used as-is
    Validator(Arc<dyn Field>),
    /// A declared kind the table does not recognize; the value passes through
    Opaque(String),
}

impl Annotation {
    /// Resolve the validator this annotation selects, if any
    pub fn field(&self) -> Option<Arc<dyn Field>> {
        match self {
            Annotation::None | Annotation::Opaque(_) => None,
            Annotation::Scalar(kind) => Some(builtin_field(*kind)),
            Annotation::Validator(field) => Some(Arc::clone(field)),
        }
    }
}

/// One declared parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub annotation: Annotation,
    pub default: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: None,
        }
    }

    /// Declare a default, applied as a raw value when the parameter is absent
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Whether this parameter is a query-style option.
    ///
    /// A declared default doubles as the marker that the parameter may be
    /// filled from the query string rather than a path capture.
    pub fn is_option(&self) -> bool {
        self.default.is_some()
    }
}

/// An ordered parameter declaration for one handler
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Build a signature from declared parameters.
    ///
    /// A name declared twice keeps its first position with the later
    /// declaration, as if the parameter had been re-annotated.
    pub fn new(params: Vec<Param>) -> Self {
        let mut deduped: Vec<Param> = Vec::with_capacity(params.len());
        for param in params {
            match deduped.iter_mut().find(|p| p.name == param.name) {
                Some(existing) => *existing = param,
                None => deduped.push(param),
            }
        }
        Self { params: deduped }
    }

    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::new()
    }

    /// Declared parameters, in declaration order
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Look up one declared parameter by name
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Fluent builder for [`Signature`]
///
/// # Example
///
/// ```ignore
/// let signature = Signature::builder()
///     .param("pk", ScalarType::Integer)
///     .param_with_default("limit", ScalarType::Integer, "20")
///     .text("q")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<Param>,
}

impl SignatureBuilder {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Declare a parameter with a built-in scalar kind
    pub fn param(mut self, name: impl Into<String>, kind: ScalarType) -> Self {
        self.params.push(Param::new(name, Annotation::Scalar(kind)));
        self
    }

    /// Declare a scalar parameter with a default raw value
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        kind: ScalarType,
        default: impl Into<String>,
    ) -> Self {
        self.params
            .push(Param::new(name, Annotation::Scalar(kind)).with_default(default));
        self
    }

    /// Declare a parameter validated by an explicit field instance
    pub fn validator(mut self, name: impl Into<String>, field: impl Field + 'static) -> Self {
        self.params
            .push(Param::new(name, Annotation::Validator(Arc::new(field))));
        self
    }

    /// Declare an explicitly validated parameter with a default raw value
    pub fn validator_with_default(
        mut self,
        name: impl Into<String>,
        field: impl Field + 'static,
        default: impl Into<String>,
    ) -> Self {
        self.params.push(
            Param::new(name, Annotation::Validator(Arc::new(field))).with_default(default),
        );
        self
    }

    /// Declare an unannotated parameter; its value passes through as text
    pub fn text(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::new(name, Annotation::None));
        self
    }

    /// Declare an unannotated parameter with a default raw value
    pub fn text_with_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.params
            .push(Param::new(name, Annotation::None).with_default(default));
        self
    }

    /// Declare a parameter with a kind the table does not recognize
    pub fn opaque(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.params
            .push(Param::new(name, Annotation::Opaque(kind.into())));
        self
    }

    pub fn build(self) -> Signature {
        Signature::new(self.params)
    }
}
