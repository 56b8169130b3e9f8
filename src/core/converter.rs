//! The argument conversion pass and handler wrappers
//!
//! A [`Converter`] binds one call's raw name-to-string values against a
//! declared [`Signature`]: defaults fill absent parameters, each annotated
//! parameter runs through its validator, and every failure is collected so
//! the call fails at most once, with all offending fields named. Handlers
//! keep their calling convention: [`Wrapped`] awaits an async handler,
//! [`WrappedSync`] calls a blocking one, and the pass itself never suspends
//! and performs no I/O.

use crate::core::error::{FieldError, ValidationError};
use crate::core::field::FieldValue;
use crate::core::signature::{Annotation, Signature};
use axum::Extension;
use indexmap::IndexMap;
use std::future::Future;
use std::sync::Arc;

/// Raw name-to-value pairs for one call, in bind order
pub type RawArgs = IndexMap<String, String>;

/// Converted arguments, in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    values: IndexMap<String, FieldValue>,
}

impl Args {
    /// Look up a converted value by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The converted text value for `name`, if it is text
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_text())
    }

    /// The converted integer value for `name`, if it is an integer
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_integer())
    }

    /// The converted float value for `name`, if it is a float
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_float())
    }

    /// The converted boolean value for `name`, if it is a boolean
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_boolean())
    }

    /// The converted decimal value for `name`, if it is a decimal
    pub fn decimal(&self, name: &str) -> Option<rust_decimal::Decimal> {
        self.get(name).and_then(|v| v.as_decimal())
    }

    /// The converted date value for `name`, if it is a date
    pub fn date(&self, name: &str) -> Option<chrono::NaiveDate> {
        self.get(name).and_then(|v| v.as_date())
    }

    /// The converted time value for `name`, if it is a time
    pub fn time(&self, name: &str) -> Option<chrono::NaiveTime> {
        self.get(name).and_then(|v| v.as_time())
    }

    /// The converted datetime value for `name`, if it is a datetime
    pub fn datetime(&self, name: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        self.get(name).and_then(|v| v.as_datetime())
    }

    /// Iterate converted values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Converts one call's raw arguments against a declared signature
#[derive(Debug, Clone)]
pub struct Converter {
    signature: Signature,
}

impl Converter {
    pub fn new(signature: Signature) -> Self {
        Self { signature }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Package this converter as a per-route extension layer.
    ///
    /// The [`Converted`](crate::server::Converted) extractor reads it back
    /// from request extensions.
    pub fn layer(self) -> Extension<Arc<Converter>> {
        Extension(Arc::new(self))
    }

    /// Run one conversion pass.
    ///
    /// Declared parameters bind first, in declaration order, falling back to
    /// their default when unsupplied; values supplied past the declaration
    /// pass through as text after them. All field failures are collected
    /// before the pass fails, so the error names every offending field.
    pub fn convert(&self, mut supplied: RawArgs) -> Result<Args, ValidationError> {
        let mut values = IndexMap::with_capacity(supplied.len().max(self.signature.len()));
        let mut errors: Vec<FieldError> = Vec::new();

        for param in self.signature.params() {
            let raw = supplied
                .shift_remove(&param.name)
                .or_else(|| param.default.clone());
            let Some(raw) = raw else {
                errors.push(FieldError::new(&param.name, "This field is required."));
                continue;
            };
            match param.annotation.field() {
                Some(field) => match field.validate(&raw) {
                    Ok(value) => {
                        values.insert(param.name.clone(), value);
                    }
                    Err(message) => errors.push(FieldError::new(&param.name, message)),
                },
                None => {
                    if let Annotation::Opaque(kind) = &param.annotation {
                        tracing::debug!(
                            "no validator for kind '{}', passing '{}' through as text",
                            kind,
                            param.name
                        );
                    }
                    values.insert(param.name.clone(), FieldValue::Text(raw));
                }
            }
        }

        for (name, raw) in supplied {
            values.insert(name, FieldValue::Text(raw));
        }

        if errors.is_empty() {
            Ok(Args { values })
        } else {
            let error = ValidationError::new(errors);
            tracing::debug!("argument conversion failed: {}", error);
            Err(error)
        }
    }

    /// Wrap an async handler, converting arguments before each call
    pub fn wrap<H, Fut, T>(self, handler: H) -> Wrapped<H>
    where
        H: Fn(Args) -> Fut,
        Fut: Future<Output = T>,
    {
        Wrapped {
            converter: Arc::new(self),
            handler,
        }
    }

    /// Wrap a blocking handler, converting arguments before each call
    pub fn wrap_sync<H, T>(self, handler: H) -> WrappedSync<H>
    where
        H: Fn(Args) -> T,
    {
        WrappedSync {
            converter: Arc::new(self),
            handler,
        }
    }
}

/// Wrap an async handler so each call converts its arguments first.
///
/// The wrapped handler has the same external contract as the original: same
/// parameters by name, same output, still async.
pub fn convert_arguments<H, Fut, T>(signature: Signature, handler: H) -> Wrapped<H>
where
    H: Fn(Args) -> Fut,
    Fut: Future<Output = T>,
{
    Converter::new(signature).wrap(handler)
}

/// An async handler with argument conversion applied on every call
#[derive(Clone)]
pub struct Wrapped<H> {
    converter: Arc<Converter>,
    handler: H,
}

impl<H, Fut, T> Wrapped<H>
where
    H: Fn(Args) -> Fut,
    Fut: Future<Output = T>,
{
    /// Convert, then await the handler.
    ///
    /// The conversion pass runs before the first suspension point; the only
    /// await is the wrapped handler itself.
    pub async fn call(&self, supplied: RawArgs) -> Result<T, ValidationError> {
        let args = self.converter.convert(supplied)?;
        Ok((self.handler)(args).await)
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}

/// A blocking handler with argument conversion applied on every call
#[derive(Clone)]
pub struct WrappedSync<H> {
    converter: Arc<Converter>,
    handler: H,
}

impl<H, T> WrappedSync<H>
where
    H: Fn(Args) -> T,
{
    /// Convert, then call the handler
    pub fn call(&self, supplied: RawArgs) -> Result<T, ValidationError> {
        let args = self.converter.convert(supplied)?;
        Ok((self.handler)(args))
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}
