//! Core module containing the conversion pass and its supporting types

pub mod converter;
pub mod error;
pub mod field;
pub mod signature;

pub use converter::{Args, Converter, RawArgs, Wrapped, WrappedSync, convert_arguments};
pub use error::{FieldError, ValidationError};
pub use field::{
    BooleanField, DateField, DateTimeField, DecimalField, Field, FieldValue, FloatField,
    IntegerField, ScalarType, TextField, TextFormat, TimeField, builtin_field,
};
pub use signature::{Annotation, Param, Signature, SignatureBuilder};
