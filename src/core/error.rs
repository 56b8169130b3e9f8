//! Aggregate validation errors and their HTTP translation
//!
//! A conversion pass either substitutes every converted value or fails once
//! with a [`ValidationError`] carrying the message for every field that did
//! not validate. Over HTTP the error renders as a 400 whose `detail` payload
//! mirrors the field-to-message pairs, so clients see all offending fields in
//! a single response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

/// A single field failure produced during one conversion pass
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field failure from one conversion pass, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// The collected failures, in declaration order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields, in declaration order
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Field-to-message object mirrored into the HTTP `detail` payload
    pub fn detail(&self) -> Value {
        let mut detail = serde_json::Map::new();
        for error in &self.errors {
            detail.insert(error.field.clone(), Value::String(error.message.clone()));
        }
        Value::Object(detail)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "Validation errors: {}", msgs.join(", "))
    }
}

impl std::error::Error for ValidationError {}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Validation failed",
                "status": 400,
                "detail": self.detail(),
            })),
        )
            .into_response()
    }
}
