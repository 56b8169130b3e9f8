//! Axum extractor for converted route arguments
//!
//! [`Converted`] collects one call's raw arguments from the request: decoded
//! path captures bind declared parameters, and declared query-style options
//! (parameters with a default) fill from the query string, falling back to
//! their default. The route's converter is read from request extensions,
//! attached with [`Converter::layer`].

use crate::core::converter::{Args, Converter, RawArgs};
use axum::{
    Extension, Json,
    extract::{FromRequestParts, Query, RawPathParams},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

/// Converted route arguments for a handler
///
/// # Usage
///
/// ```rust,ignore
/// async fn get_todo(Converted(args): Converted) -> Json<Value> {
///     let pk = args.integer("pk").expect("declared as integer");
///     // pk is already converted and validated
/// }
/// ```
pub struct Converted(pub Args);

impl Converted {
    /// Get the inner converted arguments
    pub fn into_inner(self) -> Args {
        self.0
    }
}

impl std::ops::Deref for Converted {
    type Target = Args;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Converted
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(converter) =
            match Extension::<Arc<Converter>>::from_request_parts(parts, state).await {
                Ok(extension) => extension,
                Err(_) => {
                    return Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "No converter attached to this route"
                        })),
                    )
                        .into_response());
                }
            };

        // Path captures arrive percent-decoded and bind by name
        let mut supplied = RawArgs::new();
        if let Ok(path) = RawPathParams::from_request_parts(parts, state).await {
            for (name, value) in &path {
                supplied.insert(name.to_string(), value.to_string());
            }
        }

        // Only declared options read the query string
        let query = query_pairs(parts);
        for param in converter.signature().params() {
            if !param.is_option() || supplied.contains_key(&param.name) {
                continue;
            }
            // First occurrence wins for repeated query keys
            if let Some((_, value)) = query.iter().find(|(name, _)| name == &param.name) {
                supplied.insert(param.name.clone(), value.clone());
            }
        }

        match converter.convert(supplied) {
            Ok(args) => Ok(Converted(args)),
            Err(error) => {
                tracing::debug!("rejecting request: {}", error);
                Err(error.into_response())
            }
        }
    }
}

/// Decoded query pairs, empty when the query string is absent or unreadable
fn query_pairs(parts: &Parts) -> Vec<(String, String)> {
    match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        Ok(Query(pairs)) => pairs,
        Err(_) => Vec::new(),
    }
}
