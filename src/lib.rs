//! # Tapas
//!
//! Typed argument conversion for axum handlers.
//!
//! Handlers declare their parameters once, as a value; incoming string-typed
//! request values (path captures, query options) are coerced into the
//! declared types through field validators before the handler runs, and
//! every mismatch in a call surfaces together as a single structured 400.
//!
//! ## Features
//!
//! - **Declared signatures**: parameters as a first-class value, built
//!   fluently or loaded from YAML
//! - **Fixed scalar table**: `integer`, `float`, `boolean`, `decimal`,
//!   `date`, `time`, `datetime` map to shared pre-built validators
//! - **Explicit validators**: field instances with bounds, lengths and
//!   formats are honored as-is
//! - **Aggregate errors**: all field failures in a call surface as one
//!   HTTP 400 whose `detail` payload names every offending field
//! - **Pass-through by default**: unannotated and unrecognized kinds never
//!   fail, the raw text flows through
//! - **Calling convention preserved**: async handlers stay async, blocking
//!   handlers stay blocking, and conversion itself never suspends
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tapas::prelude::*;
//!
//! async fn get_todo(Converted(args): Converted) -> Json<serde_json::Value> {
//!     let pk = args.integer("pk").expect("declared as integer");
//!     let limit = args.integer("limit").expect("declared with a default");
//!     Json(serde_json::json!({ "pk": pk, "limit": limit }))
//! }
//!
//! let converter = Converter::new(
//!     Signature::builder()
//!         .param("pk", ScalarType::Integer)
//!         .param_with_default("limit", ScalarType::Integer, "20")
//!         .build(),
//! );
//!
//! let app = Router::new().route("/todos/{pk}", get(get_todo).layer(converter.layer()));
//! serve(app, "127.0.0.1:3000").await?;
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        converter::{Args, Converter, RawArgs, Wrapped, WrappedSync, convert_arguments},
        error::{FieldError, ValidationError},
        field::{
            BooleanField, DateField, DateTimeField, DecimalField, Field, FieldValue, FloatField,
            IntegerField, ScalarType, TextField, TextFormat, TimeField, builtin_field,
        },
        signature::{Annotation, Param, Signature, SignatureBuilder},
    };

    // === Config ===
    pub use crate::config::{ConfigError, HandlerSpec, ParamSpec, SignaturesConfig};

    // === Server ===
    pub use crate::server::{Converted, serve};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Json, Router,
        routing::{delete, get, post, put},
    };
}
