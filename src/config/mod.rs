//! Declarative handler signatures loaded from YAML
//!
//! Signatures can be declared as data instead of through the builder:
//!
//! ```yaml
//! handlers:
//!   - name: get_todo
//!     params:
//!       - name: pk
//!         kind: integer
//!       - name: limit
//!         kind: integer
//!         default: 20
//! ```
//!
//! Recognized kinds map to the built-in scalar table; constraint keys
//! (`minimum`, `maximum`, `max_length`, `pattern`, `format`) promote the
//! declaration to an explicit validator instance. Unknown kinds stay
//! declared and pass values through as text.

use crate::core::field::{
    DecimalField, FloatField, IntegerField, ScalarType, TextField, TextFormat,
};
use crate::core::signature::{Annotation, Param, Signature};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading documents or building signatures from them
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse signatures config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown handler '{0}'")]
    UnknownHandler(String),

    #[error("invalid pattern for parameter '{param}': {source}")]
    InvalidPattern {
        param: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown format '{format}' for parameter '{param}'")]
    UnknownFormat { param: String, format: String },

    #[error("invalid `{constraint}` for parameter '{param}': expected {expected}")]
    InvalidBound {
        param: String,
        constraint: &'static str,
        expected: &'static str,
    },

    #[error("constraint `{constraint}` does not apply to kind '{kind}' (parameter '{param}')")]
    MisplacedConstraint {
        param: String,
        constraint: &'static str,
        kind: String,
    },

    #[error("parameter '{param}' declares both `pattern` and `format`")]
    ConflictingConstraints { param: String },
}

/// A numeric constraint bound as written in a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Bound {
    Integer(i64),
    Float(f64),
}

impl Bound {
    fn as_integer(&self) -> Option<i64> {
        match self {
            Bound::Integer(i) => Some(*i),
            Bound::Float(_) => None,
        }
    }

    fn as_float(&self) -> f64 {
        match self {
            Bound::Integer(i) => *i as f64,
            Bound::Float(f) => *f,
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Bound::Integer(i) => Some(Decimal::from(*i)),
            Bound::Float(f) => Decimal::try_from(*f).ok(),
        }
    }
}

/// One declared parameter in a config document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name, matching a path capture or query key
    pub name: String,

    /// Declared kind; absent means pass-through text
    #[serde(default)]
    pub kind: Option<String>,

    /// Default raw value; also marks the parameter as a query option
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub default: Option<String>,

    /// Lower bound, for numeric kinds
    #[serde(default)]
    pub minimum: Option<Bound>,

    /// Upper bound, for numeric kinds
    #[serde(default)]
    pub maximum: Option<Bound>,

    /// Maximum character count, for string kinds
    #[serde(default)]
    pub max_length: Option<usize>,

    /// Regex the value must match, for string kinds
    #[serde(default)]
    pub pattern: Option<String>,

    /// Named format check (`email`, `uuid`, `url`, `phone`), for string kinds
    #[serde(default)]
    pub format: Option<String>,
}

/// Defaults are raw strings, but documents naturally write them as scalars
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(serde::de::Error::custom("default must be a scalar")),
    }
}

impl ParamSpec {
    /// Build the declared parameter this spec describes
    fn build(&self) -> Result<Param, ConfigError> {
        let mut param = Param::new(&self.name, self.annotation()?);
        if let Some(default) = &self.default {
            param = param.with_default(default);
        }
        Ok(param)
    }

    fn annotation(&self) -> Result<Annotation, ConfigError> {
        let kind = match self.kind.as_deref() {
            None | Some("string") | Some("str") | Some("text") => {
                if self.has_bounds() {
                    return Err(ConfigError::MisplacedConstraint {
                        param: self.name.clone(),
                        constraint: self.first_bound(),
                        kind: "string".to_string(),
                    });
                }
                return if self.has_text_constraints() {
                    Ok(Annotation::Validator(Arc::new(self.text_field()?)))
                } else {
                    Ok(Annotation::None)
                };
            }
            Some(kind) => kind,
        };

        match ScalarType::parse(kind) {
            Some(scalar) => self.scalar_annotation(scalar, kind),
            None => {
                tracing::debug!(
                    "unknown kind '{}' for parameter '{}', values will pass through",
                    kind,
                    self.name
                );
                Ok(Annotation::Opaque(kind.to_string()))
            }
        }
    }

    fn scalar_annotation(&self, scalar: ScalarType, kind: &str) -> Result<Annotation, ConfigError> {
        if self.has_text_constraints() {
            return Err(ConfigError::MisplacedConstraint {
                param: self.name.clone(),
                constraint: self.first_text_constraint(),
                kind: kind.to_string(),
            });
        }
        if !self.has_bounds() {
            return Ok(Annotation::Scalar(scalar));
        }

        let annotation = match scalar {
            ScalarType::Integer => {
                let mut field = IntegerField::new();
                if let Some(bound) = &self.minimum {
                    field = field.minimum(self.integer_bound(bound, "minimum")?);
                }
                if let Some(bound) = &self.maximum {
                    field = field.maximum(self.integer_bound(bound, "maximum")?);
                }
                Annotation::Validator(Arc::new(field))
            }
            ScalarType::Float => {
                let mut field = FloatField::new();
                if let Some(bound) = &self.minimum {
                    field = field.minimum(bound.as_float());
                }
                if let Some(bound) = &self.maximum {
                    field = field.maximum(bound.as_float());
                }
                Annotation::Validator(Arc::new(field))
            }
            ScalarType::Decimal => {
                let mut field = DecimalField::new();
                if let Some(bound) = &self.minimum {
                    field = field.minimum(self.decimal_bound(bound, "minimum")?);
                }
                if let Some(bound) = &self.maximum {
                    field = field.maximum(self.decimal_bound(bound, "maximum")?);
                }
                Annotation::Validator(Arc::new(field))
            }
            _ => {
                return Err(ConfigError::MisplacedConstraint {
                    param: self.name.clone(),
                    constraint: self.first_bound(),
                    kind: kind.to_string(),
                });
            }
        };
        Ok(annotation)
    }

    fn text_field(&self) -> Result<TextField, ConfigError> {
        if self.pattern.is_some() && self.format.is_some() {
            return Err(ConfigError::ConflictingConstraints {
                param: self.name.clone(),
            });
        }
        let mut field = TextField::new();
        if let Some(max_length) = self.max_length {
            field = field.max_length(max_length);
        }
        if let Some(pattern) = &self.pattern {
            let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                param: self.name.clone(),
                source,
            })?;
            field = field.format(TextFormat::Pattern(regex));
        }
        if let Some(name) = &self.format {
            let format = TextFormat::parse(name).ok_or_else(|| ConfigError::UnknownFormat {
                param: self.name.clone(),
                format: name.clone(),
            })?;
            field = field.format(format);
        }
        Ok(field)
    }

    fn integer_bound(&self, bound: &Bound, constraint: &'static str) -> Result<i64, ConfigError> {
        bound.as_integer().ok_or_else(|| ConfigError::InvalidBound {
            param: self.name.clone(),
            constraint,
            expected: "an integer",
        })
    }

    fn decimal_bound(
        &self,
        bound: &Bound,
        constraint: &'static str,
    ) -> Result<Decimal, ConfigError> {
        bound.as_decimal().ok_or_else(|| ConfigError::InvalidBound {
            param: self.name.clone(),
            constraint,
            expected: "a finite number",
        })
    }

    fn has_bounds(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    fn has_text_constraints(&self) -> bool {
        self.max_length.is_some() || self.pattern.is_some() || self.format.is_some()
    }

    fn first_bound(&self) -> &'static str {
        if self.minimum.is_some() {
            "minimum"
        } else {
            "maximum"
        }
    }

    fn first_text_constraint(&self) -> &'static str {
        if self.max_length.is_some() {
            "max_length"
        } else if self.pattern.is_some() {
            "pattern"
        } else {
            "format"
        }
    }
}

/// One handler's declared parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerSpec {
    /// Handler name, used to look the signature up
    pub name: String,

    /// Declared parameters, in declaration order
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl HandlerSpec {
    /// Build the declared signature for this handler
    pub fn signature(&self) -> Result<Signature, ConfigError> {
        let mut params = Vec::with_capacity(self.params.len());
        for spec in &self.params {
            params.push(spec.build()?);
        }
        Ok(Signature::new(params))
    }
}

/// Handler signatures for a whole application, declared as data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignaturesConfig {
    /// Handler declarations
    #[serde(default)]
    pub handlers: Vec<HandlerSpec>,
}

impl SignaturesConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge config documents.
    ///
    /// A handler declared again keeps its first position with the later
    /// declaration, so application documents can override library ones.
    pub fn merge(configs: Vec<SignaturesConfig>) -> SignaturesConfig {
        let mut handlers: Vec<HandlerSpec> = Vec::new();
        for config in configs {
            for handler in config.handlers {
                match handlers.iter_mut().find(|h| h.name == handler.name) {
                    Some(existing) => *existing = handler,
                    None => handlers.push(handler),
                }
            }
        }
        SignaturesConfig { handlers }
    }

    /// Look up one handler declaration by name
    pub fn handler(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers.iter().find(|h| h.name == name)
    }

    /// Build the declared signature for one handler
    pub fn signature(&self, handler: &str) -> Result<Signature, ConfigError> {
        self.handler(handler)
            .ok_or_else(|| ConfigError::UnknownHandler(handler.to_string()))?
            .signature()
    }
}
