//! Field validators and converted argument values

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// A polymorphic converted value produced by a field validator
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Get the value as text if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float if possible
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a boolean if possible
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a decimal if possible
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the value as a date if possible
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the value as a time if possible
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            FieldValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Get the value as a datetime if possible
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// Scalar kinds with a pre-built validator in the built-in table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Float,
    Boolean,
    Decimal,
    Date,
    Time,
    DateTime,
}

impl ScalarType {
    /// Parse a declared kind name as written in config documents
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "integer" | "int" => Some(ScalarType::Integer),
            "float" | "number" => Some(ScalarType::Float),
            "boolean" | "bool" => Some(ScalarType::Boolean),
            "decimal" => Some(ScalarType::Decimal),
            "date" => Some(ScalarType::Date),
            "time" => Some(ScalarType::Time),
            "datetime" => Some(ScalarType::DateTime),
            _ => None,
        }
    }

    /// Canonical kind name
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
            ScalarType::Decimal => "decimal",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::DateTime => "datetime",
        }
    }
}

/// A validation rule that coerces one raw string into a typed value
pub trait Field: fmt::Debug + Send + Sync {
    /// Validate a raw value, returning the converted value or a message
    fn validate(&self, raw: &str) -> Result<FieldValue, String>;
}

/// Look up the pre-built validator for a scalar kind.
///
/// The table is built once and read-only afterwards; instances are shared.
pub fn builtin_field(kind: ScalarType) -> Arc<dyn Field> {
    static TABLE: OnceLock<HashMap<ScalarType, Arc<dyn Field>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let mut table: HashMap<ScalarType, Arc<dyn Field>> = HashMap::new();
        table.insert(ScalarType::Integer, Arc::new(IntegerField::new()));
        table.insert(ScalarType::Float, Arc::new(FloatField::new()));
        table.insert(ScalarType::Boolean, Arc::new(BooleanField::new()));
        table.insert(ScalarType::Decimal, Arc::new(DecimalField::new()));
        table.insert(ScalarType::Date, Arc::new(DateField::new()));
        table.insert(ScalarType::Time, Arc::new(TimeField::new()));
        table.insert(ScalarType::DateTime, Arc::new(DateTimeField::new()));
        table
    });
    Arc::clone(&table[&kind])
}

/// Integer field with optional bounds.
///
/// Numeric strings with a fractional part truncate toward zero, so `"4.2"`
/// converts to `4`.
#[derive(Debug, Clone, Default)]
pub struct IntegerField {
    minimum: Option<i64>,
    maximum: Option<i64>,
}

impl IntegerField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }
}

impl Field for IntegerField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        let parsed = match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                let float: f64 = raw
                    .parse()
                    .map_err(|_| "Must be a valid integer.".to_string())?;
                // `f64 as i64` saturates at the type bounds
                if !float.is_finite() || float < i64::MIN as f64 || float >= i64::MAX as f64 {
                    return Err("Must be a valid integer.".to_string());
                }
                float.trunc() as i64
            }
        };
        if let Some(minimum) = self.minimum {
            if parsed < minimum {
                return Err(format!("Must be greater than or equal to {minimum}."));
            }
        }
        if let Some(maximum) = self.maximum {
            if parsed > maximum {
                return Err(format!("Must be less than or equal to {maximum}."));
            }
        }
        Ok(FieldValue::Integer(parsed))
    }
}

/// Finite floating-point field with optional bounds
#[derive(Debug, Clone, Default)]
pub struct FloatField {
    minimum: Option<f64>,
    maximum: Option<f64>,
}

impl FloatField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }
}

impl Field for FloatField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        let parsed: f64 = raw
            .parse()
            .map_err(|_| "Must be a valid number.".to_string())?;
        // `str::parse` accepts "inf" and "NaN"
        if !parsed.is_finite() {
            return Err("Must be a valid number.".to_string());
        }
        if let Some(minimum) = self.minimum {
            if parsed < minimum {
                return Err(format!("Must be greater than or equal to {minimum}."));
            }
        }
        if let Some(maximum) = self.maximum {
            if parsed > maximum {
                return Err(format!("Must be less than or equal to {maximum}."));
            }
        }
        Ok(FieldValue::Float(parsed))
    }
}

/// Boolean field accepting `true/false`, `1/0` and `on/off`, case-insensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanField;

impl BooleanField {
    pub fn new() -> Self {
        Self
    }
}

impl Field for BooleanField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(FieldValue::Boolean(true)),
            "false" | "0" | "off" => Ok(FieldValue::Boolean(false)),
            _ => Err("Must be a valid boolean.".to_string()),
        }
    }
}

/// Exact decimal field with optional bounds
#[derive(Debug, Clone, Default)]
pub struct DecimalField {
    minimum: Option<Decimal>,
    maximum: Option<Decimal>,
}

impl DecimalField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum(mut self, minimum: Decimal) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: Decimal) -> Self {
        self.maximum = Some(maximum);
        self
    }
}

impl Field for DecimalField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        let parsed: Decimal = raw
            .parse()
            .map_err(|_| "Must be a valid decimal.".to_string())?;
        if let Some(minimum) = self.minimum {
            if parsed < minimum {
                return Err(format!("Must be greater than or equal to {minimum}."));
            }
        }
        if let Some(maximum) = self.maximum {
            if parsed > maximum {
                return Err(format!("Must be less than or equal to {maximum}."));
            }
        }
        Ok(FieldValue::Decimal(parsed))
    }
}

/// ISO `YYYY-MM-DD` date field
#[derive(Debug, Clone, Copy, Default)]
pub struct DateField;

impl DateField {
    pub fn new() -> Self {
        Self
    }
}

impl Field for DateField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        raw.parse::<NaiveDate>()
            .map(FieldValue::Date)
            .map_err(|_| "Must be a valid date.".to_string())
    }
}

/// `HH:MM[:SS[.fff]]` time field
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeField;

impl TimeField {
    pub fn new() -> Self {
        Self
    }
}

impl Field for TimeField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        raw.parse::<NaiveTime>()
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map(FieldValue::Time)
            .map_err(|_| "Must be a valid time.".to_string())
    }
}

/// Datetime field: RFC 3339 with offset, or naive ISO treated as UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeField;

impl DateTimeField {
    pub fn new() -> Self {
        Self
    }
}

impl Field for DateTimeField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Ok(FieldValue::DateTime(with_offset.with_timezone(&Utc)));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| FieldValue::DateTime(naive.and_utc()))
            .map_err(|_| "Must be a valid datetime.".to_string())
    }
}

/// Text field with optional length bound and format check.
///
/// Only ever used as an explicit annotation. Bare text is a pass-through and
/// never enters the built-in table.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    max_length: Option<usize>,
    format: Option<TextFormat>,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn format(mut self, format: TextFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl Field for TextField {
    fn validate(&self, raw: &str) -> Result<FieldValue, String> {
        if let Some(max_length) = self.max_length {
            if raw.chars().count() > max_length {
                return Err(format!("Must have no more than {max_length} characters."));
            }
        }
        if let Some(format) = &self.format {
            if !format.is_match(raw) {
                return Err(format.message().to_string());
            }
        }
        Ok(FieldValue::Text(raw.to_string()))
    }
}

/// Text format checks for automatic validation
#[derive(Debug, Clone)]
pub enum TextFormat {
    Email,
    Uuid,
    Url,
    Phone,
    Pattern(Regex),
}

impl TextFormat {
    /// Parse a format name as written in config documents
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "email" => Some(TextFormat::Email),
            "uuid" => Some(TextFormat::Uuid),
            "url" => Some(TextFormat::Url),
            "phone" => Some(TextFormat::Phone),
            _ => None,
        }
    }

    /// Check a raw value against this format
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            TextFormat::Email => Self::is_valid_email(value),
            TextFormat::Uuid => Uuid::parse_str(value).is_ok(),
            TextFormat::Url => Self::is_valid_url(value),
            TextFormat::Phone => Self::is_valid_phone(value),
            TextFormat::Pattern(regex) => regex.is_match(value),
        }
    }

    fn message(&self) -> &'static str {
        match self {
            TextFormat::Email => "Must be a valid email address.",
            TextFormat::Uuid => "Must be a valid UUID.",
            TextFormat::Url => "Must be a valid URL.",
            TextFormat::Phone => "Must be a valid phone number.",
            TextFormat::Pattern(_) => "Must match the expected pattern.",
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
        });
        regex.is_match(email)
    }

    fn is_valid_url(url: &str) -> bool {
        static URL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());
        regex.is_match(url)
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX.get_or_init(|| {
            // At least 8 digits, max 15 (E.164 standard)
            Regex::new(r"^\+?[1-9]\d{7,14}$").unwrap()
        });
        regex.is_match(phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_parses_digits() {
        let field = IntegerField::new();
        assert_eq!(field.validate("42"), Ok(FieldValue::Integer(42)));
        assert_eq!(field.validate("-7"), Ok(FieldValue::Integer(-7)));
    }

    #[test]
    fn test_integer_truncates_fractional() {
        let field = IntegerField::new();
        assert_eq!(field.validate("4.2"), Ok(FieldValue::Integer(4)));
        assert_eq!(field.validate("-4.9"), Ok(FieldValue::Integer(-4)));
    }

    #[test]
    fn test_integer_rejects_garbage() {
        let field = IntegerField::new();
        assert!(field.validate("a1").is_err());
        assert!(field.validate("").is_err());
        assert!(field.validate("4.2.1").is_err());
        assert!(field.validate("inf").is_err());
    }

    #[test]
    fn test_integer_rejects_out_of_range_text() {
        let field = IntegerField::new();
        assert_eq!(
            field.validate("99999999999999999999"),
            Err("Must be a valid integer.".to_string())
        );
        assert!(field.validate("-99999999999999999999").is_err());
        assert!(field.validate("1e300").is_err());
        // The i64 limits themselves still parse
        assert_eq!(
            field.validate("9223372036854775807"),
            Ok(FieldValue::Integer(i64::MAX))
        );
        assert_eq!(
            field.validate("-9223372036854775808"),
            Ok(FieldValue::Integer(i64::MIN))
        );
    }

    #[test]
    fn test_integer_bounds() {
        let field = IntegerField::new().minimum(0).maximum(10);
        assert_eq!(field.validate("0"), Ok(FieldValue::Integer(0)));
        assert_eq!(
            field.validate("-1"),
            Err("Must be greater than or equal to 0.".to_string())
        );
        assert_eq!(
            field.validate("11"),
            Err("Must be less than or equal to 10.".to_string())
        );
    }

    #[test]
    fn test_float_parses() {
        let field = FloatField::new();
        assert_eq!(field.validate("4.2"), Ok(FieldValue::Float(4.2)));
        assert_eq!(field.validate("42"), Ok(FieldValue::Float(42.0)));
    }

    #[test]
    fn test_float_rejects_garbage_and_non_finite() {
        let field = FloatField::new();
        assert!(field.validate("foo").is_err());
        assert!(field.validate("NaN").is_err());
        assert!(field.validate("inf").is_err());
    }

    #[test]
    fn test_float_bounds() {
        let field = FloatField::new().minimum(0.5);
        assert!(field.validate("0.4").is_err());
        assert_eq!(field.validate("0.5"), Ok(FieldValue::Float(0.5)));
    }

    #[test]
    fn test_boolean_literals() {
        let field = BooleanField::new();
        for raw in ["TRUE", "true", "1", "on", "ON"] {
            assert_eq!(field.validate(raw), Ok(FieldValue::Boolean(true)), "{raw}");
        }
        for raw in ["FALSE", "false", "0", "off"] {
            assert_eq!(field.validate(raw), Ok(FieldValue::Boolean(false)), "{raw}");
        }
    }

    #[test]
    fn test_boolean_rejects() {
        let field = BooleanField::new();
        for raw in ["12", "yes", "no", ""] {
            assert_eq!(
                field.validate(raw),
                Err("Must be a valid boolean.".to_string()),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_decimal_exact() {
        let field = DecimalField::new();
        assert_eq!(
            field.validate("3.14"),
            Ok(FieldValue::Decimal(Decimal::new(314, 2)))
        );
        assert!(field.validate("three").is_err());
    }

    #[test]
    fn test_decimal_bounds() {
        let field = DecimalField::new().minimum(Decimal::ZERO);
        assert!(field.validate("-0.01").is_err());
        assert!(field.validate("0.00").is_ok());
    }

    #[test]
    fn test_date_parses_iso() {
        let field = DateField::new();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 30).expect("valid date literal");
        assert_eq!(field.validate("2024-01-30"), Ok(FieldValue::Date(expected)));
        assert!(field.validate("30/01/2024").is_err());
        assert!(field.validate("2024-13-01").is_err());
    }

    #[test]
    fn test_time_parses_with_and_without_seconds() {
        let field = TimeField::new();
        let with_seconds = NaiveTime::from_hms_opt(12, 34, 56).expect("valid time literal");
        let without_seconds = NaiveTime::from_hms_opt(12, 34, 0).expect("valid time literal");
        assert_eq!(
            field.validate("12:34:56"),
            Ok(FieldValue::Time(with_seconds))
        );
        assert_eq!(
            field.validate("12:34"),
            Ok(FieldValue::Time(without_seconds))
        );
        assert!(field.validate("25:00").is_err());
        assert!(field.validate("noon").is_err());
    }

    #[test]
    fn test_datetime_rfc3339_normalizes_to_utc() {
        let field = DateTimeField::new();
        let converted = field
            .validate("2024-01-30T12:00:00+02:00")
            .expect("offset datetime should validate");
        let expected = NaiveDate::from_ymd_opt(2024, 1, 30)
            .expect("valid date literal")
            .and_hms_opt(10, 0, 0)
            .expect("valid time literal")
            .and_utc();
        assert_eq!(converted, FieldValue::DateTime(expected));
    }

    #[test]
    fn test_datetime_naive_treated_as_utc() {
        let field = DateTimeField::new();
        let converted = field
            .validate("2024-01-30T12:00:00")
            .expect("naive datetime should validate");
        assert_eq!(
            converted.as_datetime().map(|dt| dt.to_rfc3339()),
            Some("2024-01-30T12:00:00+00:00".to_string())
        );
        assert!(field.validate("yesterday").is_err());
    }

    #[test]
    fn test_text_passthrough_and_max_length() {
        let field = TextField::new();
        assert_eq!(
            field.validate("foo"),
            Ok(FieldValue::Text("foo".to_string()))
        );

        let bounded = TextField::new().max_length(3);
        assert!(bounded.validate("foo").is_ok());
        assert_eq!(
            bounded.validate("fooo"),
            Err("Must have no more than 3 characters.".to_string())
        );
    }

    #[test]
    fn test_text_format_email() {
        let field = TextField::new().format(TextFormat::Email);
        assert!(field.validate("test@example.com").is_ok());
        assert!(field.validate("user.name+tag@example.co.uk").is_ok());
        assert_eq!(
            field.validate("invalid-email"),
            Err("Must be a valid email address.".to_string())
        );
    }

    #[test]
    fn test_text_format_uuid_and_url() {
        let uuid_field = TextField::new().format(TextFormat::Uuid);
        assert!(uuid_field.validate(&Uuid::new_v4().to_string()).is_ok());
        assert!(uuid_field.validate("not-a-uuid").is_err());

        let url_field = TextField::new().format(TextFormat::Url);
        assert!(url_field.validate("https://example.com").is_ok());
        assert!(url_field.validate("http://test.com/path?query=1").is_ok());
        assert!(url_field.validate("not a url").is_err());
    }

    #[test]
    fn test_text_format_phone() {
        let format = TextFormat::Phone;
        assert!(format.is_match("+33612345678"));
        assert!(format.is_match("33612345678"));
        assert!(!format.is_match("123"));
    }

    #[test]
    fn test_text_format_pattern() {
        let pattern = Regex::new(r"^[A-Z]{3}\d{3}$").expect("valid test pattern");
        let field = TextField::new().format(TextFormat::Pattern(pattern));
        assert!(field.validate("ABC123").is_ok());
        assert_eq!(
            field.validate("abc123"),
            Err("Must match the expected pattern.".to_string())
        );
    }

    #[test]
    fn test_scalar_type_parse_and_name() {
        assert_eq!(ScalarType::parse("integer"), Some(ScalarType::Integer));
        assert_eq!(ScalarType::parse("int"), Some(ScalarType::Integer));
        assert_eq!(ScalarType::parse("datetime"), Some(ScalarType::DateTime));
        assert_eq!(ScalarType::parse("unicorn"), None);
        assert_eq!(ScalarType::Decimal.name(), "decimal");
    }

    #[test]
    fn test_builtin_table_covers_every_kind() {
        for kind in [
            ScalarType::Integer,
            ScalarType::Float,
            ScalarType::Boolean,
            ScalarType::Decimal,
            ScalarType::Date,
            ScalarType::Time,
            ScalarType::DateTime,
        ] {
            // Shared instances, not rebuilt per lookup
            assert!(Arc::ptr_eq(&builtin_field(kind), &builtin_field(kind)));
        }
    }

    // --- FieldValue accessors and serialization ---

    #[test]
    fn test_field_value_accessors() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_text(), None);
        assert_eq!(value.as_boolean(), None);

        let value = FieldValue::Text("foo".to_string());
        assert_eq!(value.as_text(), Some("foo"));
        assert_eq!(value.as_integer(), None);
    }

    #[test]
    fn test_field_value_serializes_untagged() {
        assert_eq!(
            serde_json::to_value(FieldValue::Integer(42)).expect("serialize should succeed"),
            serde_json::json!(42)
        );
        assert_eq!(
            serde_json::to_value(FieldValue::Boolean(true)).expect("serialize should succeed"),
            serde_json::json!(true)
        );
        assert_eq!(
            serde_json::to_value(FieldValue::Text("foo".to_string()))
                .expect("serialize should succeed"),
            serde_json::json!("foo")
        );
        // Decimals serialize as strings to keep their exactness
        assert_eq!(
            serde_json::to_value(FieldValue::Decimal(Decimal::new(314, 2)))
                .expect("serialize should succeed"),
            serde_json::json!("3.14")
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 30).expect("valid date literal");
        assert_eq!(
            serde_json::to_value(FieldValue::Date(date)).expect("serialize should succeed"),
            serde_json::json!("2024-01-30")
        );
    }
}
