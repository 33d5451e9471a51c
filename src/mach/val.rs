use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_PARSE: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
];

const DATE_PARSE: [&str; 3] = ["%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y"];

/// ## Semantic value types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Integer,
    Double,
    String,
    DateTime,
}

impl ValueType {
    /// Accepts canonical names and the aliases used in rule text,
    /// ignoring case and an optional `System.` prefix.
    pub fn parse(name: &str) -> Option<ValueType> {
        let upper = name.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SYSTEM.").unwrap_or(&upper);
        match bare {
            "STRING" => Some(ValueType::String),
            "NUMERIC" | "DOUBLE" | "FLOAT" => Some(ValueType::Double),
            "INTEGER" | "INT" | "INT32" => Some(ValueType::Integer),
            "BOOLEAN" | "BOOL" => Some(ValueType::Boolean),
            "DATETIME" | "DATE" => Some(ValueType::DateTime),
            "NULL" | "NULLABLE" => Some(ValueType::Null),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::DateTime => "datetime",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// ## Dynamic value
///
/// A value carries at most one payload. `Null` remembers the type it was
/// created with but behaves as null everywhere.

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(ValueType),
    Boolean(bool),
    Integer(i32),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl Default for Value {
    fn default() -> Value {
        Value::Null(ValueType::Null)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Value {
        Value::DateTime(d)
    }
}

impl Value {
    pub fn null() -> Value {
        Value::Null(ValueType::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Type inferred from the payload.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null(_) => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::DateTime(_) => ValueType::DateTime,
        }
    }

    /// Type the value was declared with, which differs from
    /// `value_type` only for typed nulls.
    pub fn declared_type(&self) -> ValueType {
        match self {
            Value::Null(t) => *t,
            _ => self.value_type(),
        }
    }

    /// Build a value of the requested type from its text form.
    pub fn from_parts(value_type: ValueType, text: &str) -> Option<Value> {
        match value_type {
            ValueType::Null => Some(Value::Null(ValueType::Null)),
            ValueType::String => Some(Value::String(text.to_string())),
            ValueType::Double => parse_f64(text).map(Value::Float),
            ValueType::Integer => parse_i32(text).map(Value::Integer),
            ValueType::Boolean => parse_bool(text).map(Value::Boolean),
            ValueType::DateTime => parse_datetime(text).map(Value::DateTime),
        }
    }

    /// Canonical text form; `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null(_) => None,
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::DateTime(d) => Some(d.format(DATETIME_FORMAT).to_string()),
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => parse_f64(s),
            Value::Null(_) | Value::DateTime(_) => None,
        }
    }

    pub fn to_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) => float_to_i32(*n),
            Value::Boolean(b) => Some(if *b { 1 } else { 0 }),
            Value::String(s) => parse_i32(s),
            Value::Null(_) | Value::DateTime(_) => None,
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(n) => Some(*n != 0),
            Value::Float(n) => Some(*n != 0.0),
            Value::String(s) => parse_bool(s),
            Value::Null(_) | Value::DateTime(_) => None,
        }
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(d) => Some(*d),
            Value::String(s) => parse_datetime(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.to_text() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "null"),
        }
    }
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn float_to_i32(n: f64) -> Option<i32> {
    let n = n.round();
    if n.is_finite() && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
        Some(n as i32)
    } else {
        None
    }
}

fn parse_i32(s: &str) -> Option<i32> {
    let s = s.trim();
    match s.parse::<i32>() {
        Ok(n) => Some(n),
        Err(_) => parse_f64(s).and_then(float_to_i32),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_PARSE.iter() {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, format) {
            return Some(d);
        }
    }
    for format in DATE_PARSE.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|d| d.naive_local())
}
