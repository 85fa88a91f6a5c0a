//! FILENAME: parser/src/value.rs
//! PURPOSE: The runtime value sum type for expression evaluation.
//! CONTEXT: Every expression evaluates to one of these variants. The
//! arithmetic coercion ladder over them lives in arith.rs. Date values are
//! `chrono::NaiveDateTime` (no timezone kind, so structurally equal dates
//! compare equal) and serial-number conversion uses the OLE Automation
//! epoch, 1899-12-30.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// A loosely-typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Text(String),
    Int(i32),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Duration(Duration),
    /// Nested value list, produced by array-valued function arguments.
    Array(Vec<Value>),
}

impl Value {
    /// Short type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::DateTime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::Array(_) => "array",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Float(_) | Value::Double(_) | Value::Decimal(_)
        )
    }

    /// Attempts to coerce the value to a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            Value::Float(n) => Some(*n != 0.0),
            Value::Double(n) => Some(*n != 0.0),
            Value::Decimal(d) => Some(*d != Decimal::ZERO),
            Value::Text(s) => match s.to_uppercase().as_str() {
                "TRUE" => Some(true),
                "FALSE" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Plain-text rendering used by concatenation and text functions.
    /// Numbers drop a trailing fractional zero; booleans render as
    /// TRUE/FALSE.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format_f64(f64::from(*n)),
            Value::Double(n) => format_f64(*n),
            Value::Decimal(d) => d.normalize().to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Duration(d) => format_duration(d),
            Value::Array(items) => items
                .first()
                .map(Value::to_text)
                .unwrap_or_default(),
        }
    }

    /// Source-text rendering used by `Expr::synthesize`. Text is quoted with
    /// doubled-separator escaping; booleans render as calls so the result
    /// re-lexes against a catalog that registers TRUE/FALSE.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' {
                        out.push('"');
                    }
                    out.push(ch);
                }
                out.push('"');
                out
            }
            Value::Bool(b) => if *b { "TRUE()" } else { "FALSE()" }.to_string(),
            other => other.to_text(),
        }
    }

    /// Flattens nested arrays into `out`, depth first.
    pub fn flatten_into(&self, out: &mut Vec<Value>) {
        match self {
            Value::Array(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other.clone()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

fn format_f64(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn format_duration(d: &Duration) -> String {
    let total = d.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

/// The OLE Automation date epoch: serial 0.0 is 1899-12-30 00:00.
pub fn ole_epoch() -> NaiveDateTime {
    // 1899-12-30 is always a valid date
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Converts an OLE Automation serial (days since the epoch) to a date.
pub fn oa_to_datetime(serial: f64) -> NaiveDateTime {
    ole_epoch() + Duration::milliseconds((serial * 86_400_000.0).round() as i64)
}

/// Converts a date to its OLE Automation serial.
pub fn datetime_to_oa(dt: NaiveDateTime) -> f64 {
    (dt - ole_epoch()).num_milliseconds() as f64 / 86_400_000.0
}
