//! FILENAME: parser/src/arith.rs
//! PURPOSE: The loosely-typed numeric coercion ladder.
//! CONTEXT: Operand pairs are classified by type priority
//! (datetime/duration > decimal > double > float > int > text > bool) and
//! the highest-ranked type present selects the calculation routine. A
//! datetime paired with a plain number converts through the OLE Automation
//! serial. Integer overflow falls back to double-precision and re-narrows
//! to int only when the double result round-trips exactly.

use std::cmp::Ordering;

use chrono::Duration;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::CalcError;
use crate::value::{datetime_to_oa, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Bool,
    Text,
    Int,
    Float,
    Double,
    Decimal,
    Temporal,
}

fn rank(v: &Value) -> Option<Rank> {
    match v {
        Value::Bool(_) => Some(Rank::Bool),
        Value::Text(_) => Some(Rank::Text),
        Value::Int(_) => Some(Rank::Int),
        Value::Float(_) => Some(Rank::Float),
        Value::Double(_) => Some(Rank::Double),
        Value::Decimal(_) => Some(Rank::Decimal),
        Value::DateTime(_) | Value::Duration(_) => Some(Rank::Temporal),
        Value::Null | Value::Array(_) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl ArithOp {
    fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Pow => "^",
        }
    }
}

fn unsupported(op: &'static str, l: &Value, r: &Value) -> CalcError {
    CalcError::Unsupported {
        op,
        left: l.type_name(),
        right: r.type_name(),
    }
}

/// Re-narrows a double result to int when it round-trips exactly.
pub fn narrow(d: f64) -> Value {
    if d.is_finite() && d.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&d) {
        Value::Int(d as i32)
    } else {
        Value::Double(d)
    }
}

fn to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(f64::from(*n)),
        Value::Float(n) => Some(f64::from(*n)),
        Value::Double(n) => Some(*n),
        Value::Decimal(d) => d.to_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn to_f32(v: &Value) -> Option<f32> {
    match v {
        Value::Int(n) => Some(*n as f32),
        Value::Float(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn to_i32(v: &Value) -> Option<i32> {
    match v {
        Value::Int(n) => Some(*n),
        Value::Bool(b) => Some(i32::from(*b)),
        Value::Text(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn to_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Decimal(d) => Some(*d),
        Value::Int(n) => Some(Decimal::from(*n)),
        Value::Float(n) => Decimal::from_f32(*n),
        Value::Double(n) => Decimal::from_f64(*n),
        Value::Bool(b) => Some(Decimal::from(i32::from(*b))),
        Value::Text(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

fn days(n: f64) -> Duration {
    Duration::milliseconds((n * 86_400_000.0).round() as i64)
}

pub fn add(l: &Value, r: &Value) -> Result<Value, CalcError> {
    apply(ArithOp::Add, l, r)
}

pub fn subtract(l: &Value, r: &Value) -> Result<Value, CalcError> {
    apply(ArithOp::Sub, l, r)
}

pub fn multiply(l: &Value, r: &Value) -> Result<Value, CalcError> {
    apply(ArithOp::Mul, l, r)
}

pub fn divide(l: &Value, r: &Value) -> Result<Value, CalcError> {
    apply(ArithOp::Div, l, r)
}

pub fn power(l: &Value, r: &Value) -> Result<Value, CalcError> {
    apply(ArithOp::Pow, l, r)
}

/// String concatenation, the `&` operator. Coerces both sides to text.
pub fn concat(l: &Value, r: &Value) -> Result<Value, CalcError> {
    Ok(Value::Text(l.to_text() + &r.to_text()))
}

fn apply(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    let (Some(lr), Some(rr)) = (rank(l), rank(r)) else {
        return Err(unsupported(op.name(), l, r));
    };
    match lr.max(rr) {
        Rank::Temporal => temporal_op(op, l, r),
        Rank::Decimal => decimal_op(op, l, r),
        Rank::Double => double_op(op, l, r),
        Rank::Float => float_op(op, l, r),
        Rank::Text => text_op(op, l, r),
        // Plain ints, and bool pairs behaving as 0/1 integers
        Rank::Int | Rank::Bool => int_op(op, l, r),
    }
}

fn int_op(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    let (Some(a), Some(b)) = (to_i32(l), to_i32(r)) else {
        return Err(unsupported(op.name(), l, r));
    };
    match op {
        ArithOp::Add => Ok(a
            .checked_add(b)
            .map(Value::Int)
            .unwrap_or_else(|| narrow(f64::from(a) + f64::from(b)))),
        ArithOp::Sub => Ok(a
            .checked_sub(b)
            .map(Value::Int)
            .unwrap_or_else(|| narrow(f64::from(a) - f64::from(b)))),
        ArithOp::Mul => Ok(a
            .checked_mul(b)
            .map(Value::Int)
            .unwrap_or_else(|| narrow(f64::from(a) * f64::from(b)))),
        ArithOp::Div => {
            if b == 0 {
                Err(CalcError::DivisionByZero)
            } else if a % b == 0 {
                Ok(Value::Int(a / b))
            } else {
                Ok(Value::Double(f64::from(a) / f64::from(b)))
            }
        }
        ArithOp::Pow => {
            if b >= 0 {
                match a.checked_pow(b as u32) {
                    Some(v) => Ok(Value::Int(v)),
                    None => Ok(narrow(f64::from(a).powi(b))),
                }
            } else {
                Ok(Value::Double(f64::from(a).powi(b)))
            }
        }
    }
}

fn double_op(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    let (Some(a), Some(b)) = (to_f64(l), to_f64(r)) else {
        return Err(unsupported(op.name(), l, r));
    };
    match op {
        ArithOp::Add => Ok(Value::Double(a + b)),
        ArithOp::Sub => Ok(Value::Double(a - b)),
        ArithOp::Mul => Ok(Value::Double(a * b)),
        ArithOp::Div => {
            if b == 0.0 {
                Err(CalcError::DivisionByZero)
            } else {
                Ok(Value::Double(a / b))
            }
        }
        ArithOp::Pow => {
            let result = a.powf(b);
            if result.is_finite() {
                Ok(Value::Double(result))
            } else {
                Err(CalcError::Overflow("^"))
            }
        }
    }
}

fn float_op(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    let (Some(a), Some(b)) = (to_f32(l), to_f32(r)) else {
        return Err(unsupported(op.name(), l, r));
    };
    if op == ArithOp::Div && b == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Pow => a.powf(b),
    };
    if result.is_finite() {
        Ok(Value::Float(result))
    } else {
        // f32 overflow falls back to double precision
        double_op(op, &Value::Double(f64::from(a)), &Value::Double(f64::from(b)))
    }
}

fn decimal_op(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    let (Some(a), Some(b)) = (to_decimal(l), to_decimal(r)) else {
        return Err(unsupported(op.name(), l, r));
    };
    match op {
        ArithOp::Add => a
            .checked_add(b)
            .map(Value::Decimal)
            .ok_or(CalcError::Overflow("+")),
        ArithOp::Sub => a
            .checked_sub(b)
            .map(Value::Decimal)
            .ok_or(CalcError::Overflow("-")),
        ArithOp::Mul => a
            .checked_mul(b)
            .map(Value::Decimal)
            .ok_or(CalcError::Overflow("*")),
        ArithOp::Div => {
            if b == Decimal::ZERO {
                Err(CalcError::DivisionByZero)
            } else {
                a.checked_div(b)
                    .map(Value::Decimal)
                    .ok_or(CalcError::Overflow("/"))
            }
        }
        ArithOp::Pow => {
            let (Some(af), Some(bf)) = (a.to_f64(), b.to_f64()) else {
                return Err(unsupported(op.name(), l, r));
            };
            let result = af.powf(bf);
            Decimal::from_f64(result)
                .map(Value::Decimal)
                .ok_or(CalcError::Overflow("^"))
        }
    }
}

fn temporal_op(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    use Value::{DateTime, Duration as Dur};
    match op {
        ArithOp::Add => match (l, r) {
            (DateTime(dt), Dur(d)) | (Dur(d), DateTime(dt)) => dt
                .checked_add_signed(*d)
                .map(DateTime)
                .ok_or(CalcError::Overflow("+")),
            (Dur(a), Dur(b)) => a
                .checked_add(b)
                .map(Dur)
                .ok_or(CalcError::Overflow("+")),
            (DateTime(dt), other) | (other, DateTime(dt)) => {
                let n = to_f64(other).ok_or_else(|| unsupported("+", l, r))?;
                dt.checked_add_signed(days(n))
                    .map(DateTime)
                    .ok_or(CalcError::Overflow("+"))
            }
            (Dur(d), other) | (other, Dur(d)) => {
                let n = to_f64(other).ok_or_else(|| unsupported("+", l, r))?;
                d.checked_add(&days(n))
                    .map(Dur)
                    .ok_or(CalcError::Overflow("+"))
            }
            _ => Err(unsupported("+", l, r)),
        },
        ArithOp::Sub => match (l, r) {
            (DateTime(a), DateTime(b)) => Ok(Dur(*a - *b)),
            (DateTime(dt), Dur(d)) => dt
                .checked_sub_signed(*d)
                .map(DateTime)
                .ok_or(CalcError::Overflow("-")),
            (DateTime(dt), other) => {
                let n = to_f64(other).ok_or_else(|| unsupported("-", l, r))?;
                dt.checked_sub_signed(days(n))
                    .map(DateTime)
                    .ok_or(CalcError::Overflow("-"))
            }
            (other, DateTime(dt)) => {
                let n = to_f64(other).ok_or_else(|| unsupported("-", l, r))?;
                Ok(Value::Double(n - datetime_to_oa(*dt)))
            }
            (Dur(a), Dur(b)) => a.checked_sub(b).map(Dur).ok_or(CalcError::Overflow("-")),
            (Dur(d), other) => {
                let n = to_f64(other).ok_or_else(|| unsupported("-", l, r))?;
                d.checked_sub(&days(n))
                    .map(Dur)
                    .ok_or(CalcError::Overflow("-"))
            }
            (other, Dur(d)) => {
                let n = to_f64(other).ok_or_else(|| unsupported("-", l, r))?;
                days(n)
                    .checked_sub(d)
                    .map(Dur)
                    .ok_or(CalcError::Overflow("-"))
            }
            _ => Err(unsupported("-", l, r)),
        },
        _ => Err(unsupported(op.name(), l, r)),
    }
}

fn text_op(op: ArithOp, l: &Value, r: &Value) -> Result<Value, CalcError> {
    // Numeric text participates in arithmetic like a number
    if let (Some(_), Some(_)) = (to_f64(l), to_f64(r)) {
        return double_op(op, l, r);
    }
    match op {
        ArithOp::Add => concat(l, r),
        _ => Err(unsupported(op.name(), l, r)),
    }
}

/// Three-way comparison through the same type-priority ladder as the
/// arithmetic routines.
pub fn compare(l: &Value, r: &Value) -> Result<Ordering, CalcError> {
    let (Some(lr), Some(rr)) = (rank(l), rank(r)) else {
        return Err(unsupported("compare", l, r));
    };
    match lr.max(rr) {
        Rank::Temporal => temporal_compare(l, r),
        Rank::Decimal => {
            let (Some(a), Some(b)) = (to_decimal(l), to_decimal(r)) else {
                return Err(unsupported("compare", l, r));
            };
            Ok(a.cmp(&b))
        }
        Rank::Double | Rank::Float | Rank::Int => {
            let (Some(a), Some(b)) = (to_f64(l), to_f64(r)) else {
                return Err(unsupported("compare", l, r));
            };
            a.partial_cmp(&b).ok_or_else(|| unsupported("compare", l, r))
        }
        Rank::Text => match (l, r) {
            (Value::Text(a), Value::Text(b)) => {
                // Case-insensitive, like spreadsheet text comparison
                Ok(a.to_uppercase().cmp(&b.to_uppercase()))
            }
            _ => Err(unsupported("compare", l, r)),
        },
        Rank::Bool => match (l, r) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            _ => Err(unsupported("compare", l, r)),
        },
    }
}

fn temporal_compare(l: &Value, r: &Value) -> Result<Ordering, CalcError> {
    use Value::{DateTime, Duration as Dur};
    match (l, r) {
        (DateTime(a), DateTime(b)) => Ok(a.cmp(b)),
        (Dur(a), Dur(b)) => Ok(a.cmp(b)),
        (DateTime(a), other) => {
            let n = to_f64(other).ok_or_else(|| unsupported("compare", l, r))?;
            datetime_to_oa(*a)
                .partial_cmp(&n)
                .ok_or_else(|| unsupported("compare", l, r))
        }
        (other, DateTime(b)) => {
            let n = to_f64(other).ok_or_else(|| unsupported("compare", l, r))?;
            n.partial_cmp(&datetime_to_oa(*b))
                .ok_or_else(|| unsupported("compare", l, r))
        }
        (Dur(a), other) => {
            let n = to_f64(other).ok_or_else(|| unsupported("compare", l, r))?;
            Ok(a.cmp(&days(n)))
        }
        (other, Dur(b)) => {
            let n = to_f64(other).ok_or_else(|| unsupported("compare", l, r))?;
            Ok(days(n).cmp(b))
        }
        _ => Err(unsupported("compare", l, r)),
    }
}

pub fn equal(l: &Value, r: &Value) -> Result<Value, CalcError> {
    // Incomparable values are simply not equal
    Ok(Value::Bool(matches!(compare(l, r), Ok(Ordering::Equal))))
}

pub fn not_equal(l: &Value, r: &Value) -> Result<Value, CalcError> {
    Ok(Value::Bool(!matches!(compare(l, r), Ok(Ordering::Equal))))
}

pub fn less_than(l: &Value, r: &Value) -> Result<Value, CalcError> {
    Ok(Value::Bool(compare(l, r)? == Ordering::Less))
}

pub fn greater_than(l: &Value, r: &Value) -> Result<Value, CalcError> {
    Ok(Value::Bool(compare(l, r)? == Ordering::Greater))
}

pub fn less_equal(l: &Value, r: &Value) -> Result<Value, CalcError> {
    Ok(Value::Bool(compare(l, r)? != Ordering::Greater))
}

pub fn greater_equal(l: &Value, r: &Value) -> Result<Value, CalcError> {
    Ok(Value::Bool(compare(l, r)? != Ordering::Less))
}

pub fn negate(v: &Value) -> Result<Value, CalcError> {
    match v {
        Value::Int(n) => Ok(n
            .checked_neg()
            .map(Value::Int)
            .unwrap_or_else(|| narrow(-f64::from(*n)))),
        Value::Float(n) => Ok(Value::Float(-n)),
        Value::Double(n) => Ok(Value::Double(-n)),
        Value::Decimal(d) => Ok(Value::Decimal(-*d)),
        Value::Duration(d) => Ok(Value::Duration(-*d)),
        Value::Bool(b) => Ok(Value::Int(-i32::from(*b))),
        Value::Text(_) => match to_f64(v) {
            Some(n) => Ok(Value::Double(-n)),
            None => Err(CalcError::UnsupportedUnary {
                op: "-",
                operand: v.type_name(),
            }),
        },
        _ => Err(CalcError::UnsupportedUnary {
            op: "-",
            operand: v.type_name(),
        }),
    }
}

pub fn identity(v: &Value) -> Result<Value, CalcError> {
    if rank(v).is_some() {
        Ok(v.clone())
    } else {
        Err(CalcError::UnsupportedUnary {
            op: "+",
            operand: v.type_name(),
        })
    }
}
