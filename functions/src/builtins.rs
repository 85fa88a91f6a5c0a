//! FILENAME: functions/src/builtins.rs
//! PURPOSE: Math, aggregate, logic, and text functions.
//! CONTEXT: Aggregates flatten nested array arguments and skip values that
//! are not numeric (text, booleans, nulls), matching spreadsheet range
//! semantics. Scalar math coerces through f64 and re-narrows integral
//! results to int.

use parser::arith::{self, narrow};
use parser::error::CalcError;
use parser::rules::{FunctionDef, FunctionRule};
use parser::value::datetime_to_oa;
use parser::{RegistryError, Value};

pub fn register(rule: &mut FunctionRule) -> Result<(), RegistryError> {
    let many = usize::MAX;
    rule.register(FunctionDef::new("TRUE", 0, 0, |_| Ok(Value::Bool(true))))?;
    rule.register(FunctionDef::new("FALSE", 0, 0, |_| Ok(Value::Bool(false))))?;

    rule.register(FunctionDef::new("SUM", 1, many, sum))?;
    rule.register(FunctionDef::new("AVERAGE", 1, many, average))?;
    rule.register(FunctionDef::new("MIN", 1, many, min))?;
    rule.register(FunctionDef::new("MAX", 1, many, max))?;
    rule.register(FunctionDef::new("COUNT", 1, many, count))?;
    rule.register(FunctionDef::new("COUNTA", 1, many, counta))?;

    rule.register(FunctionDef::new("IF", 2, 3, if_fn))?;
    rule.register(FunctionDef::new("AND", 1, many, and))?;
    rule.register(FunctionDef::new("OR", 1, many, or))?;
    rule.register(FunctionDef::new("NOT", 1, 1, not))?;

    rule.register(FunctionDef::new("ABS", 1, 1, abs))?;
    rule.register(FunctionDef::new("ROUND", 1, 2, round))?;
    rule.register(FunctionDef::new("SQRT", 1, 1, sqrt))?;
    rule.register(FunctionDef::new("POWER", 2, 2, power))?;
    rule.register(FunctionDef::new("MOD", 2, 2, mod_fn))?;
    rule.register(FunctionDef::new("INT", 1, 1, int_fn))?;
    rule.register(FunctionDef::new("SIGN", 1, 1, sign))?;

    rule.register(FunctionDef::new("LEN", 1, 1, len))?;
    rule.register(FunctionDef::new("UPPER", 1, 1, upper))?;
    rule.register(FunctionDef::new("LOWER", 1, 1, lower))?;
    rule.register(FunctionDef::new("TRIM", 1, 1, trim))?;
    rule.register(FunctionDef::new("CONCATENATE", 1, many, concatenate))?;
    rule.register(FunctionDef::new("LEFT", 1, 2, left))?;
    rule.register(FunctionDef::new("RIGHT", 1, 2, right))?;
    rule.register(FunctionDef::new("MID", 3, 3, mid))?;
    rule.register(FunctionDef::new("REPT", 2, 2, rept))?;
    Ok(())
}

// ---- shared coercions ------------------------------------------------------

fn flatten(args: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        arg.flatten_into(&mut out);
    }
    out
}

fn numeric(args: &[Value]) -> Vec<Value> {
    flatten(args).into_iter().filter(Value::is_numeric).collect()
}

pub(crate) fn as_number(func: &str, v: &Value) -> Result<f64, CalcError> {
    match v {
        Value::Int(n) => Ok(f64::from(*n)),
        Value::Float(n) => Ok(f64::from(*n)),
        Value::Double(n) => Ok(*n),
        Value::Decimal(d) => {
            use rust_decimal::prelude::ToPrimitive;
            d.to_f64()
                .ok_or_else(|| CalcError::invalid_argument(func, "decimal out of range"))
        }
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::DateTime(dt) => Ok(datetime_to_oa(*dt)),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CalcError::invalid_argument(func, format!("'{s}' is not a number"))),
        other => Err(CalcError::invalid_argument(
            func,
            format!("expected a number, got {}", other.type_name()),
        )),
    }
}

fn as_bool(func: &str, v: &Value) -> Result<bool, CalcError> {
    v.as_bool().ok_or_else(|| {
        CalcError::invalid_argument(func, format!("expected a logical value, got {}", v.type_name()))
    })
}

fn as_index(func: &str, v: &Value) -> Result<usize, CalcError> {
    let n = as_number(func, v)?;
    if n < 0.0 {
        return Err(CalcError::invalid_argument(func, "count must not be negative"));
    }
    Ok(n.trunc() as usize)
}

// ---- aggregates ------------------------------------------------------------

fn sum(args: &[Value]) -> Result<Value, CalcError> {
    numeric(args)
        .iter()
        .try_fold(Value::Int(0), |acc, v| arith::add(&acc, v))
}

fn average(args: &[Value]) -> Result<Value, CalcError> {
    let values = numeric(args);
    if values.is_empty() {
        return Err(CalcError::DivisionByZero);
    }
    let total = values
        .iter()
        .try_fold(Value::Int(0), |acc, v| arith::add(&acc, v))?;
    arith::divide(&total, &Value::Int(values.len() as i32))
}

fn min(args: &[Value]) -> Result<Value, CalcError> {
    fold_extreme(args, std::cmp::Ordering::Less)
}

fn max(args: &[Value]) -> Result<Value, CalcError> {
    fold_extreme(args, std::cmp::Ordering::Greater)
}

fn fold_extreme(args: &[Value], keep: std::cmp::Ordering) -> Result<Value, CalcError> {
    let values = numeric(args);
    let mut best: Option<Value> = None;
    for v in values {
        best = Some(match best {
            None => v,
            Some(b) => {
                if arith::compare(&v, &b)? == keep {
                    v
                } else {
                    b
                }
            }
        });
    }
    // No numeric input yields zero, like spreadsheet MIN/MAX over text
    Ok(best.unwrap_or(Value::Int(0)))
}

fn count(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Int(numeric(args).len() as i32))
}

fn counta(args: &[Value]) -> Result<Value, CalcError> {
    let n = flatten(args)
        .iter()
        .filter(|v| !matches!(v, Value::Null))
        .count();
    Ok(Value::Int(n as i32))
}

// ---- logic -----------------------------------------------------------------

fn if_fn(args: &[Value]) -> Result<Value, CalcError> {
    if as_bool("IF", &args[0])? {
        Ok(args[1].clone())
    } else {
        Ok(args.get(2).cloned().unwrap_or(Value::Bool(false)))
    }
}

fn and(args: &[Value]) -> Result<Value, CalcError> {
    for v in flatten(args) {
        if !as_bool("AND", &v)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn or(args: &[Value]) -> Result<Value, CalcError> {
    for v in flatten(args) {
        if as_bool("OR", &v)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn not(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Bool(!as_bool("NOT", &args[0])?))
}

// ---- scalar math -----------------------------------------------------------

fn abs(args: &[Value]) -> Result<Value, CalcError> {
    match &args[0] {
        Value::Int(n) => Ok(n
            .checked_abs()
            .map(Value::Int)
            .unwrap_or_else(|| narrow(f64::from(*n).abs()))),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        Value::Double(n) => Ok(Value::Double(n.abs())),
        Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
        Value::Duration(d) => Ok(Value::Duration(if *d < chrono::Duration::zero() {
            -*d
        } else {
            *d
        })),
        other => Ok(narrow(as_number("ABS", other)?.abs())),
    }
}

fn round(args: &[Value]) -> Result<Value, CalcError> {
    let n = as_number("ROUND", &args[0])?;
    let digits = match args.get(1) {
        Some(v) => as_number("ROUND", v)?.trunc() as i32,
        None => 0,
    };
    // f64::round rounds half away from zero, the spreadsheet convention
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        Ok(narrow((n * factor).round() / factor))
    } else {
        let factor = 10f64.powi(-digits);
        Ok(narrow((n / factor).round() * factor))
    }
}

fn sqrt(args: &[Value]) -> Result<Value, CalcError> {
    let n = as_number("SQRT", &args[0])?;
    if n < 0.0 {
        return Err(CalcError::invalid_argument("SQRT", "argument must not be negative"));
    }
    Ok(Value::Double(n.sqrt()))
}

fn power(args: &[Value]) -> Result<Value, CalcError> {
    arith::power(&args[0], &args[1])
}

fn mod_fn(args: &[Value]) -> Result<Value, CalcError> {
    let n = as_number("MOD", &args[0])?;
    let divisor = as_number("MOD", &args[1])?;
    if divisor == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    // Result takes the sign of the divisor
    Ok(narrow(n - divisor * (n / divisor).floor()))
}

fn int_fn(args: &[Value]) -> Result<Value, CalcError> {
    Ok(narrow(as_number("INT", &args[0])?.floor()))
}

fn sign(args: &[Value]) -> Result<Value, CalcError> {
    let n = as_number("SIGN", &args[0])?;
    Ok(Value::Int(if n > 0.0 {
        1
    } else if n < 0.0 {
        -1
    } else {
        0
    }))
}

// ---- text ------------------------------------------------------------------

fn len(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Int(args[0].to_text().chars().count() as i32))
}

fn upper(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Text(args[0].to_text().to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Text(args[0].to_text().to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Text(args[0].to_text().trim().to_string()))
}

fn concatenate(args: &[Value]) -> Result<Value, CalcError> {
    let mut out = String::new();
    for v in flatten(args) {
        out.push_str(&v.to_text());
    }
    Ok(Value::Text(out))
}

fn left(args: &[Value]) -> Result<Value, CalcError> {
    let text = args[0].to_text();
    let n = match args.get(1) {
        Some(v) => as_index("LEFT", v)?,
        None => 1,
    };
    Ok(Value::Text(text.chars().take(n).collect()))
}

fn right(args: &[Value]) -> Result<Value, CalcError> {
    let text = args[0].to_text();
    let n = match args.get(1) {
        Some(v) => as_index("RIGHT", v)?,
        None => 1,
    };
    let total = text.chars().count();
    Ok(Value::Text(text.chars().skip(total.saturating_sub(n)).collect()))
}

fn mid(args: &[Value]) -> Result<Value, CalcError> {
    let text = args[0].to_text();
    let start = as_index("MID", &args[1])?;
    if start == 0 {
        return Err(CalcError::invalid_argument("MID", "start position is 1-based"));
    }
    let n = as_index("MID", &args[2])?;
    Ok(Value::Text(text.chars().skip(start - 1).take(n).collect()))
}

fn rept(args: &[Value]) -> Result<Value, CalcError> {
    let text = args[0].to_text();
    let n = as_index("REPT", &args[1])?;
    Ok(Value::Text(text.repeat(n)))
}
