//! FILENAME: functions/src/datetime.rs
//! PURPOSE: Date and time functions.
//! CONTEXT: NOW and TODAY read the local clock and are registered
//! volatile, so trees containing them are never treated as constant.
//! Serial-number arguments convert through the OLE Automation epoch.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use parser::error::CalcError;
use parser::rules::{FunctionDef, FunctionRule};
use parser::value::oa_to_datetime;
use parser::{RegistryError, Value};

use crate::builtins::as_number;

pub fn register(rule: &mut FunctionRule) -> Result<(), RegistryError> {
    rule.register(FunctionDef::new("NOW", 0, 0, now).volatile())?;
    rule.register(FunctionDef::new("TODAY", 0, 0, today).volatile())?;
    rule.register(FunctionDef::new("DATE", 3, 3, date))?;
    rule.register(FunctionDef::new("YEAR", 1, 1, year))?;
    rule.register(FunctionDef::new("MONTH", 1, 1, month))?;
    rule.register(FunctionDef::new("DAY", 1, 1, day))?;
    Ok(())
}

fn as_datetime(func: &str, v: &Value) -> Result<NaiveDateTime, CalcError> {
    match v {
        Value::DateTime(dt) => Ok(*dt),
        other if other.is_numeric() => Ok(oa_to_datetime(as_number(func, other)?)),
        other => Err(CalcError::invalid_argument(
            func,
            format!("expected a date, got {}", other.type_name()),
        )),
    }
}

fn now(_args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::DateTime(Local::now().naive_local()))
}

fn today(_args: &[Value]) -> Result<Value, CalcError> {
    let date = Local::now().date_naive();
    date.and_hms_opt(0, 0, 0)
        .map(Value::DateTime)
        .ok_or_else(|| CalcError::invalid_argument("TODAY", "clock out of range"))
}

fn date(args: &[Value]) -> Result<Value, CalcError> {
    let year = as_number("DATE", &args[0])?.trunc() as i32;
    let month = as_number("DATE", &args[1])?.trunc() as u32;
    let day = as_number("DATE", &args[2])?.trunc() as u32;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Value::DateTime)
        .ok_or_else(|| {
            CalcError::invalid_argument("DATE", format!("{year}-{month}-{day} is not a valid date"))
        })
}

fn year(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Int(as_datetime("YEAR", &args[0])?.year()))
}

fn month(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Int(as_datetime("MONTH", &args[0])?.month() as i32))
}

fn day(args: &[Value]) -> Result<Value, CalcError> {
    Ok(Value::Int(as_datetime("DAY", &args[0])?.day() as i32))
}
