//! FILENAME: functions/src/lib.rs
//! PURPOSE: Library root for the spreadsheet-style function catalog.
//! CONTEXT: Builds on the parser crate: this crate supplies the
//! `FunctionDef` catalog (math, logic, text, date/time) and a ready-made
//! rule set wiring the catalog together with the standard lexer rules.
//!
//! USAGE: `standard_rule_set()?.parse_to_expression("SUM(1,2)*2")?.calc()?`

pub mod builtins;
pub mod catalog;
pub mod datetime;


pub use catalog::{register_all, standard_functions, standard_rule_set};
