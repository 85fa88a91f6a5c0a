//! FILENAME: parser/src/intern.rs
//! PURPOSE: Constant-leaf interning for batch expression construction.
//! CONTEXT: When many structurally similar formulas are parsed in a batch,
//! their constant leaves repeat. An explicit `InternPool` passed through
//! the build call chain shares one `Rc<Value>` per distinct constant while
//! a buffering scope is active, instead of allocating a fresh leaf per
//! occurrence. Scopes are ref-counted and nestable; the buffer is released
//! only when the outermost scope ends. Outside a scope every call
//! allocates fresh.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::value::Value;

/// Hashable identity of an internable constant. Floats key on their bit
/// patterns; arrays are never interned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InternKey {
    Null,
    Bool(bool),
    Text(String),
    Int(i32),
    Float(u32),
    Double(u64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Duration(i64, i32),
}

impl InternKey {
    fn for_value(value: &Value) -> Option<InternKey> {
        match value {
            Value::Null => Some(InternKey::Null),
            Value::Bool(b) => Some(InternKey::Bool(*b)),
            Value::Text(s) => Some(InternKey::Text(s.clone())),
            Value::Int(n) => Some(InternKey::Int(*n)),
            Value::Float(n) => Some(InternKey::Float(n.to_bits())),
            Value::Double(n) => Some(InternKey::Double(n.to_bits())),
            Value::Decimal(d) => Some(InternKey::Decimal(*d)),
            Value::DateTime(dt) => Some(InternKey::DateTime(*dt)),
            Value::Duration(d) => Some(InternKey::Duration(d.num_seconds(), d.subsec_nanos())),
            Value::Array(_) => None,
        }
    }
}

/// Ref-counted buffering scope for constant-leaf reuse.
#[derive(Debug, Default)]
pub struct InternPool {
    buffer: HashMap<InternKey, Rc<Value>>,
    depth: usize,
}

impl InternPool {
    pub fn new() -> Self {
        InternPool::default()
    }

    /// Opens a buffering scope. Nested calls share one buffer.
    pub fn begin_buffering(&mut self) {
        self.depth += 1;
    }

    /// Closes one buffering scope. The buffer is dropped only when the
    /// outermost scope closes.
    pub fn end_buffering(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
            if self.depth == 0 {
                self.buffer.clear();
            }
        }
    }

    pub fn is_buffering(&self) -> bool {
        self.depth > 0
    }

    /// Number of distinct constants currently buffered.
    pub fn buffered_count(&self) -> usize {
        self.buffer.len()
    }

    /// Returns a shared leaf for `value`. While buffering, a structurally
    /// equal constant returns the previously created instance.
    pub fn intern(&mut self, value: Value) -> Rc<Value> {
        if !self.is_buffering() {
            return Rc::new(value);
        }
        match InternKey::for_value(&value) {
            Some(key) => self
                .buffer
                .entry(key)
                .or_insert_with(|| Rc::new(value))
                .clone(),
            None => Rc::new(value),
        }
    }
}
