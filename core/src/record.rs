//! The record tree shared by both passes.
//!
//! Templates, generated records, and velocity-augmented records are all
//! JSON objects whose optional substructures are read defensively. A
//! missing or wrongly-typed substructure reads as empty; it is never an
//! error. Unknown fields are carried through untouched.

use crate::types::{CUSTOMER, ORDERS, PAYMENT_METHODS, TRANSACTIONS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level field. An existing key keeps its position.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn customer_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(CUSTOMER).and_then(Value::as_object_mut)
    }

    pub fn payment_methods(&self) -> &[Value] {
        self.list(PAYMENT_METHODS)
    }

    pub fn payment_methods_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.list_mut(PAYMENT_METHODS)
    }

    pub fn orders(&self) -> &[Value] {
        self.list(ORDERS)
    }

    pub fn orders_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.list_mut(ORDERS)
    }

    pub fn transactions(&self) -> &[Value] {
        self.list(TRANSACTIONS)
    }

    pub fn transactions_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.list_mut(TRANSACTIONS)
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    fn list(&self, key: &str) -> &[Value] {
        match self.0.get(key) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    fn list_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
        self.0.get_mut(key).and_then(Value::as_array_mut)
    }
}

/// A non-empty string field of an entity object.
pub fn str_field<'a>(entity: &'a Value, key: &str) -> Option<&'a str> {
    entity
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Shift an amount by `delta`, clamped to a floor of 1.
///
/// Integers stay integers and floats stay floats. A missing or
/// non-numeric amount counts as 0.
pub fn perturb_amount(current: Option<&Value>, delta: i64) -> Value {
    match current {
        Some(Value::Number(n)) if n.is_f64() => {
            let shifted = (n.as_f64().unwrap_or(0.0) + delta as f64).max(1.0);
            Number::from_f64(shifted)
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(1))
        }
        Some(Value::Number(n)) => {
            let base = n.as_i64().unwrap_or(i64::MAX);
            Value::from(base.saturating_add(delta).max(1))
        }
        _ => Value::from(delta.max(1)),
    }
}
