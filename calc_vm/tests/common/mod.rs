//! Shared helpers for integration tests.
// Consumed selectively by several test targets; not every helper is used by
// every target.
#![allow(dead_code)]

use std::rc::Rc;

use calc_vm::api::{eval_str, eval_str_with_output};
use calc_vm::vm::{ErrorKind, Value};

/// Evaluate in a fresh session, panicking on parse/compile failures.
pub fn eval(src: &str) -> Value {
    eval_str(src).unwrap_or_else(|e| panic!("eval failed for {src:?}: {e}"))
}

/// Evaluate in a fresh session, returning the value and the write output.
pub fn eval_with_output(src: &str) -> (Value, String) {
    eval_str_with_output(src).unwrap_or_else(|e| panic!("eval failed for {src:?}: {e}"))
}

pub fn assert_int(value: Value, expected: i64) {
    match value {
        Value::Int(v) => assert_eq!(v, expected, "expected Int({expected}), got Int({v})"),
        other => panic!("expected Int({expected}), got {other:?}"),
    }
}

pub fn assert_float(value: Value, expected: f64) {
    match value {
        Value::Float(v) => assert!(
            (v - expected).abs() < 1e-12,
            "expected Float({expected}), got Float({v})"
        ),
        other => panic!("expected Float({expected}), got {other:?}"),
    }
}

pub fn assert_bool(value: Value, expected: bool) {
    match value {
        Value::Bool(v) => assert_eq!(v, expected),
        other => panic!("expected Bool({expected}), got {other:?}"),
    }
}

pub fn assert_str(value: Value, expected: &str) {
    match value {
        Value::Str(v) => assert_eq!(v, expected),
        other => panic!("expected Str({expected:?}), got {other:?}"),
    }
}

pub fn assert_error_kind(value: Value, expected: ErrorKind) {
    match value {
        Value::Error(e) => assert_eq!(
            e.kind, expected,
            "expected {expected:?} error, got {:?} ({})",
            e.kind, e.message
        ),
        other => panic!("expected {expected:?} error, got {other:?}"),
    }
}

pub fn int_array(values: &[i64]) -> Value {
    Value::Array(Rc::new(values.iter().map(|&v| Value::Int(v)).collect()))
}
