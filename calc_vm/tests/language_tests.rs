//! End-to-end coverage of literals, operators, indexing, blocks,
//! conditionals and loops.

mod common;

use calc_vm::vm::{ErrorKind, Value};
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn literals() {
    assert_int(eval("1"), 1);
    assert_float(eval("3.14"), 3.14);
    assert_bool(eval("false"), false);
    assert_str(eval("\"abc\""), "abc");
    assert_eq!(eval("[]"), int_array(&[]));
    assert_eq!(
        eval("[1, false]"),
        Value::Array(std::rc::Rc::new(vec![Value::Int(1), Value::Bool(false)]))
    );
}

#[test]
fn arithmetic() {
    assert_int(eval("1+2"), 3);
    assert_int(eval("1-2+1"), 0);
    assert_int(eval("1-(2+1)"), -2);
    assert_int(eval("2*3+4"), 10);
    assert_int(eval("7/2"), 3);
    assert_int(eval("7%3"), 1);
    assert_int(eval("-2"), -2);
}

#[test]
fn float_arithmetic_and_promotion() {
    assert_float(eval("1.5 + 1.5"), 3.0);
    assert_float(eval("1 + 0.5"), 1.5);
    assert_float(eval("0.5 * 2"), 1.0);
}

#[test]
fn division_and_modulo_by_zero() {
    assert_error_kind(eval("1/0"), ErrorKind::ZeroDivision);
    assert_error_kind(eval("1.0/0.0"), ErrorKind::ZeroDivision);
    assert_error_kind(eval("1%0"), ErrorKind::ZeroDivision);
}

#[test]
fn string_concatenation() {
    assert_str(eval("\"abc\" + \"def\""), "abcdef");
    assert_int(eval("#(\"abc\" + \"def\")"), 6);
    assert_str(eval("(\"abc\" + \"def\")[0:3]"), "abc");
}

#[test]
fn comparisons() {
    assert_bool(eval("1==1"), true);
    assert_bool(eval("1!=1"), false);
    assert_bool(eval("1==0.9999999"), false);
    assert_bool(eval("1<1"), false);
    assert_bool(eval("1<=1"), true);
    assert_bool(eval("2>1"), true);
    assert_bool(eval("\"apple\" < \"pear\""), true);
}

#[test]
fn strict_equality_does_not_coerce() {
    assert_bool(eval("1 == 1.0"), false);
    assert_bool(eval("1 != 1.0"), true);
    assert_bool(eval("\"1\" == 1"), false);
}

#[test]
fn logic() {
    assert_bool(eval("true&true"), true);
    assert_bool(eval("true&false"), false);
    assert_bool(eval("false|true"), true);
    assert_bool(eval("!true"), false);
    assert_error_kind(eval("1 & true"), ErrorKind::Type);
    assert_error_kind(eval("!1"), ErrorKind::Type);
}

#[test]
fn string_indexing() {
    assert_str(eval("\"apple\"[1]"), "p");
    assert_str(eval("\"apple\" [ 1 : 1]"), "");
    assert_str(eval("\"apple\"[1:3]"), "pp");
    assert_int(eval("#\"\""), 0);
}

#[test]
fn array_indexing() {
    assert_int(eval("[5, 2, 4][1]"), 2);
    assert_eq!(eval("[1, 2, 3][1:3]"), int_array(&[2, 3]));
    assert_int(eval("#[]"), 0);
}

#[test]
fn index_errors() {
    assert_error_kind(eval("\"apple\"[5]"), ErrorKind::Index);
    assert_error_kind(eval("[1][1]"), ErrorKind::Index);
    assert_error_kind(eval("[1][0-1]"), ErrorKind::Index);
    assert_error_kind(eval("[1, 2][2:1]"), ErrorKind::Index);
    assert_error_kind(eval("[1, 2][0:3]"), ErrorKind::Index);
    assert_error_kind(eval("1[0]"), ErrorKind::Type);
    assert_error_kind(eval("[1][true]"), ErrorKind::Type);
}

#[test]
fn array_concatenation_properties() {
    // (a + [x])[i] == a[i], (a + [x])[#a] == x
    assert_int(eval("{ a = [1, 2]; (a + [9])[0] }"), 1);
    assert_int(eval("{ a = [1, 2]; (a + [9])[1] }"), 2);
    assert_int(eval("{ a = [1, 2]; (a + [9])[#a] }"), 9);
    assert_eq!(eval("{ a = [1, 2]; a[0:#a] }"), int_array(&[1, 2]));
}

#[test]
fn blocks() {
    assert_int(eval("{\n1\n}"), 1);
    assert_int(eval("{\n1\n2\n}"), 2);
    assert_int(eval("{\na=3\na+1\n}"), 4);
}

#[test]
fn variable_lookup_of_undefined_name() {
    let value = eval("a");
    assert!(
        matches!(value, Value::Error(ref e) if e.kind == ErrorKind::Undefined
            && e.message == "a not defined")
    );
}

#[test]
fn conditionals() {
    assert_int(eval("if true 1"), 1);
    assert_int(eval("if false 1 else 2"), 2);
    assert_error_kind(eval("if false 1"), ErrorKind::NoResult);
    assert_error_kind(eval("if 1 1"), ErrorKind::Type);
    assert_int(eval("if true {\n1\n}"), 1);
    assert_int(eval("if false {\n1\n} else {\n2\n}"), 2);
}

#[test]
fn loops() {
    assert_int(eval("{\na = 1\nwhile a < 10 a = a + 1\na\n}"), 10);
    assert_int(eval("{\na = 1\nwhile a < 10 {\na = a + 1\n}\na\n}"), 10);
    assert_error_kind(
        eval("{\nwhile false {\na = a + 1\n}\n}"),
        ErrorKind::NoResult,
    );
    assert_error_kind(eval("{\nwhile 13 {\na = a + 1\n}\n}"), ErrorKind::Type);
}

#[test]
fn loop_over_an_array_accumulates() {
    let src = r#"{
      ary = [1, 2, 3, 4]
      i = 0
      sum = 0
      while i < #ary {
        sum = sum + ary[i]
        i = i + 1
      }
      sum
    }"#;
    assert_int(eval(src), 10);
}

#[test]
fn condition_errors_propagate_out_of_conditionals() {
    // an undefined name in the condition surfaces as its own error, not as
    // the branch result
    let value = eval("if missing 1");
    assert!(matches!(value, Value::Error(ref e) if e.kind == ErrorKind::Undefined));
}

#[test]
fn arithmetic_on_errors_propagates() {
    let value = eval("a + 1");
    assert!(matches!(value, Value::Error(ref e) if e.kind == ErrorKind::Undefined));
    assert_error_kind(eval("1/0 + 1"), ErrorKind::ZeroDivision);
}

#[test]
fn evaluation_is_deterministic() {
    let src = "{ a = [3, 1]; while #a < 5 a = a + [#a]; a }";
    assert_eq!(eval(src), eval(src));
}

#[test]
fn integer_arithmetic_wraps_modulo_two_to_the_64() {
    assert_int(eval("9223372036854775807 + 1"), i64::MIN);
    assert_int(eval("9223372036854775807 * 2"), -2);
}
