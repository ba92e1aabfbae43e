//! Value - the runtime value type of the calc VM.
//!
//! All user-visible failures are `Value::Error` data flowing through the
//! stack like any other value; operations on values are pure and never
//! mutate their operands.

use std::fmt;
use std::rc::Rc;

/// Kind of a runtime error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation applied to the wrong tag(s).
    Type,
    /// Function called with the wrong arity.
    Argument,
    /// Integer or float divide/mod by zero.
    ZeroDivision,
    /// `aton` on a non-numeric string.
    Conversion,
    /// Array/string index or slice out of range.
    Index,
    /// Statement produced no value.
    NoResult,
    /// Call-frame depth limit exceeded.
    StackOverflow,
    /// Read of an unbound global.
    Undefined,
    /// Produced by the `error` builtin.
    User,
}

/// A runtime error value: a kind plus a human readable message.
/// Two errors are equal when both kind and message match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn type_error() -> Self {
        Self {
            kind: ErrorKind::Type,
            message: "type error".into(),
        }
    }

    pub fn argument() -> Self {
        Self {
            kind: ErrorKind::Argument,
            message: "argument error".into(),
        }
    }

    pub fn zero_division() -> Self {
        Self {
            kind: ErrorKind::ZeroDivision,
            message: "division by zero".into(),
        }
    }

    pub fn conversion() -> Self {
        Self {
            kind: ErrorKind::Conversion,
            message: "conversion error".into(),
        }
    }

    pub fn index() -> Self {
        Self {
            kind: ErrorKind::Index,
            message: "index error".into(),
        }
    }

    pub fn no_result() -> Self {
        Self {
            kind: ErrorKind::NoResult,
            message: "no result".into(),
        }
    }

    pub fn stack_overflow() -> Self {
        Self {
            kind: ErrorKind::StackOverflow,
            message: "stack overflow".into(),
        }
    }

    pub fn undefined(name: &str) -> Self {
        Self {
            kind: ErrorKind::Undefined,
            message: format!("{name} not defined"),
        }
    }

    pub fn user(message: String) -> Self {
        Self {
            kind: ErrorKind::User,
            message,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Callable descriptor: entry address into the code segment, arity, frame
/// size, and the captured-frame snapshot taken when the function value was
/// materialized. Function values compare by descriptor identity.
#[derive(Debug)]
pub struct FunctionValue {
    pub entry: usize,
    pub param_cnt: usize,
    pub local_cnt: usize,
    pub snapshot: Rc<Vec<Value>>,
}

/// Arithmetic operators dispatched by [`Value::arith`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Logical operators dispatched by [`Value::logic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Ordered comparison operators dispatched by [`Value::relational`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Array(Rc<Vec<Value>>),
    Function(Rc<FunctionValue>),
    Error(RuntimeError),
    /// Absence of a value; frame slots start out holding this.
    NoResult,
}

impl PartialEq for Value {
    /// Strict equality: values of different tags are never equal, Int and
    /// Float are not coerced, functions compare by identity.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Float(l), Value::Float(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Array(l), Value::Array(r)) => l == r,
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::Error(l), Value::Error(r)) => l == r,
            (Value::NoResult, Value::NoResult) => true,
            _ => false,
        }
    }
}

fn int_arith(op: ArithOp, l: i64, r: i64) -> Value {
    match op {
        ArithOp::Add => Value::Int(l.wrapping_add(r)),
        ArithOp::Sub => Value::Int(l.wrapping_sub(r)),
        ArithOp::Mul => Value::Int(l.wrapping_mul(r)),
        ArithOp::Div => {
            if r == 0 {
                Value::Error(RuntimeError::zero_division())
            } else {
                Value::Int(l.wrapping_div(r))
            }
        }
    }
}

fn float_arith(op: ArithOp, l: f64, r: f64) -> Value {
    match op {
        ArithOp::Add => Value::Float(l + r),
        ArithOp::Sub => Value::Float(l - r),
        ArithOp::Mul => Value::Float(l * r),
        ArithOp::Div => {
            if r == 0.0 {
                Value::Error(RuntimeError::zero_division())
            } else {
                Value::Float(l / r)
            }
        }
    }
}

impl Value {
    /// `+ - * /`. Int/Int stays Int, mixed numeric promotes to Float,
    /// `+` concatenates strings and arrays. An Error operand propagates.
    pub fn arith(&self, op: ArithOp, rhs: &Value) -> Value {
        if let Value::Error(_) = self {
            return self.clone();
        }
        if let Value::Error(_) = rhs {
            return rhs.clone();
        }
        match (self, rhs) {
            (Value::Int(l), Value::Int(r)) => int_arith(op, *l, *r),
            (Value::Int(l), Value::Float(r)) => float_arith(op, *l as f64, *r),
            (Value::Float(l), Value::Int(r)) => float_arith(op, *l, *r as f64),
            (Value::Float(l), Value::Float(r)) => float_arith(op, *l, *r),
            (Value::Str(l), Value::Str(r)) if op == ArithOp::Add => {
                Value::Str(format!("{l}{r}"))
            }
            (Value::Array(l), Value::Array(r)) if op == ArithOp::Add => {
                let mut out = l.as_ref().clone();
                out.extend(r.iter().cloned());
                Value::Array(Rc::new(out))
            }
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `%`, integers only.
    pub fn modulo(&self, rhs: &Value) -> Value {
        if let Value::Error(_) = self {
            return self.clone();
        }
        if let Value::Error(_) = rhs {
            return rhs.clone();
        }
        match (self, rhs) {
            (Value::Int(_), Value::Int(0)) => Value::Error(RuntimeError::zero_division()),
            (Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_rem(*r)),
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `& |`, booleans only. Both sides are already evaluated; there is no
    /// short circuit in this language.
    pub fn logic(&self, op: LogicOp, rhs: &Value) -> Value {
        if let Value::Error(_) = self {
            return self.clone();
        }
        if let Value::Error(_) = rhs {
            return rhs.clone();
        }
        match (self, rhs) {
            (Value::Bool(l), Value::Bool(r)) => Value::Bool(match op {
                LogicOp::And => *l && *r,
                LogicOp::Or => *l || *r,
            }),
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `!`, booleans only.
    pub fn not(&self) -> Value {
        match self {
            Value::Error(_) => self.clone(),
            Value::Bool(b) => Value::Bool(!b),
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `< > <= >=` over numbers (with Int/Float promotion) and strings
    /// (lexicographic).
    pub fn relational(&self, op: RelOp, rhs: &Value) -> Value {
        if let Value::Error(_) = self {
            return self.clone();
        }
        if let Value::Error(_) = rhs {
            return rhs.clone();
        }
        let ordered = |l: f64, r: f64| {
            Value::Bool(match op {
                RelOp::Lt => l < r,
                RelOp::Gt => l > r,
                RelOp::Le => l <= r,
                RelOp::Ge => l >= r,
            })
        };
        match (self, rhs) {
            (Value::Int(l), Value::Int(r)) => Value::Bool(match op {
                RelOp::Lt => l < r,
                RelOp::Gt => l > r,
                RelOp::Le => l <= r,
                RelOp::Ge => l >= r,
            }),
            (Value::Int(l), Value::Float(r)) => ordered(*l as f64, *r),
            (Value::Float(l), Value::Int(r)) => ordered(*l, *r as f64),
            (Value::Float(l), Value::Float(r)) => ordered(*l, *r),
            (Value::Str(l), Value::Str(r)) => Value::Bool(match op {
                RelOp::Lt => l < r,
                RelOp::Gt => l > r,
                RelOp::Le => l <= r,
                RelOp::Ge => l >= r,
            }),
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `== !=`. Strict across tags, never errors.
    pub fn equality(&self, negated: bool, rhs: &Value) -> Value {
        Value::Bool((self == rhs) != negated)
    }

    /// `#`: byte count of a string, element count of an array.
    pub fn length(&self) -> Value {
        match self {
            Value::Error(_) => self.clone(),
            Value::Str(s) => Value::Int(s.len() as i64),
            Value::Array(a) => Value::Int(a.len() as i64),
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `v[at]`: single element of an array, single byte substring of a
    /// string. The index must be an Int in `[0, len)`.
    pub fn index_at(&self, at: &Value) -> Value {
        if let Value::Error(_) = self {
            return self.clone();
        }
        if let Value::Error(_) = at {
            return at.clone();
        }
        let Value::Int(i) = at else {
            return Value::Error(RuntimeError::type_error());
        };
        match self {
            Value::Str(s) => {
                if *i < 0 || *i as usize >= s.len() {
                    return Value::Error(RuntimeError::index());
                }
                match s.get(*i as usize..*i as usize + 1) {
                    Some(sub) => Value::Str(sub.to_string()),
                    None => Value::Error(RuntimeError::index()),
                }
            }
            Value::Array(a) => {
                if *i < 0 {
                    return Value::Error(RuntimeError::index());
                }
                match a.get(*i as usize) {
                    Some(v) => v.clone(),
                    None => Value::Error(RuntimeError::index()),
                }
            }
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    /// `v[from:to]`: the half open slice `[from, to)`; requires
    /// `0 <= from <= to <= len`. String slices are new strings, array slices
    /// are new arrays.
    pub fn index_range(&self, from: &Value, to: &Value) -> Value {
        if let Value::Error(_) = self {
            return self.clone();
        }
        if let Value::Error(_) = from {
            return from.clone();
        }
        if let Value::Error(_) = to {
            return to.clone();
        }
        let (Value::Int(from), Value::Int(to)) = (from, to) else {
            return Value::Error(RuntimeError::type_error());
        };
        let len = match self {
            Value::Str(s) => s.len(),
            Value::Array(a) => a.len(),
            _ => return Value::Error(RuntimeError::type_error()),
        };
        if *from < 0 || *to < *from || *to as usize > len {
            return Value::Error(RuntimeError::index());
        }
        let (from, to) = (*from as usize, *to as usize);
        match self {
            Value::Str(s) => match s.get(from..to) {
                Some(sub) => Value::Str(sub.to_string()),
                None => Value::Error(RuntimeError::index()),
            },
            Value::Array(a) => Value::Array(Rc::new(a[from..to].to_vec())),
            _ => Value::Error(RuntimeError::type_error()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Rc<Vec<Value>>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionValue>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "<function/{}>", func.param_cnt),
            Value::Error(e) => write!(f, "{e}"),
            Value::NoResult => write!(f, "no result"),
        }
    }
}
