//! Runtime Value Representation
//!
//! Closed tagged union over the language's six value kinds. Numbers,
//! booleans, `undefined` and `null` are inline; strings and objects are
//! reference-counted heap handles (see `heap`).

use std::rc::Rc;

use super::heap::{ObjectRef, PropertyObject, StringRef};

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// IEEE 754 double
    Number(f64),

    /// Immutable byte string
    String(StringRef),

    Boolean(bool),

    Undefined,

    Null,

    /// Property object
    Object(ObjectRef),
}

impl Value {
    /// Allocate a new string value
    pub fn string(bytes: &[u8]) -> Self {
        Value::String(Rc::from(bytes))
    }

    /// Allocate a new, empty property object
    pub fn object(max_properties: usize) -> Self {
        Value::Object(PropertyObject::alloc(max_properties))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Object(_) => "object",
        }
    }

    /// Append the string coercion used by ADD: numbers are fixed-point with
    /// two decimals.
    pub fn append_text(&self, buf: &mut Vec<u8>) {
        match self {
            Value::Number(n) => buf.extend_from_slice(format!("{:.2}", n).as_bytes()),
            Value::String(s) => buf.extend_from_slice(s),
            Value::Boolean(true) => buf.extend_from_slice(b"true"),
            Value::Boolean(false) => buf.extend_from_slice(b"false"),
            Value::Undefined => buf.extend_from_slice(b"undefined"),
            Value::Null => buf.extend_from_slice(b"null"),
            Value::Object(_) => buf.extend_from_slice(b"[object Object]"),
        }
    }

    /// Bytes written by PRINT: integral numbers drop the fractional part,
    /// everything else follows the ADD coercion.
    pub fn display_text(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => {
                buf.extend_from_slice(format!("{}", n).as_bytes())
            }
            other => other.append_text(&mut buf),
        }
        buf
    }
}

/// Strings compare by content, objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
