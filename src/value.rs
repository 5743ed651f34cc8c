//! The HLDSL `Value` tagged sum. Grounded in the teacher's pattern of a
//! small closed enum wrapping richer object types behind `Rc` (see
//! `pdf_document.rs`'s `Rc<RefCell<_>>` resource handles) — here the
//! sharing is read-only, since every `Value` is immutable once built.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::atom::Atom;
use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::object::ObjectValue;

/// Unique-atom-keyed, unordered in the language's semantics; backed by a
/// `BTreeMap` for deterministic iteration in tests and diagnostics.
pub type Dictionary = BTreeMap<Atom, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Fixed(FixedPoint),
    Atom(Atom),
    String(Rc<str>),
    Dictionary(Rc<Dictionary>),
    Object(ObjectValue),
}

impl Value {
    /// Name used in type-error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Integer(_) => "Integer",
            Value::Fixed(_) => "Fixed",
            Value::Atom(_) => "Atom",
            Value::String(_) => "String",
            Value::Dictionary(_) => "Dictionary",
            Value::Object(obj) => obj.kind_name(),
        }
    }

    pub fn as_integer(&self) -> Result<i64, Error> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(Error::ty(format!("expected Integer, found {}", other.kind_name()))),
        }
    }

    /// A fixed-point argument accepts either a `Fixed` value directly, or an
    /// `Integer` within the promotable range (spec §4.5's coercion rule).
    pub fn as_fixed(&self) -> Result<FixedPoint, Error> {
        match self {
            Value::Fixed(v) => Ok(*v),
            Value::Integer(n) => FixedPoint::from_promotable_int(*n),
            other => Err(Error::ty(format!("expected Fixed, found {}", other.kind_name()))),
        }
    }

    pub fn as_atom(&self) -> Result<&Atom, Error> {
        match self {
            Value::Atom(a) => Ok(a),
            other => Err(Error::ty(format!("expected Atom, found {}", other.kind_name()))),
        }
    }

    pub fn as_string(&self) -> Result<&Rc<str>, Error> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::ty(format!("expected String, found {}", other.kind_name()))),
        }
    }

    pub fn as_dictionary(&self) -> Result<&Rc<Dictionary>, Error> {
        match self {
            Value::Dictionary(d) => Ok(d),
            other => Err(Error::ty(format!("expected Dictionary, found {}", other.kind_name()))),
        }
    }

    pub fn as_object(&self) -> Result<&ObjectValue, Error> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::ty(format!("expected object value, found {}", other.kind_name()))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Fixed(v) => write!(f, "{}", v),
            Value::Atom(a) => write!(f, "{}", a),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Dictionary(_) => write!(f, "<dictionary>"),
            Value::Object(obj) => write!(f, "<{}>", obj.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_promotes_to_fixed_in_range() {
        let v = Value::Integer(100);
        assert_eq!(v.as_fixed().unwrap(), FixedPoint::from_promotable_int(100).unwrap());
    }

    #[test]
    fn integer_out_of_promotable_range_is_type_error() {
        let v = Value::Integer(40000);
        assert!(v.as_fixed().is_err());
    }

    #[test]
    fn wrong_kind_is_type_error() {
        let v = Value::Null;
        assert!(v.as_integer().is_err());
        assert!(v.as_atom().is_err());
    }
}
