//! Namespace: a single table of variable/constant cells (spec §3, §4.5).
//! Grounded in the teacher's `indices.rs` newtype-keyed `BTreeMap` resource
//! tables — here the "resource" is a bound HLDSL value rather than a font or
//! XObject id.

use std::collections::HashMap;

use crate::error::Error;
use crate::validate::validate_name;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Variable(Value),
    Constant(Value),
}

#[derive(Debug, Default)]
pub struct Namespace {
    cells: HashMap<String, Cell>,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace { cells: HashMap::new() }
    }

    pub fn declare_variable(&mut self, name: &str, value: Value) -> Result<(), Error> {
        self.declare(name, Cell::Variable(value))
    }

    pub fn declare_constant(&mut self, name: &str, value: Value) -> Result<(), Error> {
        self.declare(name, Cell::Constant(value))
    }

    fn declare(&mut self, name: &str, cell: Cell) -> Result<(), Error> {
        validate_name(name)?;
        if self.cells.contains_key(name) {
            return Err(Error::name(format!("name {:?} is already declared", name)));
        }
        self.cells.insert(name.to_string(), cell);
        Ok(())
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), Error> {
        match self.cells.get_mut(name) {
            Some(Cell::Variable(slot)) => {
                *slot = value;
                Ok(())
            }
            Some(Cell::Constant(_)) => {
                Err(Error::name(format!("cannot assign to constant {:?}", name)))
            }
            None => Err(Error::name(format!("undeclared name {:?}", name))),
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, Error> {
        match self.cells.get(name) {
            Some(Cell::Variable(v)) | Some(Cell::Constant(v)) => Ok(v.clone()),
            None => Err(Error::name(format!("undeclared name {:?}", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_declaration_rejected() {
        let mut ns = Namespace::new();
        ns.declare_variable("x", Value::Integer(1)).unwrap();
        assert!(ns.declare_constant("x", Value::Integer(2)).is_err());
    }

    #[test]
    fn assign_to_constant_rejected() {
        let mut ns = Namespace::new();
        ns.declare_constant("x", Value::Integer(1)).unwrap();
        assert!(ns.assign("x", Value::Integer(2)).is_err());
    }

    #[test]
    fn assign_to_undeclared_rejected() {
        let mut ns = Namespace::new();
        assert!(ns.assign("x", Value::Integer(2)).is_err());
    }

    #[test]
    fn variable_round_trip() {
        let mut ns = Namespace::new();
        ns.declare_variable("x", Value::Integer(1)).unwrap();
        ns.assign("x", Value::Integer(2)).unwrap();
        assert_eq!(ns.get("x").unwrap(), Value::Integer(2));
    }
}
