//! Forms the value parser hands to the evaluator.
//!
//! Literals and arrays are built directly as `Value`s. A bare name or a
//! `$[op arg ...]` is captured as a `Term` and resolved by `eval::resolve`
//! the moment it has been read, so nothing unresolved reaches the document.

use crate::error::Position;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A bare name in value position
    ConstantRef { name: String, at: Position },
    /// `$[op arg ...]`
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub operation: Operation,
    /// Arguments, each already resolved when its closing token was read
    pub args: Vec<Value>,
    /// Position of the opening `$`
    pub at: Position,
}

/// Operations available inside `$[ ... ]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Len,
}

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "+" => Some(Operation::Add),
            "-" => Some(Operation::Sub),
            "*" => Some(Operation::Mul),
            "/" => Some(Operation::Div),
            "len" => Some(Operation::Len),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
            Operation::Len => "len",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Operation::Len => 1,
            Operation::Add | Operation::Sub | Operation::Mul | Operation::Div => 2,
        }
    }
}
