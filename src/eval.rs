use crate::ast::{Expression, Operation, Term};
use crate::error::{ErrorKind, Result, SyntaxError};
use crate::value::{ConstantTable, Value};

/// Resolve a constant reference or apply an expression to its arguments.
pub fn resolve(term: &Term, constants: &ConstantTable) -> Result<Value> {
    match term {
        Term::ConstantRef { name, at } => constants.get(name).cloned().ok_or_else(|| {
            SyntaxError::new(ErrorKind::UndefinedConstant(name.clone()), *at)
        }),
        Term::Expression(expr) => evaluate(expr),
    }
}

fn evaluate(expr: &Expression) -> Result<Value> {
    let op = expr.operation;
    if expr.args.len() != op.arity() {
        return Err(SyntaxError::new(
            ErrorKind::ArityMismatch {
                operation: op.name().to_string(),
                expected: op.arity(),
                found: expr.args.len(),
            },
            expr.at,
        ));
    }
    apply(op, &expr.args).map_err(|kind| SyntaxError::new(kind, expr.at))
}

/// Apply an operation to already-resolved arguments of the right arity.
pub fn apply(op: Operation, args: &[Value]) -> std::result::Result<Value, ErrorKind> {
    match (op, args) {
        (Operation::Len, [arg]) => length(arg),
        (Operation::Div, [lhs, rhs]) => divide(lhs, rhs),
        (Operation::Add, [lhs, rhs]) => arithmetic(op, lhs, rhs, i64::checked_add, |a, b| a + b),
        (Operation::Sub, [lhs, rhs]) => arithmetic(op, lhs, rhs, i64::checked_sub, |a, b| a - b),
        (Operation::Mul, [lhs, rhs]) => arithmetic(op, lhs, rhs, i64::checked_mul, |a, b| a * b),
        _ => Err(ErrorKind::ArityMismatch {
            operation: op.name().to_string(),
            expected: op.arity(),
            found: args.len(),
        }),
    }
}

fn length(arg: &Value) -> std::result::Result<Value, ErrorKind> {
    let len = match arg {
        Value::Array(items) => items.len(),
        Value::Text(s) => s.chars().count(),
        other => {
            return Err(ErrorKind::UnsupportedType {
                operation: Operation::Len.name().to_string(),
                found: other.type_name(),
            })
        }
    };
    i64::try_from(len)
        .map(Value::Integer)
        .map_err(|_| ErrorKind::IntegerOverflow(Operation::Len.name().to_string()))
}

/// Integer op Integer stays an integer; anything involving a float is a float.
fn arithmetic(
    op: Operation,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> std::result::Result<Value, ErrorKind> {
    if let (Value::Integer(a), Value::Integer(b)) = (lhs, rhs) {
        return int_op(*a, *b)
            .map(Value::Integer)
            .ok_or_else(|| ErrorKind::IntegerOverflow(op.name().to_string()));
    }
    let (a, b) = numeric_operands(op, lhs, rhs)?;
    Ok(Value::Float(float_op(a, b)))
}

/// `/` always yields a float, even for two integers.
fn divide(lhs: &Value, rhs: &Value) -> std::result::Result<Value, ErrorKind> {
    let (a, b) = numeric_operands(Operation::Div, lhs, rhs)?;
    if rhs.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    Ok(Value::Float(a / b))
}

fn numeric_operands(
    op: Operation,
    lhs: &Value,
    rhs: &Value,
) -> std::result::Result<(f64, f64), ErrorKind> {
    let unsupported = |v: &Value| ErrorKind::UnsupportedType {
        operation: op.name().to_string(),
        found: v.type_name(),
    };
    let a = lhs.as_f64().ok_or_else(|| unsupported(lhs))?;
    let b = rhs.as_f64().ok_or_else(|| unsupported(rhs))?;
    Ok((a, b))
}
