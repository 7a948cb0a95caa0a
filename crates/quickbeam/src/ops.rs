//! Type coercion and operator dispatch
//!
//! Operands arriving here are already forced; laziness is the evaluator's
//! concern. Division by zero is the one condition that leaves through the
//! catchable [`Interrupt::Raise`] channel — everything else is a hard
//! name/type/fault error.

use crate::ast::{BinOp, TypeSpec, UnaryOp};
use crate::error::{EvalError, Exception, Interrupt, Outcome};
use crate::value::{StructRef, Thunk, Value};

/// Implicit conversion of `value` to a declared target type.
///
/// A no-op when the types already match. `int` coerces to `bool` (nonzero
/// is `true`); `nil` coerces to any struct type's nil handle. Every other
/// mismatch is a type error.
pub(crate) fn coerce(value: Value, target: &TypeSpec) -> Result<Value, EvalError> {
    let matches_already = match (&value, target) {
        (Value::Int(_), TypeSpec::Int)
        | (Value::Bool(_), TypeSpec::Bool)
        | (Value::Str(_), TypeSpec::Str) => true,
        (Value::StructRef(r), TypeSpec::Struct(name)) => r.type_name.as_ref() == name.as_str(),
        _ => false,
    };
    if matches_already {
        return Ok(value);
    }
    match (&value, target) {
        (Value::Int(n), TypeSpec::Bool) => Ok(Value::Bool(*n != 0)),
        (Value::Nil, TypeSpec::Struct(name)) => {
            Ok(Value::StructRef(StructRef::nil(name.clone())))
        }
        _ => Err(EvalError::IllegalCoercion {
            from: value.type_name(),
            to: target.to_string(),
        }),
    }
}

/// Coerce without forcing: an unforced deferred value is wrapped so the
/// declared-type check runs on first read; anything else is checked now.
pub(crate) fn coerce_lazy(value: Value, target: &TypeSpec) -> Result<Value, EvalError> {
    match &value {
        Value::Deferred(thunk) => match thunk.peek() {
            Some(forced) => coerce(forced, target),
            None => Ok(Value::Deferred(Thunk::coerce(value.clone(), target.clone()))),
        },
        _ => coerce(value, target),
    }
}

/// Read a value in a boolean context, applying Int→Bool coercion.
/// `None` means the value cannot stand where a boolean is required.
pub(crate) fn bool_operand(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(n) => Some(*n != 0),
        _ => None,
    }
}

/// Apply a binary operator to two forced operands.
pub(crate) fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Outcome<Value> {
    // Struct handles only ever compare; everything else about them is a
    // type error.
    if matches!(lhs, Value::StructRef(_)) || matches!(rhs, Value::StructRef(_)) {
        return struct_compare(op, &lhs, &rhs).map_err(Interrupt::from);
    }

    let (lhs, rhs) = coerce_bool_operands(op, lhs, rhs)?;

    if !same_type(&lhs, &rhs) {
        // Equality across two different primitive types is not an error:
        // the values simply are not equal.
        return match op {
            BinOp::Eq => Ok(Value::Bool(false)),
            BinOp::Ne => Ok(Value::Bool(true)),
            _ => Err(EvalError::MixedOperands {
                op: op.symbol().to_string(),
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            }
            .into()),
        };
    }

    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, a, b),
        (Value::Str(a), Value::Str(b)) => str_op(op, &a, &b).map_err(Interrupt::from),
        (Value::Bool(a), Value::Bool(b)) => bool_op(op, a, b).map_err(Interrupt::from),
        (Value::Nil, Value::Nil) => nil_op(op).map_err(Interrupt::from),
        (lhs, _) => Err(EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty: lhs.type_name(),
        }
        .into()),
    }
}

/// Apply a unary operator to a forced operand.
pub(crate) fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => match value {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| EvalError::IntegerOverflow {
                    op: "neg".to_string(),
                }),
            other => Err(EvalError::InvalidOperator {
                op: "neg".to_string(),
                ty: other.type_name(),
            }),
        },
        UnaryOp::Not => match bool_operand(&value) {
            Some(b) => Ok(Value::Bool(!b)),
            None => Err(EvalError::InvalidOperator {
                op: "!".to_string(),
                ty: value.type_name(),
            }),
        },
    }
}

/// For `&&`/`||` both operands must be boolean after Int→Bool coercion;
/// for every other operator a bool/int operand pair coerces the int side.
fn coerce_bool_operands(op: BinOp, lhs: Value, rhs: Value) -> Result<(Value, Value), EvalError> {
    if matches!(op, BinOp::And | BinOp::Or) {
        let fail = |value: &Value| EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty: value.type_name(),
        };
        let l = bool_operand(&lhs).ok_or_else(|| fail(&lhs))?;
        let r = bool_operand(&rhs).ok_or_else(|| fail(&rhs))?;
        return Ok((Value::Bool(l), Value::Bool(r)));
    }
    match (&lhs, &rhs) {
        (Value::Bool(_), Value::Int(n)) => {
            let coerced = Value::Bool(*n != 0);
            Ok((lhs, coerced))
        }
        (Value::Int(n), Value::Bool(_)) => {
            let coerced = Value::Bool(*n != 0);
            Ok((coerced, rhs))
        }
        _ => Ok((lhs, rhs)),
    }
}

fn same_type(lhs: &Value, rhs: &Value) -> bool {
    matches!(
        (lhs, rhs),
        (Value::Int(_), Value::Int(_))
            | (Value::Str(_), Value::Str(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Nil, Value::Nil)
    )
}

fn int_op(op: BinOp, a: i64, b: i64) -> Outcome<Value> {
    let overflow = |symbol: &str| {
        Interrupt::from(EvalError::IntegerOverflow {
            op: symbol.to_string(),
        })
    };
    match op {
        BinOp::Add => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| overflow("+")),
        BinOp::Sub => a
            .checked_sub(b)
            .map(Value::Int)
            .ok_or_else(|| overflow("-")),
        BinOp::Mul => a
            .checked_mul(b)
            .map(Value::Int)
            .ok_or_else(|| overflow("*")),
        BinOp::Div => {
            if b == 0 {
                return Err(Interrupt::Raise(Exception::div_zero()));
            }
            floor_div(a, b).map(Value::Int).ok_or_else(|| overflow("/"))
        }
        BinOp::Eq => Ok(Value::Bool(a == b)),
        BinOp::Ne => Ok(Value::Bool(a != b)),
        BinOp::Lt => Ok(Value::Bool(a < b)),
        BinOp::Le => Ok(Value::Bool(a <= b)),
        BinOp::Gt => Ok(Value::Bool(a > b)),
        BinOp::Ge => Ok(Value::Bool(a >= b)),
        // Int operands of `&&`/`||` were coerced to bool before dispatch.
        BinOp::And | BinOp::Or => Err(EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty: "int".to_string(),
        }
        .into()),
    }
}

/// Floor division: the quotient rounds toward negative infinity, matching
/// the reference semantics for negative operands. `None` on i64 overflow
/// (`i64::MIN / -1`).
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn str_op(op: BinOp, a: &str, b: &str) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => Ok(Value::str(format!("{}{}", a, b))),
        BinOp::Eq => Ok(Value::Bool(a == b)),
        BinOp::Ne => Ok(Value::Bool(a != b)),
        _ => Err(EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty: "string".to_string(),
        }),
    }
}

fn bool_op(op: BinOp, a: bool, b: bool) -> Result<Value, EvalError> {
    match op {
        BinOp::And => Ok(Value::Bool(a && b)),
        BinOp::Or => Ok(Value::Bool(a || b)),
        BinOp::Eq => Ok(Value::Bool(a == b)),
        BinOp::Ne => Ok(Value::Bool(a != b)),
        _ => Err(EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty: "bool".to_string(),
        }),
    }
}

fn nil_op(op: BinOp) -> Result<Value, EvalError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(true)),
        BinOp::Ne => Ok(Value::Bool(false)),
        _ => Err(EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty: "nil".to_string(),
        }),
    }
}

/// Comparison rules when at least one operand is a struct handle.
fn struct_compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    // A struct never meets a non-nil primitive, whatever the operator.
    if matches!(lhs, Value::Int(_) | Value::Str(_) | Value::Bool(_))
        || matches!(rhs, Value::Int(_) | Value::Str(_) | Value::Bool(_))
    {
        return Err(EvalError::InvalidComparison {
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        });
    }
    if !matches!(op, BinOp::Eq | BinOp::Ne) {
        let ty = match (lhs, rhs) {
            (Value::StructRef(r), _) | (_, Value::StructRef(r)) => r.type_name.to_string(),
            _ => lhs.type_name(),
        };
        return Err(EvalError::InvalidOperator {
            op: op.symbol().to_string(),
            ty,
        });
    }
    let equal = match (lhs, rhs) {
        (Value::StructRef(a), Value::StructRef(b)) => {
            if a.type_name != b.type_name {
                return Err(EvalError::InvalidComparison {
                    lhs: a.type_name.to_string(),
                    rhs: b.type_name.to_string(),
                });
            }
            a.instance == b.instance
        }
        (Value::StructRef(r), Value::Nil) | (Value::Nil, Value::StructRef(r)) => r.is_nil(),
        _ => {
            return Err(EvalError::InvalidComparison {
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            })
        }
    };
    match op {
        BinOp::Eq => Ok(Value::Bool(equal)),
        _ => Ok(Value::Bool(!equal)),
    }
}
