//! Expression evaluation
//!
//! The caller's [`EvalMode`] decides what laziness means at each node.
//! Literals and `nil` are immediate either way. A variable read resolves
//! its binding immediately — an undefined name is a name error even in
//! lazy position — and in lazy mode hands back the bound value itself, so
//! a shared thunk stays shared. Compound expressions (operators, calls,
//! `new`) become a deferred value in lazy mode, capturing the visible
//! scopes.

use crate::ast::{BinOp, Expr, VarPath};
use crate::error::{EvalError, Outcome};
use crate::ops;
use crate::structs::InstanceId;
use crate::value::Value;

use super::{EvalMode, Interpreter};

impl Interpreter<'_> {
    /// Evaluate an expression. With [`EvalMode::Eager`] the result is
    /// never deferred; with [`EvalMode::Lazy`] it may be.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, mode: EvalMode) -> Outcome<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Str(s) => Ok(Value::str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Var(path) => self.eval_var(path, mode),
            Expr::Binary { op, lhs, rhs } => match mode {
                EvalMode::Lazy => Ok(self.defer(expr)),
                EvalMode::Eager => self.eval_binary(*op, lhs, rhs),
            },
            Expr::Unary { op, operand } => match mode {
                EvalMode::Lazy => Ok(self.defer(expr)),
                EvalMode::Eager => {
                    let value = self.eval_expr(operand, EvalMode::Eager)?;
                    Ok(ops::apply_unary(*op, value)?)
                }
            },
            Expr::Call(call) => match mode {
                EvalMode::Lazy => Ok(self.defer(expr)),
                EvalMode::Eager => match self.eval_call(call)? {
                    Some(value) => self.force(value),
                    None => Err(EvalError::VoidInExpression.into()),
                },
            },
            Expr::New { type_name } => match mode {
                EvalMode::Lazy => Ok(self.defer(expr)),
                EvalMode::Eager => self.eval_new(type_name),
            },
        }
    }

    /// Allocate a zero-initialized instance and hand back its handle.
    fn eval_new(&mut self, type_name: &str) -> Outcome<Value> {
        let layout = self
            .structs
            .get(type_name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownType {
                name: type_name.to_string(),
            })?;
        let id = self.heap.alloc(layout);
        Ok(Value::StructRef(crate::value::StructRef::new(type_name, id)))
    }

    /// Read a variable or a dotted field chain.
    fn eval_var(&mut self, path: &VarPath, mode: EvalMode) -> Outcome<Value> {
        if path.is_bare() {
            let value = self.lookup_var(&path.base)?;
            return match mode {
                EvalMode::Lazy => Ok(value),
                EvalMode::Eager => self.force(value),
            };
        }
        let (id, field) = self.resolve_struct_path(path)?;
        let instance = self.heap.get(id);
        let value = match instance.get(&field) {
            Some(value) => value.clone(),
            None => {
                return Err(EvalError::UnknownField {
                    type_name: instance.type_name().to_string(),
                    field,
                }
                .into())
            }
        };
        match mode {
            EvalMode::Lazy => Ok(value),
            EvalMode::Eager => self.force(value),
        }
    }

    /// Walk a dotted path up to (but not into) its final field: force the
    /// base, then one dereference per intermediate dot. Returns the
    /// instance holding the final field, plus that field's name. A nil
    /// handle anywhere along the way is a fault.
    pub(crate) fn resolve_struct_path(&mut self, path: &VarPath) -> Outcome<(InstanceId, String)> {
        let base = self.lookup_var(&path.base)?;
        let mut current = self.force(base)?;
        for (i, field) in path.fields.iter().enumerate() {
            let handle = match &current {
                Value::StructRef(r) => r.clone(),
                other => {
                    return Err(EvalError::NotAStruct {
                        ty: other.type_name(),
                        field: field.clone(),
                    }
                    .into())
                }
            };
            let id = match handle.instance {
                Some(id) => id,
                None => {
                    return Err(EvalError::NilDereference {
                        field: field.clone(),
                    }
                    .into())
                }
            };
            if i + 1 == path.fields.len() {
                return Ok((id, field.clone()));
            }
            let instance = self.heap.get(id);
            let next = match instance.get(field) {
                Some(value) => value.clone(),
                None => {
                    return Err(EvalError::UnknownField {
                        type_name: instance.type_name().to_string(),
                        field: field.clone(),
                    }
                    .into())
                }
            };
            current = self.force(next)?;
        }
        unreachable!("resolve_struct_path requires a dotted path");
    }

    /// Eager binary evaluation. `&&`/`||` force the left operand first
    /// and never touch the right one when the result is already decided;
    /// everything else evaluates both operands and dispatches through the
    /// operator table.
    fn eval_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Outcome<Value> {
        if matches!(op, BinOp::And | BinOp::Or) {
            let left = self.eval_expr(lhs, EvalMode::Eager)?;
            let left = match ops::bool_operand(&left) {
                Some(b) => b,
                None => {
                    return Err(EvalError::InvalidOperator {
                        op: op.symbol().to_string(),
                        ty: left.type_name(),
                    }
                    .into())
                }
            };
            match (op, left) {
                (BinOp::And, false) => return Ok(Value::Bool(false)),
                (BinOp::Or, true) => return Ok(Value::Bool(true)),
                _ => {}
            }
            let right = self.eval_expr(rhs, EvalMode::Eager)?;
            return match ops::bool_operand(&right) {
                Some(b) => Ok(Value::Bool(b)),
                None => Err(EvalError::InvalidOperator {
                    op: op.symbol().to_string(),
                    ty: right.type_name(),
                }
                .into()),
            };
        }
        let left = self.eval_expr(lhs, EvalMode::Eager)?;
        let right = self.eval_expr(rhs, EvalMode::Eager)?;
        ops::apply_binary(op, left, right)
    }
}
