//! Statement execution
//!
//! Every statement list runs inside its own `Block` frame. `return`
//! travels outward as [`Flow::Return`], each enclosing list popping its
//! frame before re-propagating; exceptions travel through the `Err`
//! channel and leave frame cleanup to the `try` that catches them (or to
//! the aborting run).

use tracing::debug;

use crate::ast::{Assignment, CatchClause, Expr, Stmt, TypeSpec};
use crate::environment::Binding;
use crate::error::{EvalError, Exception, Interrupt, Outcome};
use crate::ops;
use crate::value::Value;

use super::{EvalMode, Flow, Interpreter};

impl Interpreter<'_> {
    /// Run a statement list in a fresh block scope.
    pub(crate) fn run_statements(&mut self, stmts: &[Stmt]) -> Outcome<Flow> {
        self.scopes.push_block();
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                self.scopes.pop();
                return Ok(Flow::Return(value));
            }
        }
        self.scopes.pop();
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Outcome<Flow> {
        match stmt {
            Stmt::VarDecl { name, ty } => {
                self.declare_var(name, ty)?;
                Ok(Flow::Normal)
            }
            Stmt::Assign(assign) => {
                self.assign(assign)?;
                Ok(Flow::Normal)
            }
            // A bare call statement runs eagerly; a void or discarded
            // result is fine, but the call itself is never deferred.
            Stmt::Call(call) => {
                self.eval_call(call)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_condition(condition, "if")? {
                    self.run_statements(then_body)
                } else {
                    self.run_statements(else_body)
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => self.run_for(init, condition, update, body),
            Stmt::Return { value } => {
                let value = match value {
                    Some(expr) => Some(self.eval_expr(expr, EvalMode::Lazy)?),
                    None => None,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Raise { tag } => {
                let value = self.eval_expr(tag, EvalMode::Eager)?;
                match value {
                    Value::Str(tag) => {
                        debug!(tag = tag.as_str(), "raise");
                        Err(Interrupt::Raise(Exception::new(tag.as_str())))
                    }
                    other => Err(EvalError::NonStringRaise {
                        ty: other.type_name(),
                    }
                    .into()),
                }
            }
            Stmt::Try { body, handlers } => self.run_try(body, handlers),
        }
    }

    /// Bind a new variable to its type's zero value in the current scope.
    fn declare_var(&mut self, name: &str, ty: &TypeSpec) -> Result<(), EvalError> {
        let known = match ty {
            TypeSpec::Int | TypeSpec::Bool | TypeSpec::Str => true,
            TypeSpec::Struct(struct_name) => self.structs.contains_key(struct_name),
            TypeSpec::Void => false,
        };
        if !known {
            return Err(EvalError::UnknownType {
                name: ty.to_string(),
            });
        }
        let created = self
            .scopes
            .top_mut()
            .create(name, Binding::new(ty.clone(), Value::zero(ty)));
        if !created {
            return Err(EvalError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Execute `target = value`: evaluate the right-hand side lazily,
    /// resolve the target through the scope stack (and, for a dotted
    /// chain, through the struct heap), coerce to the target's declared
    /// type, and store.
    pub(crate) fn assign(&mut self, assign: &Assignment) -> Outcome<()> {
        let value = self.eval_expr(&assign.value, EvalMode::Lazy)?;
        if assign.target.is_bare() {
            let name = &assign.target.base;
            match self.scopes.resolve_mut(name) {
                Some(binding) => {
                    let ty = binding.ty.clone();
                    binding.value = ops::coerce_lazy(value, &ty)?;
                    Ok(())
                }
                None => Err(EvalError::UndefinedVariable { name: name.clone() }.into()),
            }
        } else {
            let (id, field) = self.resolve_struct_path(&assign.target)?;
            let field_ty = match self.heap.get(id).field_type(&field) {
                Some(ty) => ty.clone(),
                None => {
                    return Err(EvalError::UnknownField {
                        type_name: self.heap.get(id).type_name().to_string(),
                        field,
                    }
                    .into())
                }
            };
            let coerced = ops::coerce_lazy(value, &field_ty)?;
            self.heap.get_mut(id).set(&field, coerced);
            Ok(())
        }
    }

    /// Evaluate a condition eagerly; it must be boolean after Int→Bool
    /// coercion.
    fn eval_condition(&mut self, expr: &Expr, construct: &'static str) -> Outcome<bool> {
        let value = self.eval_expr(expr, EvalMode::Eager)?;
        match ops::bool_operand(&value) {
            Some(b) => Ok(b),
            None => Err(EvalError::NonBoolCondition { construct }.into()),
        }
    }

    /// `for`: the init assignment runs once in the loop's own block
    /// scope, the condition is re-checked before every iteration, and
    /// each body execution gets a fresh nested block scope.
    fn run_for(
        &mut self,
        init: &Assignment,
        condition: &Expr,
        update: &Assignment,
        body: &[Stmt],
    ) -> Outcome<Flow> {
        self.scopes.push_block();
        let result = self.for_iterations(init, condition, update, body);
        if result.is_ok() {
            self.scopes.pop();
        }
        result
    }

    fn for_iterations(
        &mut self,
        init: &Assignment,
        condition: &Expr,
        update: &Assignment,
        body: &[Stmt],
    ) -> Outcome<Flow> {
        self.assign(init)?;
        loop {
            if !self.eval_condition(condition, "for")? {
                return Ok(Flow::Normal);
            }
            if let Flow::Return(value) = self.run_statements(body)? {
                return Ok(Flow::Return(value));
            }
            self.assign(update)?;
        }
    }

    /// `try`: checkpoint the scope stack, run the body, and on a raise
    /// roll back to the checkpoint before dispatching to the matching
    /// catch clause. A tag no clause matches re-raises outward.
    fn run_try(&mut self, body: &[Stmt], handlers: &[CatchClause]) -> Outcome<Flow> {
        let mark = self.scopes.mark();
        match self.run_statements(body) {
            Ok(flow) => Ok(flow),
            Err(Interrupt::Raise(exc)) => {
                self.scopes.rollback(mark);
                debug!(tag = exc.tag.as_str(), "exception unwound to try");
                match handlers.iter().find(|handler| handler.tag == exc.tag) {
                    Some(handler) => self.run_statements(&handler.body),
                    None => Err(Interrupt::Raise(exc)),
                }
            }
            Err(fail) => Err(fail),
        }
    }
}
