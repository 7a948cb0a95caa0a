//! The recursive statement and expression evaluator
//!
//! [`Interpreter`] owns the function table, struct table, scope stack, and
//! struct heap, and drives one program run: build the tables from the AST,
//! then execute `main`. Statement execution lives in `stmt`, expression
//! evaluation in `expr`, and the built-in functions in `builtins`; this
//! module holds the shared machinery — function dispatch, deferred-value
//! forcing, and the run entry point.

mod builtins;
mod expr;
mod stmt;

use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::ast::{CallExpr, Expr, FunctionDecl, Program, TypeSpec};
use crate::console::Console;
use crate::environment::{Binding, ScopeStack};
use crate::error::{EvalError, Interrupt, Outcome};
use crate::ops;
use crate::structs::{StructHeap, StructLayout};
use crate::value::{Begin, Pending, Thunk, Value};

/// How an expression's result is requested: `Eager` forces any deferred
/// sub-result before returning; `Lazy` hands back a possibly-deferred
/// value for the caller to store or pass onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvalMode {
    /// Force before returning.
    Eager,
    /// Defer compound work; share bound values as-is.
    Lazy,
}

/// How a statement list finished.
#[derive(Debug)]
pub(crate) enum Flow {
    /// Ran to the end.
    Normal,
    /// A `return` fired; `None` is an explicitly empty `return;`.
    Return(Option<Value>),
}

/// The evaluation core: executes a parsed [`Program`] against a
/// [`Console`].
///
/// # Example
///
/// ```
/// use quickbeam::ast::{Expr, FunctionDecl, Program, Stmt, TypeSpec};
/// use quickbeam::{BufferConsole, Interpreter};
///
/// let program = Program {
///     functions: vec![FunctionDecl::new(
///         "main",
///         vec![],
///         TypeSpec::Void,
///         vec![Stmt::call("print", vec![Expr::str("hello")])],
///     )],
///     structs: vec![],
/// };
///
/// let mut console = BufferConsole::new();
/// Interpreter::new(&mut console).run(&program).unwrap();
/// assert_eq!(console.outputs(), ["hello"]);
/// ```
pub struct Interpreter<'io> {
    functions: HashMap<(String, usize), Rc<FunctionDecl>>,
    structs: IndexMap<String, Rc<StructLayout>>,
    scopes: ScopeStack,
    heap: StructHeap,
    console: &'io mut dyn Console,
}

impl<'io> Interpreter<'io> {
    /// Create an interpreter writing to the given console.
    pub fn new(console: &'io mut dyn Console) -> Self {
        Self {
            functions: HashMap::new(),
            structs: IndexMap::new(),
            scopes: ScopeStack::new(),
            heap: StructHeap::new(),
            console,
        }
    }

    /// Execute a program: build the declaration tables, then run `main`
    /// with zero arguments.
    ///
    /// # Errors
    ///
    /// Any name error, type error, or fault — including an exception no
    /// `try` caught — aborts the run and is returned here.
    pub fn run(&mut self, program: &Program) -> Result<(), EvalError> {
        self.functions.clear();
        self.structs.clear();
        self.scopes = ScopeStack::new();
        self.heap = StructHeap::new();

        self.load_functions(program);
        self.load_structs(program)?;

        match self.call_function("main", &[]) {
            Ok(_) => Ok(()),
            Err(Interrupt::Raise(exc)) => Err(EvalError::UncaughtException { tag: exc.tag }),
            Err(Interrupt::Fail(err)) => Err(err),
        }
    }

    /// Index functions by `(name, arity)`. A later declaration with the
    /// same name and arity replaces the earlier one.
    fn load_functions(&mut self, program: &Program) {
        for decl in &program.functions {
            self.functions
                .insert((decl.name.clone(), decl.params.len()), Rc::new(decl.clone()));
        }
    }

    /// Register struct layouts in declaration order. A field type must be
    /// a primitive or an already-registered struct; the struct's own name
    /// counts, so self-referential types are legal.
    fn load_structs(&mut self, program: &Program) -> Result<(), EvalError> {
        for decl in &program.structs {
            let mut fields = IndexMap::new();
            for field in &decl.fields {
                let known = match &field.ty {
                    TypeSpec::Int | TypeSpec::Bool | TypeSpec::Str => true,
                    TypeSpec::Struct(name) => {
                        name == &decl.name || self.structs.contains_key(name)
                    }
                    TypeSpec::Void => false,
                };
                if !known {
                    return Err(EvalError::UnknownType {
                        name: field.ty.to_string(),
                    });
                }
                fields.insert(field.name.clone(), field.ty.clone());
            }
            self.structs.insert(
                decl.name.clone(),
                Rc::new(StructLayout {
                    name: decl.name.clone(),
                    fields,
                }),
            );
        }
        Ok(())
    }

    /// Dispatch a call: built-ins first (they cannot be shadowed), then
    /// user functions by `(name, arity)`. `None` means a void result.
    pub(crate) fn eval_call(&mut self, call: &CallExpr) -> Outcome<Option<Value>> {
        match call.name.as_str() {
            "print" => {
                self.builtin_print(&call.args)?;
                Ok(None)
            }
            "inputi" | "inputs" => self.builtin_input(call).map(Some),
            _ => self.call_function(&call.name, &call.args),
        }
    }

    /// Call a user function: resolve the overload, bind each parameter to
    /// its lazily-evaluated argument in a fresh `Function` scope, run the
    /// body, and apply the return-type rules.
    fn call_function(&mut self, name: &str, args: &[Expr]) -> Outcome<Option<Value>> {
        let decl = self
            .functions
            .get(&(name.to_string(), args.len()))
            .cloned()
            .ok_or_else(|| EvalError::UnknownFunction {
                name: name.to_string(),
                arity: args.len(),
            })?;
        trace!(name, arity = args.len(), "call");

        // Arguments are wrapped, not forced, in the caller's scope; the
        // declared parameter type is checked now if the value is already
        // forced, on first read otherwise.
        let mut bound = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&decl.params) {
            let value = self.eval_expr(arg, EvalMode::Lazy)?;
            bound.push(ops::coerce_lazy(value, &param.ty)?);
        }

        self.scopes.push_function();
        for (param, value) in decl.params.iter().zip(bound) {
            let created = self
                .scopes
                .top_mut()
                .create(&param.name, Binding::new(param.ty.clone(), value));
            if !created {
                return Err(EvalError::DuplicateVariable {
                    name: param.name.clone(),
                }
                .into());
            }
        }

        let flow = self.run_statements(&decl.body)?;
        self.scopes.pop();

        let returned = match flow {
            Flow::Return(value) => value,
            Flow::Normal => None,
        };
        if decl.return_type == TypeSpec::Void {
            if returned.is_some() {
                return Err(EvalError::VoidReturn {
                    name: decl.name.clone(),
                }
                .into());
            }
            return Ok(None);
        }
        let value = returned.unwrap_or_else(|| Value::zero(&decl.return_type));
        Ok(Some(ops::coerce_lazy(value, &decl.return_type)?))
    }

    /// Force a value: run a pending thunk to completion, memoize the
    /// result in the shared cell, and return it. Idempotent — a forced
    /// thunk just hands back its memo.
    pub(crate) fn force(&mut self, value: Value) -> Outcome<Value> {
        let thunk = match value {
            Value::Deferred(thunk) => thunk,
            other => return Ok(other),
        };
        match thunk.begin() {
            Begin::Forced(value) => Ok(value),
            Begin::InProgress => Err(EvalError::CyclicDeferred.into()),
            Begin::Pending(pending) => {
                trace!("forcing deferred value");
                match self.run_pending(pending.clone()) {
                    Ok(value) => {
                        thunk.fulfill(value.clone());
                        Ok(value)
                    }
                    Err(interrupt) => {
                        // A failed force stays pending: a later read
                        // re-evaluates and re-raises.
                        thunk.reset(pending);
                        Err(interrupt)
                    }
                }
            }
        }
    }

    /// Run one pending computation. A captured expression is evaluated
    /// against its scope snapshot; the live stack is swapped back in
    /// before any result or interrupt propagates.
    fn run_pending(&mut self, pending: Pending) -> Outcome<Value> {
        match pending {
            Pending::Expr { expr, scopes } => {
                let saved = mem::replace(&mut self.scopes, scopes);
                let result = self.eval_expr(&expr, EvalMode::Eager);
                self.scopes = saved;
                result
            }
            Pending::Coerce { inner, target } => {
                let forced = self.force(inner)?;
                Ok(ops::coerce(forced, &target)?)
            }
        }
    }

    /// Wrap an expression as a deferred value capturing the visible
    /// scope suffix.
    pub(crate) fn defer(&self, expr: &Expr) -> Value {
        Value::Deferred(Thunk::defer(expr.clone(), self.scopes.snapshot()))
    }

    /// Read a variable's bound value, or a name error if it is not
    /// visible from the current scope.
    pub(crate) fn lookup_var(&self, name: &str) -> Result<Value, EvalError> {
        self.scopes
            .lookup(name)
            .map(|binding| binding.value.clone())
            .ok_or_else(|| EvalError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Emit one line of program output.
    pub(crate) fn output(&mut self, text: &str) {
        debug!(text, "output");
        self.console.output(text);
    }
}
