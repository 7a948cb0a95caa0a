//! # Quickbeam
//!
//! A tree-walking interpreter for a small block-structured,
//! statically-typed scripting language with first-class structs,
//! call-by-need argument passing, and structured exception handling.
//!
//! Quickbeam is the evaluation core only: it consumes an already-parsed
//! [`ast::Program`] and executes `main` by recursive descent, maintaining
//! lexical scope, enforcing the language's coercion rules, realizing
//! struct values as shared mutable references, deferring argument
//! evaluation until first use, and propagating user-raised exceptions to
//! the nearest matching `try`/`catch`.
//!
//! ## Architecture
//!
//! - **Value Model** ([`value`]): the tagged value representation,
//!   including deferred values with an explicit `Pending → Forced` memo
//!   transition
//! - **Struct Model** ([`structs`]): an arena of shared mutable instances
//!   addressed by handles; nil is a handle sentinel
//! - **Environment & Scope Stack** ([`environment`]): per-scope bindings
//!   plus an ordered frame stack with checkpoint/rollback for exception
//!   unwinding
//! - **Evaluator** ([`eval`]): the recursive statement/expression
//!   interpreter driving all of the above
//!
//! ## Example
//!
//! ```
//! use quickbeam::ast::{BinOp, Expr, FunctionDecl, Param, Program, Stmt, TypeSpec};
//! use quickbeam::{BufferConsole, Interpreter};
//!
//! // func half(x: int): int { return x / 2; }
//! // func main(): void { print(half(7)); }
//! let program = Program {
//!     functions: vec![
//!         FunctionDecl::new(
//!             "half",
//!             vec![Param::new("x", TypeSpec::Int)],
//!             TypeSpec::Int,
//!             vec![Stmt::ret(Expr::binary(BinOp::Div, Expr::var("x"), Expr::Int(2)))],
//!         ),
//!         FunctionDecl::new(
//!             "main",
//!             vec![],
//!             TypeSpec::Void,
//!             vec![Stmt::call("print", vec![Expr::call("half", vec![Expr::Int(7)])])],
//!         ),
//!     ],
//!     structs: vec![],
//! };
//!
//! let mut console = BufferConsole::new();
//! Interpreter::new(&mut console).run(&program).unwrap();
//! assert_eq!(console.outputs(), ["3"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod console;
pub mod environment;
pub mod error;
pub mod eval;
mod ops;
pub mod structs;
pub mod value;

// Re-export main types
pub use console::{BufferConsole, Console, StdConsole};
pub use environment::{Binding, Environment, Mark, ScopeKind, ScopeStack};
pub use error::{ErrorKind, EvalError, Exception, Interrupt, Outcome, DIV_ZERO_TAG};
pub use eval::Interpreter;
pub use structs::{InstanceId, StructHeap, StructInstance, StructLayout};
pub use value::{StructRef, Thunk, ThunkRef, Value};

/// Quickbeam version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
