//! Error types for evaluation
//!
//! Two channels exist side by side. [`EvalError`] covers the unrecoverable
//! conditions: name errors, type errors, and faults, classified by
//! [`ErrorKind`]. [`Exception`] covers the *recoverable* conditions a `try`
//! may catch: user `raise`s and division by zero. Both travel through the
//! evaluator's return values as an [`Interrupt`], never through host
//! panics, so scope unwinding stays visible control flow.

use thiserror::Error;

/// Exception tag raised by a division by zero.
pub const DIV_ZERO_TAG: &str = "div0";

/// Broad classification of an [`EvalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Undefined or duplicate names, unresolved overloads.
    Name,
    /// Operator/operand mismatches, illegal coercions, unknown types.
    Type,
    /// Runtime faults: nil dereference, uncaught exceptions, overflow.
    Fault,
}

/// An unrecoverable evaluation error. Reporting one terminates the run.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A variable reference did not resolve within the current function.
    #[error("variable `{name}` is not defined")]
    UndefinedVariable {
        /// The unresolved name.
        name: String,
    },

    /// A name was declared twice in the same scope.
    #[error("duplicate definition for variable `{name}`")]
    DuplicateVariable {
        /// The redeclared name.
        name: String,
    },

    /// No function matches the called `(name, arity)` pair.
    #[error("no function `{name}` taking {arity} argument(s)")]
    UnknownFunction {
        /// The callee name.
        name: String,
        /// The number of arguments at the call site.
        arity: usize,
    },

    /// A field access named a field the struct does not have.
    #[error("struct `{type_name}` has no field `{field}`")]
    UnknownField {
        /// The struct type.
        type_name: String,
        /// The missing field.
        field: String,
    },

    /// A declared type is neither a primitive nor a known struct.
    #[error("unknown type `{name}`")]
    UnknownType {
        /// The unresolved type name.
        name: String,
    },

    /// An operator was applied to a type that does not support it.
    #[error("incompatible operator `{op}` for type {ty}")]
    InvalidOperator {
        /// The operator symbol.
        op: String,
        /// The operand type's printable name.
        ty: String,
    },

    /// A non-equality binary operator received operands of two different
    /// types.
    #[error("incompatible types {lhs} and {rhs} for `{op}` operation")]
    MixedOperands {
        /// The operator symbol.
        op: String,
        /// Left operand type.
        lhs: String,
        /// Right operand type.
        rhs: String,
    },

    /// A struct value was compared against a non-struct value other than
    /// `nil`, or against a different struct type.
    #[error("cannot compare {lhs} with {rhs}")]
    InvalidComparison {
        /// Left operand type.
        lhs: String,
        /// Right operand type.
        rhs: String,
    },

    /// A value could not be coerced to the declared target type.
    #[error("cannot coerce a value of type {from} to type {to}")]
    IllegalCoercion {
        /// The value's type.
        from: String,
        /// The declared target type.
        to: String,
    },

    /// An `if` or `for` condition did not evaluate to a boolean.
    #[error("{construct} condition must be a boolean expression")]
    NonBoolCondition {
        /// `"if"` or `"for"`.
        construct: &'static str,
    },

    /// `raise` was given a non-string operand.
    #[error("raise requires a string exception tag, got {ty}")]
    NonStringRaise {
        /// The operand's type.
        ty: String,
    },

    /// A function declared `void` returned a value.
    #[error("function `{name}` with void return type must not return a value")]
    VoidReturn {
        /// The offending function.
        name: String,
    },

    /// A void call result was used where a value is required.
    #[error("cannot use a void result as a value")]
    VoidInExpression,

    /// A field was accessed through a nil struct handle.
    #[error("cannot access field `{field}` of a nil reference")]
    NilDereference {
        /// The field being accessed.
        field: String,
    },

    /// A field access was applied to a non-struct value.
    #[error("expected a struct value, got {ty} for `.{field}`")]
    NotAStruct {
        /// The actual type.
        ty: String,
        /// The field being accessed.
        field: String,
    },

    /// An exception reached the top of `main` without a matching handler.
    #[error("uncaught exception: {tag}")]
    UncaughtException {
        /// The exception's tag.
        tag: String,
    },

    /// Integer arithmetic left the i64 range.
    #[error("integer overflow in `{op}`")]
    IntegerOverflow {
        /// The operator symbol.
        op: String,
    },

    /// Forcing a deferred value re-entered the same thunk.
    #[error("deferred value depends on itself")]
    CyclicDeferred,

    /// `inputi` read a line that is not a valid integer.
    #[error("invalid integer input: {input:?}")]
    InvalidInput {
        /// The offending line.
        input: String,
    },
}

impl EvalError {
    /// Classify this error per the language's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UndefinedVariable { .. }
            | EvalError::DuplicateVariable { .. }
            | EvalError::UnknownFunction { .. }
            | EvalError::UnknownField { .. } => ErrorKind::Name,

            EvalError::UnknownType { .. }
            | EvalError::InvalidOperator { .. }
            | EvalError::MixedOperands { .. }
            | EvalError::InvalidComparison { .. }
            | EvalError::IllegalCoercion { .. }
            | EvalError::NonBoolCondition { .. }
            | EvalError::NonStringRaise { .. }
            | EvalError::VoidReturn { .. }
            | EvalError::VoidInExpression
            | EvalError::NotAStruct { .. } => ErrorKind::Type,

            EvalError::NilDereference { .. }
            | EvalError::UncaughtException { .. }
            | EvalError::IntegerOverflow { .. }
            | EvalError::CyclicDeferred
            | EvalError::InvalidInput { .. } => ErrorKind::Fault,
        }
    }
}

/// A catchable exception: a user `raise` or a division-by-zero fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    /// The tag a `catch` clause is matched against.
    pub tag: String,
}

impl Exception {
    /// Create an exception with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The distinguished division-by-zero exception.
    pub fn div_zero() -> Self {
        Self::new(DIV_ZERO_TAG)
    }
}

/// Non-local outcome of an evaluation step, propagated through the
/// statement-execution return channel.
#[derive(Debug)]
pub enum Interrupt {
    /// A catchable exception looking for an enclosing `try`.
    Raise(Exception),
    /// An unrecoverable error; aborts the run.
    Fail(EvalError),
}

impl From<EvalError> for Interrupt {
    fn from(err: EvalError) -> Self {
        Interrupt::Fail(err)
    }
}

impl From<Exception> for Interrupt {
    fn from(exc: Exception) -> Self {
        Interrupt::Raise(exc)
    }
}

/// Result type used throughout the evaluator.
pub type Outcome<T> = std::result::Result<T, Interrupt>;
