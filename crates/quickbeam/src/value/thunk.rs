//! Deferred values and their forcing state machine
//!
//! A thunk is the memo cell behind [`Value::Deferred`]. It moves through
//! an explicit state transition — `Pending → InProgress → Forced` — and is
//! always shared by `Rc`, never cloned into independent cells, so every
//! alias of a deferred value observes the one memoized result. The
//! evaluator drives the transition (it owns the scope stack the captured
//! expression must run against); this module only guards the states.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expr, TypeSpec};
use crate::environment::ScopeStack;

use super::Value;

/// A shared thunk handle. Cloning the handle aliases the cell.
pub type ThunkRef = Rc<Thunk>;

/// The memo cell of one deferred value.
#[derive(Debug)]
pub struct Thunk {
    state: RefCell<ThunkState>,
}

/// The computation a pending thunk still has to perform.
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    /// An unevaluated expression plus the scope frames visible at the
    /// point of capture.
    Expr {
        /// The captured expression.
        expr: Expr,
        /// Snapshot of the visible scope suffix at capture time.
        scopes: ScopeStack,
    },
    /// A declared-type check deferred until the inner value is first read.
    Coerce {
        /// The value to force and then coerce.
        inner: Value,
        /// The declared target type.
        target: TypeSpec,
    },
}

#[derive(Debug)]
enum ThunkState {
    Pending(Pending),
    InProgress,
    Forced(Value),
}

/// What a caller beginning a force finds in the cell.
#[derive(Debug)]
pub(crate) enum Begin {
    /// Already memoized; here is the result.
    Forced(Value),
    /// Unevaluated; the cell is now `InProgress` and the caller must
    /// either [`Thunk::fulfill`] or [`Thunk::reset`] it.
    Pending(Pending),
    /// A force of this cell is already underway — the deferred value
    /// depends on itself.
    InProgress,
}

impl Thunk {
    /// Defer an expression against a snapshot of the visible scopes.
    pub(crate) fn defer(expr: Expr, scopes: ScopeStack) -> ThunkRef {
        Rc::new(Thunk {
            state: RefCell::new(ThunkState::Pending(Pending::Expr { expr, scopes })),
        })
    }

    /// Defer a declared-type check around an inner value.
    pub(crate) fn coerce(inner: Value, target: TypeSpec) -> ThunkRef {
        Rc::new(Thunk {
            state: RefCell::new(ThunkState::Pending(Pending::Coerce { inner, target })),
        })
    }

    /// Begin a force: take the pending computation, leaving the cell
    /// `InProgress` until [`fulfill`](Thunk::fulfill) or
    /// [`reset`](Thunk::reset).
    pub(crate) fn begin(&self) -> Begin {
        let mut state = self.state.borrow_mut();
        match &*state {
            ThunkState::Forced(value) => Begin::Forced(value.clone()),
            ThunkState::InProgress => Begin::InProgress,
            ThunkState::Pending(_) => {
                match std::mem::replace(&mut *state, ThunkState::InProgress) {
                    ThunkState::Pending(pending) => Begin::Pending(pending),
                    _ => unreachable!(),
                }
            }
        }
    }

    /// Memoize the forced result. Later reads are cheap and idempotent.
    pub(crate) fn fulfill(&self, value: Value) {
        *self.state.borrow_mut() = ThunkState::Forced(value);
    }

    /// Restore the pending computation after a failed force, so a later
    /// read re-evaluates (and re-raises).
    pub(crate) fn reset(&self, pending: Pending) {
        *self.state.borrow_mut() = ThunkState::Pending(pending);
    }

    /// The memoized result, if this thunk has been forced.
    pub fn peek(&self) -> Option<Value> {
        match &*self.state.borrow() {
            ThunkState::Forced(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Whether this thunk has been forced.
    pub fn is_forced(&self) -> bool {
        matches!(&*self.state.borrow(), ThunkState::Forced(_))
    }
}
