//! Built-in functions: `print`, `inputi`, `inputs`
//!
//! Built-ins are resolved before user functions, so a user declaration
//! cannot shadow them. Their arguments are evaluated eagerly — printing
//! or prompting with a deferred value forces it.

use crate::ast::{CallExpr, Expr};
use crate::console::Console;
use crate::error::{EvalError, Outcome};
use crate::value::Value;

use super::{EvalMode, Interpreter};

impl Interpreter<'_> {
    /// `print(...)`: concatenate the printable forms of every argument
    /// into one output line.
    pub(crate) fn builtin_print(&mut self, args: &[Expr]) -> Outcome<()> {
        let mut line = String::new();
        for arg in args {
            let value = self.eval_expr(arg, EvalMode::Eager)?;
            line.push_str(&value.to_string());
        }
        self.output(&line);
        Ok(())
    }

    /// `inputi(...)` / `inputs(...)`: print the optional prompt, then
    /// read one line. `inputi` parses it as an integer; `inputs` returns
    /// it as a string.
    pub(crate) fn builtin_input(&mut self, call: &CallExpr) -> Outcome<Value> {
        if call.args.len() > 1 {
            // No input builtin takes more than a prompt.
            return Err(EvalError::UnknownFunction {
                name: call.name.clone(),
                arity: call.args.len(),
            }
            .into());
        }
        if let Some(prompt) = call.args.first() {
            let value = self.eval_expr(prompt, EvalMode::Eager)?;
            let text = value.to_string();
            self.output(&text);
        }
        let line = self.console.get_input();
        if call.name == "inputi" {
            match line.trim().parse::<i64>() {
                Ok(n) => Ok(Value::Int(n)),
                Err(_) => Err(EvalError::InvalidInput { input: line }.into()),
            }
        } else {
            Ok(Value::str(line))
        }
    }
}
