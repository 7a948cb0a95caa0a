use pretty_assertions::assert_eq;
use quickbeam::ast::{BinOp, Expr, FunctionDecl, Param, Program, Stmt, TypeSpec};
use quickbeam::{BufferConsole, ErrorKind, EvalError, Interpreter, DIV_ZERO_TAG};

fn run(program: Program) -> Result<Vec<String>, EvalError> {
    let mut console = BufferConsole::new();
    Interpreter::new(&mut console).run(&program)?;
    Ok(console.outputs().to_vec())
}

fn main_fn(body: Vec<Stmt>) -> FunctionDecl {
    FunctionDecl::new("main", vec![], TypeSpec::Void, body)
}

fn program(functions: Vec<FunctionDecl>) -> Program {
    Program {
        functions,
        structs: vec![],
    }
}

// 1 / 0 — only blows up if somebody actually looks at it
fn div_zero() -> Expr {
    Expr::binary(BinOp::Div, Expr::Int(1), Expr::Int(0))
}

// func loud(): int { print("eval"); return 7; }
fn loud() -> FunctionDecl {
    FunctionDecl::new(
        "loud",
        vec![],
        TypeSpec::Int,
        vec![
            Stmt::call("print", vec![Expr::str("eval")]),
            Stmt::ret(Expr::Int(7)),
        ],
    )
}

// func boom(): bool { raise "boom"; }  — used to prove an operand never ran
fn boom() -> FunctionDecl {
    FunctionDecl::new(
        "boom",
        vec![],
        TypeSpec::Bool,
        vec![Stmt::Raise {
            tag: Expr::str("boom"),
        }],
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Lazy Arguments
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_unused_erroring_argument_never_evaluates() {
    // func ignore(x: int): void { print("ok"); }  — x is never read
    let out = run(program(vec![
        FunctionDecl::new(
            "ignore",
            vec![Param::new("x", TypeSpec::Int)],
            TypeSpec::Void,
            vec![Stmt::call("print", vec![Expr::str("ok")])],
        ),
        main_fn(vec![Stmt::call("ignore", vec![div_zero()])]),
    ]))
    .unwrap();
    assert_eq!(out, ["ok"]);
}

#[test]
fn test_reading_the_argument_surfaces_the_error() {
    let err = run(program(vec![
        FunctionDecl::new(
            "use_it",
            vec![Param::new("x", TypeSpec::Int)],
            TypeSpec::Void,
            vec![Stmt::call("print", vec![Expr::var("x")])],
        ),
        main_fn(vec![Stmt::call("use_it", vec![div_zero()])]),
    ]))
    .unwrap_err();
    assert!(matches!(
        err,
        EvalError::UncaughtException { ref tag } if tag == DIV_ZERO_TAG
    ));
    assert_eq!(err.kind(), ErrorKind::Fault);
}

#[test]
fn test_undefined_variable_argument_errors_at_call_site() {
    // A variable read resolves immediately, even in lazy position.
    let out = run(program(vec![
        FunctionDecl::new(
            "ignore",
            vec![Param::new("x", TypeSpec::Int)],
            TypeSpec::Void,
            vec![],
        ),
        main_fn(vec![Stmt::call("ignore", vec![Expr::var("nosuch")])]),
    ]));
    assert!(matches!(
        out.unwrap_err(),
        EvalError::UndefinedVariable { .. }
    ));
}

#[test]
fn test_forced_argument_type_checks_at_call_site() {
    // A literal is already forced, so its declared-type check runs at the
    // call even though the parameter is never read.
    let err = run(program(vec![
        FunctionDecl::new(
            "ignore",
            vec![Param::new("x", TypeSpec::Int)],
            TypeSpec::Void,
            vec![],
        ),
        main_fn(vec![Stmt::call("ignore", vec![Expr::str("oops")])]),
    ]))
    .unwrap_err();
    assert!(matches!(err, EvalError::IllegalCoercion { .. }));
}

#[test]
fn test_deferred_argument_type_check_waits_for_first_read() {
    // wrong() produces a string; the bool parameter is never read, so the
    // mismatch never surfaces.
    let out = run(program(vec![
        FunctionDecl::new(
            "wrong",
            vec![],
            TypeSpec::Str,
            vec![Stmt::ret(Expr::str("not a bool"))],
        ),
        FunctionDecl::new(
            "ignore",
            vec![Param::new("b", TypeSpec::Bool)],
            TypeSpec::Void,
            vec![Stmt::call("print", vec![Expr::str("fine")])],
        ),
        main_fn(vec![Stmt::call(
            "ignore",
            vec![Expr::call("wrong", vec![])],
        )]),
    ]))
    .unwrap();
    assert_eq!(out, ["fine"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Memoization
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_deferred_call_runs_once_and_memoizes() {
    // x = loud(); print(x); print(x);  — "eval" appears exactly once,
    // and only when x is first read.
    let out = run(program(vec![
        loud(),
        main_fn(vec![
            Stmt::var_decl("x", TypeSpec::Int),
            Stmt::assign("x", Expr::call("loud", vec![])),
            Stmt::call("print", vec![Expr::str("before")]),
            Stmt::call("print", vec![Expr::var("x")]),
            Stmt::call("print", vec![Expr::var("x")]),
        ]),
    ]))
    .unwrap();
    assert_eq!(out, ["before", "eval", "7", "7"]);
}

#[test]
fn test_never_read_assignment_never_runs() {
    let out = run(program(vec![
        loud(),
        main_fn(vec![
            Stmt::var_decl("x", TypeSpec::Int),
            Stmt::assign("x", Expr::call("loud", vec![])),
            Stmt::call("print", vec![Expr::str("done")]),
        ]),
    ]))
    .unwrap();
    assert_eq!(out, ["done"]);
}

#[test]
fn test_call_statement_is_always_eager() {
    // A bare call statement runs for its side effects even though the
    // result is discarded.
    let out = run(program(vec![
        loud(),
        main_fn(vec![Stmt::Call(quickbeam::ast::CallExpr::new(
            "loud",
            vec![],
        ))]),
    ]))
    .unwrap();
    assert_eq!(out, ["eval"]);
}

#[test]
fn test_aliased_bindings_share_one_evaluation() {
    // y = x copies the deferred value; forcing through either binding
    // memoizes for both.
    let out = run(program(vec![
        loud(),
        main_fn(vec![
            Stmt::var_decl("x", TypeSpec::Int),
            Stmt::var_decl("y", TypeSpec::Int),
            Stmt::assign("x", Expr::call("loud", vec![])),
            Stmt::assign("y", Expr::var("x")),
            Stmt::call("print", vec![Expr::var("y")]),
            Stmt::call("print", vec![Expr::var("x")]),
        ]),
    ]))
    .unwrap();
    assert_eq!(out, ["eval", "7", "7"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Snapshot Capture
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_deferred_expression_captures_bindings_at_assignment() {
    // b = a + 1 captures a's binding as of the assignment; the later
    // a = 99 rebinds a and is not observed.
    let out = run(program(vec![main_fn(vec![
        Stmt::var_decl("a", TypeSpec::Int),
        Stmt::var_decl("b", TypeSpec::Int),
        Stmt::assign("a", Expr::Int(10)),
        Stmt::assign("b", Expr::binary(BinOp::Add, Expr::var("a"), Expr::Int(1))),
        Stmt::assign("a", Expr::Int(99)),
        Stmt::call("print", vec![Expr::var("b")]),
    ])]))
    .unwrap();
    assert_eq!(out, ["11"]);
}

#[test]
fn test_deferred_return_value_outlives_callee_scope() {
    // make() returns a deferred sum over its parameter; the value is
    // forced after the callee's scopes are long gone.
    let out = run(program(vec![
        FunctionDecl::new(
            "make",
            vec![Param::new("n", TypeSpec::Int)],
            TypeSpec::Int,
            vec![Stmt::ret(Expr::binary(
                BinOp::Add,
                Expr::var("n"),
                Expr::Int(1),
            ))],
        ),
        main_fn(vec![
            Stmt::var_decl("x", TypeSpec::Int),
            Stmt::assign("x", Expr::call("make", vec![Expr::Int(41)])),
            Stmt::call("print", vec![Expr::var("x")]),
        ]),
    ]))
    .unwrap();
    assert_eq!(out, ["42"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Short-Circuiting
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_false_and_never_evaluates_right_operand() {
    let out = run(program(vec![
        boom(),
        main_fn(vec![Stmt::call(
            "print",
            vec![Expr::binary(
                BinOp::And,
                Expr::Bool(false),
                Expr::call("boom", vec![]),
            )],
        )]),
    ]))
    .unwrap();
    assert_eq!(out, ["false"]);
}

#[test]
fn test_true_or_never_evaluates_right_operand() {
    let out = run(program(vec![
        boom(),
        main_fn(vec![Stmt::call(
            "print",
            vec![Expr::binary(
                BinOp::Or,
                Expr::Bool(true),
                Expr::call("boom", vec![]),
            )],
        )]),
    ]))
    .unwrap();
    assert_eq!(out, ["true"]);
}

#[test]
fn test_undetermined_logical_operator_evaluates_right_operand() {
    let err = run(program(vec![
        boom(),
        main_fn(vec![Stmt::call(
            "print",
            vec![Expr::binary(
                BinOp::And,
                Expr::Bool(true),
                Expr::call("boom", vec![]),
            )],
        )]),
    ]))
    .unwrap_err();
    assert!(matches!(
        err,
        EvalError::UncaughtException { ref tag } if tag == "boom"
    ));
}

#[test]
fn test_logical_operands_coerce_from_int() {
    let out = run(program(vec![main_fn(vec![Stmt::call(
        "print",
        vec![Expr::binary(BinOp::And, Expr::Int(1), Expr::Int(2))],
    )])]))
    .unwrap();
    assert_eq!(out, ["true"]);
}
