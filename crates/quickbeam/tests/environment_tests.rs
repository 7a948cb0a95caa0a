use pretty_assertions::assert_eq;
use quickbeam::ast::TypeSpec;
use quickbeam::{Binding, Environment, ScopeStack, Value};

fn int_binding(n: i64) -> Binding {
    Binding::new(TypeSpec::Int, Value::Int(n))
}

// ═══════════════════════════════════════════════════════════════════════
// Environment Contract
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_create_then_get() {
    let mut env = Environment::new();
    assert!(env.create("x", int_binding(1)));
    assert_eq!(env.get("x").map(|b| &b.value), Some(&Value::Int(1)));
    assert!(env.get("y").is_none());
}

#[test]
fn test_create_refuses_redeclaration() {
    let mut env = Environment::new();
    assert!(env.create("x", int_binding(1)));
    assert!(!env.create("x", int_binding(2)));
    // The original binding is untouched.
    assert_eq!(env.get("x").map(|b| &b.value), Some(&Value::Int(1)));
}

#[test]
fn test_set_requires_existing_binding() {
    let mut env = Environment::new();
    assert!(!env.set("x", Value::Int(1)));
    env.create("x", int_binding(1));
    assert!(env.set("x", Value::Int(2)));
    assert_eq!(env.get("x").map(|b| &b.value), Some(&Value::Int(2)));
}

#[test]
fn test_set_preserves_declared_type() {
    let mut env = Environment::new();
    env.create("x", int_binding(1));
    env.set("x", Value::Int(2));
    assert_eq!(env.get("x").map(|b| &b.ty), Some(&TypeSpec::Int));
}

#[test]
fn test_bindings_iterate_in_declaration_order() {
    let mut env = Environment::new();
    env.create("first", int_binding(1));
    env.create("second", int_binding(2));
    env.create("third", int_binding(3));
    let names: Vec<&str> = env.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["first", "second", "third"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Scope Stack
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_stack_resolves_nothing() {
    let scopes = ScopeStack::new();
    assert!(scopes.is_empty());
    assert!(scopes.lookup("x").is_none());
}

#[test]
fn test_lookup_searches_through_blocks() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.top_mut().create("arg", int_binding(10));
    scopes.push_block();
    scopes.top_mut().create("local", int_binding(20));
    scopes.push_block();

    assert_eq!(
        scopes.lookup("arg").map(|b| &b.value),
        Some(&Value::Int(10))
    );
    assert_eq!(
        scopes.lookup("local").map(|b| &b.value),
        Some(&Value::Int(20))
    );
}

#[test]
fn test_function_frame_is_a_lookup_wall() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.top_mut().create("outer", int_binding(1));
    scopes.push_block();
    scopes.push_function();
    scopes.push_block();

    assert!(scopes.lookup("outer").is_none());

    // Popping back to the first call restores visibility.
    scopes.pop();
    scopes.pop();
    assert!(scopes.lookup("outer").is_some());
}

#[test]
fn test_pop_discards_block_bindings() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.push_block();
    scopes.top_mut().create("gone", int_binding(1));
    scopes.pop();
    assert!(scopes.lookup("gone").is_none());
}

#[test]
fn test_rollback_restores_marked_depth() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.push_block();
    let mark = scopes.mark();

    scopes.push_block();
    scopes.push_block();
    scopes.push_function();
    assert_eq!(scopes.depth(), 5);

    scopes.rollback(mark);
    assert_eq!(scopes.depth(), 2);
}

#[test]
fn test_rollback_with_nothing_to_discard_is_noop() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    let mark = scopes.mark();
    scopes.rollback(mark);
    assert_eq!(scopes.depth(), 1);
}

#[test]
fn test_resolve_mut_writes_through() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.top_mut().create("x", int_binding(1));
    scopes.push_block();

    if let Some(binding) = scopes.resolve_mut("x") {
        binding.value = Value::Int(99);
    }
    scopes.pop();
    assert_eq!(
        scopes.lookup("x").map(|b| &b.value),
        Some(&Value::Int(99))
    );
}

#[test]
fn test_snapshot_excludes_caller_frames() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.top_mut().create("caller_var", int_binding(1));
    scopes.push_function();
    scopes.top_mut().create("callee_var", int_binding(2));

    let snap = scopes.snapshot();
    assert_eq!(snap.depth(), 1);
    assert!(snap.lookup("callee_var").is_some());
    assert!(snap.lookup("caller_var").is_none());
}
