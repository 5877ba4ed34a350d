//! Subroutine calls, frames and the registry.

use mempeek_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::{lit, loc, Harness};
use crate::{CompileErrorKind, Node, RunOutcome, RuntimeErrorKind};

fn call(h: &Harness, name: &str, args: Vec<Node>) -> Node {
    Node::call(&h.env, loc(), name, args).unwrap()
}

/// `sub fact(n) -> r { if n <= 1 { r = 1 } else { r = n * fact(n - 1) } }`
fn define_factorial(h: &Harness) {
    let def = h.env.begin_subroutine(&loc(), "fact", &["n"], Some("r")).unwrap();
    let cond = h.binary(BinaryOp::LtEq, h.var("n"), lit(1));
    let base = h.block(vec![h.assign("r", lit(1))]);
    let recurse = call(h, "fact", vec![h.binary(BinaryOp::Sub, h.var("n"), lit(1))]);
    let step = h.block(vec![h.assign(
        "r",
        h.binary(BinaryOp::Mul, h.var("n"), recurse),
    )]);
    let body = Node::if_else(&h.env, loc(), cond, base, Some(step)).unwrap();
    h.env.end_subroutine(def, h.block(vec![body])).unwrap();
}

#[test]
fn recursion_gets_a_fresh_frame_per_call() {
    let h = Harness::new();
    define_factorial(&h);

    let root = h.block(vec![h.assign("x", call(&h, "fact", vec![lit(5)]))]);
    assert_eq!(h.run(&root).unwrap(), RunOutcome::Completed);
    assert_eq!(h.value_of("x"), 120);

    let fact = h.env.lookup_subroutine("fact").unwrap();
    assert_eq!(fact.active_calls(), 0);
}

#[test]
fn locals_are_not_shared_between_activations() {
    let h = Harness::new();
    // sub keep(n) -> r { t = n; if n > 0 { keep(n - 1) } r = t }
    let def = h.env.begin_subroutine(&loc(), "keep", &["n"], Some("r")).unwrap();
    let save = h.assign("t", h.var("n"));
    let cond = h.binary(BinaryOp::Gt, h.var("n"), lit(0));
    let inner = call(&h, "keep", vec![h.binary(BinaryOp::Sub, h.var("n"), lit(1))]);
    let recurse = Node::if_else(&h.env, loc(), cond, h.block(vec![inner]), None).unwrap();
    let ret = h.assign("r", h.var("t"));
    h.env
        .end_subroutine(def, h.block(vec![save, recurse, ret]))
        .unwrap();

    let root = h.block(vec![h.assign("x", call(&h, "keep", vec![lit(3)]))]);
    h.run(&root).unwrap();
    assert_eq!(h.value_of("x"), 3);
}

#[test]
fn arguments_bind_in_order() {
    let h = Harness::new();
    let def = h.env.begin_subroutine(&loc(), "diff", &["a", "b"], Some("r")).unwrap();
    let body = h.block(vec![h.assign(
        "r",
        h.binary(BinaryOp::Sub, h.var("a"), h.var("b")),
    )]);
    h.env.end_subroutine(def, body).unwrap();

    let root = h.block(vec![h.assign("x", call(&h, "diff", vec![lit(10), lit(3)]))]);
    h.run(&root).unwrap();
    assert_eq!(h.value_of("x"), 7);
}

#[test]
fn subroutine_without_return_variable_yields_zero() {
    let h = Harness::new();
    h.run(&h.block(vec![h.assign("g", lit(0))])).unwrap();

    let def = h.env.begin_subroutine(&loc(), "touch", &[], None).unwrap();
    let body = h.block(vec![h.assign("g", lit(42))]);
    h.env.end_subroutine(def, body).unwrap();

    let root = h.block(vec![h.assign("x", call(&h, "touch", Vec::new()))]);
    h.run(&root).unwrap();
    assert_eq!(h.value_of("x"), 0);
    assert_eq!(h.value_of("g"), 42);
}

#[test]
fn static_in_subroutine_persists_across_calls() {
    let h = Harness::new();
    let def = h.env.begin_subroutine(&loc(), "count", &[], Some("r")).unwrap();
    let body = h.block(vec![
        Node::static_var(&h.env, loc(), "calls", lit(0)).unwrap(),
        h.assign("calls", h.binary(BinaryOp::Add, h.var("calls"), lit(1))),
        h.assign("r", h.var("calls")),
    ]);
    h.env.end_subroutine(def, body).unwrap();

    let root = h.block(vec![
        h.assign("a", call(&h, "count", Vec::new())),
        h.assign("b", call(&h, "count", Vec::new())),
        h.assign("c", call(&h, "count", Vec::new())),
    ]);
    h.run(&root).unwrap();
    assert_eq!(
        (h.value_of("a"), h.value_of("b"), h.value_of("c")),
        (1, 2, 3)
    );
}

#[test]
fn dropped_subroutine_is_unavailable_at_run_time() {
    let h = Harness::new();
    define_factorial(&h);
    let root = h.block(vec![h.assign("x", call(&h, "fact", vec![lit(3)]))]);

    assert!(h.env.drop_subroutine("fact"));
    let err = h.run(&root).unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::SubroutineUnavailable {
            name: "fact".into()
        }
    );
}

#[test]
fn redefinition_invalidates_existing_calls() {
    let h = Harness::new();
    define_factorial(&h);
    let old_call = h.block(vec![h.assign("x", call(&h, "fact", vec![lit(3)]))]);

    define_factorial(&h);
    let new_call = h.block(vec![h.assign("y", call(&h, "fact", vec![lit(4)]))]);

    assert!(h.run(&old_call).is_err());
    h.run(&new_call).unwrap();
    assert_eq!(h.value_of("y"), 24);
}

#[test]
fn call_checks_name_and_arity() {
    let h = Harness::new();
    define_factorial(&h);

    let err = Node::call(&h.env, loc(), "fact", Vec::new()).unwrap_err();
    assert_eq!(
        err.kind,
        CompileErrorKind::ArgumentCount {
            name: "fact".into(),
            expected: 1,
            got: 0
        }
    );

    let err = Node::call(&h.env, loc(), "nope", Vec::new()).unwrap_err();
    assert_eq!(
        err.kind,
        CompileErrorKind::UndefinedSubroutine {
            name: "nope".into()
        }
    );
}

#[test]
fn deep_recursion_grows_the_stack() {
    let h = Harness::new();
    // sub down(n) -> r { if n > 0 { r = down(n - 1) + 1 } }
    let def = h.env.begin_subroutine(&loc(), "down", &["n"], Some("r")).unwrap();
    let cond = h.binary(BinaryOp::Gt, h.var("n"), lit(0));
    let inner = call(&h, "down", vec![h.binary(BinaryOp::Sub, h.var("n"), lit(1))]);
    let then = h.block(vec![h.assign("r", h.binary(BinaryOp::Add, inner, lit(1)))]);
    let body = Node::if_else(&h.env, loc(), cond, then, None).unwrap();
    h.env.end_subroutine(def, h.block(vec![body])).unwrap();

    let root = h.block(vec![h.assign("x", call(&h, "down", vec![lit(20_000)]))]);
    h.run(&root).unwrap();
    assert_eq!(h.value_of("x"), 20_000);
}
