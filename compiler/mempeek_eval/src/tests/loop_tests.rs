//! `for` and `while` loops, and statics inside them.

use mempeek_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::{lit, loc, Harness};
use crate::{CompileErrorKind, Jump, Node};

/// `for i = from to target [step step] { n = n + 1 }`, returning the
/// iteration count and the final value of `i`.
fn count_iterations(from: i64, target: i64, step: Option<i64>) -> (i64, i64) {
    let h = Harness::new();
    let setup = h.assign("n", lit(0));
    let init = h.assign("i", lit(from.cast_unsigned()));
    let body = h.block(vec![h.assign(
        "n",
        h.binary(BinaryOp::Add, h.var("n"), lit(1)),
    )]);
    let step = step.map(|k| lit(k.cast_unsigned()));
    let target = lit(target.cast_unsigned());
    let for_loop = Node::for_loop(&h.env, loc(), init, target, step, body).unwrap();
    h.run(&h.block(vec![setup, for_loop])).unwrap();
    (
        h.value_of("n").cast_signed(),
        h.value_of("i").cast_signed(),
    )
}

#[test]
fn counts_up_inclusively() {
    assert_eq!(count_iterations(1, 5, None), (5, 6));
    assert_eq!(count_iterations(5, 5, None), (1, 6));
    assert_eq!(count_iterations(6, 5, None), (0, 6));
}

#[test]
fn counts_down_with_negative_step() {
    assert_eq!(count_iterations(10, 1, Some(-3)), (4, -2));
    assert_eq!(count_iterations(1, 10, Some(-1)), (0, 1));
}

#[test]
fn step_larger_than_one() {
    assert_eq!(count_iterations(0, 10, Some(4)), (3, 12));
}

#[test]
fn bounds_compare_signed() {
    assert_eq!(count_iterations(-3, 2, None), (6, 3));
    assert_eq!(count_iterations(2, -3, Some(-2)), (3, -4));
}

#[test]
fn counter_stops_at_the_signed_range_ends() {
    assert_eq!(
        count_iterations(i64::MAX - 1, i64::MAX, None),
        (2, i64::MAX)
    );
    assert_eq!(
        count_iterations(i64::MAX - 5, i64::MAX, Some(4)),
        (2, i64::MAX - 1)
    );
    assert_eq!(
        count_iterations(i64::MIN + 1, i64::MIN, Some(-1)),
        (2, i64::MIN)
    );
}

#[test]
fn zero_step_runs_no_iterations() {
    assert_eq!(count_iterations(1, 5, Some(0)), (0, 1));
}

#[test]
fn body_cannot_steer_the_counter() {
    let h = Harness::new();
    let setup = h.assign("n", lit(0));
    let init = h.assign("i", lit(1));
    let body = h.block(vec![
        h.assign("n", h.binary(BinaryOp::Add, h.var("n"), lit(1))),
        h.assign("i", lit(100)),
    ]);
    let for_loop = Node::for_loop(&h.env, loc(), init, lit(3), None, body).unwrap();
    h.run(&h.block(vec![setup, for_loop])).unwrap();
    assert_eq!(h.value_of("n"), 3);
}

#[test]
fn break_leaves_for_loop() {
    let h = Harness::new();
    let init = h.assign("i", lit(0));
    let cond = h.binary(BinaryOp::Eq, h.var("i"), lit(3));
    let stop = Node::if_else(
        &h.env,
        loc(),
        cond,
        h.block(vec![Node::jump(loc(), Jump::Break)]),
        None,
    )
    .unwrap();
    let body = h.block(vec![stop, h.assign("last", h.var("i"))]);
    let for_loop = Node::for_loop(&h.env, loc(), init, lit(10), None, body).unwrap();
    h.run(&h.block(vec![for_loop])).unwrap();
    assert_eq!(h.value_of("last"), 2);
    assert_eq!(h.value_of("i"), 3);
}

#[test]
fn loop_init_must_be_an_assignment() {
    let h = Harness::new();
    let body = h.block(Vec::new());
    let err = Node::for_loop(&h.env, loc(), lit(0), lit(3), None, body).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::InvalidLoopInit);
}

#[test]
fn static_initializes_once_in_a_loop() {
    let h = Harness::new();
    let setup = h.assign("calls", lit(0));

    // sub bump() -> r { calls = calls + 1; r = calls * 10 }
    let def = h.env.begin_subroutine(&loc(), "bump", &[], Some("r")).unwrap();
    let body = h.block(vec![
        h.assign("calls", h.binary(BinaryOp::Add, h.var("calls"), lit(1))),
        h.assign("r", h.binary(BinaryOp::Mul, h.var("calls"), lit(10))),
    ]);
    h.env.end_subroutine(def, body).unwrap();

    let init = h.assign("i", lit(1));
    let call = Node::call(&h.env, loc(), "bump", Vec::new()).unwrap();
    let body = h.block(vec![Node::static_var(&h.env, loc(), "s", call).unwrap()]);
    let for_loop = Node::for_loop(&h.env, loc(), init, lit(5), None, body).unwrap();

    let root = h.block(vec![setup, for_loop]);
    h.run(&root).unwrap();
    assert_eq!(h.value_of("calls"), 1);
    assert_eq!(h.value_of("s"), 10);

    // Running the tree again resets the counter but not the static.
    h.run(&root).unwrap();
    assert_eq!(h.value_of("calls"), 0);
    assert_eq!(h.value_of("s"), 10);
}

#[test]
fn while_runs_until_condition_fails() {
    let h = Harness::new();
    let setup = h.assign("x", lit(1));
    let cond = h.binary(BinaryOp::Lt, h.var("x"), lit(1000));
    let body = h.block(vec![h.assign("x", h.binary(BinaryOp::Shl, h.var("x"), lit(1)))]);
    let looped = Node::while_loop(&h.env, loc(), cond, body).unwrap();
    h.run(&h.block(vec![setup, looped])).unwrap();
    assert_eq!(h.value_of("x"), 1024);
}
