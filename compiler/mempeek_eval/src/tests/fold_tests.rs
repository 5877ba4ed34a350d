//! Constant folding and load-time directives.

use mempeek_ir::{AccessSize, BinaryOp, UnaryOp};
use pretty_assertions::assert_eq;

use super::{lit, loc, Harness};
use crate::{CompileErrorKind, Node, RunOutcome};

#[test]
fn constant_operators_mark_their_node_constant() {
    let h = Harness::new();
    let sum = h.binary(BinaryOp::Add, lit(2), lit(3));
    assert!(sum.is_constant());
    assert_eq!(sum.as_literal(), None);

    h.run(&h.block(vec![h.assign("v", lit(1))])).unwrap();
    let mixed = h.binary(BinaryOp::Add, h.var("v"), lit(3));
    assert!(!mixed.is_constant());
}

#[test]
fn def_folds_nested_expression() {
    let h = Harness::new();
    // (2 + 3 * 4) << 4 restricted to 8 bits
    let product = h.binary(BinaryOp::Mul, lit(3), lit(4));
    let sum = h.binary(BinaryOp::Add, lit(2), product);
    let shifted = h.binary(BinaryOp::Shl, sum, lit(4));
    let narrowed = Node::restriction(&h.env, loc(), AccessSize::Bits8, shifted).unwrap();
    assert!(narrowed.is_constant());

    Node::def(&h.env, loc(), "K", narrowed).unwrap();
    assert_eq!(h.value_of("K"), (14 << 4) & 0xff);
}

#[test]
fn constants_feed_further_folding() {
    let h = Harness::new();
    Node::def(&h.env, loc(), "BASE", lit(0x4000_0000)).unwrap();
    let reg = h.binary(BinaryOp::Add, h.var("BASE"), lit(0x18));
    assert!(reg.is_constant());
    Node::def(&h.env, loc(), "REG", reg).unwrap();
    assert_eq!(h.value_of("REG"), 0x4000_0018);

    let indexed = Node::indexed_var(&h.env, loc(), "BASE", lit(4)).unwrap();
    assert!(indexed.is_constant());
}

#[test]
fn division_by_zero_while_folding_is_a_compile_error() {
    let h = Harness::new();
    let quotient = h.binary(BinaryOp::Div, lit(1), lit(0));
    let err = Node::unary(&h.env, loc(), UnaryOp::Neg, quotient).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::ConstDivisionByZero);
    assert_eq!(err.to_diagnostic().code.as_str(), "E1005");

    let remainder = h.binary(BinaryOp::Mod, lit(1), lit(0));
    let err = Node::static_var(&h.env, loc(), "s", remainder).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::ConstDivisionByZero);

    let quotient = h.binary(BinaryOp::Div, lit(8), lit(0));
    let err = Node::def(&h.env, loc(), "D", quotient).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::ConstDivisionByZero);
}

#[test]
fn directives_require_constant_arguments() {
    let h = Harness::new();
    h.run(&h.block(vec![h.assign("addr", lit(0x1000))])).unwrap();

    let err = Node::def(&h.env, loc(), "A", h.var("addr")).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::NonConstExpression);

    let err = Node::map(&h.env, loc(), h.var("addr"), lit(0x100), None).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::NonConstExpression);

    let err = Node::map(&h.env, loc(), lit(0x1000), h.var("addr"), None).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::NonConstExpression);
}

#[test]
fn naming_conflicts_are_reported() {
    let h = Harness::new();
    Node::def(&h.env, loc(), "X", lit(1)).unwrap();

    let err = Node::def(&h.env, loc(), "X", lit(2)).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::NamingConflict { name: "X".into() });

    let err = Node::assign(&h.env, loc(), "X", lit(2)).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::NamingConflict { name: "X".into() });

    let err = Node::var(&h.env, loc(), "missing").unwrap_err();
    assert_eq!(
        err.kind,
        CompileErrorKind::UndefinedVariable {
            name: "missing".into()
        }
    );
}

#[test]
fn def_from_derives_member_offsets() {
    let h = Harness::new();
    Node::def(&h.env, loc(), "UART0", lit(0x1000)).unwrap();
    Node::def(&h.env, loc(), "UART0.DR", lit(0x1000)).unwrap();
    Node::def(&h.env, loc(), "UART0.FR", lit(0x1018)).unwrap();

    Node::def_from(&h.env, loc(), "UART1", lit(0x2000), "UART0").unwrap();
    assert_eq!(h.value_of("UART1"), 0x2000);
    assert_eq!(h.value_of("UART1.DR"), 0);
    assert_eq!(h.value_of("UART1.FR"), 0x18);
    assert_eq!(h.env.members_of("UART1"), vec!["DR", "FR"]);

    h.run(&h.block(vec![h.assign("plain", lit(0))])).unwrap();
    let err = Node::def_from(&h.env, loc(), "UART2", lit(0x3000), "plain").unwrap_err();
    assert_eq!(
        err.kind,
        CompileErrorKind::NamingConflict {
            name: "plain".into()
        }
    );
}

#[test]
fn map_registers_at_load_time() {
    let h = Harness::new();
    let directive = Node::map(&h.env, loc(), lit(0x1000), lit(0x100), None).unwrap();
    assert!(h.env.find_mapping(0x1000, AccessSize::Bits32).is_some());
    // Executing the directive again does nothing.
    assert_eq!(h.run(&directive).unwrap(), RunOutcome::Completed);
}

#[test]
fn refused_mapping_is_a_compile_error() {
    let env = crate::Environment::builder()
        .driver(mempeek_mmap::SimulatedDriver::new().refuse("/dev/fpga"))
        .build();
    let err = Node::map(&env, loc(), lit(0x1000), lit(0x10), Some("/dev/fpga")).unwrap_err();
    let CompileErrorKind::MappingFailure { device, .. } = &err.kind else {
        panic!("expected a mapping failure, got {:?}", err.kind);
    };
    assert_eq!(device, "/dev/fpga");
}

#[test]
fn malformed_literals_are_rejected() {
    assert_eq!(Node::int_literal(loc(), "0x2A").unwrap().as_literal(), Some(42));
    assert_eq!(Node::int_literal(loc(), "0b101").unwrap().as_literal(), Some(5));
    assert_eq!(
        Node::float_literal(loc(), "1.5").unwrap().as_literal(),
        Some(1.5f64.to_bits())
    );

    let err = Node::int_literal(loc(), "0xZZ").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::InvalidLiteral { .. }));
    let err = Node::int_literal(loc(), "99999999999999999999999").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::InvalidLiteral { .. }));
}
