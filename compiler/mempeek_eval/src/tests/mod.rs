//! Behaviour suites over whole node trees.
//!
//! Trees are built through the public constructors, the way the grammar
//! layer builds them, and run against a simulated register space with
//! buffered output.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

mod fold_tests;
mod loop_tests;
mod subroutine_tests;

use mempeek_ir::{BinaryOp, FormatKind, Location, PrintFormat, Word};
use mempeek_mmap::{SimulatedDriver, SimulatedMemory};

use crate::{
    buffer_handler, run, Environment, Node, PrintItem, RunOutcome, RuntimeError,
    SharedPrintHandler,
};

fn loc() -> Location {
    Location::new("test.mp", 1, 1)
}

fn lit(value: Word) -> Node {
    Node::literal(loc(), value)
}

/// Environment over a simulated register space, capturing output.
struct Harness {
    env: Environment,
    memory: SimulatedMemory,
    output: SharedPrintHandler,
}

impl Harness {
    fn new() -> Self {
        let memory = SimulatedMemory::new();
        let output = buffer_handler();
        let env = Environment::builder()
            .print_handler(output.clone())
            .driver(SimulatedDriver::with_memory(memory.clone()))
            .build();
        Harness {
            env,
            memory,
            output,
        }
    }

    fn var(&self, name: &str) -> Node {
        Node::var(&self.env, loc(), name).unwrap()
    }

    fn assign(&self, name: &str, value: Node) -> Node {
        Node::assign(&self.env, loc(), name, value).unwrap()
    }

    fn binary(&self, op: BinaryOp, left: Node, right: Node) -> Node {
        Node::binary(&self.env, loc(), op, left, right).unwrap()
    }

    fn block(&self, statements: Vec<Node>) -> Node {
        Node::block(&self.env, loc(), statements).unwrap()
    }

    /// `print expr` in unsigned decimal followed by a space.
    fn print(&self, expr: Node) -> Node {
        Node::print(
            &self.env,
            loc(),
            vec![PrintItem::Value(expr, PrintFormat::word_sized(FormatKind::Dec))],
            Some(" ".to_string()),
        )
        .unwrap()
    }

    fn run(&self, root: &Node) -> Result<RunOutcome, RuntimeError> {
        run(root, &self.env)
    }

    fn output(&self) -> String {
        self.output.get_output()
    }

    fn value_of(&self, name: &str) -> Word {
        self.env.lookup(name).unwrap().get()
    }
}
