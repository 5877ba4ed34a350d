//! Syntax tree nodes.
//!
//! One flat [`Node`] type with a tagged [`NodeKind`]. Nodes are created
//! bottom-up through the constructors in `build.rs`; each constructor folds
//! its constant children into literals. After construction the tree is
//! immutable and can be executed any number of times.

mod build;
mod exec;
mod operators;

use std::cell::Cell;
use std::rc::Weak;

use mempeek_ir::{AccessSize, BinaryOp, FormatKind, Location, PrintFormat, UnaryOp, Word};

use crate::environment::{Subroutine, VarRef};
use crate::errors::Signal;

pub use operators::{evaluate_binary, evaluate_unary};

/// Statements that leave a construct early.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    Break,
    Exit,
    Quit,
}

impl Jump {
    fn signal(self) -> Signal {
        match self {
            Jump::Break => Signal::Break,
            Jump::Exit => Signal::Exit,
            Jump::Quit => Signal::Quit,
        }
    }
}

/// One item of a `print` statement, as handed to [`Node::print`].
#[derive(Debug)]
pub enum PrintItem {
    /// An expression rendered with a format.
    Value(Node, PrintFormat),
    /// Literal text.
    Text(String),
}

/// A print item with its format size resolved.
#[derive(Debug)]
enum PrintPart {
    Value {
        expr: Node,
        kind: FormatKind,
        size: AccessSize,
    },
    Text(String),
}

#[derive(Debug)]
enum NodeKind {
    Constant(Word),
    /// `def` and `map`: all work happens at construction.
    Directive,
    Block(Vec<Node>),
    Jump(Signal),
    Assign {
        var: VarRef,
        value: Box<Node>,
    },
    Static {
        var: VarRef,
        init: Box<Node>,
        initialized: Cell<bool>,
    },
    Var {
        var: VarRef,
        index: Option<Box<Node>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Restriction {
        size: AccessSize,
        operand: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    For {
        init: Box<Node>,
        var: VarRef,
        target: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
    },
    Peek {
        address: Box<Node>,
        size: AccessSize,
    },
    Poke {
        address: Box<Node>,
        value: Box<Node>,
        mask: Option<Box<Node>>,
        size: AccessSize,
    },
    Print {
        parts: Vec<PrintPart>,
        trailing: String,
    },
    Sleep {
        micros: Box<Node>,
    },
    Call {
        name: String,
        subroutine: Weak<Subroutine>,
        args: Vec<Node>,
    },
    Import(Option<Box<Node>>),
}

impl NodeKind {
    fn name(&self) -> &'static str {
        match self {
            NodeKind::Constant(_) => "constant",
            NodeKind::Directive => "directive",
            NodeKind::Block(_) => "block",
            NodeKind::Jump(_) => "jump",
            NodeKind::Assign { .. } => "assign",
            NodeKind::Static { .. } => "static",
            NodeKind::Var { .. } => "var",
            NodeKind::Unary { .. } => "unary",
            NodeKind::Binary { .. } => "binary",
            NodeKind::Restriction { .. } => "restriction",
            NodeKind::If { .. } => "if",
            NodeKind::While { .. } => "while",
            NodeKind::For { .. } => "for",
            NodeKind::Peek { .. } => "peek",
            NodeKind::Poke { .. } => "poke",
            NodeKind::Print { .. } => "print",
            NodeKind::Sleep { .. } => "sleep",
            NodeKind::Call { .. } => "call",
            NodeKind::Import(_) => "import",
        }
    }
}

/// A node of the syntax tree.
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    location: Location,
    /// Pure and independent of the environment; never changes once set.
    constant: bool,
}

impl Node {
    fn new(kind: NodeKind, location: Location, constant: bool) -> Self {
        tracing::trace!(kind = kind.name(), %location, constant, "node created");
        Node {
            kind,
            location,
            constant,
        }
    }

    #[inline]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Whether the node always evaluates to the same value without side
    /// effects.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// The value of a literal node.
    pub fn as_literal(&self) -> Option<Word> {
        match self.kind {
            NodeKind::Constant(value) => Some(value),
            _ => None,
        }
    }
}
