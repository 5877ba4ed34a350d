//! Node constructors.
//!
//! Every constructor that takes child nodes folds the constant ones into
//! literals as they are attached. Construction-time failures (naming
//! conflicts, undefined names, non-constant arguments of directives, folds
//! that divide by zero) are returned as [`CompileError`].

use std::cell::Cell;
use std::rc::Rc;

use mempeek_ir::{
    parse_float, parse_int, AccessSize, BinaryOp, FormatKind, Location, UnaryOp, Word,
};
use mempeek_mmap::DEFAULT_DEVICE;
use tracing::debug;

use super::{Jump, Node, NodeKind, PrintItem, PrintPart};
use crate::environment::Environment;
use crate::errors::{
    fold_failure, naming_conflict, non_const_expression, undefined_subroutine, undefined_variable,
    CompileError, CompileErrorKind,
};

/// Replace a constant child with a literal of its value.
fn attach(env: &Environment, child: Node) -> Result<Node, CompileError> {
    if !child.constant || child.as_literal().is_some() {
        return Ok(child);
    }
    let value = child
        .execute(env)
        .map_err(|action| fold_failure(action, &child.location))?;
    debug!(value, location = %child.location, "folded constant");
    Ok(Node::literal(child.location, value))
}

fn attach_boxed(env: &Environment, child: Node) -> Result<Box<Node>, CompileError> {
    attach(env, child).map(Box::new)
}

fn attach_optional(
    env: &Environment,
    child: Option<Node>,
) -> Result<Option<Box<Node>>, CompileError> {
    child.map(|c| attach_boxed(env, c)).transpose()
}

/// Value of an expression that must be known at load time.
fn require_constant(env: &Environment, expr: &Node) -> Result<Word, CompileError> {
    if !expr.constant {
        return Err(non_const_expression(&expr.location));
    }
    expr.execute(env)
        .map_err(|action| fold_failure(action, &expr.location))
}

impl Node {
    // Leaves

    pub fn literal(location: Location, value: Word) -> Node {
        Node::new(NodeKind::Constant(value), location, true)
    }

    /// Integer literal in decimal, `0x` or `0b` notation.
    pub fn int_literal(location: Location, text: &str) -> Result<Node, CompileError> {
        match parse_int(text) {
            Ok(value) => Ok(Node::literal(location, value)),
            Err(err) => Err(CompileError::new(
                CompileErrorKind::InvalidLiteral {
                    message: err.to_string(),
                },
                location,
            )),
        }
    }

    /// Float literal, stored as its IEEE-754 bit pattern.
    pub fn float_literal(location: Location, text: &str) -> Result<Node, CompileError> {
        match parse_float(text) {
            Ok(value) => Ok(Node::literal(location, value)),
            Err(err) => Err(CompileError::new(
                CompileErrorKind::InvalidLiteral {
                    message: err.to_string(),
                },
                location,
            )),
        }
    }

    /// `break`, `exit` or `quit`.
    pub fn jump(location: Location, jump: Jump) -> Node {
        Node::new(NodeKind::Jump(jump.signal()), location, false)
    }

    // Statements

    pub fn block(
        env: &Environment,
        location: Location,
        statements: Vec<Node>,
    ) -> Result<Node, CompileError> {
        let statements = statements
            .into_iter()
            .map(|stmt| attach(env, stmt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::new(NodeKind::Block(statements), location, false))
    }

    /// `name = value`.
    pub fn assign(
        env: &Environment,
        location: Location,
        name: &str,
        value: Node,
    ) -> Result<Node, CompileError> {
        let value = attach_boxed(env, value)?;
        let var = env
            .alloc_var(name)
            .ok_or_else(|| naming_conflict(name, &location))?;
        Ok(Node::new(NodeKind::Assign { var, value }, location, false))
    }

    /// `static name = init`: `init` runs at most once per program.
    pub fn static_var(
        env: &Environment,
        location: Location,
        name: &str,
        init: Node,
    ) -> Result<Node, CompileError> {
        let init = attach_boxed(env, init)?;
        let var = env
            .alloc_static(name)
            .ok_or_else(|| naming_conflict(name, &location))?;
        Ok(Node::new(
            NodeKind::Static {
                var,
                init,
                initialized: Cell::new(false),
            },
            location,
            false,
        ))
    }

    /// `def name value`: a constant fixed now.
    pub fn def(
        env: &Environment,
        location: Location,
        name: &str,
        value: Node,
    ) -> Result<Node, CompileError> {
        let value = require_constant(env, &value)?;
        let def = env
            .alloc_def(name)
            .ok_or_else(|| naming_conflict(name, &location))?;
        def.set(value);
        debug!(name, value, "constant defined");
        Ok(Node::new(NodeKind::Directive, location, false))
    }

    /// `def name value from base`: defines `name` and, for every member `m`
    /// of `base`, `name.m = base.m - base`.
    pub fn def_from(
        env: &Environment,
        location: Location,
        name: &str,
        value: Node,
        from: &str,
    ) -> Result<Node, CompileError> {
        let value = require_constant(env, &value)?;
        let def = env
            .alloc_def(name)
            .ok_or_else(|| naming_conflict(name, &location))?;
        def.set(value);

        let base = env
            .lookup(from)
            .filter(|var| var.is_def())
            .ok_or_else(|| naming_conflict(from, &location))?;
        let base_value = base.get();

        for member in env.members_of(from) {
            let source_name = format!("{from}.{member}");
            let target_name = format!("{name}.{member}");
            let source = env
                .lookup(&source_name)
                .ok_or_else(|| undefined_variable(&source_name, &location))?;
            let target = env
                .alloc_def(&target_name)
                .ok_or_else(|| naming_conflict(&target_name, &location))?;
            target.set(source.get().wrapping_sub(base_value));
        }
        debug!(name, from, value, "constant family defined");
        Ok(Node::new(NodeKind::Directive, location, false))
    }

    /// `map address size [device]`: registers a mapping now.
    pub fn map(
        env: &Environment,
        location: Location,
        address: Node,
        size: Node,
        device: Option<&str>,
    ) -> Result<Node, CompileError> {
        let phys = require_constant(env, &address)?;
        let len = require_constant(env, &size)?;
        let device = device.unwrap_or(DEFAULT_DEVICE);

        if let Err(err) = env.map_memory(phys, len, device) {
            return Err(CompileError::new(
                CompileErrorKind::MappingFailure {
                    phys,
                    len,
                    device: device.to_string(),
                    reason: err.to_string(),
                },
                location,
            ));
        }
        Ok(Node::new(NodeKind::Directive, location, false))
    }

    pub fn if_else(
        env: &Environment,
        location: Location,
        condition: Node,
        then_branch: Node,
        else_branch: Option<Node>,
    ) -> Result<Node, CompileError> {
        let kind = NodeKind::If {
            condition: attach_boxed(env, condition)?,
            then_branch: attach_boxed(env, then_branch)?,
            else_branch: attach_optional(env, else_branch)?,
        };
        Ok(Node::new(kind, location, false))
    }

    pub fn while_loop(
        env: &Environment,
        location: Location,
        condition: Node,
        body: Node,
    ) -> Result<Node, CompileError> {
        let kind = NodeKind::While {
            condition: attach_boxed(env, condition)?,
            body: attach_boxed(env, body)?,
        };
        Ok(Node::new(kind, location, false))
    }

    /// `for init to target [step step] body`, where `init` is the
    /// assignment of the loop variable.
    pub fn for_loop(
        env: &Environment,
        location: Location,
        init: Node,
        target: Node,
        step: Option<Node>,
        body: Node,
    ) -> Result<Node, CompileError> {
        let NodeKind::Assign { var, .. } = &init.kind else {
            return Err(CompileError::new(
                CompileErrorKind::InvalidLoopInit,
                init.location,
            ));
        };
        let var = Rc::clone(var);
        let kind = NodeKind::For {
            init: Box::new(init),
            var,
            target: attach_boxed(env, target)?,
            step: attach_optional(env, step)?,
            body: attach_boxed(env, body)?,
        };
        Ok(Node::new(kind, location, false))
    }

    /// `print items... [trailing]`; the trailing text defaults to a newline.
    ///
    /// Formats without a size use the environment's default size, resolved
    /// here once.
    pub fn print(
        env: &Environment,
        location: Location,
        items: Vec<PrintItem>,
        trailing: Option<String>,
    ) -> Result<Node, CompileError> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let part = match item {
                PrintItem::Value(expr, format) => {
                    let format = format.resolve(env.default_size());
                    let size = format.size.unwrap_or(AccessSize::Bits64);
                    if format.kind == FormatKind::Float && size != AccessSize::Bits64 {
                        return Err(CompileError::new(
                            CompileErrorKind::InvalidFormat { size },
                            expr.location,
                        ));
                    }
                    PrintPart::Value {
                        expr: attach(env, expr)?,
                        kind: format.kind,
                        size,
                    }
                }
                PrintItem::Text(text) => PrintPart::Text(text),
            };
            parts.push(part);
        }
        let kind = NodeKind::Print {
            parts,
            trailing: trailing.unwrap_or_else(|| "\n".to_string()),
        };
        Ok(Node::new(kind, location, false))
    }

    /// `sleep micros`.
    pub fn sleep(env: &Environment, location: Location, micros: Node) -> Result<Node, CompileError> {
        let micros = attach_boxed(env, micros)?;
        Ok(Node::new(NodeKind::Sleep { micros }, location, false))
    }

    /// Run an imported unit's root; `None` when a run-once unit was
    /// already imported.
    pub fn import(location: Location, root: Option<Node>) -> Node {
        Node::new(NodeKind::Import(root.map(Box::new)), location, false)
    }

    // Expressions

    /// Read variable `name`. Constant if `name` is a `def`.
    pub fn var(env: &Environment, location: Location, name: &str) -> Result<Node, CompileError> {
        let var = env
            .lookup(name)
            .ok_or_else(|| undefined_variable(name, &location))?;
        let constant = var.is_def();
        Ok(Node::new(NodeKind::Var { var, index: None }, location, constant))
    }

    /// `name[index]`: the variable's value plus `index`.
    pub fn indexed_var(
        env: &Environment,
        location: Location,
        name: &str,
        index: Node,
    ) -> Result<Node, CompileError> {
        let var = env
            .lookup(name)
            .ok_or_else(|| undefined_variable(name, &location))?;
        let index = attach_boxed(env, index)?;
        let constant = var.is_def() && index.constant;
        let kind = NodeKind::Var {
            var,
            index: Some(index),
        };
        Ok(Node::new(kind, location, constant))
    }

    pub fn unary(
        env: &Environment,
        location: Location,
        op: UnaryOp,
        operand: Node,
    ) -> Result<Node, CompileError> {
        let operand = attach_boxed(env, operand)?;
        let constant = operand.constant;
        Ok(Node::new(NodeKind::Unary { op, operand }, location, constant))
    }

    pub fn binary(
        env: &Environment,
        location: Location,
        op: BinaryOp,
        left: Node,
        right: Node,
    ) -> Result<Node, CompileError> {
        let left = attach_boxed(env, left)?;
        let right = attach_boxed(env, right)?;
        let constant = left.constant && right.constant;
        Ok(Node::new(
            NodeKind::Binary { op, left, right },
            location,
            constant,
        ))
    }

    /// `expr.8`, `expr.16`, ...: keep only the low bits of `size`.
    pub fn restriction(
        env: &Environment,
        location: Location,
        size: AccessSize,
        operand: Node,
    ) -> Result<Node, CompileError> {
        let operand = attach_boxed(env, operand)?;
        let constant = operand.constant;
        Ok(Node::new(
            NodeKind::Restriction { size, operand },
            location,
            constant,
        ))
    }

    /// Sized register read.
    pub fn peek(
        env: &Environment,
        location: Location,
        address: Node,
        size: AccessSize,
    ) -> Result<Node, CompileError> {
        let address = attach_boxed(env, address)?;
        Ok(Node::new(NodeKind::Peek { address, size }, location, false))
    }

    /// Sized register write, read-modify-write when `mask` is given.
    pub fn poke(
        env: &Environment,
        location: Location,
        address: Node,
        value: Node,
        mask: Option<Node>,
        size: AccessSize,
    ) -> Result<Node, CompileError> {
        let kind = NodeKind::Poke {
            address: attach_boxed(env, address)?,
            value: attach_boxed(env, value)?,
            mask: attach_optional(env, mask)?,
            size,
        };
        Ok(Node::new(kind, location, false))
    }

    /// Call subroutine `name`.
    ///
    /// The call refers to the subroutine weakly; if it is redefined or
    /// dropped later, executing the call fails.
    pub fn call(
        env: &Environment,
        location: Location,
        name: &str,
        args: Vec<Node>,
    ) -> Result<Node, CompileError> {
        let subroutine = env
            .lookup_subroutine(name)
            .ok_or_else(|| undefined_subroutine(name, &location))?;
        if subroutine.arity() != args.len() {
            return Err(CompileError::new(
                CompileErrorKind::ArgumentCount {
                    name: name.to_string(),
                    expected: subroutine.arity(),
                    got: args.len(),
                },
                location,
            ));
        }

        let args = args
            .into_iter()
            .map(|arg| attach(env, arg))
            .collect::<Result<Vec<_>, _>>()?;
        let kind = NodeKind::Call {
            name: name.to_string(),
            subroutine: Rc::downgrade(&subroutine),
            args,
        };
        Ok(Node::new(kind, location, false))
    }
}
