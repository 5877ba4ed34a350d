//! Node execution.
//!
//! Children are evaluated depth-first, left to right, and only when their
//! value is needed. Signals are caught exactly where the language says:
//! - `Break` by `while` and `for`
//! - `Exit` (and a stray `Break`) by subroutine calls and imports
//! - `Quit` and `Terminate` nowhere inside the tree

use std::rc::Weak;
use std::time::Duration;

use mempeek_ir::{AccessSize, BinaryOp, Word, FALSE, TRUE};
use tracing::{instrument, trace};

use super::{evaluate_binary, evaluate_unary, Node, NodeKind, PrintPart};
use crate::environment::{Environment, Subroutine, VarRef};
use crate::errors::{
    bus_error, no_mapping, subroutine_unavailable, ControlAction, EvalResult, Signal,
};
use crate::format::format_word;
use crate::stack::ensure_sufficient_stack;

/// Outcome of a loop body.
enum LoopAction {
    Continue,
    Break,
}

/// Absorb `Break` raised by a loop body.
#[inline]
fn to_loop_action(result: EvalResult) -> Result<LoopAction, ControlAction> {
    match result {
        Ok(_) => Ok(LoopAction::Continue),
        Err(ControlAction::Signal(Signal::Break)) => Ok(LoopAction::Break),
        Err(action) => Err(action),
    }
}

/// Absorb `Exit` and `Break` at a call or import boundary.
#[inline]
fn absorb_exit(result: EvalResult) -> Result<(), ControlAction> {
    match result {
        Ok(_) | Err(ControlAction::Signal(Signal::Exit | Signal::Break)) => Ok(()),
        Err(action) => Err(action),
    }
}

impl Node {
    /// Evaluate this node.
    pub fn execute(&self, env: &Environment) -> EvalResult {
        ensure_sufficient_stack(|| {
            trace!(kind = self.kind.name(), location = %self.location, "execute");
            self.execute_kind(env)
        })
    }

    fn execute_kind(&self, env: &Environment) -> EvalResult {
        match &self.kind {
            NodeKind::Constant(value) => Ok(*value),
            NodeKind::Directive => Ok(0),
            NodeKind::Block(statements) => {
                for statement in statements {
                    statement.execute(env)?;
                    if env.is_terminated() {
                        return Err(Signal::Terminate.into());
                    }
                }
                Ok(0)
            }
            NodeKind::Jump(signal) => Err((*signal).into()),
            NodeKind::Assign { var, value } => {
                let value = value.execute(env)?;
                var.set(value);
                Ok(0)
            }
            NodeKind::Static {
                var,
                init,
                initialized,
            } => {
                if !initialized.get() {
                    let value = init.execute(env)?;
                    var.set(value);
                    initialized.set(true);
                }
                Ok(0)
            }
            NodeKind::Var { var, index } => {
                let offset = match index {
                    Some(index) => index.execute(env)?,
                    None => 0,
                };
                Ok(var.get().wrapping_add(offset))
            }
            NodeKind::Unary { op, operand } => Ok(evaluate_unary(*op, operand.execute(env)?)),
            NodeKind::Binary { op, left, right } => self.execute_binary(*op, left, right, env),
            NodeKind::Restriction { size, operand } => Ok(size.truncate(operand.execute(env)?)),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if condition.execute(env)? != 0 {
                    then_branch.execute(env)?;
                } else if let Some(else_branch) = else_branch {
                    else_branch.execute(env)?;
                }
                Ok(0)
            }
            NodeKind::While { condition, body } => {
                while condition.execute(env)? != 0 {
                    if let LoopAction::Break = to_loop_action(body.execute(env))? {
                        break;
                    }
                }
                Ok(0)
            }
            NodeKind::For {
                init,
                var,
                target,
                step,
                body,
            } => execute_for(init, var, target, step.as_deref(), body, env),
            NodeKind::Peek { address, size } => self.execute_peek(address, *size, env),
            NodeKind::Poke {
                address,
                value,
                mask,
                size,
            } => self.execute_poke(address, value, mask.as_deref(), *size, env),
            NodeKind::Print { parts, trailing } => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        PrintPart::Value { expr, kind, size } => {
                            out.push_str(&format_word(expr.execute(env)?, *kind, *size));
                        }
                        PrintPart::Text(text) => out.push_str(text),
                    }
                }
                out.push_str(trailing);
                env.print_handler().print(&out);
                Ok(0)
            }
            NodeKind::Sleep { micros } => {
                let micros = micros.execute(env)?;
                if !env.stop_flag().sleep(Duration::from_micros(micros)) {
                    trace!("sleep interrupted by stop request");
                }
                Ok(0)
            }
            NodeKind::Call {
                name,
                subroutine,
                args,
            } => self.execute_call(name, subroutine, args, env),
            NodeKind::Import(root) => {
                if let Some(root) = root {
                    absorb_exit(root.execute(env))?;
                }
                Ok(0)
            }
        }
    }

    fn execute_binary(
        &self,
        op: BinaryOp,
        left: &Node,
        right: &Node,
        env: &Environment,
    ) -> EvalResult {
        let left = left.execute(env)?;
        match op {
            BinaryOp::And if left == 0 => return Ok(FALSE),
            BinaryOp::Or if left != 0 => return Ok(TRUE),
            _ => {}
        }
        let right = right.execute(env)?;
        Ok(evaluate_binary(op, left, right, &self.location)?)
    }

    fn execute_peek(&self, address: &Node, size: AccessSize, env: &Environment) -> EvalResult {
        let address = address.execute(env)?;
        let window = env
            .find_mapping(address, size)
            .ok_or_else(|| no_mapping(address, size, &self.location))?;

        let value = window.read(address, size);
        if window.has_failed() {
            return Err(bus_error(address, size, &self.location).into());
        }
        Ok(size.truncate(value))
    }

    fn execute_poke(
        &self,
        address: &Node,
        value: &Node,
        mask: Option<&Node>,
        size: AccessSize,
        env: &Environment,
    ) -> EvalResult {
        let address = address.execute(env)?;
        let value = size.truncate(value.execute(env)?);
        let window = env
            .find_mapping(address, size)
            .ok_or_else(|| no_mapping(address, size, &self.location))?;

        match mask {
            None => {
                window.write(address, size, value);
                if window.has_failed() {
                    return Err(bus_error(address, size, &self.location).into());
                }
            }
            Some(mask) => {
                let mask = size.truncate(mask.execute(env)?);
                // Two primitive accesses: clear the field, then set it.
                window.clear_bits(address, size, mask);
                if window.has_failed() {
                    return Err(bus_error(address, size, &self.location).into());
                }
                window.set_bits(address, size, value & mask);
                if window.has_failed() {
                    return Err(bus_error(address, size, &self.location).into());
                }
            }
        }
        Ok(0)
    }

    #[instrument(level = "debug", skip_all, fields(name = %name))]
    fn execute_call(
        &self,
        name: &str,
        subroutine: &Weak<Subroutine>,
        args: &[Node],
        env: &Environment,
    ) -> EvalResult {
        let subroutine = subroutine
            .upgrade()
            .ok_or_else(|| subroutine_unavailable(name, &self.location))?;
        let body = subroutine
            .body()
            .ok_or_else(|| subroutine_unavailable(name, &self.location))?;

        // Arguments see the caller's frame.
        let values = args
            .iter()
            .map(|arg| arg.execute(env))
            .collect::<Result<Vec<Word>, _>>()?;

        let frame = subroutine.enter();
        trace!(depth = subroutine.active_calls(), "frame entered");
        for (param, value) in subroutine.params().iter().zip(values) {
            param.set(value);
        }

        absorb_exit(body.execute(env))?;

        let result = subroutine.retval().map_or(0, |retval| retval.get());
        drop(frame);
        Ok(result)
    }
}

fn execute_for(
    init: &Node,
    var: &VarRef,
    target: &Node,
    step: Option<&Node>,
    body: &Node,
    env: &Environment,
) -> EvalResult {
    init.execute(env)?;
    let target = target.execute(env)?.cast_signed();
    let step = match step {
        Some(step) => step.execute(env)?.cast_signed(),
        None => 1,
    };

    // The counter is private to the loop; the body sees it through `var` but
    // cannot steer it. A step past the signed range ends the loop.
    let mut i = var.get().cast_signed();
    while (step > 0 && i <= target) || (step < 0 && i >= target) {
        if let LoopAction::Break = to_loop_action(body.execute(env))? {
            break;
        }
        let Some(next) = i.checked_add(step) else {
            break;
        };
        i = next;
        var.set(i.cast_unsigned());
    }
    Ok(0)
}
