//! Subroutine definitions.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::storage::{FrameGuard, VarKind, VarRef, VarStorage, Variable};
use crate::node::Node;

/// A defined subroutine.
///
/// Owned by the environment's registry. Call nodes only hold a weak
/// reference, so recursive bodies do not keep themselves alive and a
/// redefined or dropped subroutine is released.
pub struct Subroutine {
    name: String,
    storage: Rc<VarStorage>,
    params: Vec<VarRef>,
    retval: Option<VarRef>,
    body: OnceCell<Node>,
}

impl Subroutine {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Calls currently in progress (recursion depth).
    pub fn active_calls(&self) -> usize {
        self.storage.depth()
    }

    pub(crate) fn params(&self) -> &[VarRef] {
        &self.params
    }

    pub(crate) fn retval(&self) -> Option<&VarRef> {
        self.retval.as_ref()
    }

    pub(crate) fn body(&self) -> Option<&Node> {
        self.body.get()
    }

    /// Start one activation; the frame lives until the guard is dropped.
    pub(crate) fn enter(&self) -> FrameGuard {
        FrameGuard::push(&self.storage)
    }
}

impl fmt::Debug for Subroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subroutine")
            .field("name", &self.name)
            .field("params", &self.params.len())
            .field("retval", &self.retval.is_some())
            .field("defined", &self.body.get().is_some())
            .finish()
    }
}

/// A subroutine whose body is being built.
///
/// Names resolve here before the global namespace while it is open.
pub(crate) struct PendingSubroutine {
    pub(crate) subroutine: Rc<Subroutine>,
    pub(crate) locals: FxHashMap<String, VarRef>,
}

impl PendingSubroutine {
    /// Fails with the offending name if a parameter repeats or clashes with
    /// the return variable.
    pub(crate) fn new(name: &str, params: &[&str], retval: Option<&str>) -> Result<Self, String> {
        let storage = Rc::new(VarStorage::local());
        let mut locals = FxHashMap::default();

        let mut param_vars = Vec::with_capacity(params.len());
        for param in params {
            let var = Variable::allocate(param, VarKind::Param, &storage);
            if locals.insert((*param).to_string(), Rc::clone(&var)).is_some() {
                return Err((*param).to_string());
            }
            param_vars.push(var);
        }

        let retval = match retval {
            Some(ret) => {
                let var = Variable::allocate(ret, VarKind::Retval, &storage);
                if locals.insert(ret.to_string(), Rc::clone(&var)).is_some() {
                    return Err(ret.to_string());
                }
                Some(var)
            }
            None => None,
        };

        Ok(PendingSubroutine {
            subroutine: Rc::new(Subroutine {
                name: name.to_string(),
                storage,
                params: param_vars,
                retval,
                body: OnceCell::new(),
            }),
            locals,
        })
    }

    /// New local variable in the subroutine's own storage.
    pub(crate) fn allocate_local(&mut self, name: &str) -> VarRef {
        let var = Variable::allocate(name, VarKind::Var, &self.subroutine.storage);
        self.locals.insert(name.to_string(), Rc::clone(&var));
        var
    }

    /// Attach the body and hand out the finished subroutine.
    ///
    /// Hands the body back if one was already attached.
    pub(crate) fn finish(self, body: Node) -> Result<Rc<Subroutine>, Node> {
        self.subroutine.body.set(body)?;
        Ok(self.subroutine)
    }
}
