//! Variable, subroutine and mapping state shared by all nodes.
//!
//! Names live in two namespaces:
//! - the global namespace, backed by one storage frame for the whole run
//! - while a subroutine body is being built, its local namespace, backed by
//!   the subroutine's own storage (one frame per call)
//!
//! Lookups try the local namespace first. Constants (`def`) and statics are
//! always stored globally; statics declared in a subroutine are still only
//! visible by name inside it.
//!
//! The environment is used through `&Environment`; all mutable state sits
//! behind `RefCell`s because construction and execution are single-threaded.
//! Only the [`StopFlag`] is shared with other threads.

mod builder;
mod storage;
mod subroutine;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use mempeek_ir::{AccessSize, Location, Word};
use mempeek_mmap::{MapError, MappingTable, RegisterWindow};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

pub use builder::EnvironmentBuilder;
pub use storage::{VarKind, VarRef, Variable};
pub use subroutine::Subroutine;

use crate::errors::{naming_conflict, CompileError, CompileErrorKind};
use crate::node::Node;
use crate::{SharedPrintHandler, StopFlag};
use storage::VarStorage;
use subroutine::PendingSubroutine;

/// Token for a subroutine definition in progress.
///
/// Returned by [`Environment::begin_subroutine`] and consumed by
/// [`Environment::end_subroutine`] or [`Environment::abort_subroutine`].
#[must_use = "a subroutine definition must be ended or aborted"]
#[derive(Debug)]
pub struct SubroutineDefinition {
    name: String,
}

impl SubroutineDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Evaluation environment of one script run.
pub struct Environment {
    globals: RefCell<FxHashMap<String, VarRef>>,
    global_storage: Rc<VarStorage>,
    /// Struct members registered by dotted `def` names, in definition order.
    members: RefCell<FxHashMap<String, Vec<String>>>,
    subroutines: RefCell<FxHashMap<String, Rc<Subroutine>>>,
    pending: RefCell<Option<PendingSubroutine>>,
    mappings: RefCell<MappingTable>,
    default_size: AccessSize,
    print_handler: SharedPrintHandler,
    stop: StopFlag,
}

impl Environment {
    /// Environment with default settings (see [`EnvironmentBuilder`]).
    pub fn new() -> Self {
        EnvironmentBuilder::new().build()
    }

    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::new()
    }

    /// Word size used by `print` formats without an explicit size.
    #[inline]
    pub fn default_size(&self) -> AccessSize {
        self.default_size
    }

    #[inline]
    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    #[inline]
    pub fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.stop.is_requested()
    }

    // Variables

    /// Resolve `name`, local namespace first.
    pub fn lookup(&self, name: &str) -> Option<VarRef> {
        if let Some(pending) = self.pending.borrow().as_ref() {
            if let Some(var) = pending.locals.get(name) {
                return Some(Rc::clone(var));
            }
        }
        self.globals.borrow().get(name).cloned()
    }

    /// Variable for an assignment to `name`.
    ///
    /// Reuses an existing binding unless it is a constant (`None`, a naming
    /// conflict). Otherwise creates a local inside a subroutine body and a
    /// global elsewhere.
    pub fn alloc_var(&self, name: &str) -> Option<VarRef> {
        if let Some(var) = self.lookup(name) {
            return (!var.is_def()).then_some(var);
        }

        let var = match self.pending.borrow_mut().as_mut() {
            Some(pending) => pending.allocate_local(name),
            None => {
                let var = Variable::allocate(name, VarKind::Var, &self.global_storage);
                self.globals
                    .borrow_mut()
                    .insert(name.to_string(), Rc::clone(&var));
                var
            }
        };
        trace!(name, "variable allocated");
        Some(var)
    }

    /// Static variable `name` in the current namespace.
    ///
    /// `None` if the namespace already binds `name`.
    pub fn alloc_static(&self, name: &str) -> Option<VarRef> {
        let mut pending = self.pending.borrow_mut();
        let exists = match pending.as_ref() {
            Some(pending) => pending.locals.contains_key(name),
            None => self.globals.borrow().contains_key(name),
        };
        if exists {
            return None;
        }

        let var = Variable::allocate(name, VarKind::Static, &self.global_storage);
        match pending.as_mut() {
            Some(pending) => pending.locals.insert(name.to_string(), Rc::clone(&var)),
            None => self
                .globals
                .borrow_mut()
                .insert(name.to_string(), Rc::clone(&var)),
        };
        trace!(name, "static allocated");
        Some(var)
    }

    /// Global constant `name`; `None` if the name is already bound.
    ///
    /// A dotted name `base.member` also registers `member` as a struct
    /// member of `base`.
    pub fn alloc_def(&self, name: &str) -> Option<VarRef> {
        if self.lookup(name).is_some() {
            return None;
        }

        let var = Variable::allocate(name, VarKind::Def, &self.global_storage);
        self.globals
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&var));
        if let Some((base, member)) = name.split_once('.') {
            self.members
                .borrow_mut()
                .entry(base.to_string())
                .or_default()
                .push(member.to_string());
        }
        trace!(name, "constant allocated");
        Some(var)
    }

    /// Members registered under `name`, in definition order.
    pub fn members_of(&self, name: &str) -> Vec<String> {
        self.members
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    // Mappings

    /// Register a mapping of `[phys, phys + len)` from `device`.
    pub fn map_memory(&self, phys: Word, len: Word, device: &str) -> Result<(), MapError> {
        self.mappings.borrow_mut().map_memory(phys, len, device)
    }

    /// Mapping that covers a `size` access at `address`.
    pub fn find_mapping(&self, address: Word, size: AccessSize) -> Option<Arc<dyn RegisterWindow>> {
        self.mappings.borrow().find(address, size)
    }

    // Subroutines

    /// Open the definition of subroutine `name`.
    ///
    /// Until the definition is ended, names resolve in the subroutine's
    /// local namespace and calls to `name` refer to the new definition.
    pub fn begin_subroutine(
        &self,
        location: &Location,
        name: &str,
        params: &[&str],
        retval: Option<&str>,
    ) -> Result<SubroutineDefinition, CompileError> {
        let mut pending = self.pending.borrow_mut();
        if pending.is_some() {
            return Err(CompileError::new(
                CompileErrorKind::NestedSubroutine {
                    name: name.to_string(),
                },
                location.clone(),
            ));
        }

        let definition = PendingSubroutine::new(name, params, retval)
            .map_err(|duplicate| naming_conflict(&duplicate, location))?;
        debug!(name, params = params.len(), "subroutine definition started");
        *pending = Some(definition);
        Ok(SubroutineDefinition {
            name: name.to_string(),
        })
    }

    /// Close a definition and register it, releasing any previous
    /// subroutine of the same name.
    ///
    /// Returns `None` if the definition was already aborted or already
    /// has a body.
    pub fn end_subroutine(
        &self,
        definition: SubroutineDefinition,
        body: Node,
    ) -> Option<Rc<Subroutine>> {
        let pending = self.pending.borrow_mut().take()?;
        let subroutine = pending.finish(body).ok()?;
        let previous = self
            .subroutines
            .borrow_mut()
            .insert(definition.name.clone(), Rc::clone(&subroutine));
        if previous.is_some() {
            debug!(name = %definition.name, "subroutine redefined, previous body released");
        } else {
            debug!(name = %definition.name, "subroutine defined");
        }
        Some(subroutine)
    }

    /// Discard a definition, e.g. after its body failed to build.
    pub fn abort_subroutine(&self, definition: SubroutineDefinition) {
        self.pending.borrow_mut().take();
        debug!(name = %definition.name, "subroutine definition aborted");
    }

    /// Release subroutine `name`. Returns whether it existed.
    pub fn drop_subroutine(&self, name: &str) -> bool {
        let dropped = self.subroutines.borrow_mut().remove(name).is_some();
        if dropped {
            debug!(name, "subroutine dropped");
        }
        dropped
    }

    /// Subroutine `name`, including one whose definition is still open.
    pub fn lookup_subroutine(&self, name: &str) -> Option<Rc<Subroutine>> {
        if let Some(pending) = self.pending.borrow().as_ref() {
            if pending.subroutine.name() == name {
                return Some(Rc::clone(&pending.subroutine));
            }
        }
        self.subroutines.borrow().get(name).cloned()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
