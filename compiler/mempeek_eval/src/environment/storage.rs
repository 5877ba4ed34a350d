//! Variable storage and frames.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use mempeek_ir::Word;
use tracing::trace;

/// Slots of one namespace, with one frame per active activation.
///
/// The global storage always has exactly one frame. A subroutine's storage
/// has one frame per call in progress; variables address the top frame.
pub(crate) struct VarStorage {
    frames: RefCell<Vec<Vec<Word>>>,
    slots: Cell<usize>,
}

impl VarStorage {
    pub(crate) fn global() -> Self {
        VarStorage {
            frames: RefCell::new(vec![Vec::new()]),
            slots: Cell::new(0),
        }
    }

    pub(crate) fn local() -> Self {
        VarStorage {
            frames: RefCell::new(Vec::new()),
            slots: Cell::new(0),
        }
    }

    fn allocate(&self) -> usize {
        let slot = self.slots.get();
        self.slots.set(slot + 1);
        slot
    }

    pub(crate) fn push_frame(&self) {
        let mut frames = self.frames.borrow_mut();
        frames.push(vec![0; self.slots.get()]);
        trace!(depth = frames.len(), "frame pushed");
    }

    pub(crate) fn pop_frame(&self) {
        let mut frames = self.frames.borrow_mut();
        frames.pop();
        trace!(depth = frames.len(), "frame popped");
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    fn get(&self, slot: usize) -> Word {
        self.frames
            .borrow()
            .last()
            .and_then(|frame| frame.get(slot))
            .copied()
            .unwrap_or(0)
    }

    fn set(&self, slot: usize, value: Word) {
        let mut frames = self.frames.borrow_mut();
        if let Some(frame) = frames.last_mut() {
            if frame.len() <= slot {
                frame.resize(slot + 1, 0);
            }
            frame[slot] = value;
        }
    }
}

/// Kind of a named binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// Plain assignable variable.
    Var,
    /// Initialized once, then assignable.
    Static,
    /// Constant fixed when the script is loaded.
    Def,
    /// Subroutine parameter.
    Param,
    /// Subroutine return variable.
    Retval,
}

/// A named binding.
///
/// The value lives in a slot of a [`VarStorage`]; variables of a subroutine
/// see a fresh slot in every call.
pub struct Variable {
    name: String,
    kind: VarKind,
    storage: Rc<VarStorage>,
    slot: usize,
}

/// Shared handle to a variable, held by nodes and namespaces.
pub type VarRef = Rc<Variable>;

impl Variable {
    pub(crate) fn allocate(name: &str, kind: VarKind, storage: &Rc<VarStorage>) -> VarRef {
        Rc::new(Variable {
            name: name.to_string(),
            kind,
            storage: Rc::clone(storage),
            slot: storage.allocate(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    #[inline]
    pub fn is_def(&self) -> bool {
        self.kind == VarKind::Def
    }

    /// Current value (0 outside any activation of its storage).
    #[inline]
    pub fn get(&self) -> Word {
        self.storage.get(self.slot)
    }

    #[inline]
    pub fn set(&self, value: Word) {
        self.storage.set(self.slot, value);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("slot", &self.slot)
            .finish()
    }
}

/// RAII guard for one activation of a subroutine's storage.
///
/// The frame is popped when the guard is dropped, on every exit path.
pub(crate) struct FrameGuard {
    storage: Rc<VarStorage>,
}

impl FrameGuard {
    pub(crate) fn push(storage: &Rc<VarStorage>) -> Self {
        storage.push_frame();
        FrameGuard {
            storage: Rc::clone(storage),
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        self.storage.pop_frame();
    }
}
