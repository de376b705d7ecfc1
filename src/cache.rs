//! Compute-once cells for derived values.
//!
//! Each cell is either `Fresh` (value computed and frozen) or `Dirty` (must be
//! recomputed on next read). Reads go through `OnceCell::get_or_init`, so
//! concurrent first access from several readers computes the value once.
//! Only `&mut` owners can move a cell back to `Dirty`.

use once_cell::sync::OnceCell;

/// Observable state of a derived cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Fresh,
    Dirty,
}

#[derive(Debug, Clone)]
pub(crate) struct Memo<T> {
    cell: OnceCell<T>,
}

impl<T> Memo<T> {
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(compute)
    }

    /// Mutable access to a fresh value, for in-place patching.
    pub(crate) fn fresh_mut(&mut self) -> Option<&mut T> {
        self.cell.get_mut()
    }

    pub(crate) fn invalidate(&mut self) {
        self.cell.take();
    }

    pub(crate) fn state(&self) -> CacheState {
        if self.cell.get().is_some() {
            CacheState::Fresh
        } else {
            CacheState::Dirty
        }
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
