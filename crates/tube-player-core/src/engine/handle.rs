//! Shared reference to the mounted engine

use super::{PlaybackControl, PlaybackEngine};
use crate::{Error, Result};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Shared reference to at most one live engine
///
/// The player populates the handle when it mounts and empties it when it
/// unmounts. Clones point at the same slot, so the context menu can issue
/// commands through the engine the adapter created without ever owning it.
#[derive(Clone, Default)]
pub struct PlaybackHandle {
    slot: Rc<RefCell<Option<Box<dyn PlaybackEngine>>>>,
    /// Mirrors `slot.is_some()`, readable while the slot is borrowed
    mounted: Rc<Cell<bool>>,
}

impl PlaybackHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self::default()
    }

    /// True between mount and unmount, also from inside a command closure
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// True if both handles refer to the same slot
    pub fn ptr_eq(&self, other: &PlaybackHandle) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    /// Issue commands against the mounted engine
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn PlaybackControl) -> R) -> Result<R> {
        let mut slot = self.slot.try_borrow_mut().map_err(|_| Error::HandleBusy)?;
        let engine = slot.as_mut().ok_or(Error::NotMounted)?;
        Ok(f(engine))
    }

    /// Read engine state without mutating it
    pub fn read<R>(&self, f: impl FnOnce(&dyn PlaybackControl) -> R) -> Result<R> {
        let slot = self.slot.try_borrow().map_err(|_| Error::HandleBusy)?;
        let engine = slot.as_ref().ok_or(Error::NotMounted)?;
        Ok(f(engine))
    }

    pub(crate) fn with_engine<R>(&self, f: impl FnOnce(&mut dyn PlaybackEngine) -> R) -> Result<R> {
        let mut slot = self.slot.try_borrow_mut().map_err(|_| Error::HandleBusy)?;
        let engine = slot.as_deref_mut().ok_or(Error::NotMounted)?;
        Ok(f(engine))
    }

    pub(crate) fn populate(&self, engine: Box<dyn PlaybackEngine>) -> Result<()> {
        let mut slot = self.slot.try_borrow_mut().map_err(|_| Error::HandleBusy)?;
        *slot = Some(engine);
        self.mounted.set(true);
        Ok(())
    }

    pub(crate) fn take(&self) -> Result<Option<Box<dyn PlaybackEngine>>> {
        let mut slot = self.slot.try_borrow_mut().map_err(|_| Error::HandleBusy)?;
        self.mounted.set(false);
        Ok(slot.take())
    }
}

impl fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
