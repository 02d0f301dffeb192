//! Change observers for a tileset.
//!
//! Consumers that cache per-tile derived state (a renderer's glyph atlas,
//! say) attach an [`Observer`] to a tileset and get a synchronous callback
//! whenever a tile's pixels are rewritten, plus a one-shot callback when the
//! observer is detached or the tileset is torn down.
//!
//! The registry visits observers newest-first, so the most recently attached
//! observer sees a change before earlier ones. Callers should treat the
//! exact order as unspecified beyond that.

use crate::error::Error;

/// Callback invoked with `(tile_id, codepoint)` after a tile's pixels
/// change. Returning `Err` aborts the notification pass; the error becomes
/// the result of the `set_tile` call that triggered it.
pub type ChangeHook = Box<dyn FnMut(i32, i32) -> Result<(), Error>>;

/// Callback invoked exactly once when the observer is detached, whether
/// explicitly or during tileset teardown.
pub type DeleteHook = Box<dyn FnOnce()>;

/// A pair of optional hooks to attach to a tileset.
///
/// Built in the builder style:
///
/// ```ignore
/// let obs = Observer::new()
///     .on_changed(|tile_id, cp| { /* invalidate cache entry */ Ok(()) })
///     .on_delete(|| { /* drop cached state */ });
/// let id = tileset.attach_observer(obs);
/// ```
#[derive(Default)]
pub struct Observer {
    pub(crate) on_changed: Option<ChangeHook>,
    pub(crate) on_delete: Option<DeleteHook>,
}

impl Observer {
    /// An observer with no hooks set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the change hook (builder).
    pub fn on_changed<F>(mut self, hook: F) -> Self
    where
        F: FnMut(i32, i32) -> Result<(), Error> + 'static,
    {
        self.on_changed = Some(Box::new(hook));
        self
    }

    /// Set the delete hook (builder).
    pub fn on_delete<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_delete = Some(Box::new(hook));
        self
    }
}

/// Opaque handle to an attached observer, for later detaching.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) usize);

/// Slot-based observer registry owned by the tileset.
///
/// Detaching tombstones a slot instead of shifting, so [`ObserverId`]s stay
/// stable; slots are never reused.
#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Option<Observer>>,
}

impl Registry {
    pub(crate) fn attach(&mut self, observer: Observer) -> ObserverId {
        self.slots.push(Some(observer));
        ObserverId(self.slots.len() - 1)
    }

    /// Tombstone the slot and hand back its delete hook so the caller can
    /// run it without holding any tileset borrow. Unknown or already
    /// detached ids yield `None` (detach is a no-op then).
    pub(crate) fn detach(&mut self, id: ObserverId) -> Option<DeleteHook> {
        let observer = self.slots.get_mut(id.0)?.take()?;
        observer.on_delete
    }

    /// Invoke change hooks newest-first. The first `Err` stops the pass and
    /// is returned; earlier observers have already been notified and that
    /// is not rolled back.
    pub(crate) fn notify(&mut self, tile_id: i32, codepoint: i32) -> Result<(), Error> {
        for slot in self.slots.iter_mut().rev() {
            let Some(observer) = slot else { continue };
            if let Some(hook) = observer.on_changed.as_mut() {
                hook(tile_id, codepoint)?;
            }
        }
        Ok(())
    }

    /// Detach everything, returning the delete hooks newest-first. Used
    /// during tileset teardown.
    pub(crate) fn take_delete_hooks(&mut self) -> Vec<DeleteHook> {
        self.slots
            .drain(..)
            .rev()
            .filter_map(|slot| slot.and_then(|observer| observer.on_delete))
            .collect()
    }

    /// Fold slots attached while this registry was detached from its
    /// tileset back in (reentrancy escape hatch; ordering and id stability
    /// are not guaranteed for such slots).
    pub(crate) fn merge_from(&mut self, late: Registry) {
        self.slots.extend(late.slots);
    }
}
