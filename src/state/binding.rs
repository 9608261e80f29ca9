//! Two-way bound values shared between the host UI and the timeline.
//!
//! A `Binding` is a cheap cloneable handle to one value. Every write bumps a
//! version counter, so either side can poll for changes once per frame instead
//! of subscribing. Handles are `!Send`: the timeline runs on one owner thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Slot<T> {
    value: RefCell<T>,
    version: Cell<u64>,
}

pub struct Binding<T> {
    slot: Rc<Slot<T>>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Default> Default for Binding<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.slot.value.borrow())
            .field("version", &self.slot.version.get())
            .finish()
    }
}

impl<T> Binding<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(Slot {
                value: RefCell::new(value),
                version: Cell::new(0),
            }),
        }
    }

    /// Counter bumped on every write.
    pub fn version(&self) -> u64 {
        self.slot.version.get()
    }

    pub fn set(&self, value: T) {
        *self.slot.value.borrow_mut() = value;
        self.bump();
    }

    /// Mutate in place; counts as one write.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.slot.value.borrow_mut());
        self.bump();
        result
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.value.borrow())
    }

    fn bump(&self) {
        self.slot.version.set(self.slot.version.get().wrapping_add(1));
    }
}

impl<T: Clone> Binding<T> {
    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.slot.value.borrow().clone()
    }
}

impl<T: PartialEq> Binding<T> {
    /// Write only when the value differs, so observers don't see a spurious
    /// version bump. Returns whether a write happened.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.slot.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let host = Binding::new(1);
        let core = host.clone();
        core.set(5);
        assert_eq!(host.get(), 5);
        assert_eq!(host.version(), 1);
    }

    #[test]
    fn test_update_bumps_version() {
        let binding = Binding::new(vec![1, 2]);
        let len = binding.update(|values| {
            values.push(3);
            values.len()
        });
        assert_eq!(len, 3);
        assert_eq!(binding.version(), 1);
    }

    #[test]
    fn test_set_if_changed_skips_equal_values() {
        let binding = Binding::new(Some(3));
        assert!(!binding.set_if_changed(Some(3)));
        assert_eq!(binding.version(), 0);
        assert!(binding.set_if_changed(None));
        assert_eq!(binding.version(), 1);
    }
}
