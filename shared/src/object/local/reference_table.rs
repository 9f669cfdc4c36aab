use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use crate::{
    object::public_object::{PublicObject, SharedObject},
    types::ObjectHandle,
};

/// Weak references to the locally registered objects
///
/// Holding only weak references is what lets model code decide an object's lifetime: once
/// every strong handle is dropped, the entry is dead and the lazy-deletion sweep picks it up.
#[derive(Default)]
pub struct ReferenceTable {
    entries: HashMap<ObjectHandle, Weak<RefCell<dyn PublicObject>>>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, object: ObjectHandle, shared: &SharedObject) {
        self.entries.insert(object, Rc::downgrade(shared));
    }

    pub fn unregister(&mut self, object: ObjectHandle) -> bool {
        self.entries.remove(&object).is_some()
    }

    /// The object, if it is registered and still alive
    pub fn get(&self, object: ObjectHandle) -> Option<SharedObject> {
        self.entries.get(&object)?.upgrade()
    }

    pub fn contains(&self, object: ObjectHandle) -> bool {
        self.entries.contains_key(&object)
    }

    pub fn is_alive(&self, object: ObjectHandle) -> bool {
        self.entries
            .get(&object)
            .is_some_and(|entry| entry.strong_count() > 0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every registered handle, ascending
    pub fn handles(&self) -> Vec<ObjectHandle> {
        let mut handles: Vec<ObjectHandle> = self.entries.keys().copied().collect();
        handles.sort();
        handles
    }

    /// Remove and return the handles whose objects have been dropped, ascending
    pub fn drain_dead(&mut self) -> Vec<ObjectHandle> {
        let mut dead: Vec<ObjectHandle> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.strong_count() == 0)
            .map(|(object, _)| *object)
            .collect();
        dead.sort();
        for object in &dead {
            self.entries.remove(object);
        }
        dead
    }
}
