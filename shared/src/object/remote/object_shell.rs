use std::collections::BTreeSet;

use crate::{
    ambassador::attribute_values::AttributeValues,
    types::{AttributeHandle, ClassHandle, ObjectHandle},
};

/// A discovered instance whose class nobody has asked to mirror yet
///
/// Updates are kept in arrival order and replayed when the shell becomes a proxy, so
/// cumulative deltas survive the wait.
#[derive(Clone, Debug)]
pub struct ObjectShell {
    object: ObjectHandle,
    class: ClassHandle,
    updates: Vec<AttributeValues>,
}

impl ObjectShell {
    pub fn new(object: ObjectHandle, class: ClassHandle) -> Self {
        Self {
            object,
            class,
            updates: Vec::new(),
        }
    }

    pub fn object(&self) -> ObjectHandle {
        self.object
    }

    pub fn class(&self) -> ClassHandle {
        self.class
    }

    pub fn update(&mut self, values: &AttributeValues) {
        self.updates.push(values.clone());
    }

    pub fn updates(&self) -> &[AttributeValues] {
        &self.updates
    }

    /// Attributes that received at least one value
    pub fn attributes(&self) -> BTreeSet<AttributeHandle> {
        self.updates
            .iter()
            .flat_map(|values| values.handles())
            .collect()
    }

    /// Latest payload received for the attribute
    pub fn value(&self, attribute: AttributeHandle) -> Option<&[u8]> {
        self.updates
            .iter()
            .rev()
            .find_map(|values| values.get(attribute))
    }
}
