use std::collections::HashMap;

use crate::{
    ambassador::attribute_values::AttributeValues,
    object::remote::object_shell::ObjectShell,
    types::{ClassHandle, ObjectHandle},
};

/// Shells of one class, kept in discovery order
pub struct ShellList {
    class: ClassHandle,
    shells: HashMap<ObjectHandle, ObjectShell>,
    order: Vec<ObjectHandle>,
}

impl ShellList {
    pub fn new(class: ClassHandle) -> Self {
        Self {
            class,
            shells: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn class(&self) -> ClassHandle {
        self.class
    }

    pub fn add(&mut self, shell: ObjectShell) {
        let object = shell.object();
        if self.shells.insert(object, shell).is_none() {
            self.order.push(object);
        }
    }

    /// Returns false if no shell has this handle
    pub fn update(&mut self, object: ObjectHandle, values: &AttributeValues) -> bool {
        match self.shells.get_mut(&object) {
            Some(shell) => {
                shell.update(values);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, object: ObjectHandle) -> Option<ObjectShell> {
        let shell = self.shells.remove(&object)?;
        self.order.retain(|handle| *handle != object);
        Some(shell)
    }

    pub fn get(&self, object: ObjectHandle) -> Option<&ObjectShell> {
        self.shells.get(&object)
    }

    pub fn contains(&self, object: ObjectHandle) -> bool {
        self.shells.contains_key(&object)
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// Every shell, oldest discovery first
    pub fn drain(mut self) -> Vec<ObjectShell> {
        let mut shells = Vec::with_capacity(self.order.len());
        for object in self.order.drain(..) {
            if let Some(shell) = self.shells.remove(&object) {
                shells.push(shell);
            }
        }
        shells
    }
}
