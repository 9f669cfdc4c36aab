use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    ambassador::{attribute_values::AttributeValues, error::RtiError},
    class_lookup::class_lookup::ClassLookup,
    link::rti_link::RtiLink,
    object::{
        error::ObjectError,
        public_object::SharedObject,
        remote::{object_shell::ObjectShell, proxy_list::ProxyList, shell_list::ShellList},
    },
    types::{AttributeHandle, ClassHandle, ObjectHandle},
};

/// Every remote instance this federate has discovered
///
/// Instances of a class nobody has asked to mirror are kept as shells. The first request
/// for a class's [`ProxyList`] turns its shells into proxies.
#[derive(Default)]
pub struct RemoteBase {
    proxy_lists: HashMap<ClassHandle, ProxyList>,
    proxy_classes: HashMap<ObjectHandle, ClassHandle>,
    shell_lists: HashMap<ClassHandle, ShellList>,
    shell_classes: HashMap<ObjectHandle, ClassHandle>,
}

impl RemoteBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn discover(
        &mut self,
        object: ObjectHandle,
        class: ClassHandle,
    ) -> Result<(), ObjectError> {
        if self.has_instance(object) {
            warn!("Ignoring repeated discovery of {object}");
            return Ok(());
        }

        if let Some(list) = self.proxy_lists.get_mut(&class) {
            list.add_instance(object, None)?;
            self.proxy_classes.insert(object, class);
        } else {
            self.shell_lists
                .entry(class)
                .or_insert_with(|| ShellList::new(class))
                .add(ObjectShell::new(object, class));
            self.shell_classes.insert(object, class);
        }
        debug!("Discovered {object} of {class}");
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        object: ObjectHandle,
        values: &AttributeValues,
    ) -> Result<(), ObjectError> {
        if let Some(class) = self.proxy_classes.get(&object) {
            let list = self
                .proxy_lists
                .get_mut(class)
                .ok_or(ObjectError::ObjectNotFound { object })?;
            list.update(object, values)?;
            return Ok(());
        }
        if let Some(class) = self.shell_classes.get(&object) {
            let updated = self
                .shell_lists
                .get_mut(class)
                .is_some_and(|shells| shells.update(object, values));
            if updated {
                return Ok(());
            }
        }
        Err(ObjectError::ObjectNotFound { object })
    }

    /// Forget the instance; returns false if it was never discovered
    pub(crate) fn delete(&mut self, object: ObjectHandle) -> bool {
        if let Some(class) = self.proxy_classes.remove(&object) {
            return self
                .proxy_lists
                .get_mut(&class)
                .and_then(|list| list.remove_object(object))
                .is_some();
        }
        if let Some(class) = self.shell_classes.remove(&object) {
            return self
                .shell_lists
                .get_mut(&class)
                .and_then(|shells| shells.remove(object))
                .is_some();
        }
        false
    }

    /// The class's proxy list, created on first request from any waiting shells
    pub(crate) fn proxy_list(
        &mut self,
        class: ClassHandle,
        classes: &ClassLookup,
    ) -> Result<&mut ProxyList, ObjectError> {
        if !self.proxy_lists.contains_key(&class) {
            let mut list = ProxyList::new(class, classes)?;
            if let Some(shells) = self.shell_lists.remove(&class) {
                for shell in shells.drain() {
                    let object = shell.object();
                    self.shell_classes.remove(&object);
                    // a shell that cannot be replayed is dropped alone
                    match list.add_instance(object, Some(shell)) {
                        Ok(()) => {
                            self.proxy_classes.insert(object, class);
                        }
                        Err(error) => warn!("Dropped shell {object}: {error}"),
                    }
                }
            }
            debug!("Mirroring class {}", list.class_name());
            self.proxy_lists.insert(class, list);
        }

        self.proxy_lists
            .get_mut(&class)
            .ok_or_else(|| ObjectError::NoProxyFactory {
                class: class.to_string(),
            })
    }

    pub fn has_instance(&self, object: ObjectHandle) -> bool {
        self.has_proxy(object) || self.has_shell(object)
    }

    pub fn has_proxy(&self, object: ObjectHandle) -> bool {
        self.proxy_classes.contains_key(&object)
    }

    pub fn has_shell(&self, object: ObjectHandle) -> bool {
        self.shell_classes.contains_key(&object)
    }

    pub fn class_of(&self, object: ObjectHandle) -> Option<ClassHandle> {
        self.proxy_classes
            .get(&object)
            .or_else(|| self.shell_classes.get(&object))
            .copied()
    }

    /// The proxy of a mirrored instance, complete or not
    pub fn proxy(&self, object: ObjectHandle) -> Option<SharedObject> {
        let class = self.proxy_classes.get(&object)?;
        self.proxy_lists.get(class)?.get(object)
    }

    /// Start-of-tick reset: divest what was won last tick, then chase incomplete proxies
    pub(crate) fn reset_all(&mut self, link: &mut RtiLink) {
        for list in self.proxy_lists.values() {
            for (object, attributes) in list.reset_ownership() {
                divest_quietly(link, object, &attributes);
            }
            list.refresh_incomplete(link);
        }
    }
}

/// Hand attributes back to the federation, tolerating ones already gone
pub(crate) fn divest_quietly(
    link: &mut RtiLink,
    object: ObjectHandle,
    attributes: &[AttributeHandle],
) {
    if attributes.is_empty() {
        return;
    }
    match link
        .ambassador()
        .unconditional_attribute_ownership_divestiture(object, attributes)
    {
        Ok(()) => {}
        Err(RtiError::AttributeNotOwned { .. }) => {
            debug!("Attributes of {object} were already divested");
        }
        Err(error) => warn!("Could not divest attributes of {object}: {error}"),
    }
}
