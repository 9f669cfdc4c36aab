use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use crate::{
    ambassador::attribute_values::AttributeValues,
    class_lookup::{class_lookup::ClassLookup, object_class::ProxyFactory},
    link::rti_link::RtiLink,
    object::{
        error::ObjectError,
        ownership::{OwnershipState, VariableKind},
        public_object::{
            borrow_object, borrow_object_mut, reflect_variable, reset_variables, PublicObject,
            SharedObject,
        },
        public_variable::VariableBinding,
        remote::object_shell::ObjectShell,
    },
    types::{AttributeHandle, ClassHandle, ObjectHandle},
};

/// Observer of proxies entering and leaving a [`ProxyList`]
///
/// `instance_added` fires when a proxy becomes complete, not when it is discovered.
pub trait InstanceListener {
    fn instance_added(&mut self, object: ObjectHandle, proxy: &SharedObject);

    fn instance_removed(&mut self, object: ObjectHandle, proxy: &SharedObject);
}

/// Proxies of every remote instance of one class
///
/// A proxy stays hidden until each of its non-dummy variables has received a value.
pub struct ProxyList {
    class: ClassHandle,
    class_name: String,
    factory: ProxyFactory,
    variables: Vec<(String, AttributeHandle)>,
    names: HashMap<AttributeHandle, String>,
    proxies: HashMap<ObjectHandle, SharedObject>,
    visible: Vec<ObjectHandle>,
    incomplete: BTreeSet<ObjectHandle>,
    listeners: Vec<Box<dyn InstanceListener>>,
}

impl ProxyList {
    pub(crate) fn new(class: ClassHandle, classes: &ClassLookup) -> Result<Self, ObjectError> {
        let class_name = classes.class_name_for(class)?.to_string();
        let factory = classes
            .object_class(&class_name)?
            .factory()
            .ok_or_else(|| ObjectError::NoProxyFactory {
                class: class_name.clone(),
            })?;

        let mut variables = Vec::new();
        let mut names = HashMap::new();
        for variable in classes.variable_names(&class_name)? {
            let attribute = classes.attribute_handle(class, variable)?;
            variables.push((variable.clone(), attribute));
            names.insert(attribute, variable.clone());
        }

        Ok(Self {
            class,
            class_name,
            factory,
            variables,
            names,
            proxies: HashMap::new(),
            visible: Vec::new(),
            incomplete: BTreeSet::new(),
            listeners: Vec::new(),
        })
    }

    pub fn class(&self) -> ClassHandle {
        self.class
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Complete proxies, in the order they became complete
    pub fn proxies(&self) -> Vec<SharedObject> {
        self.visible
            .iter()
            .filter_map(|object| self.proxies.get(object).cloned())
            .collect()
    }

    /// Any proxy of the instance, complete or not
    pub fn get(&self, object: ObjectHandle) -> Option<SharedObject> {
        self.proxies.get(&object).cloned()
    }

    pub fn contains(&self, object: ObjectHandle) -> bool {
        self.proxies.contains_key(&object)
    }

    pub fn is_visible(&self, object: ObjectHandle) -> bool {
        self.proxies.contains_key(&object) && !self.incomplete.contains(&object)
    }

    /// Number of complete proxies
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn incomplete_len(&self) -> usize {
        self.incomplete.len()
    }

    pub fn add_listener(&mut self, listener: Box<dyn InstanceListener>) {
        self.listeners.push(listener);
    }

    /// Build a proxy for a discovered instance, replaying the shell's updates if any
    pub(crate) fn add_instance(
        &mut self,
        object: ObjectHandle,
        shell: Option<ObjectShell>,
    ) -> Result<(), ObjectError> {
        let proxy = (self.factory)();
        {
            let mut inner = borrow_object_mut(&proxy, "build a proxy")?;
            for (name, attribute) in &self.variables {
                let variable =
                    inner
                        .variable_mut(name)
                        .ok_or_else(|| ObjectError::MissingVariable {
                            class: self.class_name.clone(),
                            variable: name.clone(),
                        })?;
                let kind = variable.kind();
                let state = variable.state_mut();
                state.bind(VariableBinding {
                    object,
                    attribute: *attribute,
                });
                match kind {
                    VariableKind::Exclusive | VariableKind::Cumulative => {
                        state.set_ownership(OwnershipState::Ambiguous);
                        state.clear_value();
                    }
                    VariableKind::Viewable => {
                        state.set_ownership(OwnershipState::NotOwned);
                        state.clear_value();
                    }
                    VariableKind::Dummy => state.set_ownership(OwnershipState::Owned),
                }
            }

            if let Some(shell) = &shell {
                for values in shell.updates() {
                    self.apply(&mut *inner, values)?;
                }
            }
        }

        self.proxies.insert(object, proxy);
        self.incomplete.insert(object);
        self.promote_if_complete(object)?;
        Ok(())
    }

    /// Apply a reflection; returns true if it completed the proxy
    pub(crate) fn update(
        &mut self,
        object: ObjectHandle,
        values: &AttributeValues,
    ) -> Result<bool, ObjectError> {
        let proxy = self
            .proxies
            .get(&object)
            .cloned()
            .ok_or(ObjectError::ObjectNotFound { object })?;
        {
            let mut inner = borrow_object_mut(&proxy, "reflect into a proxy")?;
            self.apply(&mut *inner, values)?;
        }
        self.promote_if_complete(object)
    }

    pub(crate) fn remove_object(&mut self, object: ObjectHandle) -> Option<SharedObject> {
        let proxy = self.proxies.remove(&object)?;
        if !self.incomplete.remove(&object) {
            self.visible.retain(|handle| *handle != object);
            for listener in self.listeners.iter_mut() {
                listener.instance_removed(object, &proxy);
            }
        }
        Some(proxy)
    }

    /// Whether every non-dummy variable of the proxy has a value
    pub fn is_complete(&self, object: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(self.missing_attributes(object)?.is_empty())
    }

    /// Ask the owners of every incomplete proxy to resend what is missing
    pub(crate) fn refresh_incomplete(&self, link: &mut RtiLink) {
        for object in &self.incomplete {
            let missing = match self.missing_attributes(*object) {
                Ok(missing) => missing,
                Err(error) => {
                    warn!("Could not inspect proxy {object}: {error}");
                    continue;
                }
            };
            if missing.is_empty() {
                continue;
            }
            debug!("Requesting {} missing attributes of {object}", missing.len());
            if let Err(error) = link
                .ambassador()
                .request_object_attribute_value_update(*object, &missing)
            {
                warn!("Could not request a refresh of {object}: {error}");
            }
        }
    }

    /// Return every proxy to its per-tick ownership, listing what each owned
    pub(crate) fn reset_ownership(&self) -> Vec<(ObjectHandle, Vec<AttributeHandle>)> {
        let mut owned = Vec::new();
        for (object, proxy) in &self.proxies {
            match proxy.try_borrow_mut() {
                Ok(mut inner) => {
                    let divest = reset_variables(&mut *inner, false);
                    if !divest.is_empty() {
                        owned.push((*object, divest));
                    }
                }
                Err(_) => warn!("Skipped ownership reset of {object}: proxy is borrowed"),
            }
        }
        owned
    }

    fn apply(
        &self,
        proxy: &mut dyn PublicObject,
        values: &AttributeValues,
    ) -> Result<(), ObjectError> {
        for (attribute, bytes) in values.iter() {
            match self.names.get(&attribute) {
                Some(name) => reflect_variable(proxy, name, bytes)?,
                None => debug!("Ignoring unknown attribute {attribute} of {}", self.class_name),
            }
        }
        Ok(())
    }

    fn missing_attributes(
        &self,
        object: ObjectHandle,
    ) -> Result<Vec<AttributeHandle>, ObjectError> {
        let proxy = self
            .proxies
            .get(&object)
            .ok_or(ObjectError::ObjectNotFound { object })?;
        let inner = borrow_object(proxy, "inspect a proxy")?;
        Ok(self
            .variables
            .iter()
            .filter(|(name, _)| {
                inner.variable(name).is_some_and(|variable| {
                    variable.kind() != VariableKind::Dummy && !variable.state().has_value()
                })
            })
            .map(|(_, attribute)| *attribute)
            .collect())
    }

    fn promote_if_complete(&mut self, object: ObjectHandle) -> Result<bool, ObjectError> {
        if !self.incomplete.contains(&object) || !self.is_complete(object)? {
            return Ok(false);
        }
        self.incomplete.remove(&object);
        self.visible.push(object);
        if let Some(proxy) = self.proxies.get(&object) {
            for listener in self.listeners.iter_mut() {
                listener.instance_added(object, proxy);
            }
        }
        Ok(true)
    }
}
