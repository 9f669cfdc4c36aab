use std::collections::HashMap;

use log::{info, warn};

use crate::{
    ambassador::{attribute_values::AttributeValues, error::RtiError},
    class_lookup::class_lookup::ClassLookup,
    link::rti_link::RtiLink,
    object::{
        error::ObjectError,
        local::reference_table::ReferenceTable,
        ownership::OwnershipState,
        public_object::{
            borrow_object, borrow_object_mut, reflect_variable, reset_variables, SharedObject,
        },
        public_variable::VariableBinding,
        remote::remote_base::divest_quietly,
    },
    types::{ClassHandle, ObjectHandle},
};

/// The objects this federate registered
pub struct LocalBase {
    references: ReferenceTable,
    classes: HashMap<ObjectHandle, ClassHandle>,
}

impl LocalBase {
    pub fn new() -> Self {
        Self {
            references: ReferenceTable::new(),
            classes: HashMap::new(),
        }
    }

    /// Register the object, publish a full snapshot of it, then release its negotiated variables
    pub(crate) fn register_object(
        &mut self,
        link: &mut RtiLink,
        classes: &ClassLookup,
        object: &SharedObject,
    ) -> Result<ObjectHandle, ObjectError> {
        let (class_name, variables) = {
            let inner = borrow_object(object, "register an object")?;
            let class_name = inner.class_name();
            if !classes.has_class(class_name) {
                return Err(ObjectError::BadClass {
                    class: class_name.to_string(),
                });
            }
            if let Some(handle) = inner.handle() {
                return Err(ObjectError::AlreadyRegistered {
                    class: class_name.to_string(),
                    object: handle,
                });
            }
            let variables = classes.variable_names(class_name)?.to_vec();
            if let Some(missing) = variables.iter().find(|name| inner.variable(name).is_none()) {
                return Err(ObjectError::MissingVariable {
                    class: class_name.to_string(),
                    variable: missing.clone(),
                });
            }
            (class_name, variables)
        };
        let class = classes.class_handle(class_name)?;

        let handle = link
            .ambassador()
            .register_object_instance(class)
            .map_err(|source| ObjectError::rti("register an object instance", source))?;

        let mut snapshot = AttributeValues::with_capacity(variables.len());
        {
            let mut inner = borrow_object_mut(object, "register an object")?;
            for name in &variables {
                let attribute = classes.attribute_handle(class, name)?;
                let Some(variable) = inner.variable_mut(name) else {
                    continue;
                };
                let state = variable.state_mut();
                state.bind(VariableBinding {
                    object: handle,
                    attribute,
                });
                // registration hands every attribute to the registrar
                state.set_ownership(OwnershipState::Owned);
                state.mark_value();
                let bytes = variable.encode().map_err(|source| ObjectError::Codec {
                    variable: name.clone(),
                    source,
                })?;
                snapshot.push(attribute, bytes);
            }
        }

        self.references.register(handle, object);
        self.classes.insert(handle, class);

        let time = link.granted_time()?;
        link.ambassador()
            .update_attribute_values(handle, &snapshot, time)
            .map_err(|source| ObjectError::rti("send a registration snapshot", source))?;

        self.reset_object(link, handle, object);
        info!("Registered {class_name} as {handle}");
        Ok(handle)
    }

    pub fn contains(&self, object: ObjectHandle) -> bool {
        self.references.contains(object)
    }

    pub fn class_of(&self, object: ObjectHandle) -> Option<ClassHandle> {
        self.classes.get(&object).copied()
    }

    /// The object, if still registered and alive
    pub fn get_object(&self, object: ObjectHandle) -> Option<SharedObject> {
        self.references.get(object)
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    /// Apply another federate's write to the variables this federate does not hold
    pub(crate) fn update_instance(
        &mut self,
        classes: &ClassLookup,
        object: ObjectHandle,
        values: &AttributeValues,
    ) -> Result<(), ObjectError> {
        let class = self
            .class_of(object)
            .ok_or(ObjectError::ObjectNotFound { object })?;
        let shared = self
            .get_object(object)
            .ok_or(ObjectError::ObjectDeleted { object })?;
        let mut inner = borrow_object_mut(&shared, "reflect into a local object")?;

        for (attribute, bytes) in values.iter() {
            let name = classes.attribute_name(class, attribute)?;
            let owned = inner
                .variable(name)
                .is_some_and(|variable| variable.state().ownership() == OwnershipState::Owned);
            if owned {
                warn!("Ignoring reflection of {name} of {object}: it is owned here");
                continue;
            }
            reflect_variable(&mut *inner, name, bytes)?;
        }
        Ok(())
    }

    /// Delete the instance from the federation and forget it
    pub(crate) fn delete_object(
        &mut self,
        link: &mut RtiLink,
        object: ObjectHandle,
    ) -> Result<(), ObjectError> {
        if !self.references.unregister(object) {
            return Err(ObjectError::ObjectNotFound { object });
        }
        self.classes.remove(&object);

        let time = link.granted_time()?;
        match link.ambassador().delete_object_instance(object, time) {
            Ok(()) => {
                info!("Deleted {object}");
                Ok(())
            }
            Err(RtiError::ObjectNotKnown { .. }) => Err(ObjectError::ObjectDeleted { object }),
            Err(source) => Err(ObjectError::rti("delete an object instance", source)),
        }
    }

    /// Delete every object model code has dropped, returning their handles
    pub(crate) fn clean_references(&mut self, link: &mut RtiLink) -> Vec<ObjectHandle> {
        let dead = self.references.drain_dead();
        if dead.is_empty() {
            return dead;
        }

        let time = match link.granted_time() {
            Ok(time) => time,
            Err(error) => {
                warn!("Could not read the granted time to delete dropped objects: {error}");
                return dead;
            }
        };
        for object in &dead {
            self.classes.remove(object);
            match link.ambassador().delete_object_instance(*object, time) {
                Ok(()) => info!("Deleted dropped object {object}"),
                Err(error) => warn!("Could not delete dropped object {object}: {error}"),
            }
        }
        dead
    }

    pub(crate) fn reset_all(&mut self, link: &mut RtiLink) {
        for object in self.references.handles() {
            if let Some(shared) = self.references.get(object) {
                self.reset_object(link, object, &shared);
            }
        }
    }

    pub(crate) fn reset_object(
        &self,
        link: &mut RtiLink,
        object: ObjectHandle,
        shared: &SharedObject,
    ) {
        let divest = match shared.try_borrow_mut() {
            Ok(mut inner) => reset_variables(&mut *inner, true),
            Err(_) => {
                warn!("Skipped ownership reset of {object}: object is borrowed");
                return;
            }
        };
        divest_quietly(link, object, &divest);
    }
}

impl Default for LocalBase {
    fn default() -> Self {
        Self::new()
    }
}
