use std::any::type_name;

use log::{debug, warn};

use crate::{
    ambassador::{attribute_values::AttributeValues, error::RtiError},
    callback::callback::Callback,
    class_lookup::class_lookup::ClassLookup,
    link::{rti_link::RtiLink, tick_config::TickKind},
    object::{
        error::ObjectError,
        local::local_base::LocalBase,
        ownership::{OwnershipRequestStatus, OwnershipState, VariableKind},
        public_object::{borrow_object, borrow_object_mut, SharedObject},
        public_variable::PublicVariable,
        remote::{
            proxy_list::ProxyList,
            remote_base::{divest_quietly, RemoteBase},
        },
    },
    types::{AttributeHandle, ClassHandle, ObjectHandle},
};

// Target
/// A bound variable, resolved once per ownership operation
struct Target {
    object: ObjectHandle,
    attribute: AttributeHandle,
    variable: String,
    kind: VariableKind,
    local: bool,
}

/// The shared-object database
///
/// Routes registrations, discoveries, reflections and deletions to the local or remote side,
/// and runs the per-variable ownership policies. Every method runs on the driving thread.
pub struct ObjectLookup {
    classes: ClassLookup,
    locals: LocalBase,
    remotes: RemoteBase,
}

impl ObjectLookup {
    /// `classes` must already be resolved
    pub fn new(classes: ClassLookup) -> Self {
        Self {
            classes,
            locals: LocalBase::new(),
            remotes: RemoteBase::new(),
        }
    }

    pub fn classes(&self) -> &ClassLookup {
        &self.classes
    }

    pub fn locals(&self) -> &LocalBase {
        &self.locals
    }

    pub fn remotes(&self) -> &RemoteBase {
        &self.remotes
    }

    // Registration & Deletion

    pub fn register_public_object(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
    ) -> Result<ObjectHandle, ObjectError> {
        self.locals.register_object(link, &self.classes, object)
    }

    pub fn delete_public_object(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
    ) -> Result<ObjectHandle, ObjectError> {
        let handle = {
            let inner = borrow_object(object, "delete an object")?;
            inner.handle().ok_or_else(|| ObjectError::NotRegistered {
                class: inner.class_name().to_string(),
            })?
        };
        self.locals.delete_object(link, handle)?;
        Ok(handle)
    }

    /// Delete every local object model code has dropped, returning their handles
    pub fn clean_public_objects(&mut self, link: &mut RtiLink) -> Vec<ObjectHandle> {
        self.locals.clean_references(link)
    }

    // Remote Instances

    pub fn discover_remote_object(
        &mut self,
        object: ObjectHandle,
        class: ClassHandle,
    ) -> Result<(), ObjectError> {
        if self.locals.contains(object) {
            warn!("Ignoring discovery of local object {object}");
            return Ok(());
        }
        self.remotes.discover(object, class)
    }

    /// Apply a reflection to whichever side knows the instance
    pub fn resolve_update(
        &mut self,
        object: ObjectHandle,
        values: &AttributeValues,
    ) -> Result<(), ObjectError> {
        if self.remotes.has_instance(object) {
            return self.remotes.update(object, values);
        }
        if self.locals.contains(object) {
            return self.locals.update_instance(&self.classes, object, values);
        }
        Err(ObjectError::ObjectNotFound { object })
    }

    pub fn remove_instance(&mut self, object: ObjectHandle) -> Result<(), ObjectError> {
        if self.remotes.delete(object) {
            debug!("Removed remote instance {object}");
            Ok(())
        } else {
            Err(ObjectError::ObjectNotFound { object })
        }
    }

    /// The proxy list of a declared class, created on first request
    pub fn proxy_list(&mut self, class_name: &str) -> Result<&mut ProxyList, ObjectError> {
        let class = self.classes.class_handle(class_name)?;
        self.remotes.proxy_list(class, &self.classes)
    }

    /// Complete proxies of a declared class
    pub fn proxies(&mut self, class_name: &str) -> Result<Vec<SharedObject>, ObjectError> {
        Ok(self.proxy_list(class_name)?.proxies())
    }

    /// The local object or proxy behind a handle
    pub fn find_object(&self, object: ObjectHandle) -> Option<SharedObject> {
        self.remotes
            .proxy(object)
            .or_else(|| self.locals.get_object(object))
    }

    /// Answer a refresh request with the full current value of each named attribute
    pub fn refresh_object(
        &mut self,
        link: &mut RtiLink,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), ObjectError> {
        let class = self
            .locals
            .class_of(object)
            .ok_or(ObjectError::ObjectNotFound { object })?;
        let shared = self
            .locals
            .get_object(object)
            .ok_or(ObjectError::ObjectDeleted { object })?;

        let mut values = AttributeValues::with_capacity(attributes.len());
        {
            let inner = borrow_object(&shared, "refresh an object")?;
            for attribute in attributes {
                let name = self.classes.attribute_name(class, *attribute)?;
                let Some(variable) = inner.variable(name) else {
                    continue;
                };
                if variable.kind() == VariableKind::Dummy {
                    continue;
                }
                let bytes = variable.encode().map_err(|source| ObjectError::Codec {
                    variable: name.to_string(),
                    source,
                })?;
                values.push(*attribute, bytes);
            }
        }
        if values.is_empty() {
            return Ok(());
        }

        let time = link.granted_time()?;
        link.ambassador()
            .update_attribute_values(object, &values, time)
            .map_err(|source| ObjectError::rti("refresh an object", source))?;
        debug!("Refreshed {} attributes of {object}", values.len());
        Ok(())
    }

    /// Ask whoever answers for a mirrored object to send every variable's full value again
    pub fn request_refresh(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
    ) -> Result<(), ObjectError> {
        let (handle, attributes) = {
            let inner = borrow_object(object, "request a refresh")?;
            let mut handle = None;
            let mut attributes = Vec::new();
            for name in inner.public_variables() {
                let Some(variable) = inner.variable(name) else {
                    continue;
                };
                let Some(binding) = variable.state().binding() else {
                    continue;
                };
                handle = Some(binding.object);
                if variable.kind() != VariableKind::Dummy {
                    attributes.push(binding.attribute);
                }
            }
            let handle = handle.ok_or_else(|| ObjectError::NotRegistered {
                class: inner.class_name().to_string(),
            })?;
            (handle, attributes)
        };
        if !self.remotes.has_proxy(handle) {
            return Err(ObjectError::ObjectNotFound { object: handle });
        }

        link.ambassador()
            .request_object_attribute_value_update(handle, &attributes)
            .map_err(|source| ObjectError::rti("request a refresh", source))?;
        debug!("Requested a refresh of {} attributes of {handle}", attributes.len());
        Ok(())
    }

    // Ownership

    /// Write a public variable under its ownership policy, then publish the change
    ///
    /// Exclusive variables make one acquisition attempt and fail with `Excluded` if another
    /// federate won the attribute this tick. Cumulative variables retry until they win, and
    /// hand ownership back as soon as the delta is published.
    pub fn write<V, R>(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
        variable: &str,
        apply: impl FnOnce(&mut V) -> R,
    ) -> Result<R, ObjectError>
    where
        V: PublicVariable,
    {
        let target = self.target(object, variable)?;
        {
            let inner = borrow_object(object, "write a variable")?;
            let is_type = inner
                .variable(variable)
                .is_some_and(|found| found.as_any().is::<V>());
            if !is_type {
                return Err(ObjectError::VariableTypeMismatch {
                    variable: variable.to_string(),
                    expected: type_name::<V>(),
                });
            }
        }

        let status = self.check_target(link, &target)?;
        if !status.is_owned() {
            return Err(match target.kind {
                VariableKind::Viewable => ObjectError::NotOwned {
                    object: target.object,
                    variable: target.variable,
                },
                _ => ObjectError::Excluded {
                    object: target.object,
                    variable: target.variable,
                },
            });
        }

        let (result, payload) = {
            let mut inner = borrow_object_mut(object, "write a variable")?;
            let typed = inner
                .variable_mut(variable)
                .and_then(|found| found.as_any_mut().downcast_mut::<V>())
                .ok_or_else(|| ObjectError::VariableTypeMismatch {
                    variable: variable.to_string(),
                    expected: type_name::<V>(),
                })?;
            let result = apply(&mut *typed);
            let payload = match target.kind {
                VariableKind::Dummy => None,
                _ => Some(typed.take_outgoing().map_err(|source| ObjectError::Codec {
                    variable: variable.to_string(),
                    source,
                })?),
            };
            (result, payload)
        };

        if let Some(bytes) = payload {
            let time = link.granted_time()?;
            link.ambassador()
                .update_attribute_values(
                    target.object,
                    &AttributeValues::single(target.attribute, bytes),
                    time,
                )
                .map_err(|source| ObjectError::rti("publish a variable", source))?;
        }

        if target.kind == VariableKind::Cumulative {
            self.return_target(link, &target)?;
        }
        Ok(result)
    }

    /// Make sure this federate may write the variable, negotiating if its policy requires
    pub fn check_ownership(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
        variable: &str,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        let target = self.target(object, variable)?;
        self.check_target(link, &target)
    }

    /// Issue a single acquisition request without waiting for its outcome
    pub fn request_ownership(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
        variable: &str,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        let target = self.target(object, variable)?;
        self.request_target(link, &target)
    }

    /// Divest the variable if owned and leave it Ambiguous
    pub fn return_ownership(
        &mut self,
        link: &mut RtiLink,
        object: &SharedObject,
        variable: &str,
    ) -> Result<(), ObjectError> {
        let target = self.target(object, variable)?;
        self.return_target(link, &target)
    }

    /// Start-of-tick reset of every negotiated variable, remote and local
    pub fn reset_ownership(&mut self, link: &mut RtiLink) {
        self.remotes.reset_all(link);
        self.locals.reset_all(link);
    }

    /// Apply every ownership outcome the RTI has delivered so far
    pub fn apply_ownership_notices(&mut self, link: &mut RtiLink) -> Result<(), ObjectError> {
        link.pump()?;
        for notice in link.take_ownership_notices() {
            match notice {
                Callback::OwnershipAcquired { object, attributes } => {
                    self.notify_ownership(link, object, &attributes, OwnershipState::Owned)
                }
                Callback::OwnershipUnavailable { object, attributes } => {
                    self.notify_ownership(link, object, &attributes, OwnershipState::NotOwned)
                }
                other => warn!("Unexpected ownership notice {}", other.log()),
            }
        }
        Ok(())
    }

    pub fn ownership(
        &self,
        object: &SharedObject,
        variable: &str,
    ) -> Result<OwnershipState, ObjectError> {
        let target = self.target(object, variable)?;
        self.ownership_of(&target)
    }

    fn notify_ownership(
        &mut self,
        link: &mut RtiLink,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
        state: OwnershipState,
    ) {
        let found = self
            .class_of(object)
            .ok_or(ObjectError::ObjectNotFound { object })
            .and_then(|class| Ok((class, self.shared_for(object)?)));
        let (class, shared) = match found {
            Ok(found) => found,
            Err(error) => {
                // nobody is left to write what was won
                if state == OwnershipState::Owned {
                    warn!("Returning attributes of {object}: {error}");
                    divest_quietly(link, object, attributes);
                } else {
                    debug!("Ignoring ownership notice for {object}: {error}");
                }
                return;
            }
        };

        let Ok(mut inner) = borrow_object_mut(&shared, "apply an ownership notice") else {
            warn!("Dropped ownership notice for {object}: object is borrowed");
            return;
        };
        for attribute in attributes {
            let Ok(name) = self.classes.attribute_name(class, *attribute) else {
                warn!("Ownership notice for unknown attribute {attribute} of {object}");
                continue;
            };
            if let Some(variable) = inner.variable_mut(name) {
                variable.state_mut().set_ownership(state);
            }
        }
        debug!("{object}: {} attributes now {state:?}", attributes.len());
    }

    fn check_target(
        &mut self,
        link: &mut RtiLink,
        target: &Target,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        match target.kind {
            VariableKind::Dummy => Ok(OwnershipRequestStatus::AlreadyOwned),
            VariableKind::Viewable => Ok(if target.local {
                OwnershipRequestStatus::AlreadyOwned
            } else {
                OwnershipRequestStatus::Unavailable
            }),
            VariableKind::Exclusive => match self.ownership_of(target)? {
                OwnershipState::Owned => Ok(OwnershipRequestStatus::AlreadyOwned),
                OwnershipState::NotOwned => Ok(OwnershipRequestStatus::Unavailable),
                OwnershipState::Ambiguous => match self.request_target(link, target)? {
                    OwnershipRequestStatus::Pending => self.wait_for_resolution(link, target),
                    status => Ok(status),
                },
            },
            VariableKind::Cumulative => self.acquire_persistently(link, target),
        }
    }

    /// Keep requesting until the attribute is won, however often it is lost to others
    fn acquire_persistently(
        &mut self,
        link: &mut RtiLink,
        target: &Target,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        if self.ownership_of(target)? == OwnershipState::Owned {
            return Ok(OwnershipRequestStatus::AlreadyOwned);
        }
        let mut status = self.request_target(link, target)?;
        if status.is_owned() {
            return Ok(status);
        }

        let timeout = link.config().ownership_timeout;
        link.wait_until::<ObjectError, _>("acquire a cumulative variable", timeout, |link| {
            if self.ownership_of(target)? == OwnershipState::NotOwned {
                status = self.request_target(link, target)?;
                if status.is_owned() {
                    return Ok(true);
                }
            }
            link.tick(TickKind::Long)?;
            self.apply_ownership_notices(link)?;
            Ok(self.ownership_of(target)? == OwnershipState::Owned)
        })?;

        Ok(match status {
            OwnershipRequestStatus::AlreadyOwned => status,
            _ => OwnershipRequestStatus::Granted,
        })
    }

    fn wait_for_resolution(
        &mut self,
        link: &mut RtiLink,
        target: &Target,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        let timeout = link.config().ownership_timeout;
        link.wait_until::<ObjectError, _>("resolve attribute ownership", timeout, |link| {
            link.tick(TickKind::Long)?;
            self.apply_ownership_notices(link)?;
            Ok(self.ownership_of(target)? != OwnershipState::Ambiguous)
        })?;

        Ok(match self.ownership_of(target)? {
            OwnershipState::Owned => OwnershipRequestStatus::Granted,
            _ => OwnershipRequestStatus::Unavailable,
        })
    }

    fn request_target(
        &mut self,
        link: &mut RtiLink,
        target: &Target,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        self.set_ownership(target, OwnershipState::Ambiguous)?;
        match link
            .ambassador()
            .attribute_ownership_acquisition_if_available(target.object, &[target.attribute])
        {
            Ok(()) => Ok(OwnershipRequestStatus::Pending),
            Err(RtiError::FederateOwnsAttributes { .. }) => {
                self.set_ownership(target, OwnershipState::Owned)?;
                Ok(OwnershipRequestStatus::AlreadyOwned)
            }
            Err(RtiError::AttributeAlreadyBeingAcquired { .. }) => {
                Ok(OwnershipRequestStatus::Pending)
            }
            Err(RtiError::ObjectNotKnown { .. }) => Err(ObjectError::ObjectDeleted {
                object: target.object,
            }),
            Err(source) => Err(ObjectError::rti("request attribute ownership", source)),
        }
    }

    fn return_target(&mut self, link: &mut RtiLink, target: &Target) -> Result<(), ObjectError> {
        if !target.kind.is_negotiated() {
            return Ok(());
        }
        if self.ownership_of(target)? == OwnershipState::Owned {
            divest_quietly(link, target.object, &[target.attribute]);
        }
        self.set_ownership(target, OwnershipState::Ambiguous)
    }

    fn target(&self, object: &SharedObject, variable: &str) -> Result<Target, ObjectError> {
        let inner = borrow_object(object, "inspect a variable")?;
        let found = inner
            .variable(variable)
            .ok_or_else(|| ObjectError::UnknownVariable {
                object: inner.class_name().to_string(),
                variable: variable.to_string(),
            })?;
        let binding = found
            .state()
            .binding()
            .ok_or_else(|| ObjectError::VariableNotBound {
                variable: variable.to_string(),
            })?;
        Ok(Target {
            object: binding.object,
            attribute: binding.attribute,
            variable: variable.to_string(),
            kind: found.kind(),
            local: self.locals.contains(binding.object),
        })
    }

    fn class_of(&self, object: ObjectHandle) -> Option<ClassHandle> {
        self.remotes
            .class_of(object)
            .or_else(|| self.locals.class_of(object))
    }

    fn shared_for(&self, object: ObjectHandle) -> Result<SharedObject, ObjectError> {
        if let Some(proxy) = self.remotes.proxy(object) {
            return Ok(proxy);
        }
        if self.locals.contains(object) {
            return self
                .locals
                .get_object(object)
                .ok_or(ObjectError::ObjectDeleted { object });
        }
        Err(ObjectError::ObjectNotFound { object })
    }

    fn ownership_of(&self, target: &Target) -> Result<OwnershipState, ObjectError> {
        let shared = self.shared_for(target.object)?;
        let inner = borrow_object(&shared, "read ownership")?;
        inner
            .variable(&target.variable)
            .map(|variable| variable.state().ownership())
            .ok_or_else(|| ObjectError::UnknownVariable {
                object: target.object.to_string(),
                variable: target.variable.clone(),
            })
    }

    fn set_ownership(&self, target: &Target, state: OwnershipState) -> Result<(), ObjectError> {
        let shared = self.shared_for(target.object)?;
        let mut inner = borrow_object_mut(&shared, "set ownership")?;
        let variable =
            inner
                .variable_mut(&target.variable)
                .ok_or_else(|| ObjectError::UnknownVariable {
                    object: target.object.to_string(),
                    variable: target.variable.clone(),
                })?;
        variable.state_mut().set_ownership(state);
        debug!("{} of {} is now {state:?}", target.variable, target.object);
        Ok(())
    }
}
