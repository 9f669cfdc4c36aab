use std::{
    any::Any,
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use crate::{
    object::{
        error::ObjectError,
        ownership::{OwnershipState, VariableKind},
        public_variable::PublicVariable,
    },
    types::{AttributeHandle, ObjectHandle},
};

/// Handle through which model code and the object database share an object
///
/// The object database only keeps weak references to local objects, so dropping every
/// `SharedObject` clone is what makes a local object eligible for lazy deletion.
pub type SharedObject = Rc<RefCell<dyn PublicObject>>;

/// An entity exposing a named set of public variables
pub trait PublicObject: Any {
    /// Local class name, matching an [`ObjectClass`](crate::ObjectClass) declaration
    fn class_name(&self) -> &'static str;

    fn public_variables(&self) -> &'static [&'static str];

    fn variable(&self, name: &str) -> Option<&dyn PublicVariable>;

    fn variable_mut(&mut self, name: &str) -> Option<&mut dyn PublicVariable>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Instance handle, once any variable has been bound
    fn handle(&self) -> Option<ObjectHandle> {
        self.public_variables()
            .iter()
            .filter_map(|name| self.variable(name))
            .find_map(|variable| variable.state().binding())
            .map(|binding| binding.object)
    }
}

/// Wrap a model object so it can be registered
pub fn share<T: PublicObject>(object: T) -> SharedObject {
    Rc::new(RefCell::new(object))
}

/// Borrow a shared object as its concrete type
pub fn object_ref<T: PublicObject>(object: &SharedObject) -> Option<Ref<'_, T>> {
    let borrowed = object.try_borrow().ok()?;
    Ref::filter_map(borrowed, |inner| inner.as_any().downcast_ref::<T>()).ok()
}

/// Mutably borrow a shared object as its concrete type
pub fn object_mut<T: PublicObject>(object: &SharedObject) -> Option<RefMut<'_, T>> {
    let borrowed = object.try_borrow_mut().ok()?;
    RefMut::filter_map(borrowed, |inner| inner.as_any_mut().downcast_mut::<T>()).ok()
}

pub(crate) fn borrow_object<'o>(
    object: &'o SharedObject,
    operation: &'static str,
) -> Result<Ref<'o, dyn PublicObject>, ObjectError> {
    object
        .try_borrow()
        .map_err(|_| ObjectError::ObjectBorrowed { operation })
}

pub(crate) fn borrow_object_mut<'o>(
    object: &'o SharedObject,
    operation: &'static str,
) -> Result<RefMut<'o, dyn PublicObject>, ObjectError> {
    object
        .try_borrow_mut()
        .map_err(|_| ObjectError::ObjectBorrowed { operation })
}

/// Apply an owner's payload to the named variable
pub(crate) fn reflect_variable(
    object: &mut dyn PublicObject,
    variable: &str,
    bytes: &[u8],
) -> Result<(), ObjectError> {
    let label = object_label(object);
    let target = object
        .variable_mut(variable)
        .ok_or_else(|| ObjectError::UnknownVariable {
            object: label,
            variable: variable.to_string(),
        })?;
    target.reflect(bytes).map_err(|source| ObjectError::Codec {
        variable: variable.to_string(),
        source,
    })
}

/// Return every variable to its per-tick default, listing the attributes to divest
///
/// Negotiated kinds go back to Ambiguous, and the ones currently owned are returned so the
/// caller can divest them. Viewable variables are owned iff the object is local.
pub(crate) fn reset_variables(object: &mut dyn PublicObject, local: bool) -> Vec<AttributeHandle> {
    let mut divest = Vec::new();
    for name in object.public_variables() {
        let Some(variable) = object.variable_mut(name) else {
            continue;
        };
        let kind = variable.kind();
        let state = variable.state_mut();
        match kind {
            VariableKind::Exclusive | VariableKind::Cumulative => {
                if state.ownership() == OwnershipState::Owned {
                    if let Some(binding) = state.binding() {
                        divest.push(binding.attribute);
                    }
                }
                state.set_ownership(OwnershipState::Ambiguous);
            }
            VariableKind::Viewable => state.set_ownership(if local {
                OwnershipState::Owned
            } else {
                OwnershipState::NotOwned
            }),
            VariableKind::Dummy => state.set_ownership(OwnershipState::Owned),
        }
    }
    divest
}

pub(crate) fn object_label(object: &dyn PublicObject) -> String {
    match object.handle() {
        Some(handle) => format!("{} {}", object.class_name(), handle),
        None => object.class_name().to_string(),
    }
}
