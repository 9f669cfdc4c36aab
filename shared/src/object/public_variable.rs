use std::any::Any;

use hla_sim_serde::SerdeErr;

use crate::{
    object::ownership::{OwnershipState, VariableKind},
    types::{AttributeHandle, ObjectHandle},
};

/// Where a variable lives in the federation once its object is registered or discovered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VariableBinding {
    pub object: ObjectHandle,
    pub attribute: AttributeHandle,
}

/// Bookkeeping common to every public variable
///
/// Ownership is only ever changed by the object database, never by model code.
#[derive(Clone, Debug)]
pub struct VariableState {
    ownership: OwnershipState,
    binding: Option<VariableBinding>,
    has_value: bool,
}

impl VariableState {
    pub fn new(ownership: OwnershipState) -> Self {
        Self {
            ownership,
            binding: None,
            has_value: false,
        }
    }

    pub fn ownership(&self) -> OwnershipState {
        self.ownership
    }

    pub(crate) fn set_ownership(&mut self, ownership: OwnershipState) {
        self.ownership = ownership;
    }

    pub fn binding(&self) -> Option<VariableBinding> {
        self.binding
    }

    pub(crate) fn bind(&mut self, binding: VariableBinding) {
        self.binding = Some(binding);
    }

    /// Whether at least one value was set locally or reflected
    pub fn has_value(&self) -> bool {
        self.has_value
    }

    pub(crate) fn mark_value(&mut self) {
        self.has_value = true;
    }

    pub(crate) fn clear_value(&mut self) {
        self.has_value = false;
    }
}

/// A single shareable attribute of a [`PublicObject`](crate::PublicObject)
pub trait PublicVariable: Any {
    fn kind(&self) -> VariableKind;

    fn state(&self) -> &VariableState;

    fn state_mut(&mut self) -> &mut VariableState;

    /// The full current value, as sent in registration snapshots and refreshes
    fn encode(&self) -> Result<Vec<u8>, SerdeErr>;

    /// The payload to publish after a local write
    fn take_outgoing(&mut self) -> Result<Vec<u8>, SerdeErr> {
        self.encode()
    }

    /// Apply a payload published by the attribute's owner
    fn reflect(&mut self, bytes: &[u8]) -> Result<(), SerdeErr>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
