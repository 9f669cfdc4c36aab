use std::any::Any;

use hla_sim_serde::{decode, encode, Serde, SerdeErr};

use crate::object::{
    ownership::{OwnershipState, VariableKind},
    public_variable::{PublicVariable, VariableState},
    variables::value_cell::{ValueCell, VariableListener},
};

/// A variable only its registering federate writes
///
/// Proxies of it are read-only: `FederateManager::write` reports `NotOwned` for them.
pub struct Viewable<T> {
    cell: ValueCell<T>,
    state: VariableState,
}

impl<T: Serde> Viewable<T> {
    pub fn new(value: T) -> Self {
        let mut state = VariableState::new(OwnershipState::NotOwned);
        state.mark_value();
        Self {
            cell: ValueCell::new(value),
            state,
        }
    }

    pub fn get(&self) -> &T {
        self.cell.get()
    }

    pub fn set(&mut self, value: T) {
        self.cell.replace(value);
        self.state.mark_value();
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&T, &T) + 'static) {
        let listener: VariableListener<T> = Box::new(listener);
        self.cell.add_listener(listener);
    }
}

impl<T: Serde + Default> Default for Viewable<T> {
    fn default() -> Self {
        Self {
            cell: ValueCell::new(T::default()),
            state: VariableState::new(OwnershipState::NotOwned),
        }
    }
}

impl<T: Serde + 'static> PublicVariable for Viewable<T> {
    fn kind(&self) -> VariableKind {
        VariableKind::Viewable
    }

    fn state(&self) -> &VariableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariableState {
        &mut self.state
    }

    fn encode(&self) -> Result<Vec<u8>, SerdeErr> {
        encode(self.cell.get())
    }

    fn reflect(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        let value = decode::<T>(bytes)?;
        self.set(value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
