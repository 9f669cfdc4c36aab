use std::any::Any;

use hla_sim_serde::SerdeErr;

use crate::object::{
    ownership::{OwnershipState, VariableKind},
    public_variable::{PublicVariable, VariableState},
};

/// Placeholder variable: always owned, carries no payload
pub struct Dummy {
    state: VariableState,
}

impl Dummy {
    pub fn new() -> Self {
        let mut state = VariableState::new(OwnershipState::Owned);
        state.mark_value();
        Self { state }
    }
}

impl Default for Dummy {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicVariable for Dummy {
    fn kind(&self) -> VariableKind {
        VariableKind::Dummy
    }

    fn state(&self) -> &VariableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariableState {
        &mut self.state
    }

    fn encode(&self) -> Result<Vec<u8>, SerdeErr> {
        Ok(Vec::new())
    }

    fn reflect(&mut self, _bytes: &[u8]) -> Result<(), SerdeErr> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
