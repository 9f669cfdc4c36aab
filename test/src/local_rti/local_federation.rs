use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use hla_sim_shared::{AttributeHandle, AttributeValues, FederateHandle, LogicalTime, ObjectHandle};

use crate::local_rti::{
    execution::{Delivery, Execution},
    local_ambassador::LocalAmbassador,
    object_model::ObjectModel,
};

pub(crate) struct FederationState {
    pub(crate) model: ObjectModel,
    pub(crate) executions: HashMap<String, Execution>,
}

/// An in-memory RTI serving any number of federates, each on its own thread
///
/// Ownership is settled as soon as it is requested and time is granted conservatively: a
/// constrained federate only advances to a time no regulating peer can still send before.
/// Callbacks queue per federate and are delivered, outside the lock, when it ticks.
#[derive(Clone)]
pub struct LocalFederation {
    state: Arc<Mutex<FederationState>>,
}

impl LocalFederation {
    pub fn new(model: ObjectModel) -> Self {
        Self {
            state: Arc::new(Mutex::new(FederationState {
                model,
                executions: HashMap::new(),
            })),
        }
    }

    /// A fresh connection for one federate
    pub fn ambassador(&self) -> LocalAmbassador {
        LocalAmbassador::new(self.clone())
    }

    pub fn federation_exists(&self, federation: &str) -> bool {
        self.with_state(|state| state.executions.contains_key(federation))
    }

    /// Federates currently joined to the execution
    pub fn joined(&self, federation: &str) -> usize {
        self.with_state(|state| {
            state
                .executions
                .get(federation)
                .map_or(0, |execution| execution.len())
        })
    }

    /// Live object instances in the execution
    pub fn instances(&self, federation: &str) -> usize {
        self.with_state(|state| {
            state
                .executions
                .get(federation)
                .map_or(0, |execution| execution.instance_count())
        })
    }

    /// Current RTI-side owner of an attribute, `None` while unowned
    pub fn owner(
        &self,
        federation: &str,
        object: ObjectHandle,
        attribute: AttributeHandle,
    ) -> Option<FederateHandle> {
        self.with_state(|state| state.executions.get(federation)?.owner(object, attribute))
    }

    /// Hand a federate a reflection no federate sent, delivered at its next tick
    pub fn inject_reflection(
        &self,
        federation: &str,
        federate: FederateHandle,
        object: ObjectHandle,
        values: AttributeValues,
        time: Option<LogicalTime>,
    ) {
        self.with_state(|state| {
            if let Some(execution) = state.executions.get_mut(federation) {
                execution.inject(
                    federate,
                    Delivery::Reflect {
                        object,
                        values,
                        time,
                    },
                );
            }
        });
    }

    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut FederationState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}
