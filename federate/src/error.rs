use thiserror::Error;

use hla_sim_shared::{
    CallbackError, ClassLookupError, EventQueueError, LinkError, LogicalTime, ObjectError,
    RtiError,
};

use crate::{advancer::AdvancerState, coupler::CouplingError};

/// Errors that can occur while joining, coupling and driving a federate
#[derive(Debug, Clone, Error)]
pub enum FederateError {
    // Startup Errors

    /// Only one manager may be live per process unless `single_instance` is off
    #[error("A FederateManager is already active in this process")]
    ManagerAlreadyActive,

    #[error("Class declarations rejected: {source}")]
    BadClassTree {
        #[source]
        source: ClassLookupError,
    },

    #[error("Advancer is {state:?}, expected {expected:?}")]
    AdvancerNotReady {
        state: AdvancerState,
        expected: AdvancerState,
    },

    // Scheduling Errors

    #[error("Cannot schedule at {time}: the schedule is already at {current}")]
    ScheduleInPast {
        time: LogicalTime,
        current: LogicalTime,
    },

    #[error("Repeating interval {interval} must be positive")]
    InvalidInterval { interval: LogicalTime },

    // Wrapped Errors

    /// Terminal RTI failure; nothing retries these
    #[error("RTI failure during {operation}: {source}")]
    Rti {
        operation: &'static str,
        #[source]
        source: RtiError,
    },

    #[error(transparent)]
    Coupling(#[from] CouplingError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Lookup(#[from] ClassLookupError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Queue(#[from] EventQueueError),
}

impl FederateError {
    pub(crate) fn rti(operation: &'static str, source: RtiError) -> Self {
        Self::Rti { operation, source }
    }
}

impl From<CallbackError> for FederateError {
    fn from(error: CallbackError) -> Self {
        Self::Link(LinkError::from(error))
    }
}
