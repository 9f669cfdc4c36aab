use thiserror::Error;

use hla_sim_shared::{LinkError, RtiError, SerdeErr};

/// Errors that can occur during the coupling rendezvous
#[derive(Debug, Clone, Error)]
pub enum CouplingError {
    /// The fed file lacks one of the admin classes; fatal
    #[error("Federation object model has no {class}.{attribute}: {source}")]
    MissingAdminClass {
        class: &'static str,
        attribute: &'static str,
        #[source]
        source: RtiError,
    },

    #[error("Coupler used before initialise")]
    NotInitialised,

    #[error("RTI failure during {operation}: {source}")]
    Rti {
        operation: &'static str,
        #[source]
        source: RtiError,
    },

    #[error("Could not encode or decode the session id: {source}")]
    Codec {
        #[source]
        source: SerdeErr,
    },

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl CouplingError {
    pub(crate) fn rti(operation: &'static str, source: RtiError) -> Self {
        Self::Rti { operation, source }
    }
}
