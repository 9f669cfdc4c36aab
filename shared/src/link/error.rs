use std::time::Duration;

use thiserror::Error;

use crate::{ambassador::error::RtiError, callback::error::CallbackError};

/// Errors raised while talking to the RTI or waiting on it
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    /// The RTI rejected a request with no defined recovery
    #[error("RTI failure during {operation}: {source}")]
    Rti {
        operation: &'static str,
        #[source]
        source: RtiError,
    },

    /// A spin loop saw the cancellation token
    #[error("Cancelled while waiting for {operation}")]
    Cancelled { operation: &'static str },

    /// A spin loop ran past its configured timeout
    #[error("Timed out after {waited:?} waiting for {operation}")]
    TimedOut {
        operation: &'static str,
        waited: Duration,
    },

    #[error(transparent)]
    Callback(#[from] CallbackError),
}

impl LinkError {
    pub fn rti(operation: &'static str, source: RtiError) -> Self {
        Self::Rti { operation, source }
    }
}
