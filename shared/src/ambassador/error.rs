use thiserror::Error;

use crate::types::{AttributeHandle, ClassHandle, LogicalTime, ObjectHandle};

/// Exceptions raised by the RTI ambassador
///
/// Several of these are expected races between federates starting or negotiating
/// concurrently, and callers match on them to retry instead of failing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RtiError {
    // Federation Lifecycle

    #[error("Federation execution {federation} already exists")]
    FederationExecutionAlreadyExists { federation: String },

    #[error("Federation execution {federation} does not exist")]
    FederationExecutionDoesNotExist { federation: String },

    #[error("Federates are still joined to {federation}")]
    FederatesCurrentlyJoined { federation: String },

    #[error("Federate is not a member of a federation execution")]
    FederateNotExecutionMember,

    #[error("Federate {federate} is already a member of {federation}")]
    FederateAlreadyExecutionMember { federate: String, federation: String },

    // Declarations

    #[error("Name {name} not found in the federation object model")]
    NameNotFound { name: String },

    #[error("Object class {class} is not published by this federate")]
    ObjectClassNotPublished { class: ClassHandle },

    // Objects & Ownership

    #[error("Object {object} is not known")]
    ObjectNotKnown { object: ObjectHandle },

    #[error("Attribute {attribute} of {object} is not owned by this federate")]
    AttributeNotOwned {
        object: ObjectHandle,
        attribute: AttributeHandle,
    },

    #[error("Federate already owns the requested attributes of {object}")]
    FederateOwnsAttributes { object: ObjectHandle },

    #[error("Attributes of {object} are already being acquired")]
    AttributeAlreadyBeingAcquired { object: ObjectHandle },

    // Time Management

    #[error("Requested time {requested} is before the current time {current}")]
    InvalidFederationTime {
        requested: LogicalTime,
        current: LogicalTime,
    },

    #[error("A time advance is already in progress")]
    TimeAdvanceAlreadyInProgress,

    #[error("Time {operation} is already enabled")]
    TimeAlreadyEnabled { operation: &'static str },

    /// Anything the RTI cannot recover from
    #[error("RTI internal error: {message}")]
    Internal { message: String },
}
