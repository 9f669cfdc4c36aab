use hla_sim_serde::SerdeErr;
use thiserror::Error;

use crate::{
    ambassador::error::RtiError, class_lookup::error::ClassLookupError, link::error::LinkError,
    types::ObjectHandle,
};

/// Errors that can occur in the shared-object database
///
/// `ObjectNotFound` and `ObjectDeleted` usually mean a harmless race with a deletion
/// elsewhere in the federation, and callers on the per-tick path log and carry on.
#[derive(Debug, Clone, Error)]
pub enum ObjectError {
    // Registration Errors

    /// Object's class was never declared to the class lookup
    #[error("Class {class} is not a registered public class")]
    BadClass { class: String },

    /// Object does not expose a variable its class declares
    #[error("Class {class} declares {variable} but the object does not expose it")]
    MissingVariable { class: String, variable: String },

    #[error("Object of class {class} is already registered as {object}")]
    AlreadyRegistered { class: String, object: ObjectHandle },

    #[error("Object of class {class} has not been registered")]
    NotRegistered { class: String },

    #[error("Class {class} has no proxy factory, so its instances cannot be mirrored")]
    NoProxyFactory { class: String },

    // Stale References

    #[error("Object {object} not found")]
    ObjectNotFound { object: ObjectHandle },

    #[error("Object {object} was deleted")]
    ObjectDeleted { object: ObjectHandle },

    /// Object is borrowed elsewhere on the driving thread
    #[error("Cannot {operation}: the object is already borrowed")]
    ObjectBorrowed { operation: &'static str },

    // Variable Errors

    #[error("Object {object} has no public variable {variable}")]
    UnknownVariable { object: String, variable: String },

    #[error("Variable {variable} has not been registered with the federation")]
    VariableNotBound { variable: String },

    #[error("Variable {variable} is not a {expected}")]
    VariableTypeMismatch {
        variable: String,
        expected: &'static str,
    },

    /// Exclusive write refused: another federate holds the attribute this tick
    #[error("Write to {variable} of {object} excluded this tick")]
    Excluded {
        object: ObjectHandle,
        variable: String,
    },

    /// Write to a variable this federate can never own
    #[error("Variable {variable} of {object} is not owned by this federate")]
    NotOwned {
        object: ObjectHandle,
        variable: String,
    },

    #[error("Could not encode or decode {variable}: {source}")]
    Codec {
        variable: String,
        #[source]
        source: SerdeErr,
    },

    // Wrapped Errors

    #[error("RTI failure during {operation}: {source}")]
    Rti {
        operation: &'static str,
        #[source]
        source: RtiError,
    },

    #[error(transparent)]
    Lookup(#[from] ClassLookupError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl ObjectError {
    pub(crate) fn rti(operation: &'static str, source: RtiError) -> Self {
        Self::Rti { operation, source }
    }

    /// Whether this is a stale-reference race that callers may log and ignore
    pub fn is_stale_reference(&self) -> bool {
        matches!(
            self,
            ObjectError::ObjectNotFound { .. } | ObjectError::ObjectDeleted { .. }
        )
    }
}
