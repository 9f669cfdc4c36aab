use thiserror::Error;

use crate::{
    ambassador::error::RtiError,
    types::{AttributeHandle, ClassHandle},
};

/// Errors raised while declaring or resolving public classes
#[derive(Debug, Clone, Error)]
pub enum ClassLookupError {
    // Declaration Errors

    #[error("Class {class} was declared twice")]
    DuplicateClass { class: String },

    /// The class list cannot be shared through the federation
    #[error("Bad class tree at {class}: {reason}")]
    BadClassTree { class: String, reason: String },

    // Lookup Errors

    #[error("Class {class} is not a registered public class")]
    UnknownClass { class: String },

    #[error("No public class is bound to {handle}")]
    UnknownClassHandle { handle: ClassHandle },

    #[error("Class {class} has no public variable {variable}")]
    UnknownVariable { class: String, variable: String },

    #[error("Class {class} has no variable bound to {handle}")]
    UnknownAttributeHandle {
        class: String,
        handle: AttributeHandle,
    },

    // Resolution Errors

    #[error("Cannot {operation} before names are resolved")]
    NotResolved { operation: &'static str },

    #[error("Names were already resolved for this federation")]
    AlreadyResolved,

    #[error("RTI failure while resolving {name}: {source}")]
    Rti {
        name: String,
        #[source]
        source: RtiError,
    },
}
