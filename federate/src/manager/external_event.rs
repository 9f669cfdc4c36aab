use hla_sim_shared::{AttributeValues, ObjectHandle};

/// A remote change waiting in the external event queue for its logical time
#[derive(Clone, Debug, PartialEq)]
pub enum ExternalEvent {
    Reflect {
        object: ObjectHandle,
        values: AttributeValues,
    },
    Remove {
        object: ObjectHandle,
    },
}

impl ExternalEvent {
    pub fn object(&self) -> ObjectHandle {
        match self {
            Self::Reflect { object, .. } | Self::Remove { object } => *object,
        }
    }
}
