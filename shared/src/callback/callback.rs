use crate::{
    ambassador::attribute_values::AttributeValues,
    types::{AttributeHandle, ClassHandle, LogicalTime, ObjectHandle},
};

/// A buffered RTI callback, captured by value so the RTI may reuse its arguments
#[derive(Clone, Debug, PartialEq)]
pub enum Callback {
    Discover {
        object: ObjectHandle,
        class: ClassHandle,
    },
    Reflect {
        object: ObjectHandle,
        values: AttributeValues,
        time: Option<LogicalTime>,
    },
    Remove {
        object: ObjectHandle,
        time: Option<LogicalTime>,
    },
    ProvideUpdate {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
    OwnershipAcquired {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
    OwnershipUnavailable {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
    ReleaseRequest {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
}

impl Callback {
    pub fn object(&self) -> ObjectHandle {
        match self {
            Self::Discover { object, .. } => *object,
            Self::Reflect { object, .. } => *object,
            Self::Remove { object, .. } => *object,
            Self::ProvideUpdate { object, .. } => *object,
            Self::OwnershipAcquired { object, .. } => *object,
            Self::OwnershipUnavailable { object, .. } => *object,
            Self::ReleaseRequest { object, .. } => *object,
        }
    }

    /// Ownership outcomes are applied as soon as they are drained, never time-queued
    pub fn is_ownership_notice(&self) -> bool {
        matches!(
            self,
            Self::OwnershipAcquired { .. } | Self::OwnershipUnavailable { .. }
        )
    }

    pub fn log(&self) -> String {
        match self {
            Self::Discover { object, class } => format!("Discover({object}, {class})"),
            Self::Reflect { object, values, time } => {
                format!("Reflect({object}, {} attributes, {time:?})", values.len())
            }
            Self::Remove { object, time } => format!("Remove({object}, {time:?})"),
            Self::ProvideUpdate { object, attributes } => {
                format!("ProvideUpdate({object}, {attributes:?})")
            }
            Self::OwnershipAcquired { object, attributes } => {
                format!("OwnershipAcquired({object}, {attributes:?})")
            }
            Self::OwnershipUnavailable { object, attributes } => {
                format!("OwnershipUnavailable({object}, {attributes:?})")
            }
            Self::ReleaseRequest { object, attributes } => {
                format!("ReleaseRequest({object}, {attributes:?})")
            }
        }
    }
}
