//! # HLA Sim Shared
//! The federate-side core of the simulation middleware: the RTI contract, callback buffering,
//! class resolution, the shared-object database and the logical-time event queue.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use hla_sim_serde::{
    decode, decode_object, encode, encode_object, ByteReader, ByteWriter, Serde, SerdeErr,
};

mod ambassador;
mod callback;
mod class_lookup;
mod constants;
mod event_queue;
mod link;
mod object;
mod types;

pub use ambassador::{
    attribute_values::AttributeValues,
    error::RtiError,
    federate_ambassador::FederateAmbassador,
    rti_ambassador::{ResignAction, RtiAmbassador},
};
pub use callback::{
    callback::Callback,
    callback_buffer::{CallbackBuffer, CallbackLogging},
    error::CallbackError,
    time_channel::{TimeAccessor, TimeChannel, TimeListener, TimeMutator},
};
pub use class_lookup::{
    class_lookup::ClassLookup,
    error::ClassLookupError,
    object_class::{ObjectClass, ProxyFactory},
};
pub use constants::{FEDEX_CLASS, FEDEX_TS_ATTRIBUTE, LOOKAHEAD, NODE_CLASS, NODE_NAME_ATTRIBUTE};
pub use event_queue::{EventQueue, EventQueueError};
pub use link::{
    cancellation::CancellationToken,
    error::LinkError,
    rti_link::RtiLink,
    tick_config::{TickConfig, TickKind},
};
pub use object::{
    error::ObjectError,
    local::{local_base::LocalBase, reference_table::ReferenceTable},
    object_lookup::ObjectLookup,
    ownership::{OwnershipRequestStatus, OwnershipState, VariableKind},
    public_object::{object_mut, object_ref, share, PublicObject, SharedObject},
    public_variable::{PublicVariable, VariableBinding, VariableState},
    remote::{
        object_shell::ObjectShell,
        proxy_list::{InstanceListener, ProxyList},
        remote_base::RemoteBase,
        shell_list::ShellList,
    },
    variables::{Cumulative, Dummy, Exclusive, VariableListener, Viewable},
};
pub use types::{
    AttributeHandle, ClassHandle, FederateHandle, FederateRole, LogicalTime, ObjectHandle, Point,
    SessionId,
};
