//! # HLA Sim Federate
//! Couples a discrete-event model to an HLA federation: joins or creates the federation
//! execution, runs the coupling rendezvous, advances logical time conservatively and drives
//! each tick through a fixed phase order so remote changes land before local actions run.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use hla_sim_shared::{
        AttributeHandle, AttributeValues, CancellationToken, ClassHandle, ClassLookup,
        ClassLookupError, Cumulative, Dummy, EventQueue, Exclusive, FederateAmbassador,
        FederateHandle, FederateRole, InstanceListener, LogicalTime, ObjectClass, ObjectError,
        ObjectHandle, OwnershipRequestStatus, OwnershipState, Point, ProxyFactory, ProxyList,
        PublicObject, PublicVariable, RtiAmbassador, RtiError, SessionId, SharedObject,
        TickConfig, TimeListener, VariableBinding, VariableListener, Viewable,
    };
}

mod advancer;
mod coupler;
mod error;
mod federate_config;
mod manager;
mod schedule;

pub use advancer::{Advancer, AdvancerState};
pub use coupler::{Coupler, CouplingError};
pub use error::FederateError;
pub use federate_config::FederateConfig;
pub use manager::{ExternalEvent, FederateManager};
pub use schedule::{
    BasicSchedule, DisplayAction, DistributedSchedule, ScheduleBase, ScheduledAction, Stopwatch,
};
