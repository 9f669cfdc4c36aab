use std::time::Duration;

use crate::{
    ambassador::{
        attribute_values::AttributeValues, error::RtiError,
        federate_ambassador::FederateAmbassador,
    },
    types::{AttributeHandle, ClassHandle, FederateHandle, LogicalTime, ObjectHandle},
};

/// What the RTI does with a federate's objects and attributes when it resigns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResignAction {
    ReleaseAttributes,
    DeleteObjects,
    DeleteObjectsAndReleaseAttributes,
    NoAction,
}

/// Requests a federate can make of the Run-Time Infrastructure
pub trait RtiAmbassador {
    // Federation Management

    fn create_federation_execution(&mut self, federation: &str, fed_file: &str)
        -> Result<(), RtiError>;

    fn destroy_federation_execution(&mut self, federation: &str) -> Result<(), RtiError>;

    /// Join and hand over the callback handler for this federate
    fn join_federation_execution(
        &mut self,
        federate: &str,
        federation: &str,
        handler: Box<dyn FederateAmbassador + Send>,
    ) -> Result<FederateHandle, RtiError>;

    fn resign_federation_execution(&mut self, action: ResignAction) -> Result<(), RtiError>;

    // Declaration Management

    fn object_class_handle(&mut self, name: &str) -> Result<ClassHandle, RtiError>;

    fn attribute_handle(&mut self, name: &str, class: ClassHandle)
        -> Result<AttributeHandle, RtiError>;

    fn publish_object_class(
        &mut self,
        class: ClassHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    fn subscribe_object_class_attributes(
        &mut self,
        class: ClassHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    // Object Management

    fn register_object_instance(&mut self, class: ClassHandle) -> Result<ObjectHandle, RtiError>;

    fn update_attribute_values(
        &mut self,
        object: ObjectHandle,
        values: &AttributeValues,
        time: LogicalTime,
    ) -> Result<(), RtiError>;

    fn delete_object_instance(
        &mut self,
        object: ObjectHandle,
        time: LogicalTime,
    ) -> Result<(), RtiError>;

    fn request_object_attribute_value_update(
        &mut self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    // Ownership Management

    fn attribute_ownership_acquisition_if_available(
        &mut self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    fn unconditional_attribute_ownership_divestiture(
        &mut self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError>;

    /// Answer a release request, returning the attributes actually released
    fn attribute_ownership_release_response(
        &mut self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<Vec<AttributeHandle>, RtiError>;

    // Time Management

    fn enable_time_constrained(&mut self) -> Result<(), RtiError>;

    fn enable_time_regulation(
        &mut self,
        time: LogicalTime,
        lookahead: LogicalTime,
    ) -> Result<(), RtiError>;

    fn next_event_request_available(&mut self, time: LogicalTime) -> Result<(), RtiError>;

    /// Deliver pending callbacks, waiting between `min` and `max` wall time for work
    fn tick(&mut self, min: Duration, max: Duration) -> Result<(), RtiError>;
}
