use crate::{
    ambassador::attribute_values::AttributeValues,
    types::{AttributeHandle, ClassHandle, LogicalTime, ObjectHandle},
};

/// Callbacks the RTI delivers to a joined federate, only ever from inside `tick`
///
/// The RTI is not reentrant: implementations must not call back into the ambassador.
pub trait FederateAmbassador {
    fn discover_object_instance(&self, object: ObjectHandle, class: ClassHandle, name: &str);

    /// `time` is `None` for receive-ordered reflections
    fn reflect_attribute_values(
        &self,
        object: ObjectHandle,
        values: &AttributeValues,
        time: Option<LogicalTime>,
    );

    fn remove_object_instance(&self, object: ObjectHandle, time: Option<LogicalTime>);

    fn provide_attribute_value_update(&self, object: ObjectHandle, attributes: &[AttributeHandle]);

    fn attribute_ownership_acquisition_notification(
        &self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    );

    fn attribute_ownership_unavailable(&self, object: ObjectHandle, attributes: &[AttributeHandle]);

    fn request_attribute_ownership_release(
        &self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    );

    fn time_regulation_enabled(&self, time: LogicalTime);

    fn time_constrained_enabled(&self, time: LogicalTime);

    fn time_advance_grant(&self, time: LogicalTime);
}
