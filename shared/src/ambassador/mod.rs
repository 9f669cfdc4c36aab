pub mod attribute_values;
pub mod error;
pub mod federate_ambassador;
pub mod rti_ambassador;
