pub mod error;
pub mod local;
pub mod object_lookup;
pub mod ownership;
pub mod public_object;
pub mod public_variable;
pub mod remote;
pub mod variables;
