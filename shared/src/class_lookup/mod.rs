pub mod class_lookup;
pub mod error;
pub mod object_class;
