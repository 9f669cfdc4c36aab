pub mod local_base;
pub mod reference_table;
