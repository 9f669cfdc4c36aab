mod cumulative;
mod dummy;
mod exclusive;
mod value_cell;
mod viewable;

pub use cumulative::Cumulative;
pub use dummy::Dummy;
pub use exclusive::Exclusive;
pub use value_cell::VariableListener;
pub use viewable::Viewable;
