mod coupler;
pub use coupler::Coupler;

mod error;
pub use error::CouplingError;
