pub mod cancellation;
pub mod error;
pub mod rti_link;
pub mod tick_config;
