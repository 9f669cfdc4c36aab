mod external_event;
pub use external_event::ExternalEvent;

mod federate_manager;
pub use federate_manager::FederateManager;

mod instance_guard;
pub(crate) use instance_guard::InstanceGuard;
