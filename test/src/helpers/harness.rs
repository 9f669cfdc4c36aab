use std::{sync::Arc, thread, time::Duration};

use hla_sim_federate::{FederateConfig, FederateError, FederateManager};
use hla_sim_shared::{ClassLookup, LogicalTime, ObjectClass, TickConfig};

use crate::{
    helpers::models::{BasicTestObject, Country, BASIC_TEST_OBJECT, COUNTRY},
    local_rti::{LocalFederation, ObjectModel},
};

const WAIT: Duration = Duration::from_secs(20);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Admin classes plus every test model
pub fn test_model() -> ObjectModel {
    ObjectModel::new()
        .with_class(BASIC_TEST_OBJECT, BasicTestObject::VARIABLES)
        .with_class(COUNTRY, Country::VARIABLES)
}

pub fn test_federation() -> LocalFederation {
    LocalFederation::new(test_model())
}

pub fn test_classes() -> ClassLookup {
    let mut classes = ClassLookup::new();
    classes
        .add_class(BasicTestObject::class())
        .expect("fresh lookup accepts BasicTestObject");
    classes
        .add_class(ObjectClass::of::<Country>())
        .expect("fresh lookup accepts Country");
    classes
}

/// Fast ticks and bounded waits, so a broken rendezvous fails instead of hanging
pub fn test_tick_config() -> TickConfig {
    TickConfig {
        short_tick: (Duration::ZERO, Duration::from_millis(2)),
        long_tick: (Duration::ZERO, Duration::ZERO),
        poll_backoff: Duration::from_micros(200),
        advance_timeout: Some(WAIT),
        coupling_timeout: Some(WAIT),
        ownership_timeout: Some(WAIT),
    }
}

pub fn test_config(federate: &str, federation: &str, num_federates: usize) -> FederateConfig {
    FederateConfig {
        federate_name: federate.to_string(),
        federation_name: federation.to_string(),
        fed_file: "test.fed".to_string(),
        num_federates,
        single_instance: false,
        tick: test_tick_config(),
        ..FederateConfig::default()
    }
}

pub fn start_federate(
    federation: &LocalFederation,
    config: FederateConfig,
) -> Result<FederateManager, FederateError> {
    FederateManager::create(config, test_classes(), Box::new(federation.ambassador()))
}

/// A lone federate that leads its own federation
pub fn solo_federate(federation: &LocalFederation, name: &str) -> FederateManager {
    start_federate(federation, test_config(name, name, 1)).expect("solo federate starts")
}

/// One tick in the schedule's phase order: advance, route callbacks, apply remote changes,
/// then reset ownership
pub fn step(manager: &mut FederateManager, time: LogicalTime) -> Result<(), FederateError> {
    manager.advance_to(time, true)?;
    manager.flush_callback_buffer()?;
    manager.flush_external_event_queue();
    manager.reset_ownership();
    Ok(())
}

/// Start `count` federates of one federation on their own threads and run `body` on each
///
/// Managers are not `Send`, so each is created on the thread that drives it.
pub fn run_federates<T, F>(
    federation: &LocalFederation,
    name: &str,
    count: usize,
    body: F,
) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize, FederateManager) -> T + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let handles: Vec<_> = (0..count)
        .map(|index| {
            let federation = federation.clone();
            let body = body.clone();
            let config = test_config(&format!("federate-{index}"), name, count);
            thread::spawn(move || {
                let manager = start_federate(&federation, config).expect("federate starts");
                body(index, manager)
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|handle| handle.join().expect("federate thread panicked"))
        .collect()
}
