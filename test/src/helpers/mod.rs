pub mod harness;

pub use harness::{
    init_logging, run_federates, solo_federate, start_federate, step, test_classes, test_config,
    test_federation, test_model, test_tick_config,
};
pub use models::{BasicTestObject, Country, BASIC_TEST_OBJECT, COUNTRY};
