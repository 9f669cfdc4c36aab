use std::default::Default;

use hla_sim_shared::{CallbackLogging, TickConfig};

/// Contains Config properties which will be used by a FederateManager
#[derive(Clone, Debug)]
pub struct FederateConfig {
    /// Name this federate joins under
    pub federate_name: String,
    /// Federation execution to create or join
    pub federation_name: String,
    /// Federation object model handed to the RTI on creation
    pub fed_file: String,
    /// Federates taking part in the coupling rendezvous, leader included
    pub num_federates: usize,
    /// Try to create the federation execution; whoever succeeds leads the rendezvous
    pub create_federation: bool,
    /// Delete local objects once model code drops its last handle to them
    pub lazy_deletion: bool,
    /// Refuse to start a second manager in the same process
    pub single_instance: bool,
    /// Tick bounds, polling backoff and timeouts for the spin loops
    pub tick: TickConfig,
    /// Which callback families are traced at debug level
    pub logging: CallbackLogging,
}

impl Default for FederateConfig {
    fn default() -> Self {
        Self {
            federate_name: "federate".to_string(),
            federation_name: "federation".to_string(),
            fed_file: "federation.fed".to_string(),
            num_federates: 1,
            create_federation: true,
            lazy_deletion: false,
            single_instance: true,
            tick: TickConfig::default(),
            logging: CallbackLogging::default(),
        }
    }
}
