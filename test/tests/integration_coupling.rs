/// Tests for joining, the coupling rendezvous and leaving the federation

use std::time::Duration;

use hla_sim_federate::{CouplingError, FederateError, FederateManager};
use hla_sim_shared::{ClassLookup, ClassLookupError, FederateRole, LinkError, ObjectClass, RtiError};
use hla_sim_test::{
    init_logging, run_federates, solo_federate, start_federate, test_classes, test_config,
    test_federation, BasicTestObject, LocalFederation, ObjectModel, BASIC_TEST_OBJECT,
};

#[test]
fn a_lone_federate_leads_its_own_session() {
    init_logging();
    let federation = test_federation();

    let manager = solo_federate(&federation, "alone");

    assert_eq!(manager.role(), FederateRole::Leader);
    assert!(manager.session_id().millis() > 0);
    assert_eq!(manager.time().unwrap(), 0.0);
    assert_eq!(manager.federate_name(), "alone");
    assert_eq!(manager.federation_name(), "alone");
    assert_eq!(federation.joined("alone"), 1);

    manager.end_participation().unwrap();
    assert!(!federation.federation_exists("alone"));
}

#[test]
fn every_federate_converges_on_one_session() {
    init_logging();
    let federation = test_federation();

    let results = run_federates(&federation, "trio", 3, |_, manager| {
        let outcome = (manager.session_id(), manager.role());
        manager.end_participation().unwrap();
        outcome
    });

    let leaders = results
        .iter()
        .filter(|(_, role)| *role == FederateRole::Leader)
        .count();
    assert_eq!(leaders, 1);
    assert!(results.iter().all(|(session, _)| *session == results[0].0));
    assert!(!federation.federation_exists("trio"));
}

#[test]
fn missing_admin_classes_are_fatal() {
    init_logging();
    let model = ObjectModel::empty().with_class(BASIC_TEST_OBJECT, BasicTestObject::VARIABLES);
    let federation = LocalFederation::new(model);

    let result = start_federate(&federation, test_config("lost", "no-admin", 1));

    assert!(matches!(
        result,
        Err(FederateError::Coupling(CouplingError::MissingAdminClass {
            class: "node",
            source: RtiError::NameNotFound { .. },
            ..
        }))
    ));
}

#[test]
fn bad_class_trees_are_rejected_before_joining() {
    init_logging();
    let federation = test_federation();
    let mut classes = ClassLookup::new();
    classes.add_class(ObjectClass::new("Empty", &[])).unwrap();

    let result = FederateManager::create(
        test_config("picky", "rejected", 1),
        classes,
        Box::new(federation.ambassador()),
    );

    assert!(matches!(
        result,
        Err(FederateError::BadClassTree {
            source: ClassLookupError::BadClassTree { .. }
        })
    ));
    assert!(!federation.federation_exists("rejected"));
}

#[test]
fn undeclared_model_classes_fail_name_resolution() {
    init_logging();
    let federation = LocalFederation::new(ObjectModel::new());

    let result = FederateManager::create(
        test_config("orphan", "no-model", 1),
        test_classes(),
        Box::new(federation.ambassador()),
    );

    assert!(matches!(
        result,
        Err(FederateError::Lookup(ClassLookupError::Rti { .. }))
    ));
}

#[test]
fn joining_without_creating_waits_for_the_federation() {
    init_logging();
    let federation = test_federation();
    let mut config = test_config("late", "absent", 1);
    config.create_federation = false;
    config.tick.coupling_timeout = Some(Duration::from_millis(50));

    let result = start_federate(&federation, config);

    assert!(matches!(
        result,
        Err(FederateError::Link(LinkError::TimedOut { .. }))
    ));
    assert!(!federation.federation_exists("absent"));
}
