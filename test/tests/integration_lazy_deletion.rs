/// Tests for deleting local objects once model code drops them

use std::{cell::RefCell, rc::Rc};

use hla_sim_federate::{DistributedSchedule, FederateError, FederateManager};
use hla_sim_shared::{share, ObjectError, SharedObject};
use hla_sim_test::{
    init_logging, run_federates, solo_federate, step, test_federation, BasicTestObject, Country,
    BASIC_TEST_OBJECT,
};

#[test]
fn dropped_objects_are_swept_exactly_once() {
    init_logging();
    let federation = test_federation();
    let mut manager = solo_federate(&federation, "sweep");
    let kept = share(BasicTestObject::named("kept"));
    let dropped = share(Country::new("Quito", 2_000_000));
    manager.register_public_object(&kept).unwrap();
    let handle = manager.register_public_object(&dropped).unwrap();
    let live = federation.instances("sweep");

    drop(dropped);

    assert_eq!(manager.clean_public_objects(), vec![handle]);
    assert!(manager.clean_public_objects().is_empty());
    assert!(manager.find_object(handle).is_none());
    assert_eq!(manager.objects().locals().references().len(), 1);
    assert_eq!(federation.instances("sweep"), live - 1);
    manager.end_participation().unwrap();
}

#[test]
fn explicitly_deleted_objects_are_not_swept_again() {
    init_logging();
    let federation = test_federation();
    let mut manager = solo_federate(&federation, "explicit");
    let object = share(BasicTestObject::default());
    let handle = manager.register_public_object(&object).unwrap();

    assert_eq!(manager.delete_public_object(&object).unwrap(), handle);
    drop(object);

    assert!(manager.clean_public_objects().is_empty());
    manager.end_participation().unwrap();
}

#[test]
fn deleting_an_unregistered_object_is_an_error() {
    init_logging();
    let federation = test_federation();
    let mut manager = solo_federate(&federation, "unregistered");
    let object = share(BasicTestObject::default());

    let result = manager.delete_public_object(&object);

    assert!(matches!(
        result,
        Err(ObjectError::NotRegistered { ref class }) if class == BASIC_TEST_OBJECT
    ));
    manager.end_participation().unwrap();
}

#[test]
fn the_schedule_sweeps_only_when_lazy_deletion_is_on() {
    init_logging();
    let federation = test_federation();
    let mut manager = solo_federate(&federation, "scheduled-sweep");
    let holder: Rc<RefCell<Vec<SharedObject>>> = Rc::new(RefCell::new(Vec::new()));
    let mut schedule: DistributedSchedule = DistributedSchedule::default();

    let registering = holder.clone();
    schedule
        .base_mut()
        .schedule_at(
            1.0,
            Box::new(move |manager: &mut FederateManager| -> Result<(), FederateError> {
                for name in ["first", "second"] {
                    let object = share(BasicTestObject::named(name));
                    manager.register_public_object(&object)?;
                    registering.borrow_mut().push(object);
                }
                Ok(())
            }),
        )
        .unwrap();
    let dropping = holder.clone();
    schedule
        .base_mut()
        .schedule_repeating(
            2.0,
            1.0,
            Box::new(move |_: &mut FederateManager| -> Result<(), FederateError> {
                dropping.borrow_mut().pop();
                Ok(())
            }),
        )
        .unwrap();

    schedule.run_until(&mut manager, 2.0).unwrap();
    // nothing is swept while lazy deletion is off
    assert_eq!(manager.objects().locals().references().len(), 2);

    manager.set_lazy_deletion(true);
    schedule.run_until(&mut manager, 3.0).unwrap();
    assert_eq!(manager.objects().locals().references().len(), 0);
    assert!(holder.borrow().is_empty());
    manager.end_participation().unwrap();
}

#[test]
fn a_mirror_sees_swept_objects_disappear() {
    init_logging();
    let federation = test_federation();

    let remaining = run_federates(&federation, "mirror-sweep", 2, |index, mut manager| {
        step(&mut manager, 1.0).unwrap();
        if index == 0 {
            let object = share(BasicTestObject::named("ephemeral"));
            manager.register_public_object(&object).unwrap();
            step(&mut manager, 2.0).unwrap();
            drop(object);
            assert_eq!(manager.clean_public_objects().len(), 1);
            step(&mut manager, 3.0).unwrap();
            manager.end_participation().unwrap();
            return None;
        }

        step(&mut manager, 2.0).unwrap();
        let before = manager.proxies(BASIC_TEST_OBJECT).unwrap().len();
        step(&mut manager, 3.0).unwrap();
        let after = manager.proxies(BASIC_TEST_OBJECT).unwrap().len();
        manager.end_participation().unwrap();
        Some((before, after))
    });

    assert_eq!(remaining[1], Some((1, 0)));
}
