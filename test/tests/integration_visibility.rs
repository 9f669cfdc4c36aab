/// Tests for discovering, completing and removing proxies of remote objects

use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, Barrier},
};

use hla_sim_shared::{
    object_mut, object_ref, share, AttributeValues, Exclusive, InstanceListener, ObjectHandle,
    SharedObject,
};
use hla_sim_test::{
    init_logging, run_federates, step, test_federation, BasicTestObject, Country,
    BASIC_TEST_OBJECT, COUNTRY,
};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Added(ObjectHandle, String),
    Removed(ObjectHandle),
}

struct Watcher {
    seen: Rc<RefCell<Vec<Seen>>>,
}

impl InstanceListener for Watcher {
    fn instance_added(&mut self, object: ObjectHandle, proxy: &SharedObject) {
        let capital = object_ref::<Country>(proxy)
            .map(|country| country.capital.get().clone())
            .unwrap_or_default();
        self.seen.borrow_mut().push(Seen::Added(object, capital));
    }

    fn instance_removed(&mut self, object: ObjectHandle, _: &SharedObject) {
        self.seen.borrow_mut().push(Seen::Removed(object));
    }
}

#[derive(Debug, Default)]
struct Observed {
    registered: Option<ObjectHandle>,
    discovered_but_hidden: bool,
    visible_after_reflection: bool,
    population: i32,
    gone_after_removal: bool,
    seen: Vec<Seen>,
}

#[test]
fn proxies_appear_once_complete_and_leave_on_removal() {
    init_logging();
    let federation = test_federation();

    let observed = run_federates(&federation, "visibility", 2, |index, mut manager| {
        let mut observed = Observed::default();

        if index == 0 {
            step(&mut manager, 1.0).unwrap();
            let country = share(Country::new("Oslo", 5_000_000));
            observed.registered = Some(manager.register_public_object(&country).unwrap());
            step(&mut manager, 2.0).unwrap();
            manager.delete_public_object(&country).unwrap();
            step(&mut manager, 3.0).unwrap();
            manager.end_participation().unwrap();
            return observed;
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        manager
            .proxy_list(COUNTRY)
            .unwrap()
            .add_listener(Box::new(Watcher { seen: seen.clone() }));
        step(&mut manager, 1.0).unwrap();

        // the discovery is applied straight away, the snapshot waits in the external queue
        manager.advance_to(2.0, true).unwrap();
        manager.flush_callback_buffer().unwrap();
        {
            let list = manager.proxy_list(COUNTRY).unwrap();
            observed.discovered_but_hidden =
                list.incomplete_len() == 1 && list.is_empty() && list.proxies().is_empty();
        }
        manager.flush_external_event_queue();
        manager.reset_ownership();

        let proxies = manager.proxies(COUNTRY).unwrap();
        observed.visible_after_reflection = proxies.len() == 1;
        if let Some(proxy) = proxies.first() {
            observed.population = *object_ref::<Country>(proxy).unwrap().population.get();
        }

        step(&mut manager, 3.0).unwrap();
        observed.gone_after_removal = manager.proxies(COUNTRY).unwrap().is_empty()
            && seen
                .borrow()
                .iter()
                .any(|event| matches!(event, Seen::Removed(_)));
        observed.seen = seen.borrow().clone();
        manager.end_participation().unwrap();
        observed
    });

    let registered = observed[0].registered.unwrap();
    let mirror = &observed[1];
    assert!(mirror.discovered_but_hidden);
    assert!(mirror.visible_after_reflection);
    assert_eq!(mirror.population, 5_000_000);
    assert!(mirror.gone_after_removal);
    assert_eq!(
        mirror.seen,
        vec![
            Seen::Added(registered, "Oslo".to_string()),
            Seen::Removed(registered)
        ]
    );
}

#[test]
fn a_registrar_never_mirrors_its_own_objects() {
    init_logging();
    let federation = test_federation();

    let counts = run_federates(&federation, "own-objects", 1, |_, mut manager| {
        step(&mut manager, 1.0).unwrap();
        let country = share(Country::new("Lima", 10_000_000));
        let handle = manager.register_public_object(&country).unwrap();
        step(&mut manager, 2.0).unwrap();

        let proxies = manager.proxies(COUNTRY).unwrap().len();
        let found = manager
            .find_object(handle)
            .is_some_and(|found| Rc::ptr_eq(&found, &country));
        manager.end_participation().unwrap();
        (proxies, found)
    });

    assert_eq!(counts, vec![(0, true)]);
}

#[test]
fn proxy_variables_report_each_reflected_change() {
    init_logging();
    let federation = test_federation();

    let changes = run_federates(&federation, "changes", 2, |index, mut manager| {
        step(&mut manager, 1.0).unwrap();
        if index == 0 {
            let object = share(BasicTestObject::named("watched"));
            manager.register_public_object(&object).unwrap();
            step(&mut manager, 2.0).unwrap();
            manager
                .write(&object, "value", |value: &mut Exclusive<i32>| value.set(7))
                .unwrap();
            step(&mut manager, 3.0).unwrap();
            manager.end_participation().unwrap();
            return Vec::new();
        }

        step(&mut manager, 2.0).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let proxy = manager.proxies(BASIC_TEST_OBJECT).unwrap()[0].clone();
        let recording = changes.clone();
        object_mut::<BasicTestObject>(&proxy)
            .unwrap()
            .value
            .add_listener(move |old, new| recording.borrow_mut().push((*old, *new)));
        step(&mut manager, 3.0).unwrap();
        manager.end_participation().unwrap();
        let changes = changes.borrow().clone();
        changes
    });

    assert_eq!(changes[1], vec![(0, 7)]);
}

#[test]
fn an_unorderable_reflection_does_not_drop_the_rest_of_its_batch() {
    init_logging();
    let federation = test_federation();
    let injector = federation.clone();
    let injected = Arc::new(Barrier::new(2));

    let mirrored = run_federates(&federation, "unorderable", 2, move |index, mut manager| {
        step(&mut manager, 1.0).unwrap();
        if index == 0 {
            // registered after the bad reflection, so its discovery shares the batch
            injected.wait();
            let country = share(Country::new("Bern", 9_000_000));
            manager.register_public_object(&country).unwrap();
            step(&mut manager, 2.0).unwrap();
            step(&mut manager, 3.0).unwrap();
            manager.end_participation().unwrap();
            return 0;
        }

        injector.inject_reflection(
            "unorderable",
            manager.federate_handle(),
            ObjectHandle::new(9_999),
            AttributeValues::new(),
            Some(f64::NAN),
        );
        injected.wait();
        step(&mut manager, 2.0).unwrap();
        let mirrored = manager.proxies(COUNTRY).unwrap().len();
        step(&mut manager, 3.0).unwrap();
        manager.end_participation().unwrap();
        mirrored
    });

    assert_eq!(mirrored[1], 1);
}
