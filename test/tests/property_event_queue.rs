/// Property tests for the logical-time event queue

use hla_sim_shared::EventQueue;
use proptest::prelude::*;

fn drain<T>(queue: &mut EventQueue<T>) -> Vec<(f64, T)> {
    std::iter::from_fn(|| queue.next()).collect()
}

#[test]
fn ties_leave_in_arrival_order() {
    let mut queue = EventQueue::new();
    for (index, time) in [5.0, 2.0, 2.0, 8.0].into_iter().enumerate() {
        queue.enqueue(index, time);
    }

    let drained = drain(&mut queue);

    assert_eq!(drained, vec![(2.0, 1), (2.0, 2), (5.0, 0), (8.0, 3)]);
}

proptest! {
    #[test]
    fn drained_times_never_decrease(times in prop::collection::vec(0u16..50, 0..64)) {
        let mut queue = EventQueue::new();
        for (index, time) in times.iter().enumerate() {
            queue.enqueue(index, f64::from(*time));
        }

        let drained = drain(&mut queue);

        prop_assert_eq!(drained.len(), times.len());
        prop_assert!(drained.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }

    #[test]
    fn equal_times_keep_their_insertion_order(times in prop::collection::vec(0u8..4, 1..64)) {
        let mut queue = EventQueue::new();
        for (index, time) in times.iter().enumerate() {
            queue.enqueue(index, f64::from(*time));
        }

        let drained = drain(&mut queue);

        for pair in drained.windows(2) {
            if pair[0].0 == pair[1].0 {
                prop_assert!(pair[0].1 < pair[1].1);
            }
        }
        prop_assert_eq!(queue.find_last(), f64::from(*times.iter().max().unwrap()));
    }

    #[test]
    fn peek_always_names_the_next_time(times in prop::collection::vec(-1.0e6f64..1.0e6, 1..32)) {
        let mut queue = EventQueue::new();
        for time in &times {
            queue.enqueue((), *time);
        }

        while let Some(peeked) = queue.peek_time() {
            let (time, ()) = queue.next().unwrap();
            prop_assert_eq!(peeked, time);
        }
        prop_assert!(queue.is_empty());
    }
}
