//! Integration tests for `EventQueue` ordering, counting, and concurrency.
//!
//! Emitters and resources are plain structs owned by each test; events
//! borrow them, so every test keeps them alive for the queue's lifetime.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use eventq_queue::{Event, EventQueue, EventStatus, Priority, QueueConfig, QueueError};
use rand::Rng;

struct Emitter {
    index: usize,
}

struct Resource {
    name: &'static str,
}

fn emitters(count: usize) -> Vec<Emitter> {
    (0..count).map(|index| Emitter { index }).collect()
}

#[test]
fn scenario_mixed_priorities() {
    let emitters = emitters(5);
    let water = Resource { name: "water" };
    let queue = EventQueue::new();

    for (emitter, prio) in emitters.iter().zip([3, 7, 1, 7, 5]) {
        queue
            .push(Event::new(emitter, &water, EventStatus::OK, Priority(prio), 0))
            .unwrap();
    }

    let order: Vec<(i32, usize)> = (0..5)
        .map(|_| queue.pop().unwrap())
        .map(|e| (e.priority().value(), e.emitter().index))
        .collect();

    assert_eq!(order, vec![(7, 1), (7, 3), (5, 4), (3, 0), (1, 2)]);
    assert!(queue.pop().is_none());
}

#[test]
fn fifo_tie_break_for_equal_priority() {
    let emitters = emitters(3);
    let oil = Resource { name: "oil" };
    let queue = EventQueue::new();

    for emitter in &emitters {
        queue
            .push(Event::new(emitter, &oil, EventStatus::LOW, Priority(5), 1))
            .unwrap();
    }

    for expected in 0..3 {
        let event = queue.pop().unwrap();
        assert_eq!(event.emitter().index, expected);
        assert_eq!(event.resource().name, "oil");
    }
}

#[test]
fn random_pushes_pop_in_non_increasing_order() {
    let emitters = emitters(200);
    let ore = Resource { name: "ore" };
    let queue = EventQueue::new();
    let mut rng = rand::rng();

    for emitter in &emitters {
        let prio: i32 = rng.random_range(-10..=10);
        queue
            .push(Event::new(emitter, &ore, EventStatus::OK, Priority(prio), 0))
            .unwrap();
    }

    let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
    assert_eq!(popped.len(), 200);
    for pair in popped.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.priority() >= b.priority());
        if a.priority() == b.priority() {
            // Ties keep push order, and emitters were pushed by index.
            assert!(a.emitter().index < b.emitter().index);
        }
    }
}

#[test]
fn len_matches_poppable_entries() {
    let emitters = emitters(10);
    let wood = Resource { name: "wood" };
    let queue = EventQueue::new();

    for (i, emitter) in emitters.iter().enumerate() {
        queue
            .push(Event::new(emitter, &wood, EventStatus::OK, Priority::STANDARD, 0))
            .unwrap();
        if i % 3 == 0 {
            queue.pop().unwrap();
        }
    }

    let reported = queue.len();
    let mut poppable = 0;
    while queue.pop().is_some() {
        poppable += 1;
    }
    assert_eq!(reported, poppable);
    assert_eq!(queue.len(), 0);
}

#[test]
fn empty_pop_is_idempotent() {
    let queue: EventQueue<'_, Emitter, Resource> = EventQueue::new();

    for _ in 0..100 {
        assert!(queue.pop().is_none());
    }
    assert!(queue.is_empty());
    let stats = queue.stats();
    assert_eq!(stats.popped, 0);
    assert_eq!(stats.len, 0);
}

#[test]
fn producer_mutation_after_push_does_not_affect_queue() {
    let emitter = Emitter { index: 0 };
    let fuel = Resource { name: "fuel" };
    let queue = EventQueue::new();

    let mut event = Event::new(&emitter, &fuel, EventStatus::OK, Priority::LOW, 10);
    queue.push(event).unwrap();
    event = Event::new(&emitter, &fuel, EventStatus::EMPTY, Priority::HIGH, 99);

    let stored = queue.pop().unwrap();
    assert_eq!(stored.amount(), 10);
    assert_eq!(stored.status(), EventStatus::OK);
    assert_eq!(event.amount(), 99);
}

#[test]
fn drain_returns_pop_order_and_empties_queue() {
    let emitters = emitters(4);
    let stone = Resource { name: "stone" };
    let queue = EventQueue::new();

    for (emitter, prio) in emitters.iter().zip([1, 3, 3, 2]) {
        queue
            .push(Event::new(emitter, &stone, EventStatus::OK, Priority(prio), 0))
            .unwrap();
    }

    let drained: Vec<usize> = queue.drain().iter().map(|e| e.emitter().index).collect();
    assert_eq!(drained, vec![1, 2, 3, 0]);
    assert!(queue.is_empty());
    assert!(queue.drain().is_empty());
}

#[test]
fn teardown_reports_remaining_entries() {
    let emitters = emitters(6);
    let gas = Resource { name: "gas" };
    let queue = EventQueue::with_config(&QueueConfig::default()).unwrap();

    for emitter in &emitters {
        queue
            .push(Event::new(emitter, &gas, EventStatus::OK, Priority::LOW, 0))
            .unwrap();
    }
    queue.pop().unwrap();

    assert_eq!(queue.len(), 5);
    assert_eq!(queue.teardown(), 5);

    let empty: EventQueue<'_, Emitter, Resource> = EventQueue::new();
    assert_eq!(empty.teardown(), 0);
}

#[test]
fn bounded_push_reports_full_as_transient() {
    let emitter = Emitter { index: 0 };
    let sand = Resource { name: "sand" };
    let config = QueueConfig::parse("capacity: 1").unwrap();
    let queue = EventQueue::with_config(&config).unwrap();

    queue
        .push(Event::new(&emitter, &sand, EventStatus::OK, Priority::LOW, 0))
        .unwrap();
    let err = queue
        .push(Event::new(&emitter, &sand, EventStatus::OK, Priority::HIGH, 0))
        .unwrap_err();

    assert!(matches!(err, QueueError::Full { capacity: 1 }));
    assert!(err.is_transient());
    assert_eq!(queue.capacity(), Some(1));
}

#[test]
fn unsatisfiable_reservation_is_a_permanent_error() {
    let config = QueueConfig {
        capacity: 0,
        initial_slots: usize::MAX,
    };
    let err = EventQueue::<'_, Emitter, Resource>::with_config(&config).unwrap_err();

    assert!(matches!(err, QueueError::ResourceExhausted { .. }));
    assert!(!err.is_transient());
}

#[test]
fn extreme_priorities_interleaved_with_pops() {
    let emitters = emitters(8);
    let salt = Resource { name: "salt" };
    let queue = EventQueue::new();
    let push = |index: usize, prio: i32| {
        queue
            .push(Event::new(&emitters[index], &salt, EventStatus::OK, Priority(prio), 0))
            .unwrap();
    };

    for (index, prio) in [i32::MIN, 0, i32::MAX, -1, i32::MAX].into_iter().enumerate() {
        push(index, prio);
    }
    assert_eq!(queue.pop().unwrap().emitter().index, 2);
    push(5, i32::MIN);
    push(6, 0);
    push(7, 0);

    let order: Vec<(i32, usize)> = queue
        .drain()
        .iter()
        .map(|e| (e.priority().value(), e.emitter().index))
        .collect();
    assert_eq!(
        order,
        vec![(i32::MAX, 4), (0, 1), (0, 6), (0, 7), (-1, 3), (i32::MIN, 0), (i32::MIN, 5)]
    );

    // Refill after draining to empty.
    push(0, 1);
    push(1, 2);
    assert_eq!(queue.pop().unwrap().emitter().index, 1);
    assert_eq!(queue.pop().unwrap().emitter().index, 0);
    assert!(queue.pop().is_none());
}

#[test]
fn concurrent_producers_and_consumers_conserve_events() {
    const PRODUCERS: usize = 8;
    const CONSUMERS: usize = 8;
    const PER_PRODUCER: usize = 500;

    let emitters = emitters(PRODUCERS);
    let water = Resource { name: "water" };
    let queue = EventQueue::new();
    let producers_done = AtomicUsize::new(0);

    let popped: Vec<Vec<(usize, i32)>> = thread::scope(|scope| {
        for emitter in &emitters {
            let queue = &queue;
            let water = &water;
            let producers_done = &producers_done;
            scope.spawn(move || {
                let mut rng = rand::rng();
                for seq in 0..PER_PRODUCER {
                    let prio = Priority(rng.random_range(1..=3));
                    let amount = i32::try_from(seq).unwrap();
                    queue
                        .push(Event::new(emitter, water, EventStatus::OK, prio, amount))
                        .unwrap();
                }
                producers_done.fetch_add(1, Ordering::AcqRel);
            });
        }

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let queue = &queue;
                let producers_done = &producers_done;
                scope.spawn(move || {
                    let mut seen = Vec::new();
                    loop {
                        match queue.pop() {
                            Some(event) => seen.push((event.emitter().index, event.amount())),
                            None if producers_done.load(Ordering::Acquire) == PRODUCERS => {
                                if queue.is_empty() {
                                    break;
                                }
                            }
                            None => thread::yield_now(),
                        }
                    }
                    seen
                })
            })
            .collect();

        consumers.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let total: usize = popped.iter().map(Vec::len).sum();
    assert_eq!(total, PRODUCERS * PER_PRODUCER);

    let unique: HashSet<(usize, i32)> = popped.into_iter().flatten().collect();
    assert_eq!(unique.len(), PRODUCERS * PER_PRODUCER);

    assert!(queue.is_empty());
    let stats = queue.stats();
    assert_eq!(stats.pushed, u64::try_from(PRODUCERS * PER_PRODUCER).unwrap());
    assert_eq!(stats.popped, stats.pushed);
    assert_eq!(queue.teardown(), 0);
}

#[test]
fn arc_shared_queue_with_static_collaborators() {
    static EMITTER: Emitter = Emitter { index: 42 };
    static CLAY: Resource = Resource { name: "clay" };

    let queue: Arc<EventQueue<'static, Emitter, Resource>> = Arc::new(EventQueue::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for _ in 0..25 {
                    queue
                        .push(Event::new(&EMITTER, &CLAY, EventStatus::OK, Priority(i), i))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(queue.len(), 100);
    assert_eq!(queue.peek().map(|e| e.priority()), Some(Priority(3)));
    let first = queue.pop().unwrap();
    assert_eq!(first.emitter().index, 42);
    assert_eq!(first.resource().name, "clay");
}
