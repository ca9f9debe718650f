//! Concurrent producer/consumer workload against a single queue.
//!
//! The workload owns the emitter and resource objects for the whole run and
//! lends them to events, so every queued event's borrows stay valid until
//! the queue is torn down.
//!
//! Producers retry a push that fails with a transient error (a bounded
//! queue at capacity) for as long as a consumer is still running. Consumers
//! poll `pop` and yield while the queue is empty, exiting once every
//! producer has finished and nothing is left. Workers record their exit
//! from a drop guard, so a panicking worker still counts as finished.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use rand::Rng;
use tracing::{debug, info};

use eventq_queue::{EventQueue, QueueError, QueueStats};
use eventq_types::{EmitterId, Event, EventStatus, Priority, ResourceId};

use crate::config::LoadgenConfig;
use crate::error::LoadgenError;

/// An entity that produces events.
#[derive(Debug)]
pub struct Emitter {
    /// Stable identity.
    pub id: EmitterId,
    /// Display name.
    pub name: String,
}

/// A resource that events refer to.
#[derive(Debug)]
pub struct Resource {
    /// Stable identity.
    pub id: ResourceId,
    /// Display name.
    pub name: String,
}

/// Exit counts shared by every worker of a run.
#[derive(Debug, Default)]
struct Progress {
    producers_done: AtomicUsize,
    consumers_done: AtomicUsize,
}

/// Bumps an exit counter when dropped, including while unwinding.
struct ExitGuard<'p>(&'p AtomicUsize);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

/// Outcome of one producer thread.
#[derive(Debug, Default)]
struct ProducerTally {
    pushed: u64,
    retries: u64,
}

/// Outcome of one consumer thread.
#[derive(Debug, Default)]
struct ConsumerTally {
    popped: u64,
    by_priority: BTreeMap<Priority, u64>,
    by_status: BTreeMap<EventStatus, u64>,
    total_amount: i64,
}

/// Aggregate results of a run.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Events successfully pushed across all producers.
    pub pushed: u64,
    /// Events popped across all consumers.
    pub popped: u64,
    /// Pushes retried after a transient queue error.
    pub retries: u64,
    /// Popped events per priority.
    pub by_priority: BTreeMap<Priority, u64>,
    /// Popped events per status.
    pub by_status: BTreeMap<EventStatus, u64>,
    /// Sum of popped event amounts.
    pub total_amount: i64,
    /// Queue counters captured just before teardown.
    pub stats: QueueStats,
    /// Entries released by teardown.
    pub released: usize,
}

impl core::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} pushed, {} popped, {} retries, amount total {} ({})",
            self.pushed, self.popped, self.retries, self.total_amount, self.stats
        )
    }
}

/// Build the emitters owned by the run, one per producer.
pub fn build_emitters(count: usize) -> Vec<Emitter> {
    (0..count)
        .map(|i| Emitter {
            id: EmitterId::new(),
            name: format!("emitter-{i}"),
        })
        .collect()
}

/// Build the resources named in the configuration.
pub fn build_resources(names: &[String]) -> Vec<Resource> {
    names
        .iter()
        .map(|name| Resource {
            id: ResourceId::new(),
            name: name.clone(),
        })
        .collect()
}

/// Run the configured workload to completion.
///
/// # Errors
///
/// Returns [`LoadgenError::InvalidConfig`] for an unrunnable configuration,
/// [`LoadgenError::Queue`] if a push fails permanently,
/// [`LoadgenError::WorkerPanicked`] if a thread panics, and
/// [`LoadgenError::Imbalance`] if events were lost or duplicated.
pub fn run(config: &LoadgenConfig) -> Result<LoadReport, LoadgenError> {
    config.validate()?;

    let emitters = build_emitters(config.producers);
    let resources = build_resources(&config.resources);
    let queue = EventQueue::with_config(&config.queue)?;

    info!(
        producers = config.producers,
        consumers = config.consumers,
        events_per_producer = config.events_per_producer,
        resources = resources.len(),
        "Starting workload"
    );
    for resource in &resources {
        debug!(resource = %resource.id, resource_name = resource.name, "Resource registered");
    }

    let progress = Progress::default();
    let (producer_results, consumer_results) = thread::scope(|scope| {
        let producers: Vec<_> = emitters
            .iter()
            .map(|emitter| {
                let queue = &queue;
                let resources = resources.as_slice();
                let progress = &progress;
                scope.spawn(move || {
                    let _exit = ExitGuard(&progress.producers_done);
                    produce(queue, emitter, resources, config, progress)
                })
            })
            .collect();

        let consumers: Vec<_> = (0..config.consumers)
            .map(|_| {
                let queue = &queue;
                let progress = &progress;
                scope.spawn(move || {
                    let _exit = ExitGuard(&progress.consumers_done);
                    consume(queue, progress, config.producers)
                })
            })
            .collect();

        let producer_results: Vec<_> = producers
            .into_iter()
            .map(thread::ScopedJoinHandle::join)
            .collect();
        let consumer_results: Vec<_> = consumers
            .into_iter()
            .map(thread::ScopedJoinHandle::join)
            .collect();
        (producer_results, consumer_results)
    });

    let mut report = LoadReport::default();

    // Consumers first: a dead consumer is why producers give up on a full queue.
    for result in consumer_results {
        let tally = result.map_err(|_panic| LoadgenError::WorkerPanicked { role: "consumer" })?;
        report.popped = report.popped.saturating_add(tally.popped);
        report.total_amount = report.total_amount.saturating_add(tally.total_amount);
        merge_counts(&mut report.by_priority, tally.by_priority);
        merge_counts(&mut report.by_status, tally.by_status);
    }

    for result in producer_results {
        let tally = result.map_err(|_panic| LoadgenError::WorkerPanicked { role: "producer" })??;
        report.pushed = report.pushed.saturating_add(tally.pushed);
        report.retries = report.retries.saturating_add(tally.retries);
    }

    report.stats = queue.stats();
    let remaining = report.stats.len;
    report.released = queue.teardown();

    if report.pushed != report.popped || report.released != 0 {
        return Err(LoadgenError::Imbalance {
            pushed: report.pushed,
            popped: report.popped,
            remaining,
        });
    }

    Ok(report)
}

/// Push `config.events_per_producer` randomized events from `emitter`.
///
/// A transient push error is retried until every consumer has exited, at
/// which point it is returned.
fn produce<'a>(
    queue: &EventQueue<'a, Emitter, Resource>,
    emitter: &'a Emitter,
    resources: &'a [Resource],
    config: &LoadgenConfig,
    progress: &Progress,
) -> Result<ProducerTally, QueueError> {
    let mut rng = rand::rng();
    let mut tally = ProducerTally::default();
    let priorities = Priority::LOW.value()..=Priority::HIGH.value();
    let statuses = EventStatus::EMPTY.code()..=EventStatus::CAPACITY.code();

    for _ in 0..config.events_per_producer {
        let Some(resource) = resources.get(rng.random_range(0..resources.len())) else {
            continue;
        };
        let priority = Priority::from(rng.random_range(priorities.clone()));
        let status = EventStatus::from(rng.random_range(statuses.clone()));
        let amount: i32 = rng.random_range(1..=100);
        let event = Event::new(emitter, resource, status, priority, amount);

        loop {
            match queue.push(event) {
                Ok(()) => break,
                Err(e) if e.is_transient() => {
                    if progress.consumers_done.load(Ordering::Acquire) >= config.consumers {
                        return Err(e);
                    }
                    tally.retries = tally.retries.saturating_add(1);
                    thread::yield_now();
                }
                Err(e) => return Err(e),
            }
        }
        tally.pushed = tally.pushed.saturating_add(1);
    }

    debug!(
        emitter = %emitter.id,
        emitter_name = emitter.name,
        pushed = tally.pushed,
        retries = tally.retries,
        "Producer finished"
    );
    Ok(tally)
}

/// Poll the queue until all `producers` have finished and it is empty.
fn consume(
    queue: &EventQueue<'_, Emitter, Resource>,
    progress: &Progress,
    producers: usize,
) -> ConsumerTally {
    let mut tally = ConsumerTally::default();

    loop {
        if let Some(event) = queue.pop() {
            tally.popped = tally.popped.saturating_add(1);
            tally.total_amount = tally.total_amount.saturating_add(i64::from(event.amount()));
            bump(&mut tally.by_priority, event.priority());
            bump(&mut tally.by_status, event.status());
            continue;
        }
        // Producers only count as finished after their last push, so an
        // empty queue observed afterwards stays empty.
        if progress.producers_done.load(Ordering::Acquire) >= producers && queue.is_empty() {
            break;
        }
        thread::yield_now();
    }

    debug!(popped = tally.popped, "Consumer finished");
    tally
}

fn bump<K: Ord>(counts: &mut BTreeMap<K, u64>, key: K) {
    let count = counts.entry(key).or_insert(0);
    *count = count.saturating_add(1);
}

fn merge_counts<K: Ord>(into: &mut BTreeMap<K, u64>, from: BTreeMap<K, u64>) {
    for (key, n) in from {
        let count = into.entry(key).or_insert(0);
        *count = count.saturating_add(n);
    }
}
