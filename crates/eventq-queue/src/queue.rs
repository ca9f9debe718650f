//! The priority-ordered, mutex-guarded [`EventQueue`].
//!
//! # Layout
//!
//! Entries live in an index-based arena (`Vec<Slot>`) and are singly linked
//! from `head` by slot index, in non-increasing priority order. A new entry
//! is spliced in front of the first entry whose priority is strictly lower,
//! which places it after every entry of equal priority (FIFO among ties).
//!
//! Popped slots are pushed onto a free list and reused by later pushes. Once
//! the queue drains to empty the arena is cleared. Callers only ever receive
//! copies of [`Event`] values, never a handle into the arena.
//!
//! # Locking
//!
//! One [`Mutex`] guards the whole chain. `push` holds it for the full O(n)
//! scan, so pushes and pops are totally ordered by lock acquisition. Every
//! entry is stamped with a sequence number under the lock, which records
//! that order.
//!
//! No foreign code runs while the lock is held and no step of a mutation can
//! panic, so a poisoned lock still guards a consistent chain and is
//! recovered rather than propagated.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use eventq_types::{Event, Priority};

use crate::config::QueueConfig;
use crate::error::QueueError;

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// A queued event and its link to the next entry.
struct Node<'a, S, R> {
    event: Event<'a, S, R>,
    /// Lock-acquisition order of the push that created this entry.
    seq: u64,
    next: Option<usize>,
}

enum Slot<'a, S, R> {
    Occupied(Node<'a, S, R>),
    Vacant { next_free: Option<usize> },
}

/// Everything behind the lock.
struct Chain<'a, S, R> {
    slots: Vec<Slot<'a, S, R>>,
    head: Option<usize>,
    free: Option<usize>,
    len: usize,
    next_seq: u64,
    pushed: u64,
    popped: u64,
    rejected: u64,
    high_water: usize,
}

impl<'a, S, R> Chain<'a, S, R> {
    const fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            free: None,
            len: 0,
            next_seq: 0,
            pushed: 0,
            popped: 0,
            rejected: 0,
            high_water: 0,
        }
    }

    fn node(&self, idx: usize) -> Option<&Node<'a, S, R>> {
        match self.slots.get(idx) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<'a, S, R>> {
        match self.slots.get_mut(idx) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Find where an entry of `priority` belongs.
    ///
    /// Returns `(prev, next)`: the last entry with priority `>= priority`
    /// (or `None` to insert at the head) and the first entry with a strictly
    /// lower priority (or `None` at the tail).
    fn position_for(&self, priority: Priority) -> (Option<usize>, Option<usize>) {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let Some(node) = self.node(idx) else {
                break;
            };
            if node.event.priority() < priority {
                break;
            }
            prev = Some(idx);
            cur = node.next;
        }
        (prev, cur)
    }

    /// Store `node` in a free slot, or in a newly reserved one.
    fn allocate(&mut self, node: Node<'a, S, R>) -> Result<usize, QueueError> {
        if let Some(idx) = self.free {
            if let Some(slot) = self.slots.get_mut(idx) {
                if let Slot::Vacant { next_free } = *slot {
                    self.free = next_free;
                    *slot = Slot::Occupied(node);
                    return Ok(idx);
                }
            }
        }

        self.slots.try_reserve(1)?;
        let idx = self.slots.len();
        self.slots.push(Slot::Occupied(node));
        Ok(idx)
    }

    fn link_after(&mut self, prev: Option<usize>, idx: usize) {
        if let Some(node) = prev.and_then(|p| self.node_mut(p)) {
            node.next = Some(idx);
            return;
        }
        self.head = Some(idx);
    }

    fn insert(&mut self, event: Event<'a, S, R>) -> Result<u64, QueueError> {
        let (prev, next) = self.position_for(event.priority());
        let seq = self.next_seq;
        let idx = self.allocate(Node { event, seq, next })?;
        self.link_after(prev, idx);

        self.next_seq = seq.wrapping_add(1);
        self.len = self.len.saturating_add(1);
        self.pushed = self.pushed.saturating_add(1);
        self.high_water = self.high_water.max(self.len);
        Ok(seq)
    }

    /// Unlink the head entry and return its node.
    fn remove_head(&mut self) -> Option<Node<'a, S, R>> {
        let idx = self.head?;
        let slot = self.slots.get_mut(idx)?;
        match std::mem::replace(slot, Slot::Vacant { next_free: self.free }) {
            Slot::Occupied(node) => {
                self.free = Some(idx);
                self.head = node.next;
                self.len = self.len.saturating_sub(1);
                self.popped = self.popped.saturating_add(1);
                if self.len == 0 {
                    self.slots.clear();
                    self.free = None;
                }
                Some(node)
            }
            vacant @ Slot::Vacant { .. } => {
                *slot = vacant;
                None
            }
        }
    }

    fn occupied(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count()
    }

    const fn stats(&self) -> QueueStats {
        QueueStats {
            len: self.len,
            pushed: self.pushed,
            popped: self.popped,
            rejected: self.rejected,
            high_water: self.high_water,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Snapshot of queue activity returned by [`EventQueue::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Entries currently queued.
    pub len: usize,
    /// Successful pushes since creation.
    pub pushed: u64,
    /// Successful pops (including drained entries) since creation.
    pub popped: u64,
    /// Pushes refused with an error.
    pub rejected: u64,
    /// Largest length the queue has reached.
    pub high_water: usize,
}

impl core::fmt::Display for QueueStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} queued, {} pushed, {} popped, {} rejected, high water {}",
            self.len, self.pushed, self.popped, self.rejected, self.high_water
        )
    }
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// A thread-safe queue of [`Event`]s, dequeued highest priority first.
///
/// Equal priorities dequeue in the order their pushes acquired the lock.
/// All operations take `&self`; share the queue by reference across scoped
/// threads or wrap it in an `Arc`.
///
/// The queue exists in exactly one state between construction and
/// [`teardown`](Self::teardown): ready. Teardown consumes it, and dropping
/// it releases every remaining entry the same way.
pub struct EventQueue<'a, S, R> {
    inner: Mutex<Chain<'a, S, R>>,
    capacity: Option<usize>,
}

impl<'a, S, R> EventQueue<'a, S, R> {
    /// Create an empty, unbounded queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Chain::new()),
            capacity: None,
        }
    }

    /// Create an empty queue from configuration.
    ///
    /// Reserves `config.initial_slots` node slots up front.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ResourceExhausted`] if the initial reservation
    /// fails.
    pub fn with_config(config: &QueueConfig) -> Result<Self, QueueError> {
        let mut chain = Chain::new();
        chain.slots.try_reserve(config.initial_slots)?;
        debug!(
            capacity = config.capacity,
            initial_slots = config.initial_slots,
            "event queue created"
        );
        Ok(Self {
            inner: Mutex::new(chain),
            capacity: config.bound(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Chain<'a, S, R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a copy of `event` in priority order.
    ///
    /// The event lands after every queued event whose priority is greater
    /// than or equal to its own.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] if the queue is bounded and at capacity,
    /// or [`QueueError::ResourceExhausted`] if node storage cannot be
    /// allocated. The queue is unchanged in both cases.
    pub fn push(&self, event: Event<'a, S, R>) -> Result<(), QueueError> {
        let mut guard = self.lock();
        let chain = &mut *guard;

        if let Some(capacity) = self.capacity {
            if chain.len >= capacity {
                chain.rejected = chain.rejected.saturating_add(1);
                return Err(QueueError::Full { capacity });
            }
        }

        let inserted = chain.insert(event);
        if inserted.is_err() {
            chain.rejected = chain.rejected.saturating_add(1);
        }
        let seq = inserted?;
        trace!(priority = %event.priority(), seq, len = chain.len, "event pushed");
        Ok(())
    }

    /// Remove and return the highest-priority event.
    ///
    /// Among equal priorities the earliest push wins. Returns `None`
    /// immediately when the queue is empty; this never waits for a push.
    pub fn pop(&self) -> Option<Event<'a, S, R>> {
        let mut chain = self.lock();
        let node = chain.remove_head()?;
        trace!(priority = %node.event.priority(), seq = node.seq, len = chain.len, "event popped");
        Some(node.event)
    }

    /// Return a copy of the event [`pop`](Self::pop) would return, without
    /// removing it.
    pub fn peek(&self) -> Option<Event<'a, S, R>> {
        let chain = self.lock();
        chain.head.and_then(|idx| chain.node(idx)).map(|node| node.event)
    }

    /// Remove every queued event, returned in pop order.
    ///
    /// Runs under a single lock acquisition, so no concurrent push can
    /// interleave with the drain.
    pub fn drain(&self) -> Vec<Event<'a, S, R>> {
        let mut chain = self.lock();
        let mut out = Vec::with_capacity(chain.len);
        while let Some(node) = chain.remove_head() {
            out.push(node.event);
        }
        out
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Whether the queue holds no events.
    pub fn is_empty(&self) -> bool {
        self.lock().head.is_none()
    }

    /// The configured bound, or `None` when unbounded.
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Snapshot of cumulative activity counters.
    pub fn stats(&self) -> QueueStats {
        self.lock().stats()
    }

    /// Release every remaining entry and the lock.
    ///
    /// Consumes the queue, so it cannot be used afterwards. Returns the
    /// number of entries released.
    pub fn teardown(self) -> usize {
        let chain = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        let released = chain.occupied();
        debug!(
            released,
            pushed = chain.pushed,
            popped = chain.popped,
            rejected = chain.rejected,
            "event queue torn down"
        );
        released
    }

    /// Walk the chain and check ordering and count invariants.
    #[cfg(test)]
    fn check_invariants(&self) -> bool {
        let chain = self.lock();
        let mut count = 0_usize;
        let mut last: Option<(Priority, u64)> = None;
        let mut cur = chain.head;
        while let Some(idx) = cur {
            let Some(node) = chain.node(idx) else {
                return false;
            };
            let key = (node.event.priority(), node.seq);
            if let Some((prio, seq)) = last {
                if key.0 > prio || (key.0 == prio && key.1 <= seq) {
                    return false;
                }
            }
            last = Some(key);
            count = count.saturating_add(1);
            cur = node.next;
        }
        count == chain.len && count == chain.occupied()
    }
}

impl<S, R> Default for EventQueue<'_, S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, R> core::fmt::Debug for EventQueue<'_, S, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventQueue")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
