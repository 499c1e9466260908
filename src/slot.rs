//! Per-resource bookkeeping and the idle collection

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Stable identity of a slot within its pool.
pub(crate) type SlotId = u64;

/// Owns one resource plus the pool's bookkeeping for it.
pub(crate) struct ResourceSlot<R> {
    id: SlotId,
    resource: Arc<R>,
    usage_count: u32,
    created_at: Instant,
    last_activity: Instant,
}

impl<R> ResourceSlot<R> {
    pub fn new(id: SlotId, resource: R) -> Self {
        // The idle clock starts at creation so a never-used slot can still
        // be measured by the eviction scan.
        let now = Instant::now();
        Self {
            id,
            resource: Arc::new(resource),
            usage_count: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn resource(&self) -> &Arc<R> {
        &self.resource
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Record a hand-out to a caller.
    pub fn mark_acquired(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
        self.touch();
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    pub fn is_idle_expired(&self, now: Instant, timeout: Duration) -> bool {
        self.idle_for(now) > timeout
    }
}

/// Outcome of a blocking wait on the idle collection.
pub(crate) enum Wait<R> {
    Slot(ResourceSlot<R>),
    /// Capacity was freed; the waiter should try to create.
    Capacity,
    TimedOut,
    Closed,
}

/// Outcome of trying to evict one slot.
pub(crate) enum Removal<R> {
    Removed(ResourceSlot<R>),
    FloorReached,
    /// Already taken by an acquirer, or touched since the scan began.
    Skipped,
}

struct IdleState<R> {
    slots: VecDeque<ResourceSlot<R>>,
    closed: bool,
}

/// FIFO of idle slots with a blocking, deadline-bounded pop.
pub(crate) struct IdleQueue<R> {
    state: Mutex<IdleState<R>>,
    available: Condvar,
}

impl<R> IdleQueue<R> {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(IdleState {
                slots: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Append a slot at the tail. Hands the slot back if the queue is closed.
    pub fn push(&self, slot: ResourceSlot<R>) -> Result<(), ResourceSlot<R>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(slot);
        }
        state.slots.push_back(slot);
        self.available.notify_one();
        Ok(())
    }

    pub fn try_pop(&self) -> Option<ResourceSlot<R>> {
        self.state.lock().slots.pop_front()
    }

    /// Block until a slot is pushed, `has_capacity` reports room to create,
    /// the queue closes, or `deadline` passes.
    pub fn wait_pop(&self, deadline: Instant, has_capacity: impl Fn() -> bool) -> Wait<R> {
        let mut state = self.state.lock();
        loop {
            if let Some(slot) = state.slots.pop_front() {
                return Wait::Slot(slot);
            }
            if state.closed {
                return Wait::Closed;
            }
            if has_capacity() {
                return Wait::Capacity;
            }
            if self.available.wait_until(&mut state, deadline).timed_out() {
                return match state.slots.pop_front() {
                    Some(slot) => Wait::Slot(slot),
                    None if state.closed => Wait::Closed,
                    None => Wait::TimedOut,
                };
            }
        }
    }

    /// Wake one waiter after capacity was freed by a destruction.
    ///
    /// Takes the lock so the notification cannot slip between a waiter's
    /// capacity check and its wait.
    pub fn notify_capacity(&self) {
        let _state = self.state.lock();
        self.available.notify_one();
    }

    /// Ids of slots idle longer than `timeout`, in queue order.
    pub fn expired_ids(&self, now: Instant, timeout: Duration) -> Vec<SlotId> {
        self.state
            .lock()
            .slots
            .iter()
            .filter(|slot| slot.is_idle_expired(now, timeout))
            .map(ResourceSlot::id)
            .collect()
    }

    /// Remove slot `id` if it is still idle and expired, unless that would
    /// take the idle count to or below `floor`.
    pub fn remove_expired(
        &self,
        id: SlotId,
        floor: usize,
        now: Instant,
        timeout: Duration,
    ) -> Removal<R> {
        let mut state = self.state.lock();
        if state.slots.len() <= floor {
            return Removal::FloorReached;
        }
        let position = state
            .slots
            .iter()
            .position(|slot| slot.id() == id && slot.is_idle_expired(now, timeout));
        match position.and_then(|index| state.slots.remove(index)) {
            Some(slot) => Removal::Removed(slot),
            None => Removal::Skipped,
        }
    }

    /// Close the queue, wake every waiter and hand back the idle slots.
    pub fn close(&self) -> Vec<ResourceSlot<R>> {
        let mut state = self.state.lock();
        state.closed = true;
        self.available.notify_all();
        state.slots.drain(..).collect()
    }
}
