//! Multicast bus retaining the latest [`ButtonPress`]
//!
//! # Delivery
//!
//! ```text
//! publish ──► latest := event ──► snapshot(subscribers) ──► deliver in subscription order
//!                                                         ├─ callback (panics isolated)
//!                                                         └─ stream channel
//! ```
//!
//! `publish` returns only after every live subscriber has been served. The internal
//! lock is released before any subscriber runs, so callbacks may publish, subscribe or
//! unsubscribe (themselves included) without deadlocking. An entry unsubscribed during
//! a broadcast is skipped for the rest of that broadcast; the others are each served
//! exactly once.

use crate::events::subscription::{CoalesceSlot, Feed, Subscription};
use crate::mapping::ButtonPress;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

type Callback = Box<dyn Fn(&ButtonPress) + Send + Sync>;

/// Handle identifying one subscription on a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

enum Sink {
    Callback(Callback),
    Stream(mpsc::UnboundedSender<ButtonPress>),
    Window(Arc<CoalesceSlot>),
}

struct Subscriber {
    id: SubscriptionId,
    active: AtomicBool,
    sink: Sink,
}

impl Subscriber {
    // Returns false once the subscriber can no longer receive anything.
    fn deliver(&self, event: &ButtonPress) -> bool {
        match &self.sink {
            Sink::Callback(callback) => {
                match panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                    Ok(()) => true,
                    Err(_) => {
                        error!(
                            "Subscriber {} panicked while handling {:?}, removing it",
                            self.id.0, event
                        );
                        false
                    }
                }
            }
            Sink::Stream(sender) => sender.send(event.clone()).is_ok(),
            Sink::Window(slot) => {
                slot.offer(event);
                true
            }
        }
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        if let Sink::Window(slot) = &self.sink {
            slot.close();
        }
    }
}

pub(crate) struct BusState {
    latest: ButtonPress,
    subscribers: Vec<Arc<Subscriber>>,
    next_id: u64,
}

impl BusState {
    fn add(&mut self, sink: Sink) -> Arc<Subscriber> {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let subscriber = Arc::new(Subscriber {
            id,
            active: AtomicBool::new(true),
            sink,
        });
        self.subscribers.push(Arc::clone(&subscriber));
        subscriber
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        match self.subscribers.iter().position(|s| s.id == id) {
            Some(index) => {
                let subscriber = self.subscribers.remove(index);
                subscriber.active.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }
}

pub(crate) fn lock_state(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Canonical event bus
///
/// Cheap to clone; all clones share the same subscriber list and retained value.
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("EventBus")
            .field("latest", &state.latest)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Creates a bus whose retained value is the idle press
    pub fn new() -> Self {
        debug!("Creating canonical event bus");
        Self {
            state: Arc::new(Mutex::new(BusState {
                latest: ButtonPress::idle(),
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Records `event` as the latest value and delivers it to every live subscriber
    ///
    /// The idle press is only ever the initial retained value; publishing it is a no-op.
    pub fn publish(&self, event: ButtonPress) {
        if event.is_idle() {
            debug!("Ignoring published idle press");
            return;
        }

        let snapshot = {
            let mut state = lock_state(&self.state);
            state.latest = event.clone();
            state.subscribers.clone()
        };

        debug!("Publishing {:?} to {} subscribers", event, snapshot.len());

        let mut closed = Vec::new();
        for subscriber in &snapshot {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }
            if !subscriber.deliver(&event) {
                closed.push(subscriber.id);
            }
        }

        if !closed.is_empty() {
            let mut state = lock_state(&self.state);
            for id in closed {
                state.remove(id);
            }
        }
    }

    /// Registers a callback; it immediately receives the retained value
    pub fn subscribe_with<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ButtonPress) + Send + Sync + 'static,
    {
        let (subscriber, latest) = {
            let mut state = lock_state(&self.state);
            let subscriber = state.add(Sink::Callback(Box::new(callback)));
            (subscriber, state.latest.clone())
        };
        info!("New callback subscriber {}", subscriber.id.0);

        if !subscriber.deliver(&latest) {
            lock_state(&self.state).remove(subscriber.id);
        }
        subscriber.id
    }

    /// Opens a stream subscription
    ///
    /// Without a window every published event is delivered once, in order. With a
    /// window the stream yields at most one event per window: the first event after a
    /// quiet period opens the window and the newest event seen when it closes is the
    /// one delivered. A windowed stream buffers no more than that single value. The
    /// retained value is the first item entering the stream.
    pub fn subscribe(&self, coalesce_window_ms: Option<u32>) -> Subscription {
        let (sink, feed) = match coalesce_window_ms {
            Some(ms) => {
                let slot = Arc::new(CoalesceSlot::new(Duration::from_millis(u64::from(ms))));
                (Sink::Window(Arc::clone(&slot)), Feed::Coalesced(slot))
            }
            None => {
                let (sender, receiver) = mpsc::unbounded_channel();
                (Sink::Stream(sender), Feed::Every(receiver))
            }
        };

        let id = {
            let mut state = lock_state(&self.state);
            let latest = state.latest.clone();
            let subscriber = state.add(sink);
            // Feed is alive in this scope, delivery cannot fail.
            let _ = subscriber.deliver(&latest);
            subscriber.id
        };
        info!(
            "New stream subscriber {} (coalesce window: {:?} ms)",
            id.0, coalesce_window_ms
        );

        Subscription::new(id, feed, Arc::downgrade(&self.state))
    }

    /// Removes a subscription; returns false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = lock_state(&self.state).remove(id);
        if removed {
            debug!("Subscriber {} removed", id.0);
        }
        removed
    }

    pub fn latest(&self) -> ButtonPress {
        lock_state(&self.state).latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        lock_state(&self.state).subscribers.len()
    }
}
