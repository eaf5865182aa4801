use crate::events::bus::{lock_state, BusState, SubscriptionId};
use crate::mapping::ButtonPress;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

#[derive(Debug, Default)]
struct WindowState {
    // Window that already closed but was not handed out yet.
    ready: Option<ButtonPress>,
    // Deadline of the open window and the newest press seen inside it.
    open: Option<(Instant, ButtonPress)>,
    closed: bool,
}

impl WindowState {
    fn settle(&mut self, now: Instant) {
        let elapsed = match &self.open {
            Some((deadline, _)) => now >= *deadline || self.closed,
            None => false,
        };
        if elapsed {
            // A newer closed window replaces one nobody picked up.
            self.ready = self.open.take().map(|(_, press)| press);
        }
    }
}

/// Single-value mailbox behind a coalescing subscription
///
/// Holds at most the open window plus one closed window, however fast the bus
/// publishes.
#[derive(Debug)]
pub(crate) struct CoalesceSlot {
    window: Duration,
    state: Mutex<WindowState>,
    notify: Notify,
}

impl CoalesceSlot {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            state: Mutex::new(WindowState::default()),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called by the bus for every publish
    pub(crate) fn offer(&self, press: &ButtonPress) {
        let now = Instant::now();
        {
            let mut state = self.lock();
            state.settle(now);
            match &mut state.open {
                Some((_, latest)) => *latest = press.clone(),
                None => state.open = Some((now + self.window, press.clone())),
            }
        }
        self.notify.notify_one();
    }

    /// The bus side went away; whatever is still open is flushed on the next read
    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    #[cfg(test)]
    fn held(&self) -> usize {
        let state = self.lock();
        usize::from(state.ready.is_some()) + usize::from(state.open.is_some())
    }
}

/// Where a subscription reads from
pub(crate) enum Feed {
    Every(mpsc::UnboundedReceiver<ButtonPress>),
    Coalesced(Arc<CoalesceSlot>),
}

/// Live stream of canonical events
///
/// Dropping the subscription (or calling [`Subscription::close`]) detaches it from
/// the bus. The stream never restarts.
pub struct Subscription {
    id: SubscriptionId,
    feed: Feed,
    bus: Weak<Mutex<BusState>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, feed: Feed, bus: Weak<Mutex<BusState>>) -> Self {
        Self { id, feed, bus }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn window(&self) -> Option<Duration> {
        match &self.feed {
            Feed::Every(_) => None,
            Feed::Coalesced(slot) => Some(slot.window),
        }
    }

    /// Waits for the next event
    ///
    /// Returns `None` once the bus is gone and everything buffered has been handed out.
    ///
    /// # Cancel safety
    ///
    /// Cancel safe. An open window lives in the subscription, not in the future, so
    /// dropping a pending `recv` (timeout, `select!`) loses nothing and the next call
    /// resumes the same window.
    pub async fn recv(&mut self) -> Option<ButtonPress> {
        let slot = match &mut self.feed {
            Feed::Every(receiver) => return receiver.recv().await,
            Feed::Coalesced(slot) => Arc::clone(slot),
        };

        loop {
            let notified = slot.notify.notified();
            let deadline = {
                let mut state = slot.lock();
                state.settle(Instant::now());
                if let Some(press) = state.ready.take() {
                    return Some(press);
                }
                if state.closed {
                    return None;
                }
                state.open.as_ref().map(|(deadline, _)| *deadline)
            };

            match deadline {
                Some(deadline) => {
                    tokio::select! {
                        _ = notified => {}
                        _ = sleep_until(deadline) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::recv`]
    ///
    /// For a coalescing subscription this only yields once the current window has
    /// fully elapsed.
    pub fn try_recv(&mut self) -> Option<ButtonPress> {
        match &mut self.feed {
            Feed::Every(receiver) => receiver.try_recv().ok(),
            Feed::Coalesced(slot) => {
                let mut state = slot.lock();
                state.settle(Instant::now());
                state.ready.take()
            }
        }
    }

    pub fn close(self) {
        // Detaching happens in Drop.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.bus.upgrade() {
            if lock_state(&state).remove(self.id) {
                debug!("Stream subscriber {} closed", self.id.value());
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("window", &self.window())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Feed;
    use crate::events::EventBus;
    use crate::mapping::{ButtonPress, CanonicalAction};
    use std::time::Duration;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn uncoalesced_stream_yields_every_event_in_order() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(None);

        bus.publish(CanonicalAction::DpadUp.into());
        bus.publish(CanonicalAction::DpadUp.into());
        bus.publish(CanonicalAction::R1.into());

        assert_eq!(sub.recv().await, Some(ButtonPress::idle()));
        assert_eq!(sub.recv().await, Some(CanonicalAction::DpadUp.into()));
        assert_eq!(sub.recv().await, Some(CanonicalAction::DpadUp.into()));
        assert_eq!(sub.recv().await, Some(CanonicalAction::R1.into()));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn events_after_the_window_start_a_new_window() {
        let bus = EventBus::new();
        bus.publish(CanonicalAction::L1.into());
        let mut sub = bus.subscribe(Some(50));

        advance(Duration::from_millis(10)).await;
        bus.publish(CanonicalAction::L2.into());
        advance(Duration::from_millis(60)).await;
        bus.publish(CanonicalAction::R1.into());
        advance(Duration::from_millis(5)).await;
        bus.publish(CanonicalAction::R2.into());

        assert_eq!(sub.recv().await, Some(CanonicalAction::L2.into()));
        assert_eq!(sub.recv().await, Some(CanonicalAction::R2.into()));
        assert!(timeout(Duration::from_millis(200), sub.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn try_recv_waits_for_the_window_to_close() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Some(80));
        bus.publish(CanonicalAction::ApadLeft.into());

        assert!(sub.try_recv().is_none());
        advance(Duration::from_millis(80)).await;
        assert_eq!(sub.try_recv(), Some(CanonicalAction::ApadLeft.into()));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_recv_resumes_the_open_window() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Some(80));
        bus.publish(CanonicalAction::L1.into());

        assert!(timeout(Duration::from_millis(10), sub.recv()).await.is_err());
        advance(Duration::from_millis(200)).await;

        assert_eq!(
            timeout(Duration::from_millis(500), sub.recv()).await,
            Ok(Some(CanonicalAction::L1.into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_recv_keeps_collecting_into_the_same_window() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Some(80));
        bus.publish(CanonicalAction::DpadUp.into());

        assert!(timeout(Duration::from_millis(30), sub.recv()).await.is_err());
        bus.publish(CanonicalAction::DpadDown.into());

        let start = tokio::time::Instant::now();
        assert_eq!(sub.recv().await, Some(CanonicalAction::DpadDown.into()));
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(49) && waited < Duration::from_millis(80));
    }

    #[tokio::test(start_paused = true)]
    async fn coalescing_burst_holds_a_single_value() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Some(80));

        for _ in 0..100_000 {
            bus.publish(CanonicalAction::DpadLeft.into());
        }
        bus.publish(CanonicalAction::DpadRight.into());

        match &sub.feed {
            Feed::Coalesced(slot) => assert_eq!(slot.held(), 1),
            Feed::Every(_) => panic!("windowed subscription without a slot"),
        }
        assert_eq!(sub.recv().await, Some(CanonicalAction::DpadRight.into()));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reader_keeps_only_the_newest_closed_window() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Some(20));

        for action in [
            CanonicalAction::ApadUp,
            CanonicalAction::ApadDown,
            CanonicalAction::ApadLeft,
        ] {
            bus.publish(action.into());
            advance(Duration::from_millis(30)).await;
        }

        match &sub.feed {
            Feed::Coalesced(slot) => assert!(slot.held() <= 2),
            Feed::Every(_) => panic!("windowed subscription without a slot"),
        }
        assert_eq!(sub.try_recv(), Some(CanonicalAction::ApadLeft.into()));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn coalesced_stream_flushes_and_ends_when_bus_is_gone() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Some(80));
        bus.publish(CanonicalAction::R1.into());
        drop(bus);

        assert_eq!(sub.recv().await, Some(CanonicalAction::R1.into()));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn dropping_a_subscription_detaches_it() {
        let bus = EventBus::new();
        let sub = bus.subscribe(None);
        let other = bus.subscribe(Some(10));
        assert_eq!(bus.subscriber_count(), 2);

        drop(sub);
        other.close();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn stream_ends_when_bus_is_gone() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(None);
        bus.publish(CanonicalAction::DpadRight.into());
        drop(bus);

        assert_eq!(sub.recv().await, Some(ButtonPress::idle()));
        assert_eq!(sub.recv().await, Some(CanonicalAction::DpadRight.into()));
        assert_eq!(sub.recv().await, None);
    }
}
