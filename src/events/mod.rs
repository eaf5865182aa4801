//! Canonical event bus
//!
//! - [`bus`] - multicast publisher retaining the latest value
//! - [`subscription`] - stream subscriptions with optional coalescing windows

pub mod bus;
pub mod subscription;

pub use bus::{EventBus, SubscriptionId};
pub use subscription::Subscription;
