//! Controller input normalisation
//!
//! Ingests keyboard state, per-tick gamepad button values and discrete gamepad down
//! events and turns them into one device-agnostic stream of [`ButtonPress`] events.
//!
//! ```text
//! Keyboard / Gamepad ──► ControllerHandle ──► EventBus ──► game logic, UI
//!                          │
//!                          └── MappingRegistry (device identity → layout)
//! ```

pub mod config;
pub mod controller;
pub mod events;
pub mod mapping;

#[cfg(feature = "gilrs")]
pub mod backend;

pub use config::{ConfigError, ControllerConfig, ControllerSettings, MappingEntry};
pub use controller::{ConnectionStatus, ControllerHandle, KeyCode, PadInfo, PrimaryButtons};
pub use events::{EventBus, Subscription, SubscriptionId};
pub use mapping::{
    ButtonPress, CanonicalAction, ControllerMapping, MappingRegistry, PrimaryButton,
    ShoulderButton,
};
