//! Controller subsystem: raw host signals in, canonical events out
//!
//! Two dispatch models feed the same bus:
//!
//! 1. [`sampler`] - level-triggered, sampled once per host tick (held directions)
//! 2. [`dispatcher`] - edge-triggered, fired from down callbacks (actions, shoulders,
//!    face buttons)
//!
//! [`handshake`] resolves the active pad's layout on attach and [`controller_handle`]
//! ties everything together for the host.
//!
//! ```text
//! Host ──► ControllerHandle ──► Sampler / Dispatcher ──► EventBus
//! ```

pub mod controller_handle;
pub mod dispatcher;
pub mod gamepad;
pub mod handshake;
pub mod keys;
pub mod sampler;

pub use controller_handle::ControllerHandle;
pub use dispatcher::ActionDispatcher;
pub use gamepad::{standard, ButtonValues, GamepadState, PadInfo, PrimaryButtons};
pub use handshake::{ActivePad, ConnectionStatus, PadSlot};
pub use keys::{HeldKeys, KeyCode, KeyboardState};
pub use sampler::{DirectionBinding, PollingSampler};
