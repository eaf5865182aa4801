//! Canonical vocabulary and device layouts
//!
//! Turns device-specific buttons into device-agnostic actions:
//!
//! - [`action`] - the canonical vocabulary and the bus event type
//! - [`layout`] - per-device face/shoulder button layouts
//! - [`registry`] - identity string → layout lookup, extensible at runtime

pub mod action;
pub mod layout;
pub mod registry;

pub use action::{ButtonPress, CanonicalAction};
pub use layout::{ControllerMapping, PrimaryButton, ShoulderButton};
pub use registry::{builtin_mappings, MappingRegistry, DUALSHOCK4_WIRELESS, GENERIC_USB_JOYSTICK};
